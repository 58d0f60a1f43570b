// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod browser_engine;
pub mod document;
pub mod fetch_engine;
pub mod request_filter;
pub mod traits;
