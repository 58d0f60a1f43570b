// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Json, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    application::dto::{
        scrape_request::{ScrapeByNameRequestDto, ScrapeEpisodeRequestDto, ScrapeSimpleRequestDto},
        scrape_response::{ScrapeNotFoundResponseDto, ScrapeSuccessResponseDto},
    },
    application::usecases::scrape_episode::{AcquisitionStrategy, ScrapeEpisodeUseCase},
    config::settings::Settings,
    domain::models::extraction_target::ExtractionTarget,
    domain::models::streaming_result::{elapsed_seconds, ScrapeOutcome},
    presentation::errors::AppError,
    utils::errors::ScrapeError,
};

/// 渲染抓取：`POST /scrape-episode`，请求体 `{ episodeUrl }`
pub async fn scrape_episode(
    Extension(use_case): Extension<Arc<ScrapeEpisodeUseCase>>,
    Extension(settings): Extension<Arc<Settings>>,
    payload: Result<Json<ScrapeEpisodeRequestDto>, JsonRejection>,
) -> Result<Response, AppError> {
    let started = Instant::now();
    let target = payload
        .map_err(|rejection| AppError::from_json_rejection(rejection, started))?
        .0
        .into_target();
    run_scrape(&use_case, &settings, target, AcquisitionStrategy::Rendered, started).await
}

/// 渲染抓取：`POST /scrape-by-name`，请求体 `{ animeName, episodeNumber }`
pub async fn scrape_by_name(
    Extension(use_case): Extension<Arc<ScrapeEpisodeUseCase>>,
    Extension(settings): Extension<Arc<Settings>>,
    payload: Result<Json<ScrapeByNameRequestDto>, JsonRejection>,
) -> Result<Response, AppError> {
    let started = Instant::now();
    let target = payload
        .map_err(|rejection| AppError::from_json_rejection(rejection, started))?
        .0
        .into_target();
    run_scrape(&use_case, &settings, target, AcquisitionStrategy::Rendered, started).await
}

/// 静态抓取（查询参数）：`GET /scrape-simple`、`GET /scrape-episode`
pub async fn scrape_simple_query(
    Extension(use_case): Extension<Arc<ScrapeEpisodeUseCase>>,
    Extension(settings): Extension<Arc<Settings>>,
    query: Result<Query<ScrapeSimpleRequestDto>, QueryRejection>,
) -> Result<Response, AppError> {
    let started = Instant::now();
    let target = query
        .map_err(|rejection| AppError::from_query_rejection(rejection, started))?
        .0
        .into_target();
    run_scrape(&use_case, &settings, target, AcquisitionStrategy::Static, started).await
}

/// 静态抓取（请求体）：`POST /scrape-simple`
pub async fn scrape_simple_body(
    Extension(use_case): Extension<Arc<ScrapeEpisodeUseCase>>,
    Extension(settings): Extension<Arc<Settings>>,
    payload: Result<Json<ScrapeSimpleRequestDto>, JsonRejection>,
) -> Result<Response, AppError> {
    let started = Instant::now();
    let target = payload
        .map_err(|rejection| AppError::from_json_rejection(rejection, started))?
        .0
        .into_target();
    run_scrape(&use_case, &settings, target, AcquisitionStrategy::Static, started).await
}

async fn run_scrape(
    use_case: &ScrapeEpisodeUseCase,
    settings: &Settings,
    target: Result<ExtractionTarget, ScrapeError>,
    strategy: AcquisitionStrategy,
    started: Instant,
) -> Result<Response, AppError> {
    let expose_details = !settings.is_production();
    let fail = |e: ScrapeError| AppError::new(e, started).with_details(expose_details);

    let target = target.map_err(fail)?;
    let episode_url = use_case.resolve(&target).map_err(fail)?;

    match use_case
        .execute(&target, &episode_url, strategy, started)
        .await
    {
        Ok(ScrapeOutcome::Found(result)) => Ok((
            StatusCode::OK,
            Json(ScrapeSuccessResponseDto::new(*result)),
        )
            .into_response()),
        Ok(ScrapeOutcome::NotFound(report)) => Ok((
            StatusCode::NOT_FOUND,
            Json(ScrapeNotFoundResponseDto::new(
                report,
                elapsed_seconds(started.elapsed()),
            )),
        )
            .into_response()),
        Err(e) => Err(fail(e).with_episode_url(episode_url)),
    }
}
