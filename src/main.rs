// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anime_scraper::application::usecases::scrape_episode::ScrapeEpisodeUseCase;
use anime_scraper::config::settings::Settings;
use anime_scraper::engines::browser_engine::ChromiumRenderer;
use anime_scraper::infrastructure::metrics::init_metrics;
use anime_scraper::presentation::routes;
use anime_scraper::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Arc::new(Settings::new()?);

    // 2. Initialize logging
    telemetry::init_telemetry(&settings.log.format);
    info!(
        environment = %settings.environment,
        "Starting anime-scraper {}",
        env!("CARGO_PKG_VERSION")
    );

    // 3. Initialize Prometheus metrics
    let metrics = if settings.metrics.enabled {
        init_metrics()
    } else {
        None
    };

    // 4. Build the scrape pipeline
    let renderer = Arc::new(ChromiumRenderer::new(settings.browser.clone()));
    let use_case = Arc::new(ScrapeEpisodeUseCase::new(&settings, renderer)?);

    // 5. Start HTTP server
    let app = routes::app(use_case, settings.clone(), metrics);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
