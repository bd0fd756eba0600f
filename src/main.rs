use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beurs_cowboy::routers::create_routes;
use beurs_cowboy::{
    load_config, AppState, DataCollectorService, MarketAnalyzerService, MarketDataHolder,
    NewsFeedHolder, SiteRendererService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Настройка структурированного логирования
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("beurs_cowboy=info,warn"));

    let file_appender = tracing_appender::rolling::daily("logs", "beurs_cowboy.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(file_writer))
        .init();

    let config = load_config()?;
    let market_holder = MarketDataHolder::new();
    let news_holder = NewsFeedHolder::new();

    let state = AppState {
        collector: DataCollectorService::new(
            market_holder.clone(),
            news_holder.clone(),
            config.clone(),
        ),
        analyzer: MarketAnalyzerService::new(market_holder, news_holder, config.clone()),
        renderer: SiteRendererService::new(config.clone()),
        config,
    };

    let app = create_routes(state);
    println!("Сервер запущен на http://localhost:3000");
    axum::Server::bind(&"0.0.0.0:3000".parse()?)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
