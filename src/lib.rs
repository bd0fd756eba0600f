pub mod analysis;
pub mod config;
pub mod errors;
pub mod holders;
pub mod models;
pub mod routers;
pub mod services;

pub use config::{
    load_config, AppConfig, CompanyEntry, FeedEntry, Limits, RegionEntry, ScoringWeights,
    SentimentKeywords, TechnicalParams,
};
pub use errors::{AnalysisError, Result};
pub use holders::{MarketDataHolder, NewsFeedHolder};
pub use models::{
    AnalysisRecord, IndicatorSet, MarketReport, NewsArticle, PriceBar, PriceSeries,
    RegionalSentiment, ScoreResult, SentimentResult, TickerMarketData, TrendingSnapshot,
};
pub use services::{DataCollectorService, MarketAnalyzerService, SiteRendererService};

#[derive(Clone)]
pub struct AppState {
    pub collector: DataCollectorService,
    pub analyzer: MarketAnalyzerService,
    pub renderer: SiteRendererService,
    pub config: AppConfig,
}
