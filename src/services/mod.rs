pub mod analyzer;
pub mod collector;
pub mod renderer;

pub use analyzer::MarketAnalyzerService;
pub use collector::DataCollectorService;
pub use renderer::SiteRendererService;
