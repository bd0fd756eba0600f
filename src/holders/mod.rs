pub mod market;
pub mod news;

pub use market::MarketDataHolder;
pub use news::NewsFeedHolder;
