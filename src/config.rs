use anyhow::Result;
use config::Config;
use std::env;

/// Параметры технического анализа (окна индикаторов).
#[derive(Clone, Debug, serde::Deserialize)]
pub struct TechnicalParams {
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub atr_period: usize,
    pub volatility_period: usize,
    pub sma_short: usize,
    pub sma_medium: usize,
}

impl Default for TechnicalParams {
    fn default() -> Self {
        TechnicalParams {
            rsi_window: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            atr_period: 14,
            volatility_period: 252,
            sma_short: 20,
            sma_medium: 50,
        }
    }
}

/// Веса скоринговых правил.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ScoringWeights {
    pub rsi_oversold: f64,
    pub rsi_bullish: f64,
    pub macd_bullish: f64,
    pub ma_alignment: f64,
    pub high_volatility: f64,
    pub sentiment_multiplier: f64,
    pub social_max_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            rsi_oversold: 2.0,
            rsi_bullish: 1.5,
            macd_bullish: 2.0,
            ma_alignment: 2.0,
            high_volatility: 1.0,
            sentiment_multiplier: 3.0,
            social_max_bonus: 0.3,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct SentimentKeywords {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct FeedEntry {
    pub source: String,
    pub url: String,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct RegionEntry {
    pub name: String,
    pub feeds: Vec<String>,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct CompanyEntry {
    pub ticker: String,
    pub name: String,
    pub sector: String,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Limits {
    pub rss_feed_limit: Option<usize>,
    pub max_age_hours: Option<i64>,
    pub max_headlines_per_ticker: Option<usize>,
    pub max_llm_headlines: Option<usize>,
    pub max_trending_display: Option<usize>,
    pub max_regional_display: Option<usize>,
    pub trending_limit: Option<usize>,
    pub parallel_workers: Option<usize>,
}

#[derive(Clone, serde::Deserialize)]
pub struct AppConfig {
    pub market_data_url: String,
    pub stocktwits_url: String,
    pub history_range: Option<String>,
    pub llm_api_url: Option<String>,
    pub llm_model: Option<String>,
    #[serde(default)]
    pub llm_api_key: Option<String>,
    pub output_dir: String,
    pub data_dir: String,
    pub rss_feeds: Vec<FeedEntry>,
    pub regions: Vec<RegionEntry>,
    pub tickers: Vec<String>,
    pub companies: Vec<CompanyEntry>,
    pub sentiment_keywords: SentimentKeywords,
    pub macro_keywords: SentimentKeywords,
    #[serde(default)]
    pub technical: TechnicalParams,
    #[serde(default)]
    pub weights: ScoringWeights,
    #[serde(default)]
    pub limits: Limits,
}

impl AppConfig {
    /// Валидация конфигурации
    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(anyhow::anyhow!("tickers cannot be empty"));
        }

        if self.sentiment_keywords.positive.is_empty() || self.sentiment_keywords.negative.is_empty() {
            return Err(anyhow::anyhow!("sentiment keywords cannot be empty"));
        }

        if self.macro_keywords.positive.is_empty() || self.macro_keywords.negative.is_empty() {
            return Err(anyhow::anyhow!("macro keywords cannot be empty"));
        }

        if self.rss_feeds.is_empty() {
            return Err(anyhow::anyhow!("rss_feeds cannot be empty"));
        }

        if let Some(workers) = self.limits.parallel_workers {
            if workers == 0 || workers > 50 {
                return Err(anyhow::anyhow!("parallel_workers must be between 1 and 50"));
            }
        }

        if let Some(limit) = self.limits.rss_feed_limit {
            if limit == 0 || limit > 100 {
                return Err(anyhow::anyhow!("rss_feed_limit must be between 1 and 100"));
            }
        }

        for region in &self.regions {
            for feed in &region.feeds {
                if !self.rss_feeds.iter().any(|f| &f.source == feed) {
                    return Err(anyhow::anyhow!(
                        "region {} references unknown feed {}",
                        region.name,
                        feed
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn company_name(&self, ticker: &str) -> String {
        self.companies
            .iter()
            .find(|c| c.ticker == ticker)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| ticker.to_string())
    }

    pub fn sector(&self, ticker: &str) -> String {
        self.companies
            .iter()
            .find(|c| c.ticker == ticker)
            .map(|c| c.sector.clone())
            .unwrap_or_else(|| "Overig".to_string())
    }

    pub fn region_of(&self, source: &str) -> String {
        self.regions
            .iter()
            .find(|r| r.feeds.iter().any(|f| f == source))
            .map(|r| r.name.clone())
            .unwrap_or_else(|| "Overig".to_string())
    }
}

pub fn load_config() -> Result<AppConfig> {
    // Загружаем .env файл
    dotenvy::dotenv().ok();

    let settings = Config::builder()
        .add_source(config::File::with_name("config"))
        .add_source(config::Environment::with_prefix("BEURS_COWBOY"))
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    // Ключ LLM берем только из окружения; без ключа работает keyword-путь
    if let Ok(key) = env::var("LLM_API_KEY") {
        config.llm_api_key = Some(key);
    }

    config.validate()?;

    Ok(config)
}
