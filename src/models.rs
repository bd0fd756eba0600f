use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Дневная история цен, отсортированная по дате по возрастанию.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        PriceSeries { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn latest_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn average_close(&self) -> Option<f64> {
        if self.bars.is_empty() {
            return None;
        }
        let sum: f64 = self.bars.iter().map(|b| b.close).sum();
        Some(sum / self.bars.len() as f64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub source: String,
    pub title: String,
    pub link: Option<String>,
    pub published_at: Option<String>,
    pub summary: String,
    pub age_hours: Option<f64>,
}

/// Собранные данные одного тикера: история цен плюс свежие заголовки.
#[derive(Debug, Clone)]
pub struct TickerMarketData {
    pub series: PriceSeries,
    pub headlines: Vec<String>,
}

/// Последние значения всех технических индикаторов.
/// None означает "недостаточно данных", не ноль.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub sma_short: Option<f64>,
    pub sma_medium: Option<f64>,
    pub atr: Option<f64>,
    pub atr_pct: Option<f64>,
    pub volatility_rank: f64,
    pub high_52w: f64,
    pub low_52w: f64,
    pub latest_volume: u64,
}

#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub score: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub score: f64,
    pub summary: String,
    pub catalyst: String,
}

impl SentimentResult {
    pub fn no_news() -> Self {
        SentimentResult {
            score: 0.0,
            summary: "Geen nieuws".to_string(),
            catalyst: "Geen".to_string(),
        }
    }

    pub fn not_analyzed() -> Self {
        SentimentResult {
            score: 0.0,
            summary: "Geen analyse".to_string(),
            catalyst: "Geen".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionalSentiment {
    pub score: f64,
    pub article_count: usize,
    pub label: String,
    pub positive_count: usize,
    pub negative_count: usize,
}

/// Итоговая запись анализа одного тикера. Создаётся один раз за прогон,
/// все числовые поля уже округлены для снапшота.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub price: f64,
    pub change_pct: f64,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub atr_pct: Option<f64>,
    pub vol_rank: f64,
    pub setup_score: f64,
    pub setup_reasons: Vec<String>,
    pub setup_type: String,
    pub potential_upside: f64,
    pub sentiment_score: f64,
    pub sentiment_summary: String,
    pub catalyst: String,
    pub is_trending: bool,
    pub social_weight: f64,
    pub signal: String,
    pub signal_class: String,
    pub high_52w: f64,
    pub low_52w: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingSnapshot {
    pub ticker: String,
    pub watchlist_count: u64,
    pub price: f64,
    pub change_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketReport {
    pub date: String,
    pub timestamp: String,
    pub status: String,
    pub records: Vec<AnalysisRecord>,
    pub regional_sentiment: BTreeMap<String, RegionalSentiment>,
    pub trending: Vec<TrendingSnapshot>,
}

// Округление до точности снапшота
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
