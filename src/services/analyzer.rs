use chrono::Utc;
use reqwest::{Client, ClientBuilder};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::analysis::{indicators, scoring, sentiment};
use crate::config::{AppConfig, ScoringWeights, TechnicalParams};
use crate::errors::{AnalysisError, Result};
use crate::holders::{MarketDataHolder, NewsFeedHolder};
use crate::models::{
    round1, round2, round4, AnalysisRecord, MarketReport, PriceSeries, RegionalSentiment,
    ScoreResult, SentimentResult, TickerMarketData, TrendingSnapshot,
};

#[derive(Clone)]
pub struct MarketAnalyzerService {
    client: Client,
    market_holder: MarketDataHolder,
    news_holder: NewsFeedHolder,
    config: AppConfig,
}

impl MarketAnalyzerService {
    pub fn new(
        market_holder: MarketDataHolder,
        news_holder: NewsFeedHolder,
        config: AppConfig,
    ) -> Self {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build reqwest client");
        MarketAnalyzerService {
            client,
            market_holder,
            news_holder,
            config,
        }
    }

    pub async fn analyze(&self, tickers: &[String]) -> Result<MarketReport> {
        let mut ticker_data: Vec<(String, TickerMarketData)> = Vec::new();
        for ticker in tickers {
            if let Some(data) = self.market_holder.get(ticker).await? {
                ticker_data.push((ticker.clone(), data));
            }
        }
        if ticker_data.is_empty() {
            return Err(AnalysisError::NoDataSourcesAvailable(
                "Нет рыночных данных ни по одному тикеру".to_string(),
            ));
        }

        let ticker_headlines: HashMap<String, Vec<String>> = ticker_data
            .iter()
            .map(|(ticker, data)| (ticker.clone(), data.headlines.clone()))
            .collect();
        let sentiments = self.resolve_sentiment_batch(&ticker_headlines).await;

        let trending = self.news_holder.trending().await?;

        let mut records = Vec::with_capacity(ticker_data.len());
        for (ticker, data) in &ticker_data {
            let sentiment_result = sentiments
                .get(ticker)
                .cloned()
                .unwrap_or_else(SentimentResult::no_news);
            let watchlist_count = trending.get(ticker).copied();

            match compose_record(
                ticker,
                &self.config.company_name(ticker),
                &self.config.sector(ticker),
                &data.series,
                &sentiment_result,
                watchlist_count,
                &self.config.technical,
                &self.config.weights,
            ) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Тикер {} исключен из отчета: {}", ticker, e),
            }
        }

        // Сортировка по итоговому скору, лучшие сетапы сверху
        records.sort_by(|a, b| {
            b.setup_score
                .partial_cmp(&a.setup_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let regional_sentiment = self.build_regional_sentiment().await?;
        let trending_snapshot = build_trending(&records, &trending);

        tracing::info!("Проанализировано {} тикеров", records.len());

        let today = Utc::now().date_naive();
        Ok(MarketReport {
            date: today.format("%Y-%m-%d").to_string(),
            timestamp: Utc::now().to_rfc3339(),
            status: "success".to_string(),
            records,
            regional_sentiment,
            trending: trending_snapshot,
        })
    }

    async fn build_regional_sentiment(&self) -> Result<BTreeMap<String, RegionalSentiment>> {
        let regional = self.news_holder.regional().await?;
        let mut result = BTreeMap::new();
        for region in &self.config.regions {
            let articles = regional
                .get(&region.name)
                .map(|articles| articles.as_slice())
                .unwrap_or(&[]);
            result.insert(
                region.name.clone(),
                sentiment::regional_sentiment(articles, &self.config.macro_keywords),
            );
        }
        Ok(result)
    }

    /// Двухступенчатый резолвер: сначала LLM, при любой типизированной
    /// ошибке батч целиком уходит на keyword-путь.
    async fn resolve_sentiment_batch(
        &self,
        ticker_headlines: &HashMap<String, Vec<String>>,
    ) -> HashMap<String, SentimentResult> {
        if ticker_headlines.is_empty() {
            return HashMap::new();
        }

        if self.config.llm_api_url.is_some() {
            match self.llm_batch_sentiment(ticker_headlines).await {
                Ok(result) => return result,
                Err(e) => {
                    tracing::warn!("LLM недоступен, переходим на ключевые слова: {}", e);
                }
            }
        }

        ticker_headlines
            .iter()
            .map(|(ticker, headlines)| {
                (
                    ticker.clone(),
                    sentiment::keyword_sentiment(headlines, &self.config.sentiment_keywords),
                )
            })
            .collect()
    }

    async fn llm_batch_sentiment(
        &self,
        ticker_headlines: &HashMap<String, Vec<String>>,
    ) -> Result<HashMap<String, SentimentResult>> {
        let url = self
            .config
            .llm_api_url
            .as_deref()
            .ok_or_else(|| AnalysisError::SentimentService("LLM не настроен".to_string()))?;
        let max_headlines = self.config.limits.max_llm_headlines.unwrap_or(7);

        let mut tickers: Vec<&String> = ticker_headlines.keys().collect();
        tickers.sort();

        let mut input_text = String::new();
        for ticker in &tickers {
            let headlines: Vec<&str> = ticker_headlines[*ticker]
                .iter()
                .filter(|h| !h.is_empty())
                .take(max_headlines)
                .map(|h| h.as_str())
                .collect();
            if headlines.is_empty() {
                continue;
            }
            input_text.push_str(&format!("\n{}:\n", ticker));
            for headline in headlines {
                input_text.push_str(&format!("  - {}\n", headline));
            }
        }
        if input_text.trim().is_empty() {
            return Err(AnalysisError::SentimentService(
                "Нет заголовков для анализа".to_string(),
            ));
        }

        let prompt = format!(
            "Je bent een financiële sentiment analist. Analyseer het nieuws voor deze aandelen:\n\
            {}\n\n\
            Geef je antwoord ALS ALLEEN EEN JSON OBJECT in dit formaat:\n\
            {{\n    \"TICKER1\": {{\"score\": <getal -1.0 tot 1.0>, \"summary\": \"<1 zin>\", \"catalyst\": \"<catalyst of 'Geen'>\"}},\n    ...\n}}\n\n\
            Score richtlijnen:\n\
            - Zeer negatief (-1.0 tot -0.6): slechte cijfers, ontslagen, schandalen\n\
            - Negatief (-0.6 tot -0.3): tegenvallers, waarschuwingen\n\
            - Neutraal (-0.3 tot 0.3): gemengd, geen duidelijke trend\n\
            - Positief (0.3 tot 0.6): goede cijfers, groei, partnerships\n\
            - Zeer positief (0.6 tot 1.0): records, doorbraken, upgrades\n\n\
            Geef ALLEEN de JSON terug, geen uitleg.",
            input_text
        );

        let payload = json!({
            "model": self.config.llm_model.as_deref().unwrap_or("qwen-plus"),
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.2,
        });

        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&payload);
        if let Some(key) = &self.config.llm_api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AnalysisError::SentimentService(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::SentimentService(format!(
                "статус {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::SentimentParse(e.to_string()))?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                AnalysisError::SentimentParse("Отсутствует текст ответа".to_string())
            })?;

        let json_text = sentiment::extract_json_object(content).ok_or_else(|| {
            AnalysisError::SentimentParse("В ответе нет JSON объекта".to_string())
        })?;
        let parsed: Value = serde_json::from_str(json_text)
            .map_err(|e| AnalysisError::SentimentParse(e.to_string()))?;
        let map = parsed.as_object().ok_or_else(|| {
            AnalysisError::SentimentParse("Ответ не является объектом".to_string())
        })?;

        // Тикеры, пропущенные моделью, получают нейтральный дефолт
        let mut sentiments = HashMap::new();
        for ticker in ticker_headlines.keys() {
            let result = match map.get(ticker) {
                Some(entry) => SentimentResult {
                    score: round2(entry["score"].as_f64().unwrap_or(0.0).clamp(-1.0, 1.0)),
                    summary: entry["summary"]
                        .as_str()
                        .unwrap_or("Gemengd nieuws")
                        .to_string(),
                    catalyst: entry["catalyst"].as_str().unwrap_or("Geen").to_string(),
                },
                None => SentimentResult::not_analyzed(),
            };
            sentiments.insert(ticker.clone(), result);
        }

        Ok(sentiments)
    }
}

/// Собирает итоговую запись одного тикера: индикаторы, скор, потенциал,
/// тип сетапа и сигнал. Бонус за социальный тренд входит только в итоговый
/// скор, результат сентимента не мутируется.
pub fn compose_record(
    ticker: &str,
    name: &str,
    sector: &str,
    series: &PriceSeries,
    sentiment_result: &SentimentResult,
    watchlist_count: Option<u64>,
    technical: &TechnicalParams,
    weights: &ScoringWeights,
) -> Result<AnalysisRecord> {
    if series.len() < 2 {
        return Err(AnalysisError::InsufficientHistory {
            ticker: ticker.to_string(),
            bars: series.len(),
        });
    }

    let closes = series.closes();
    let current_price = closes[closes.len() - 1];
    let prev_close = closes[closes.len() - 2];
    let change_pct = (current_price - prev_close) / prev_close * 100.0;
    let avg_price = series.average_close().unwrap_or(current_price);

    let indicator_set = indicators::compute_indicators(series, technical);
    let ScoreResult { score, reasons } =
        scoring::setup_score(&indicator_set, current_price, avg_price, weights);
    let upside = scoring::potential_upside(&indicator_set, current_price);
    let setup_type = scoring::setup_type(&indicator_set, current_price);

    let social_weight = watchlist_count
        .map(|count| scoring::social_bonus(count, weights.social_max_bonus))
        .unwrap_or(0.0);
    let total_score = score + sentiment_result.score * weights.sentiment_multiplier + social_weight;
    let (signal, signal_class) = scoring::get_signal(total_score, upside);

    Ok(AnalysisRecord {
        ticker: ticker.to_string(),
        name: name.to_string(),
        sector: sector.to_string(),
        price: round2(current_price),
        change_pct: round2(change_pct),
        rsi: indicator_set.rsi.map(round1),
        macd: indicator_set.macd.map(round4),
        macd_signal: indicator_set.macd_signal.map(round4),
        macd_hist: indicator_set.macd_hist.map(round4),
        sma_20: indicator_set.sma_short.map(round2),
        sma_50: indicator_set.sma_medium.map(round2),
        atr_pct: indicator_set.atr_pct.map(round1),
        vol_rank: indicator_set.volatility_rank.round(),
        setup_score: round1(total_score),
        setup_reasons: reasons,
        setup_type: setup_type.to_string(),
        potential_upside: round1(upside),
        sentiment_score: round2(sentiment_result.score),
        sentiment_summary: sentiment_result.summary.clone(),
        catalyst: sentiment_result.catalyst.clone(),
        is_trending: watchlist_count.is_some(),
        social_weight: round2(social_weight),
        signal: signal.to_string(),
        signal_class: signal_class.to_string(),
        high_52w: round2(indicator_set.high_52w),
        low_52w: round2(indicator_set.low_52w),
        volume: indicator_set.latest_volume,
    })
}

fn build_trending(
    records: &[AnalysisRecord],
    trending: &HashMap<String, u64>,
) -> Vec<TrendingSnapshot> {
    let mut snapshot: Vec<TrendingSnapshot> = records
        .iter()
        .filter(|r| r.is_trending)
        .map(|r| TrendingSnapshot {
            ticker: r.ticker.clone(),
            watchlist_count: trending.get(&r.ticker).copied().unwrap_or(0),
            price: r.price,
            change_pct: r.change_pct,
        })
        .collect();
    snapshot.sort_by(|a, b| b.watchlist_count.cmp(&a.watchlist_count));
    snapshot
}
