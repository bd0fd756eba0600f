use chrono::{DateTime, Days, Utc};
use futures::stream::{self, StreamExt};
use regex::Regex;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::AppConfig;
use crate::errors::{AnalysisError, Result};
use crate::holders::{MarketDataHolder, NewsFeedHolder};
use crate::models::{NewsArticle, PriceBar, PriceSeries, TickerMarketData};

#[derive(Clone)]
pub struct DataCollectorService {
    client: Client,
    market_holder: MarketDataHolder,
    news_holder: NewsFeedHolder,
    config: AppConfig,
}

impl DataCollectorService {
    pub fn new(
        market_holder: MarketDataHolder,
        news_holder: NewsFeedHolder,
        config: AppConfig,
    ) -> Self {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build reqwest client");
        DataCollectorService {
            client,
            market_holder,
            news_holder,
            config,
        }
    }

    pub async fn collect_data(&self, tickers: &[String]) -> Result<()> {
        self.market_holder.clear().await?;
        self.news_holder.clear().await?;

        let market_task = {
            let service = self.clone();
            let tickers = tickers.to_vec();
            tokio::spawn(async move { service.collect_market_data(&tickers).await })
        };

        let rss_task = {
            let service = self.clone();
            tokio::spawn(async move { service.collect_rss_news().await })
        };

        let trending_task = {
            let service = self.clone();
            tokio::spawn(async move { service.collect_trending().await })
        };

        let (market_result, rss_result, trending_result) =
            tokio::try_join!(market_task, rss_task, trending_task)?;
        market_result?;
        rss_result?;
        trending_result?;

        Ok(())
    }

    async fn collect_market_data(&self, tickers: &[String]) -> Result<()> {
        let max_concurrent = self.config.limits.parallel_workers.unwrap_or(10);

        let tasks: Vec<_> = tickers
            .iter()
            .map(|ticker| {
                let this = self.clone();
                let ticker = ticker.clone();
                async move {
                    match this.collect_ticker(&ticker).await {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!("Тикер {} пропущен: {}", ticker, e);
                            false
                        }
                    }
                }
            })
            .collect();

        let results = stream::iter(tasks)
            .buffer_unordered(max_concurrent)
            .collect::<Vec<_>>()
            .await;

        let collected = results.iter().filter(|ok| **ok).count();
        tracing::info!("Собраны данные {} из {} тикеров", collected, tickers.len());
        if collected == 0 {
            tracing::warn!("Ни один тикер не вернул историю цен");
        }
        Ok(())
    }

    async fn collect_ticker(&self, ticker: &str) -> Result<()> {
        let series = self.fetch_history(ticker).await?;
        if series.is_empty() {
            return Err(AnalysisError::InvalidDataFormat(
                "Получена пустая история цен".to_string(),
            ));
        }

        // Новости не критичны, без них тикер анализируется дальше
        let headlines = match self.fetch_ticker_headlines(ticker).await {
            Ok(headlines) => headlines,
            Err(e) => {
                tracing::debug!("Нет новостей для {}: {}", ticker, e);
                Vec::new()
            }
        };

        self.market_holder
            .insert(ticker, TickerMarketData { series, headlines })
            .await?;
        Ok(())
    }

    async fn fetch_history(&self, ticker: &str) -> Result<PriceSeries> {
        let range = self.config.history_range.as_deref().unwrap_or("1y");
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.config.market_data_url,
            urlencoding::encode(ticker),
            range
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Неизвестная ошибка".to_string());
            return Err(AnalysisError::ApiError(format!(
                "Chart API error: {} - {}",
                status, error_text
            )));
        }

        let json: Value = response.json().await?;
        let result = &json["chart"]["result"][0];
        if result.is_null() {
            return Err(AnalysisError::InvalidDataFormat(
                "Отсутствует поле chart.result".to_string(),
            ));
        }

        let timestamps = result["timestamp"].as_array().ok_or_else(|| {
            AnalysisError::InvalidDataFormat("Отсутствует поле timestamp".to_string())
        })?;
        let quote = &result["indicators"]["quote"][0];
        let empty = Vec::new();
        let opens = quote["open"].as_array().unwrap_or(&empty);
        let highs = quote["high"].as_array().unwrap_or(&empty);
        let lows = quote["low"].as_array().unwrap_or(&empty);
        let closes = quote["close"].as_array().unwrap_or(&empty);
        let volumes = quote["volume"].as_array().unwrap_or(&empty);

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            let ts = match ts.as_i64() {
                Some(t) => t,
                None => continue,
            };

            // Бары с пропусками в OHLC отбрасываем
            let ohlc = (
                opens.get(i).and_then(Value::as_f64),
                highs.get(i).and_then(Value::as_f64),
                lows.get(i).and_then(Value::as_f64),
                closes.get(i).and_then(Value::as_f64),
            );
            let (open, high, low, close) = match ohlc {
                (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
                _ => continue,
            };

            let date = match DateTime::from_timestamp(ts, 0) {
                Some(dt) => dt.date_naive(),
                None => continue,
            };

            bars.push(PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume: volumes.get(i).and_then(Value::as_u64).unwrap_or(0),
            });
        }

        Ok(PriceSeries::new(bars))
    }

    async fn fetch_ticker_headlines(&self, ticker: &str) -> Result<Vec<String>> {
        let max_headlines = self.config.limits.max_headlines_per_ticker.unwrap_or(10);
        let url = format!(
            "{}/v1/finance/search?q={}&newsCount={}&quotesCount=0",
            self.config.market_data_url,
            urlencoding::encode(ticker),
            max_headlines
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::ApiError(format!(
                "News API error: {}",
                status
            )));
        }

        let json: Value = response.json().await?;
        let items = match json["news"].as_array() {
            Some(items) => items,
            None => return Ok(Vec::new()),
        };

        // Берем заголовки не старше одного дня
        let cutoff = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| {
                AnalysisError::InvalidDataFormat("Невозможно вычислить дату".to_string())
            })?;

        let mut headlines = Vec::new();
        for item in items {
            let title = match item["title"].as_str() {
                Some(title) if !title.is_empty() => title,
                _ => continue,
            };

            let published = item["providerPublishTime"]
                .as_i64()
                .and_then(|t| DateTime::from_timestamp(t, 0));
            if let Some(published) = published {
                if published.date_naive() < cutoff {
                    continue;
                }
            }

            headlines.push(title.to_string());
            if headlines.len() >= max_headlines {
                break;
            }
        }

        Ok(headlines)
    }

    async fn collect_rss_news(&self) -> Result<()> {
        let max_concurrent = self.config.limits.parallel_workers.unwrap_or(10);

        let tasks: Vec<_> = self
            .config
            .rss_feeds
            .iter()
            .map(|feed| {
                let this = self.clone();
                let source = feed.source.clone();
                let url = feed.url.clone();
                async move {
                    match this.process_rss_feed(&source, &url).await {
                        Ok(count) => {
                            tracing::info!("Собрано {} статей из {}", count, source);
                            (1usize, count)
                        }
                        Err(e) => {
                            tracing::warn!("Ошибка обработки RSS {}: {}", source, e);
                            (0usize, 0usize)
                        }
                    }
                }
            })
            .collect();

        let results = stream::iter(tasks)
            .buffer_unordered(max_concurrent)
            .collect::<Vec<_>>()
            .await;

        let successful: usize = results.iter().map(|(ok, _)| ok).sum();
        let total: usize = results.iter().map(|(_, count)| count).sum();
        tracing::info!(
            "Всего {} статей из {} фидов ({} успешных)",
            total,
            self.config.rss_feeds.len(),
            successful
        );
        Ok(())
    }

    async fn process_rss_feed(&self, source: &str, url: &str) -> Result<usize> {
        let response = self.client.get(url).send().await?;
        let content = response.bytes().await?;

        let feed = feed_rs::parser::parse(&content[..])
            .map_err(|e| AnalysisError::InvalidDataFormat(format!("RSS parse error: {}", e)))?;

        let feed_limit = self.config.limits.rss_feed_limit.unwrap_or(25);
        let max_age_hours = self.config.limits.max_age_hours.unwrap_or(24);
        let now = Utc::now();
        let region = self.config.region_of(source);

        let mut added_count = 0;
        for entry in feed.entries.iter().take(feed_limit) {
            let title = entry
                .title
                .as_ref()
                .map(|t| t.content.clone())
                .unwrap_or_default();
            if title.trim().is_empty() {
                continue;
            }

            // Статьи старше отсечки не попадают в отчет
            let age_hours = entry
                .published
                .map(|published| (now - published).num_seconds() as f64 / 3600.0);
            if let Some(age) = age_hours {
                if age > max_age_hours as f64 {
                    continue;
                }
            }

            let raw_summary = entry
                .summary
                .as_ref()
                .map(|text| text.content.clone())
                .unwrap_or_default();
            let summary: String = self.clean_text(&raw_summary)?.chars().take(500).collect();

            let article = NewsArticle {
                source: source.to_string(),
                title,
                link: entry.links.first().map(|link| link.href.clone()),
                published_at: entry.published.map(|dt| dt.to_rfc3339()),
                summary,
                age_hours,
            };

            self.news_holder.add_article(&region, article).await?;
            added_count += 1;
        }

        Ok(added_count)
    }

    fn clean_text(&self, text: &str) -> Result<String> {
        let html_regex = Regex::new(r"<[^>]+>")?;
        let url_regex = Regex::new(r"http\S+|www\.\S+")?;
        let whitespace_regex = Regex::new(r"\s+")?;

        let cleaned = html_regex.replace_all(text, " ");
        let cleaned = url_regex.replace_all(&cleaned, " ");
        let cleaned = whitespace_regex.replace_all(&cleaned, " ");

        Ok(cleaned.trim().to_string())
    }

    async fn collect_trending(&self) -> Result<()> {
        let limit = self.config.limits.trending_limit.unwrap_or(10);
        match self.fetch_trending(limit).await {
            Ok(trending) => {
                tracing::info!("Получено {} трендовых тикеров", trending.len());
                self.news_holder.set_trending(trending).await?;
            }
            Err(e) => {
                // Полный отказ источника допустим, отчет выходит без трендов
                tracing::warn!("Источник трендов недоступен: {}", e);
            }
        }
        Ok(())
    }

    async fn fetch_trending(&self, limit: usize) -> Result<HashMap<String, u64>> {
        let response = self
            .client
            .get(&self.config.stocktwits_url)
            .header(
                "User-Agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            )
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::ApiError(format!(
                "Trending API error: {}",
                status
            )));
        }

        let json: Value = response.json().await?;
        let symbols = json["symbols"].as_array().ok_or_else(|| {
            AnalysisError::InvalidDataFormat("Отсутствует поле symbols".to_string())
        })?;

        let mut trending = HashMap::new();
        for symbol in symbols.iter().take(limit) {
            let ticker = symbol["symbol"].as_str().unwrap_or("");
            let watchlist_count = symbol["watchlist_count"].as_u64().unwrap_or(0);
            if !ticker.is_empty() {
                trending.insert(ticker.to_string(), watchlist_count);
            }
        }

        Ok(trending)
    }
}
