use beurs_cowboy::*;
use chrono::NaiveDate;
use std::collections::HashMap;

fn sample_bar(day: u32, close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::from_ymd_opt(2025, 8, day).unwrap(),
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 1_000_000,
    }
}

fn sample_article(title: &str) -> NewsArticle {
    NewsArticle {
        source: "marketwatch".to_string(),
        title: title.to_string(),
        link: Some("https://example.com".to_string()),
        published_at: Some("2025-08-20T12:00:00Z".to_string()),
        summary: String::new(),
        age_hours: Some(2.0),
    }
}

fn sample_config() -> AppConfig {
    AppConfig {
        market_data_url: "https://query1.finance.yahoo.com".to_string(),
        stocktwits_url: "https://api.stocktwits.com/api/2/trending/symbols.json".to_string(),
        history_range: Some("1y".to_string()),
        llm_api_url: None,
        llm_model: None,
        llm_api_key: None,
        output_dir: "docs".to_string(),
        data_dir: "data_snapshots".to_string(),
        rss_feeds: vec![FeedEntry {
            source: "marketwatch".to_string(),
            url: "https://feeds.marketwatch.com/marketwatch/topstories/".to_string(),
        }],
        regions: vec![RegionEntry {
            name: "Noord-Amerika".to_string(),
            feeds: vec!["marketwatch".to_string()],
        }],
        tickers: vec!["AAPL".to_string(), "MSFT".to_string()],
        companies: vec![CompanyEntry {
            ticker: "AAPL".to_string(),
            name: "Apple Inc".to_string(),
            sector: "Technologie".to_string(),
        }],
        sentiment_keywords: SentimentKeywords {
            positive: vec!["surge".to_string(), "winst".to_string()],
            negative: vec!["crash".to_string(), "verlies".to_string()],
        },
        macro_keywords: SentimentKeywords {
            positive: vec!["growth".to_string()],
            negative: vec!["recession".to_string()],
        },
        technical: TechnicalParams::default(),
        weights: ScoringWeights::default(),
        limits: Limits::default(),
    }
}

#[tokio::test]
async fn test_market_data_holder() {
    let holder = MarketDataHolder::new();

    // Тест добавления данных тикера
    let data = TickerMarketData {
        series: PriceSeries::new(vec![sample_bar(20, 230.0)]),
        headlines: vec!["Apple beats expectations".to_string()],
    };
    holder.insert("AAPL", data).await.unwrap();
    assert_eq!(holder.len().await.unwrap(), 1);

    // Тест получения данных
    let stored = holder.get("AAPL").await.unwrap().unwrap();
    assert_eq!(stored.series.len(), 1);
    assert_eq!(stored.headlines.len(), 1);
    assert!(holder.get("MSFT").await.unwrap().is_none());

    // Тест очистки
    holder.clear().await.unwrap();
    assert_eq!(holder.len().await.unwrap(), 0);
}

#[test]
fn test_news_feed_holder() {
    tokio_test::block_on(async {
        let holder = NewsFeedHolder::new();

        // Тест добавления статей по регионам
        holder
            .add_article("Noord-Amerika", sample_article("Markets rally on growth"))
            .await
            .unwrap();
        holder
            .add_article("Europa", sample_article("Recession warning in eurozone"))
            .await
            .unwrap();
        assert_eq!(holder.article_count().await.unwrap(), 2);
        assert_eq!(holder.articles().await.unwrap().len(), 2);

        let regional = holder.regional().await.unwrap();
        assert_eq!(regional["Noord-Amerika"].len(), 1);
        assert_eq!(regional["Europa"].len(), 1);

        // Тест трендов
        let mut trending = HashMap::new();
        trending.insert("AAPL".to_string(), 250_000u64);
        holder.set_trending(trending).await.unwrap();
        assert_eq!(holder.trending().await.unwrap()["AAPL"], 250_000);

        // Тест очистки
        holder.clear().await.unwrap();
        assert_eq!(holder.article_count().await.unwrap(), 0);
        assert!(holder.trending().await.unwrap().is_empty());
    });
}

#[test]
fn test_config_validation() {
    let config = sample_config();

    // Валидная конфигурация должна проходить
    assert!(config.validate().is_ok());

    // Пустая вселенная тикеров должна вызывать ошибку
    let mut config = sample_config();
    config.tickers = vec![];
    assert!(config.validate().is_err());

    // Пустые ключевые слова должны вызывать ошибку
    let mut config = sample_config();
    config.sentiment_keywords.positive = vec![];
    assert!(config.validate().is_err());

    // Неверное количество одновременных запросов
    let mut config = sample_config();
    config.limits.parallel_workers = Some(0);
    assert!(config.validate().is_err());
    config.limits.parallel_workers = Some(100);
    assert!(config.validate().is_err());

    // Регион со ссылкой на неизвестный фид
    let mut config = sample_config();
    config.regions.push(RegionEntry {
        name: "Japan".to_string(),
        feeds: vec!["nikkei_asia".to_string()],
    });
    assert!(config.validate().is_err());
}

#[test]
fn test_config_lookups() {
    let config = sample_config();

    assert_eq!(config.company_name("AAPL"), "Apple Inc");
    assert_eq!(config.sector("AAPL"), "Technologie");

    // Неизвестный тикер получает дефолты
    assert_eq!(config.company_name("MSFT"), "MSFT");
    assert_eq!(config.sector("MSFT"), "Overig");

    assert_eq!(config.region_of("marketwatch"), "Noord-Amerika");
    assert_eq!(config.region_of("unknown_feed"), "Overig");
}
