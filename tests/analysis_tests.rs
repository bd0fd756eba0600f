use beurs_cowboy::analysis::{
    compute_indicators, extract_json_object, get_signal, keyword_sentiment, potential_upside,
    regional_sentiment, sentiment::detect_catalyst, setup_score,
};
use beurs_cowboy::services::analyzer::compose_record;
use beurs_cowboy::{
    NewsArticle, PriceBar, PriceSeries, ScoringWeights, SentimentKeywords, SentimentResult,
    TechnicalParams,
};
use chrono::{Days, NaiveDate};

// Линейно растущая серия от start до end с дневными барами
fn rising_series(bars_count: usize, start: f64, end: f64, volume: u64) -> PriceSeries {
    let first_date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let step = (end - start) / (bars_count - 1) as f64;

    let mut bars = Vec::with_capacity(bars_count);
    for i in 0..bars_count {
        let close = start + step * i as f64;
        let open = if i == 0 { close } else { close - step };
        bars.push(PriceBar {
            date: first_date.checked_add_days(Days::new(i as u64)).unwrap(),
            open,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume,
        });
    }
    PriceSeries::new(bars)
}

fn test_keywords() -> SentimentKeywords {
    SentimentKeywords {
        positive: vec![
            "surge".to_string(),
            "rally".to_string(),
            "winst".to_string(),
            "record".to_string(),
        ],
        negative: vec![
            "crash".to_string(),
            "verlies".to_string(),
            "lawsuit".to_string(),
        ],
    }
}

#[test]
fn test_sma_medium_absent_below_window() {
    // 30 баров: короче окна средней SMA (50)
    let series = rising_series(30, 100.0, 110.0, 1_000_000);
    let params = TechnicalParams::default();
    let indicators = compute_indicators(&series, &params);

    assert!(indicators.sma_short.is_some());
    assert!(indicators.sma_medium.is_none());

    // Правило выравнивания MA не должно срабатывать
    let price = series.latest_close().unwrap();
    let avg = series.average_close().unwrap();
    let result = setup_score(&indicators, price, avg, &ScoringWeights::default());
    assert!(!result
        .reasons
        .iter()
        .any(|r| r.contains("MA alignement") || r.contains("20-daags")));
}

#[test]
fn test_rsi_clamped_on_monotonic_rise() {
    // Строго растущая серия: нулевые потери, RSI клэмпится к 100
    let series = rising_series(60, 100.0, 130.0, 1_000_000);
    let indicators = compute_indicators(&series, &TechnicalParams::default());

    let rsi = indicators.rsi.unwrap();
    assert!((0.0..=100.0).contains(&rsi));
    assert!(rsi >= 90.0);
    assert_eq!(rsi, 100.0);
}

#[test]
fn test_signal_thresholds() {
    assert_eq!(get_signal(4.0, 5.0), ("Sterk Koop", "buy-strong"));
    assert_eq!(get_signal(-3.0, 1.0), ("Verkoop", "sell-strong"));
    assert_eq!(get_signal(1.0, 1.0), ("Neutraal", "neutral"));
    assert_eq!(get_signal(2.0, 4.0), ("Koop", "buy"));
    assert_eq!(get_signal(-1.0, 1.0), ("Voorzichtig", "sell"));
}

#[test]
fn test_keyword_sentiment_case_insensitive() {
    let keywords = test_keywords();
    let upper = vec!["Aandeel SURGE en RALLY na RECORD winst".to_string()];
    let lower = vec!["aandeel surge en rally na record winst".to_string()];

    let a = keyword_sentiment(&upper, &keywords);
    let b = keyword_sentiment(&lower, &keywords);
    assert_eq!(a.score, b.score);
    assert!(a.score > 0.0);
}

#[test]
fn test_keyword_sentiment_no_news() {
    let result = keyword_sentiment(&[], &test_keywords());
    assert_eq!(result.score, 0.0);
    assert_eq!(result.summary, "Geen nieuws");
    assert_eq!(result.catalyst, "Geen");
}

#[test]
fn test_catalyst_first_match_wins() {
    // Earnings идет первым в таблице, даже когда deal тоже в тексте
    let text = "company signs major deal after strong earnings report";
    assert_eq!(detect_catalyst(text), "Komende kwartaalcijfers");
    assert_eq!(detect_catalyst("nothing relevant"), "Geen specifieke catalyst");
}

#[test]
fn test_regional_sentiment_empty_region() {
    let result = regional_sentiment(&[], &test_keywords());
    assert_eq!(result.score, 0.0);
    assert_eq!(result.label, "Neutraal");
    assert_eq!(result.article_count, 0);
    assert_eq!(result.positive_count, 0);
    assert_eq!(result.negative_count, 0);
}

#[test]
fn test_regional_sentiment_counts() {
    let articles = vec![
        NewsArticle {
            source: "marketwatch".to_string(),
            title: "Markets rally on record surge".to_string(),
            link: None,
            published_at: None,
            summary: "winst everywhere".to_string(),
            age_hours: Some(1.0),
        },
        NewsArticle {
            source: "marketwatch".to_string(),
            title: "Crash fears".to_string(),
            link: None,
            published_at: None,
            summary: String::new(),
            age_hours: Some(1.0),
        },
    ];
    let result = regional_sentiment(&articles, &test_keywords());
    assert_eq!(result.article_count, 2);
    assert_eq!(result.positive_count, 4);
    assert_eq!(result.negative_count, 1);
    assert_eq!(result.score, 0.6);
    assert_eq!(result.label, "Positief");
}

#[test]
fn test_potential_upside_default_without_sma() {
    let series = rising_series(30, 100.0, 110.0, 1_000_000);
    let indicators = compute_indicators(&series, &TechnicalParams::default());
    assert!(indicators.sma_medium.is_none());
    assert_eq!(potential_upside(&indicators, 110.0), 2.0);
}

#[test]
fn test_extract_json_object_balanced() {
    let text = "Hier is de analyse: {\"AAPL\": {\"score\": 0.5}} en verder nog tekst {x}";
    assert_eq!(
        extract_json_object(text),
        Some("{\"AAPL\": {\"score\": 0.5}}")
    );

    let with_braces_in_string = "{\"a\": \"tekst } met brace\"} rest";
    assert_eq!(
        extract_json_object(with_braces_in_string),
        Some("{\"a\": \"tekst } met brace\"}")
    );

    assert_eq!(extract_json_object("geen json hier"), None);
}

#[test]
fn test_snapshot_round_trip() {
    let series = rising_series(60, 100.0, 130.0, 1_000_000);
    let record = compose_record(
        "AAPL",
        "Apple Inc",
        "Technologie",
        &series,
        &SentimentResult::no_news(),
        Some(250_000),
        &TechnicalParams::default(),
        &ScoringWeights::default(),
    )
    .unwrap();

    let serialized = serde_json::to_string(&record).unwrap();
    let restored: beurs_cowboy::AnalysisRecord = serde_json::from_str(&serialized).unwrap();

    assert_eq!(restored.ticker, record.ticker);
    assert_eq!(restored.price, record.price);
    assert_eq!(restored.change_pct, record.change_pct);
    assert_eq!(restored.rsi, record.rsi);
    assert_eq!(restored.macd, record.macd);
    assert_eq!(restored.macd_signal, record.macd_signal);
    assert_eq!(restored.macd_hist, record.macd_hist);
    assert_eq!(restored.sma_20, record.sma_20);
    assert_eq!(restored.sma_50, record.sma_50);
    assert_eq!(restored.atr_pct, record.atr_pct);
    assert_eq!(restored.vol_rank, record.vol_rank);
    assert_eq!(restored.setup_score, record.setup_score);
    assert_eq!(restored.setup_reasons, record.setup_reasons);
    assert_eq!(restored.potential_upside, record.potential_upside);
    assert_eq!(restored.sentiment_score, record.sentiment_score);
    assert_eq!(restored.social_weight, record.social_weight);
    assert_eq!(restored.high_52w, record.high_52w);
    assert_eq!(restored.low_52w, record.low_52w);
    assert_eq!(restored.volume, record.volume);
    assert_eq!(restored.signal, record.signal);
    assert_eq!(restored.signal_class, record.signal_class);
}

#[test]
fn test_end_to_end_rising_trend() {
    // 60 баров, стабильный рост 100 -> 130, без новостей
    let series = rising_series(60, 100.0, 130.0, 1_000_000);
    let record = compose_record(
        "TEST",
        "Test Corp",
        "Technologie",
        &series,
        &SentimentResult::no_news(),
        None,
        &TechnicalParams::default(),
        &ScoringWeights::default(),
    )
    .unwrap();

    assert!(record.macd_hist.unwrap() > 0.0);
    assert_eq!(record.setup_type, "Trend Volgt");
    assert_eq!(record.sentiment_score, 0.0);
    assert_eq!(record.sentiment_summary, "Geen nieuws");
    assert_eq!(record.volume, 1_000_000);
    assert!(!record.is_trending);

    // Сигнал не хуже нейтрального
    assert!(["Neutraal", "Koop", "Sterk Koop"].contains(&record.signal.as_str()));
}

#[test]
fn test_insufficient_history_dropped() {
    let series = rising_series(2, 100.0, 101.0, 1_000);
    let short = PriceSeries::new(series.bars[..1].to_vec());
    let result = compose_record(
        "TEST",
        "Test Corp",
        "Overig",
        &short,
        &SentimentResult::no_news(),
        None,
        &TechnicalParams::default(),
        &ScoringWeights::default(),
    );
    assert!(result.is_err());
}
