use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{AnalysisRecord, MarketReport, RegionalSentiment, TrendingSnapshot};

#[derive(Clone)]
pub struct SiteRendererService {
    config: AppConfig,
}

impl SiteRendererService {
    pub fn new(config: AppConfig) -> Self {
        SiteRendererService { config }
    }

    pub fn render(&self, report: &MarketReport) -> Result<()> {
        let output_dir = Path::new(&self.config.output_dir);
        let data_dir = Path::new(&self.config.data_dir);
        fs::create_dir_all(output_dir)?;
        fs::create_dir_all(data_dir)?;
        fs::create_dir_all(output_dir.join("ticker"))?;

        self.write_index(report, output_dir)?;
        self.write_ticker_pages(report, output_dir)?;
        self.write_search_index(report, output_dir)?;
        self.write_snapshot(report, data_dir)?;

        tracing::info!("Сайт сгенерирован в {}", self.config.output_dir);
        Ok(())
    }

    fn write_index(&self, report: &MarketReport, output_dir: &Path) -> Result<()> {
        let bullish = report.records.iter().filter(|r| r.setup_score > 0.0).count();
        let bearish = report.records.iter().filter(|r| r.setup_score < 0.0).count();
        let neutral = report.records.len() - bullish - bearish;
        let avg_upside = if report.records.is_empty() {
            0.0
        } else {
            report.records.iter().map(|r| r.potential_upside).sum::<f64>()
                / report.records.len() as f64
        };

        let top_picks: Vec<&AnalysisRecord> = report
            .records
            .iter()
            .filter(|r| r.setup_score >= 2.0)
            .take(3)
            .collect();

        let row_count = report.records.len().min(10);
        let market_rows = market_rows(&report.records[..row_count]);
        let analysis_cards = analysis_cards(&top_picks);
        let macro_section = macro_section(
            &report.regional_sentiment,
            self.config.limits.max_regional_display.unwrap_or(8),
        );
        let trending_section = trending_section(
            &report.trending,
            self.config.limits.max_trending_display.unwrap_or(5),
        );

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="nl">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Beurs Cowboy | Markt Analyse | {date}</title>
    <link rel="stylesheet" href="assets/styles.css">
</head>
<body>
    <header class="site-header">
        <div class="header-container">
            <div class="logo">
                <a href="index.html" class="logo-link">
                    <span class="logo-icon">🤠</span>
                    <span class="logo-text">Beurs<span class="highlight">Cowboy</span></span>
                </a>
            </div>
            <nav class="main-nav">
                <a href="index.html" class="active">Markten</a>
            </nav>
        </div>
    </header>

    <div class="market-ticker">
        <div class="ticker-content">
            <span class="ticker-item">MARKT: {bullish} Bullisch | {bearish} Bearish | {neutral} Neutraal</span>
            <span class="ticker-item">GEM. POTENTIEEL: +{avg_upside:.1}%</span>
            <span class="ticker-item">DATUM: {date}</span>
        </div>
    </div>

    <main class="main-content">
        <section class="content-section">
            <div class="section-header">
                <h1>Markt Analyse</h1>
                <p class="section-subtitle">{date}</p>
            </div>

            {macro_section}

            {trending_section}

            <div class="top-picks-section">
                <h2 class="section-title">Top Analyses</h2>
                <div class="analysis-grid">
                    {analysis_cards}
                </div>
            </div>

            <div class="market-table-section">
                <h2 class="section-title">Complete Markt</h2>
                <div class="table-container">
                    <table class="market-table">
                        <thead>
                            <tr>
                                <th>Aandeel</th>
                                <th>Sector</th>
                                <th>Prijs</th>
                                <th>Verandering</th>
                                <th>Volume</th>
                                <th>RSI</th>
                                <th>Signal</th>
                                <th>Potentieel</th>
                            </tr>
                        </thead>
                        <tbody>
                            {market_rows}
                        </tbody>
                    </table>
                </div>
            </div>
        </section>
    </main>

    <footer class="site-footer">
        <div class="footer-container">
            <div class="footer-content">
                <div class="footer-section">
                    <h4>🤠 Beurs Cowboy</h4>
                    <p>Dagelijkse beursanalyse met een westelijk tintje.</p>
                </div>
                <div class="footer-section">
                    <h4>Disclaimer</h4>
                    <p>Dit is geen financieel advies.</p>
                </div>
            </div>
        </div>
    </footer>
</body>
</html>"#,
            date = report.date,
            bullish = bullish,
            bearish = bearish,
            neutral = neutral,
            avg_upside = avg_upside,
            macro_section = macro_section,
            trending_section = trending_section,
            analysis_cards = analysis_cards,
            market_rows = market_rows,
        );

        fs::write(output_dir.join("index.html"), html)?;
        Ok(())
    }

    fn write_ticker_pages(&self, report: &MarketReport, output_dir: &Path) -> Result<()> {
        let ticker_dir = output_dir.join("ticker");
        for record in &report.records {
            let html = ticker_page(record);
            fs::write(ticker_dir.join(format!("{}.html", record.ticker)), html)?;
        }
        tracing::info!("Сгенерировано {} страниц тикеров", report.records.len());
        Ok(())
    }

    fn write_search_index(&self, report: &MarketReport, output_dir: &Path) -> Result<()> {
        let stocks: Vec<_> = report
            .records
            .iter()
            .map(|r| {
                json!({
                    "ticker": r.ticker,
                    "name": r.name,
                    "sector": r.sector,
                    "signal": r.signal,
                    "signal_class": r.signal_class,
                })
            })
            .collect();

        let search_index = json!({ "date": report.date, "stocks": stocks });
        fs::write(
            output_dir.join("search-index.json"),
            serde_json::to_string_pretty(&search_index)?,
        )?;
        Ok(())
    }

    fn write_snapshot(&self, report: &MarketReport, data_dir: &Path) -> Result<()> {
        let snapshot: BTreeMap<&str, &AnalysisRecord> = report
            .records
            .iter()
            .map(|r| (r.ticker.as_str(), r))
            .collect();
        fs::write(
            data_dir.join(format!("snap_{}.json", report.date)),
            serde_json::to_string_pretty(&snapshot)?,
        )?;
        Ok(())
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

fn market_rows(records: &[AnalysisRecord]) -> String {
    let mut rows = String::new();
    for r in records {
        let change_class = if r.change_pct >= 0.0 { "positive" } else { "negative" };
        let change_sign = if r.change_pct >= 0.0 { "+" } else { "" };
        let trending_badge = if r.is_trending { "🔥" } else { "" };

        rows.push_str(&format!(
            r#"
        <tr class="stock-row">
            <td class="ticker">
                <a href="ticker/{ticker}.html" class="ticker-link">
                    <strong>{ticker}</strong>{trending_badge}
                </a>
                <br><small>{name}</small>
            </td>
            <td class="sector">{sector}</td>
            <td class="price">€{price:.2}</td>
            <td class="change {change_class}">{change_sign}{change:.2}%</td>
            <td class="volume">{volume}</td>
            <td class="rsi">{rsi}</td>
            <td class="signal {signal_class}">{signal}</td>
            <td class="upside">+{upside:.1}%</td>
        </tr>"#,
            ticker = r.ticker,
            trending_badge = trending_badge,
            name = r.name,
            sector = r.sector,
            price = r.price,
            change_class = change_class,
            change_sign = change_sign,
            change = r.change_pct,
            volume = r.volume,
            rsi = fmt_opt(r.rsi, 1),
            signal_class = r.signal_class,
            signal = r.signal,
            upside = r.potential_upside,
        ));
    }
    rows
}

fn analysis_cards(picks: &[&AnalysisRecord]) -> String {
    let mut cards = String::new();
    for (i, pick) in picks.iter().enumerate() {
        let card_class = if i == 0 { "featured" } else { "" };
        let reasons: String = pick
            .setup_reasons
            .iter()
            .take(3)
            .map(|r| format!("<li>✓ {}</li>", r))
            .collect();

        cards.push_str(&format!(
            r#"
        <article class="analysis-card {card_class}">
            <header>
                <span class="ticker-badge">{ticker}</span>
                <span class="signal-badge {signal_class}">{signal}</span>
            </header>
            <h3>{name}</h3>
            <div class="price-block">
                <span class="price">€{price:.2}</span>
                <span class="upside">Potentieel: +{upside:.1}%</span>
            </div>
            <ul class="reasons">
                {reasons}
            </ul>
            <a href="ticker/{ticker}.html" class="read-more">Lees analyse →</a>
        </article>"#,
            card_class = card_class,
            ticker = pick.ticker,
            signal_class = pick.signal_class,
            signal = pick.signal,
            name = pick.name,
            price = pick.price,
            upside = pick.potential_upside,
            reasons = reasons,
        ));
    }
    cards
}

fn macro_section(regional: &BTreeMap<String, RegionalSentiment>, max_display: usize) -> String {
    if regional.is_empty() {
        return String::new();
    }

    let mut sorted: Vec<(&String, &RegionalSentiment)> = regional.iter().collect();
    sorted.sort_by(|a, b| {
        b.1.score
            .partial_cmp(&a.1.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut rows = String::new();
    for (region, data) in sorted.into_iter().take(max_display) {
        if data.article_count == 0 {
            continue;
        }
        let emoji = match data.label.as_str() {
            "Positief" => "🟢",
            "Negatief" => "🔴",
            _ => "⚪",
        };
        rows.push_str(&format!(
            r#"
        <div class="region-item">
            <div class="region-header">
                <span class="region-name">{emoji} {region}</span>
                <span class="region-sentiment">{label} ({score:+.2})</span>
            </div>
            <div class="region-stats">
                <span class="stat">{count} artikelen</span>
                <span class="stat">🟢 {positive}</span>
                <span class="stat">🔴 {negative}</span>
            </div>
        </div>"#,
            emoji = emoji,
            region = region,
            label = data.label,
            score = data.score,
            count = data.article_count,
            positive = data.positive_count,
            negative = data.negative_count,
        ));
    }

    format!(
        r#"
    <section class="macro-section">
        <h2>🌍 Macro-economisch Sentiment</h2>
        <p class="section-subtitle">Wereldwijd economisch sentiment per regio</p>
        <div class="macro-grid">
            {}
        </div>
    </section>"#,
        rows
    )
}

fn trending_section(trending: &[TrendingSnapshot], max_display: usize) -> String {
    if trending.is_empty() {
        return String::new();
    }

    let mut rows = String::new();
    for t in trending.iter().take(max_display) {
        let change_class = if t.change_pct >= 0.0 { "positive" } else { "negative" };
        let change_sign = if t.change_pct >= 0.0 { "+" } else { "" };
        rows.push_str(&format!(
            r#"
        <div class="trending-item">
            <span class="trending-ticker">{ticker}</span>
            <span class="trending-social">💬 {watchers} volgers</span>
            <span class="trending-price">€{price:.2}</span>
            <span class="trending-change {change_class}">{change_sign}{change:.1}%</span>
        </div>"#,
            ticker = t.ticker,
            watchers = t.watchlist_count,
            price = t.price,
            change_class = change_class,
            change_sign = change_sign,
            change = t.change_pct,
        ));
    }

    format!(
        r#"
    <section class="trending-section">
        <h2>💬 Trending op Social Media</h2>
        <p class="section-subtitle">Meest besproken aandelen vandaag</p>
        <div class="trending-grid">
            {}
        </div>
    </section>"#,
        rows
    )
}

fn ticker_page(record: &AnalysisRecord) -> String {
    let reasons: String = record
        .setup_reasons
        .iter()
        .map(|r| format!("<li>✓ {}</li>", r))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="nl">
<head>
    <meta charset="UTF-8">
    <title>{ticker} - {name} | Beurs Cowboy</title>
    <link rel="stylesheet" href="../assets/styles.css">
</head>
<body>
    <main class="main-content article-page">
        <article class="stock-analysis" id="{ticker}">
            <header class="article-header">
                <span class="ticker-badge large">{ticker}</span>
                <span class="signal-badge {signal_class}">{signal}</span>
                <h2>{name}</h2>
                <p class="sector">{sector}</p>
            </header>
            <div class="detail-grid">
                <div class="detail-item"><span class="label">Prijs</span><span class="value">€{price:.2}</span></div>
                <div class="detail-item"><span class="label">Verandering</span><span class="value">{change:+.2}%</span></div>
                <div class="detail-item"><span class="label">RSI</span><span class="value">{rsi}</span></div>
                <div class="detail-item"><span class="label">MACD</span><span class="value">{macd}</span></div>
                <div class="detail-item"><span class="label">SMA 20</span><span class="value">{sma_20}</span></div>
                <div class="detail-item"><span class="label">SMA 50</span><span class="value">{sma_50}</span></div>
                <div class="detail-item"><span class="label">52W High</span><span class="value">€{high:.2}</span></div>
                <div class="detail-item"><span class="label">52W Low</span><span class="value">€{low:.2}</span></div>
            </div>
            <div class="setup-info">
                <div class="setup-row"><span class="label">Type:</span><span class="value">{setup_type}</span></div>
                <div class="setup-row"><span class="label">Score:</span><span class="value">{score:.1}</span></div>
                <div class="setup-row"><span class="label">Potentieel:</span><span class="value positive">+{upside:.1}%</span></div>
                <div class="setup-row"><span class="label">Catalyst:</span><span class="value">{catalyst}</span></div>
            </div>
            <div class="analysis-content">
                <h3>Analyse</h3>
                <p>{summary}</p>
                <ul class="reasons">{reasons}</ul>
            </div>
        </article>
    </main>
</body>
</html>"#,
        ticker = record.ticker,
        name = record.name,
        sector = record.sector,
        signal_class = record.signal_class,
        signal = record.signal,
        price = record.price,
        change = record.change_pct,
        rsi = fmt_opt(record.rsi, 1),
        macd = fmt_opt(record.macd, 4),
        sma_20 = fmt_opt(record.sma_20, 2),
        sma_50 = fmt_opt(record.sma_50, 2),
        high = record.high_52w,
        low = record.low_52w,
        setup_type = record.setup_type,
        score = record.setup_score,
        upside = record.potential_upside,
        catalyst = record.catalyst,
        summary = record.sentiment_summary,
        reasons = reasons,
    )
}
