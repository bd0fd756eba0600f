use crate::config::SentimentKeywords;
use crate::models::{round2, NewsArticle, RegionalSentiment, SentimentResult};

// Упорядоченная таблица катализаторов, первое совпадение выигрывает
const CATALYST_TABLE: &[(&str, &[&str])] = &[
    ("Komende kwartaalcijfers", &["earnings", "kwartaal", "resultaat"]),
    ("Nieuwe productaankondiging", &["product", "lanceert", "nieuwe"]),
    ("Zakelijke ontwikkeling", &["deal", "contract", "partnership"]),
    ("Analisten advies wijziging", &["upgrade", "downgrade", "advies"]),
];

/// Keyword-сентимент по заголовкам одного тикера: средний балл
/// (pos - neg) / (pos + neg) по первым пяти непустым заголовкам.
pub fn keyword_sentiment(headlines: &[String], keywords: &SentimentKeywords) -> SentimentResult {
    let valid: Vec<&String> = headlines
        .iter()
        .take(5)
        .filter(|h| !h.trim().is_empty())
        .collect();
    if valid.is_empty() {
        return SentimentResult::no_news();
    }

    let mut scores = Vec::with_capacity(valid.len());
    for headline in &valid {
        let text = headline.to_lowercase();
        let positive = count_hits(&text, &keywords.positive);
        let negative = count_hits(&text, &keywords.negative);
        let total = positive + negative;
        let score = if total > 0 {
            (positive as f64 - negative as f64) / total as f64
        } else {
            0.0
        };
        scores.push(score);
    }

    let avg_score = scores.iter().sum::<f64>() / scores.len() as f64;

    let summary = if avg_score > 0.3 {
        "Overwegend positief nieuws"
    } else if avg_score < -0.3 {
        "Overwegend negatief nieuws"
    } else {
        "Gemengd nieuws, geen duidelijke trend"
    };

    let all_text = valid
        .iter()
        .map(|h| h.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    SentimentResult {
        score: round2(avg_score),
        summary: summary.to_string(),
        catalyst: detect_catalyst(&all_text).to_string(),
    }
}

/// Ищет первую группу катализаторов в тексте (текст уже в нижнем регистре).
pub fn detect_catalyst(text_lower: &str) -> &'static str {
    for (catalyst, keywords) in CATALYST_TABLE {
        if keywords.iter().any(|k| text_lower.contains(k)) {
            return catalyst;
        }
    }
    "Geen specifieke catalyst"
}

/// Макро-сентимент региона: счет ключевых слов по title + summary
/// всех статей. Регион без статей сразу получает 0.0 и "Neutraal".
pub fn regional_sentiment(
    articles: &[NewsArticle],
    keywords: &SentimentKeywords,
) -> RegionalSentiment {
    if articles.is_empty() {
        return RegionalSentiment {
            score: 0.0,
            article_count: 0,
            label: "Neutraal".to_string(),
            positive_count: 0,
            negative_count: 0,
        };
    }

    let mut positive_count = 0;
    let mut negative_count = 0;
    for article in articles {
        let text = format!("{} {}", article.title, article.summary).to_lowercase();
        positive_count += count_hits(&text, &keywords.positive);
        negative_count += count_hits(&text, &keywords.negative);
    }

    let total = positive_count + negative_count;
    let score = if total > 0 {
        (positive_count as f64 - negative_count as f64) / total as f64
    } else {
        0.0
    };

    let label = if score > 0.2 {
        "Positief"
    } else if score < -0.2 {
        "Negatief"
    } else {
        "Neutraal"
    };

    RegionalSentiment {
        score: round2(score),
        article_count: articles.len(),
        label: label.to_string(),
        positive_count,
        negative_count,
    }
}

fn count_hits(text_lower: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|k| !k.is_empty() && text_lower.contains(k.to_lowercase().as_str()))
        .count()
}

/// Находит первый сбалансированный JSON-объект в свободном тексте ответа.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
