use crate::config::ScoringWeights;
use crate::models::{IndicatorSet, ScoreResult};

/// Взвешенный скор сетапа. Правила оцениваются в фиксированном порядке
/// (RSI, MACD, выравнивание MA, волатильность), причины дописываются
/// при срабатывании правила.
pub fn setup_score(
    indicators: &IndicatorSet,
    current_price: f64,
    avg_price: f64,
    weights: &ScoringWeights,
) -> ScoreResult {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    // RSI
    if let Some(rsi) = indicators.rsi {
        if (30.0..=40.0).contains(&rsi) {
            score += weights.rsi_oversold;
            reasons.push("RSI oversold - bounce kans".to_string());
        } else if (60.0..=70.0).contains(&rsi) {
            score += weights.rsi_bullish;
            reasons.push("RSI in bullische zone".to_string());
        } else if rsi < 30.0 {
            score += weights.rsi_oversold * 0.5;
            reasons.push("Diep oversold - reversal kans".to_string());
        } else if rsi > 75.0 {
            score -= weights.rsi_oversold;
            reasons.push("Overbought - correctie risico".to_string());
        }
    }

    // MACD
    if let (Some(hist), Some(macd), Some(signal)) =
        (indicators.macd_hist, indicators.macd, indicators.macd_signal)
    {
        if hist > 0.0 && macd > signal {
            score += weights.macd_bullish;
            reasons.push("MACD bullisch momentum".to_string());
        } else if hist < 0.0 && macd < signal {
            score -= weights.macd_bullish;
            reasons.push("MACD bearish momentum".to_string());
        }
    }

    // Выравнивание скользящих средних, только при обеих SMA
    if let (Some(sma_short), Some(sma_medium)) = (indicators.sma_short, indicators.sma_medium) {
        if current_price > sma_short && sma_short > sma_medium {
            score += weights.ma_alignment;
            reasons.push("Bullische MA alignement".to_string());
        } else if current_price < sma_short && sma_short < sma_medium {
            score -= weights.ma_alignment;
            reasons.push("Bearish MA alignement".to_string());
        } else if avg_price > 0.0 && ((current_price - sma_short) / avg_price).abs() < 0.02 {
            score += weights.ma_alignment * 0.5;
            reasons.push("Test 20-daags gemiddelde".to_string());
        }
    }

    // Волатильность
    if let Some(atr_pct) = indicators.atr_pct {
        if atr_pct > 3.0 {
            score += weights.high_volatility;
            reasons.push(format!("Hoge volatiliteit (ATR {:.1}%)", atr_pct));
        }
    }

    ScoreResult { score, reasons }
}

/// Потенциал роста в процентах, ограниченный технически правдоподобным
/// движением. Без обеих SMA возвращает фиксированные 2%.
pub fn potential_upside(indicators: &IndicatorSet, current_price: f64) -> f64 {
    let (sma_short, sma_medium) = match (indicators.sma_short, indicators.sma_medium) {
        (Some(s), Some(m)) => (s, m),
        _ => return 2.0,
    };

    let resistance_to_high = if indicators.high_52w > 0.0 {
        (indicators.high_52w - current_price) / current_price * 100.0
    } else {
        10.0
    };
    let expected_move = match indicators.atr {
        Some(atr) if atr > 0.0 => atr / current_price * 100.0,
        _ => 2.0,
    };

    if current_price > sma_short && sma_short > sma_medium {
        (expected_move * 1.5).min(resistance_to_high)
    } else if current_price < sma_short && current_price > sma_medium {
        ((sma_short - current_price) / current_price * 100.0)
            .abs()
            .min(expected_move)
    } else if current_price < sma_medium {
        ((sma_medium - current_price) / current_price * 100.0)
            .abs()
            .min(expected_move * 1.2)
    } else {
        expected_move
    }
}

/// Тип сетапа, первое сработавшее правило выигрывает.
pub fn setup_type(indicators: &IndicatorSet, current_price: f64) -> &'static str {
    if let (Some(rsi), Some(hist)) = (indicators.rsi, indicators.macd_hist) {
        if rsi < 30.0 && hist > 0.0 {
            return "Oversold Reversal";
        }
        if rsi > 70.0 && hist < 0.0 {
            return "Overbought Correctie";
        }
    }

    if let (Some(sma_short), Some(sma_medium), Some(hist)) = (
        indicators.sma_short,
        indicators.sma_medium,
        indicators.macd_hist,
    ) {
        if current_price > sma_short && sma_short > sma_medium && hist > 0.0 {
            return "Trend Volgt";
        }
        if current_price < sma_short && sma_short < sma_medium && hist < 0.0 {
            return "Downtrend Volgt";
        }
    }

    if let Some(sma_short) = indicators.sma_short {
        if sma_short > 0.0 && ((current_price - sma_short) / sma_short).abs() < 0.01 {
            return "MA Test";
        }
    }

    if let Some(rsi) = indicators.rsi {
        if rsi > 45.0 && rsi < 55.0 {
            return "Consolidatie";
        }
    }

    "Gemengd Signaal"
}

/// Торговый сигнал по порогам (итоговый скор, потенциал).
pub fn get_signal(score: f64, upside: f64) -> (&'static str, &'static str) {
    if score >= 4.0 && upside >= 5.0 {
        ("Sterk Koop", "buy-strong")
    } else if score >= 2.0 && upside >= 4.0 {
        ("Koop", "buy")
    } else if score >= 0.0 {
        ("Neutraal", "neutral")
    } else if score >= -2.0 {
        ("Voorzichtig", "sell")
    } else {
        ("Verkoop", "sell-strong")
    }
}

/// Ограниченный бонус за социальный тренд.
pub fn social_bonus(watchlist_count: u64, max_bonus: f64) -> f64 {
    (watchlist_count as f64 / 1_000_000.0 * max_bonus).min(max_bonus)
}
