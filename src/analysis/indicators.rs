use crate::config::TechnicalParams;
use crate::models::{IndicatorSet, PriceBar, PriceSeries};

/// Рассчитывает последние значения всех индикаторов по дневной истории.
/// Индикатор, которому не хватает баров, остается None; остальные считаются.
pub fn compute_indicators(series: &PriceSeries, params: &TechnicalParams) -> IndicatorSet {
    let closes = series.closes();
    let latest_close = closes.last().copied().unwrap_or(0.0);

    let macd = latest_macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal);
    let atr = latest_atr(&series.bars, params.atr_period);
    let atr_pct = atr.and_then(|a| {
        if latest_close > 0.0 {
            Some(a / latest_close * 100.0)
        } else {
            None
        }
    });

    let high_52w = series
        .bars
        .iter()
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let low_52w = series
        .bars
        .iter()
        .map(|b| b.low)
        .fold(f64::INFINITY, f64::min);

    IndicatorSet {
        rsi: latest_rsi(&closes, params.rsi_window),
        macd: macd.map(|m| m.0),
        macd_signal: macd.map(|m| m.1),
        macd_hist: macd.map(|m| m.2),
        sma_short: latest_sma(&closes, params.sma_short),
        sma_medium: latest_sma(&closes, params.sma_medium),
        atr,
        atr_pct,
        volatility_rank: volatility_rank(&closes, params.volatility_period),
        high_52w: if high_52w.is_finite() { high_52w } else { 0.0 },
        low_52w: if low_52w.is_finite() { low_52w } else { 0.0 },
        latest_volume: series.bars.last().map(|b| b.volume).unwrap_or(0),
    }
}

/// RSI по скользящему среднему прибылей и убытков за окно.
/// При нулевых убытках клэмпим к 100 вместо деления на ноль.
fn latest_rsi(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window + 1 {
        return None;
    }

    let start = closes.len() - window;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in start..closes.len() {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            gain_sum += delta;
        } else {
            loss_sum += -delta;
        }
    }

    let avg_gain = gain_sum / window as f64;
    let avg_loss = loss_sum / window as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

// EMA с рекурсивным сглаживанием, стартовое значение равно первому элементу
fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() || span == 0 {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    result.push(values[0]);
    for i in 1..values.len() {
        let prev = result[i - 1];
        result.push(alpha * values[i] + (1.0 - alpha) * prev);
    }
    result
}

fn latest_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<(f64, f64, f64)> {
    if closes.len() < slow {
        return None;
    }

    let ema_fast = ema_series(closes, fast);
    let ema_slow = ema_series(closes, slow);
    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_series(&macd_line, signal);

    let macd = *macd_line.last()?;
    let macd_signal = *signal_line.last()?;
    Some((macd, macd_signal, macd - macd_signal))
}

fn latest_sma(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    let sum: f64 = closes[closes.len() - window..].iter().sum();
    Some(sum / window as f64)
}

/// ATR: скользящее среднее истинного диапазона.
/// Для первого бара истинный диапазон равен high - low.
fn latest_atr(bars: &[PriceBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let mut true_ranges = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let tr = if i == 0 {
            bar.high - bar.low
        } else {
            let prev_close = bars[i - 1].close;
            (bar.high - bar.low)
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        };
        true_ranges.push(tr);
    }

    let tail = &true_ranges[true_ranges.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}

const VOLATILITY_WINDOW: usize = 20;

/// Перцентильный ранг текущей 20-дневной волатильности доходностей.
/// При короткой истории возвращает нейтральные 50.
fn volatility_rank(closes: &[f64], period: usize) -> f64 {
    if period <= VOLATILITY_WINDOW || closes.len() < period {
        return 50.0;
    }

    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.len() < VOLATILITY_WINDOW {
        return 50.0;
    }

    let stds: Vec<f64> = (VOLATILITY_WINDOW - 1..returns.len())
        .map(|i| sample_std(&returns[i + 1 - VOLATILITY_WINDOW..=i]))
        .collect();

    let current = match stds.last() {
        Some(v) => *v,
        None => return 50.0,
    };
    let below = stds.iter().filter(|&&s| s < current).count();
    below as f64 / (period - VOLATILITY_WINDOW) as f64 * 100.0
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}
