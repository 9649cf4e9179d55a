// =============================================================================
// Simple Moving Average & Rolling Standard Deviation
// =============================================================================
//
// The trailing arithmetic mean of closing prices, and the sample standard
// deviation (N-1 denominator) over the same window. Both series are
// index-aligned with the input so the chart pipeline can zip them against
// the bars without bookkeeping.
// =============================================================================

/// Trailing simple moving average over a `period`-wide window.
///
/// `result[i]` is the mean of `values[i-period+1..=i]`, or `None` while
/// fewer than `period` values are available. Non-finite values poison every
/// window containing them.
pub fn rolling_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        if mean.is_finite() {
            out[i] = Some(mean);
        }
    }

    out
}

/// Trailing sample standard deviation (N-1 denominator) over a
/// `period`-wide window, same availability rule as [`rolling_sma`].
///
/// A `period` of 1 has no degrees of freedom and yields all `None`.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period < 2 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance =
            window.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (period - 1) as f64;
        let std = variance.sqrt();
        if std.is_finite() {
            out[i] = Some(std);
        }
    }

    out
}
