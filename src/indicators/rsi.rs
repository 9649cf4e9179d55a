// =============================================================================
// Relative Strength Index (RSI) — rolling-mean variant
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes. The first
//          close has no predecessor, so its delta is undefined.
// Step 2 — Split each delta into gain (positive part) and loss (absolute
//          negative part).
// Step 3 — avg_gain / avg_loss = plain arithmetic mean over the trailing
//          `period`-wide window of gains / losses (no Wilder smoothing).
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// When the average loss over the window is exactly zero the ratio is
// undefined and no value is produced for that index — callers drop the row
// rather than seeing RSI pinned at 100.
// =============================================================================

/// Compute the rolling-mean RSI series for `closes` and the given `period`.
///
/// The result is index-aligned with the input: `result[i]` is the RSI of the
/// bar at index `i`, or `None` where it is undefined.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - indices below `period` => `None` (one leading undefined delta plus
///   `period` deltas to fill the first window)
/// - zero average loss in the window => `None` (undefined ratio, not 100)
/// - non-finite deltas poison every window they fall into => `None`
pub fn rolling_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    for i in period..closes.len() {
        // `period + 1` closes ending at `i` yield exactly `period` deltas.
        let window = &closes[i - period..=i];

        let mut gain_sum = 0.0_f64;
        let mut loss_sum = 0.0_f64;
        for pair in window.windows(2) {
            let delta = pair[1] - pair[0];
            if delta > 0.0 {
                gain_sum += delta;
            } else if delta < 0.0 {
                loss_sum -= delta;
            }
            if !delta.is_finite() {
                gain_sum = f64::NAN;
                loss_sum = f64::NAN;
            }
        }

        let avg_gain = gain_sum / period as f64;
        let avg_loss = loss_sum / period as f64;

        // Undefined ratio: the window saw no down moves.
        if avg_loss == 0.0 {
            continue;
        }

        let rs = avg_gain / avg_loss;
        let rsi = 100.0 - 100.0 / (1.0 + rs);
        if rsi.is_finite() {
            out[i] = Some(rsi);
        }
    }

    out
}
