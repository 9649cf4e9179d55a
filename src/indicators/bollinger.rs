// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands form a volatility envelope around the SMA: an upper band at
// SMA + k*σ and a lower band at SMA - k*σ, where σ is the sample standard
// deviation over the same trailing window as the SMA.

use crate::indicators::sma::{rolling_sma, rolling_std};

/// Upper and lower band values for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub upper: f64,
    pub lower: f64,
}

/// Compute the Bollinger Band series for `closes`.
///
/// `result[i]` carries both bands for the bar at index `i`, or `None` while
/// fewer than `period` closes are available or either band is non-finite.
/// Index-aligned with the input, like the other rolling series.
pub fn rolling_bands(closes: &[f64], period: usize, num_std: f64) -> Vec<Option<Band>> {
    let sma = rolling_sma(closes, period);
    let std = rolling_std(closes, period);

    sma.into_iter()
        .zip(std)
        .map(|pair| match pair {
            (Some(mean), Some(sigma)) => {
                let upper = mean + num_std * sigma;
                let lower = mean - num_std * sigma;
                if upper.is_finite() && lower.is_finite() {
                    Some(Band { upper, lower })
                } else {
                    None
                }
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn bands_insufficient_data() {
        let closes = vec![1.0, 2.0, 3.0];
        assert!(rolling_bands(&closes, 20, 2.0).iter().all(Option::is_none));
    }

    #[test]
    fn bands_symmetric_around_sma() {
        let closes: Vec<f64> = (1..=25).map(|x| x as f64).collect();
        let bands = rolling_bands(&closes, 20, 2.0);
        let sma = rolling_sma(&closes, 20);
        for (band, mean) in bands.iter().zip(sma.iter()) {
            if let (Some(b), Some(m)) = (band, mean) {
                assert_approx(b.upper - m, m - b.lower, 1e-10);
                assert!(b.upper >= b.lower);
            }
        }
    }

    #[test]
    fn bands_known_half_width() {
        let closes = vec![
            10.0, 12.0, 11.0, 13.0, 16.0, 15.0, 17.0, 20.0, 19.0, 21.0, 23.0, 22.0, 24.0, 26.0,
            25.0, 27.0, 29.0, 28.0, 30.0, 32.0,
        ];
        let bands = rolling_bands(&closes, 20, 2.0);
        let band = bands[19].unwrap();
        let half_width = 2.0 * (854.0_f64 / 19.0).sqrt();
        assert_approx(band.upper, 21.0 + half_width, 1e-10);
        assert_approx(band.lower, 21.0 - half_width, 1e-10);
    }

    #[test]
    fn bands_flat_series_collapse_to_sma() {
        let closes = vec![100.0; 25];
        let bands = rolling_bands(&closes, 20, 2.0);
        let band = bands[24].unwrap();
        assert_approx(band.upper, 100.0, 1e-10);
        assert_approx(band.lower, 100.0, 1e-10);
    }
}
