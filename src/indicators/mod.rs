// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free rolling-series implementations of the indicators the
// chart pipeline draws. Every series is index-aligned with its input and uses
// `Option<f64>` so callers are forced to handle insufficient-history and
// numerical-edge-case scenarios.

pub mod bollinger;
pub mod rsi;
pub mod sma;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}",
        (actual - expected).abs()
    );
}
