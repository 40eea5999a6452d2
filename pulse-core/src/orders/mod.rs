//! Execution-parameter calculation for trap orders.

pub mod trap;

pub use trap::{TrapOrderCalculator, TrapOrderError, TrapOrderParams, DEFAULT_MAX_POSITION_PCT};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for calculator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-9;
