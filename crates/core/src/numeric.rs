//! Small numeric helpers shared by the generator, the accountant and the
//! projection services.

/// Number of decimal places kept on the per-purchase BTC amount.
pub const BTC_DECIMALS: i32 = 6;

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: f64 = 100_000_000.0;

/// Round half away from zero to `decimals` decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round a monetary amount to cents.
pub fn round_cents(value: f64) -> f64 {
    round_to(value, 2)
}

/// Replace NaN and infinities with `fallback`.
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Normalize a percentage input: non-finite → 0, then clamp to [0, 100].
pub fn clamp_percent(value: f64) -> f64 {
    finite_or(value, 0.0).clamp(0.0, 100.0)
}

/// Divide, returning 0 when the denominator is zero or the result is not finite.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or(numerator / denominator, 0.0)
}
