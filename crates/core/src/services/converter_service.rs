use crate::numeric::{round_cents, SATS_PER_BTC};

/// Converts between fiat amounts and satoshis at the live price.
pub struct ConverterService;

impl ConverterService {
    pub fn new() -> Self {
        Self
    }

    /// Whole satoshis bought by `fiat` at `price` (rounded down).
    /// `None` when the price is unknown or unusable or the input is not finite.
    pub fn fiat_to_sats(&self, fiat: f64, price: Option<f64>) -> Option<u64> {
        let price = usable_price(price)?;
        if !fiat.is_finite() || fiat < 0.0 {
            return None;
        }
        Some((fiat / price * SATS_PER_BTC).floor() as u64)
    }

    /// Fiat value of `sats` at `price`, rounded to cents.
    pub fn sats_to_fiat(&self, sats: f64, price: Option<f64>) -> Option<f64> {
        let price = usable_price(price)?;
        if !sats.is_finite() || sats < 0.0 {
            return None;
        }
        Some(round_cents(sats / SATS_PER_BTC * price))
    }
}

impl Default for ConverterService {
    fn default() -> Self {
        Self::new()
    }
}

fn usable_price(price: Option<f64>) -> Option<f64> {
    price.filter(|p| p.is_finite() && *p > 0.0)
}
