use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::CoreError;
use crate::models::price::PricePoint;

const SOURCE: &str = "Binance";

/// A BTC/USDT ticker reading, from the 24h REST ticker or the ticker stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerUpdate {
    pub price_usd: f64,
    pub change_24h_pct: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    /// Exchange-side event time, when the payload carries one
    pub timestamp: Option<DateTime<Utc>>,
}

// ── Binance payload types ───────────────────────────────────────────

/// `GET /api/v3/ticker/24hr?symbol=BTCUSDT`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24hr {
    last_price: String,
    price_change_percent: String,
    high_price: String,
    low_price: String,
    #[serde(default)]
    close_time: Option<i64>,
}

/// `wss://stream.binance.com:9443/ws/btcusdt@ticker` message
#[derive(Deserialize)]
struct StreamTicker {
    #[serde(rename = "E", default)]
    event_time: Option<i64>,
    #[serde(rename = "c")]
    close: String,
    #[serde(rename = "P")]
    change_percent: String,
    #[serde(rename = "h")]
    high: String,
    #[serde(rename = "l")]
    low: String,
}

/// `GET /api/v3/ticker/price?symbol=EURUSDT`
#[derive(Deserialize)]
struct SymbolPrice {
    price: String,
}

/// Decode the 24h REST ticker.
pub fn decode_ticker(json: &str) -> Result<TickerUpdate, CoreError> {
    let t: Ticker24hr = serde_json::from_str(json)
        .map_err(|e| feed_error(format!("Failed to parse 24h ticker: {e}")))?;

    Ok(TickerUpdate {
        price_usd: parse_price("lastPrice", &t.last_price)?,
        change_24h_pct: parse_number("priceChangePercent", &t.price_change_percent)?,
        high_24h: parse_price("highPrice", &t.high_price)?,
        low_24h: parse_price("lowPrice", &t.low_price)?,
        timestamp: t.close_time.and_then(DateTime::from_timestamp_millis),
    })
}

/// Decode one ticker stream message.
pub fn decode_stream_ticker(json: &str) -> Result<TickerUpdate, CoreError> {
    let t: StreamTicker = serde_json::from_str(json)
        .map_err(|e| feed_error(format!("Failed to parse ticker stream message: {e}")))?;

    Ok(TickerUpdate {
        price_usd: parse_price("c", &t.close)?,
        change_24h_pct: parse_number("P", &t.change_percent)?,
        high_24h: parse_price("h", &t.high)?,
        low_24h: parse_price("l", &t.low)?,
        timestamp: t.event_time.and_then(DateTime::from_timestamp_millis),
    })
}

/// Decode the EURUSDT price: USD per EUR.
pub fn decode_eur_usd_rate(json: &str) -> Result<f64, CoreError> {
    let p: SymbolPrice = serde_json::from_str(json)
        .map_err(|e| feed_error(format!("Failed to parse EURUSDT price: {e}")))?;
    let rate = parse_price("price", &p.price)?;
    if rate == 0.0 {
        return Err(feed_error("EURUSDT rate is zero".into()));
    }
    Ok(rate)
}

/// Decode hourly klines into close-price history.
///
/// Each kline is an array whose first element is the open time (ms) and
/// fifth element the close price. Malformed klines are skipped.
pub fn decode_klines(json: &str) -> Result<Vec<PricePoint>, CoreError> {
    let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(json)
        .map_err(|e| feed_error(format!("Failed to parse klines: {e}")))?;

    let points: Vec<PricePoint> = rows
        .iter()
        .filter_map(|row| {
            let open_time = row.first()?.as_i64()?;
            let close: f64 = row.get(4)?.as_str()?.parse().ok()?;
            if !close.is_finite() {
                return None;
            }
            Some(PricePoint {
                time: DateTime::from_timestamp_millis(open_time)?,
                price: close,
            })
        })
        .collect();

    if points.len() < rows.len() {
        log::warn!(
            "Skipped {} malformed klines out of {}",
            rows.len() - points.len(),
            rows.len()
        );
    }

    Ok(points)
}

fn parse_number(field: &str, raw: &str) -> Result<f64, CoreError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| feed_error(format!("Invalid number in '{field}': {raw} ({e})")))?;
    if !value.is_finite() {
        return Err(feed_error(format!("Non-finite number in '{field}': {raw}")));
    }
    Ok(value)
}

/// Prices must additionally be non-negative.
fn parse_price(field: &str, raw: &str) -> Result<f64, CoreError> {
    let value = parse_number(field, raw)?;
    if value < 0.0 {
        return Err(feed_error(format!("Negative price in '{field}': {raw}")));
    }
    Ok(value)
}

fn feed_error(message: String) -> CoreError {
    CoreError::Feed {
        source_name: SOURCE.into(),
        message,
    }
}
