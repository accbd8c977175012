//! Decoding of the payloads delivered by the external price feed, and the
//! most-recent-wins holder for the live price. Fetching itself (REST
//! polling, WebSocket subscription) stays with the caller.

pub mod binance;
pub mod live;
pub mod sentiment;
