pub mod metrics;
pub mod plan;
pub mod price;
pub mod projections;
pub mod purchase;
pub mod serde_helpers;
pub mod settings;
pub mod state;
