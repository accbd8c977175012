pub mod accounting_service;
pub mod activity_service;
pub mod alert_service;
pub mod converter_service;
pub mod countdown_service;
pub mod dca_service;
pub mod export_service;
pub mod plan_service;
pub mod scenario_service;
pub mod tax_service;
