pub mod alert_service;
pub mod chat_service;
pub mod chat_tools;
pub mod dca_service;
pub mod education_service;
pub mod export_service;
pub mod market_service;
pub mod portfolio_service;
pub mod watchlist_service;

