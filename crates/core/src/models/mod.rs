pub mod alert;
pub mod chat;
pub mod coin;
pub mod dca;
pub mod education;
pub mod market_cache;
pub mod news;
pub mod portfolio;
pub mod preferences;
pub mod settings;
pub mod state;
pub mod wallet;
