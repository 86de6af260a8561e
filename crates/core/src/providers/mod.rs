pub mod registry;
pub mod traits;

mod http;

// API provider implementations
pub mod blockchain_info;
pub mod coingecko;
pub mod cohere;
pub mod cryptopanic;
pub mod etherscan;

