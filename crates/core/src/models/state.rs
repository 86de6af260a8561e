use serde::{Deserialize, Serialize};

use super::alert::PriceAlert;
use super::chat::ChatMessage;
use super::portfolio::Portfolio;
use super::preferences::UserPreferences;
use super::settings::Settings;

/// Everything the client keeps between sessions. This is what gets
/// serialized, encrypted, and written to the state file.
///
/// Each field is an independent store; nothing references across stores
/// except by coin id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppState {
    /// Conversation history, oldest first
    pub messages: Vec<ChatMessage>,

    /// `None` until the first holding is added
    pub portfolio: Option<Portfolio>,

    /// Coin ids the user follows
    pub watchlist: Vec<String>,

    pub alerts: Vec<PriceAlert>,

    pub preferences: UserPreferences,

    /// API keys and other non-display settings
    #[serde(default)]
    pub settings: Settings,
}
