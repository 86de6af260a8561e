use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayCurrency {
    USD,
    EUR,
    BTC,
}

impl std::fmt::Display for DisplayCurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayCurrency::USD => write!(f, "USD"),
            DisplayCurrency::EUR => write!(f, "EUR"),
            DisplayCurrency::BTC => write!(f, "BTC"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl std::fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskProfile::Conservative => write!(f, "conservative"),
            RiskProfile::Moderate => write!(f, "moderate"),
            RiskProfile::Aggressive => write!(f, "aggressive"),
        }
    }
}

/// Per-user display and assistant preferences (one per state file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub theme: Theme,
    pub currency: DisplayCurrency,
    pub notifications: bool,
    pub risk_profile: RiskProfile,
    pub favorite_coins: Vec<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            currency: DisplayCurrency::USD,
            notifications: true,
            risk_profile: RiskProfile::Moderate,
            favorite_coins: Vec::new(),
        }
    }
}

/// Partial update: `None` fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub theme: Option<Theme>,
    pub currency: Option<DisplayCurrency>,
    pub notifications: Option<bool>,
    pub risk_profile: Option<RiskProfile>,
    pub favorite_coins: Option<Vec<String>>,
}

impl UserPreferences {
    pub fn apply(&mut self, update: PreferencesUpdate) {
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(notifications) = update.notifications {
            self.notifications = notifications;
        }
        if let Some(risk_profile) = update.risk_profile {
            self.risk_profile = risk_profile;
        }
        if let Some(favorite_coins) = update.favorite_coins {
            self.favorite_coins = favorite_coins;
        }
    }
}
