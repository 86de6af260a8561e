use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DcaFrequency {
    Daily,
    Weekly,
    Monthly,
}

/// Longest simulation window accepted, in months.
pub const MAX_DURATION_MONTHS: u32 = 120;

impl DcaFrequency {
    /// Number of purchases over `months`, using 30-day months and 4-week months.
    pub fn purchases_over(self, months: u32) -> u32 {
        match self {
            DcaFrequency::Daily => months.saturating_mul(30),
            DcaFrequency::Weekly => months.saturating_mul(4),
            DcaFrequency::Monthly => months,
        }
    }
}

/// Parameters of a dollar-cost-averaging simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaRequest {
    pub coin_id: String,
    /// USD spent on every purchase
    pub investment_amount: f64,
    pub frequency: DcaFrequency,
    pub duration_months: u32,
}

impl DcaRequest {
    /// Days of price history the simulation needs.
    pub fn history_days(&self) -> u32 {
        self.duration_months.saturating_mul(30)
    }
}

/// One simulated purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaScheduleEntry {
    pub date: NaiveDate,
    pub investment: f64,
    pub price: f64,
    pub coins: f64,
    pub total_coins: f64,
    pub total_invested: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaResult {
    pub total_invested: f64,
    pub total_coins: f64,
    pub average_price: f64,
    pub current_value: f64,
    pub profit_loss: f64,
    pub profit_loss_percentage: f64,
    pub investment_schedule: Vec<DcaScheduleEntry>,
}
