use chrono::DateTime;

use crate::errors::CoreError;
use crate::models::dca::{DcaRequest, DcaResult, DcaScheduleEntry, MAX_DURATION_MONTHS};
use crate::providers::traits::MarketDataProvider;

/// Dollar-cost-averaging backtest over historical prices.
pub struct DcaService;

impl DcaService {
    /// Fetch `duration_months * 30` days of USD history and simulate.
    pub async fn calculate(
        provider: &dyn MarketDataProvider,
        request: &DcaRequest,
    ) -> Result<DcaResult, CoreError> {
        Self::validate(request)?;
        let chart = provider
            .get_market_chart(&request.coin_id, request.history_days(), "usd")
            .await?;
        Self::simulate(request, &chart.prices)
    }

    /// Spread the purchases evenly over `prices` (`[unix_ms, price]`, oldest
    /// first). Purchase `i` buys at index `min(i * floor(len / n), len - 1)`;
    /// the last sample is taken as the current price.
    pub fn simulate(request: &DcaRequest, prices: &[(f64, f64)]) -> Result<DcaResult, CoreError> {
        Self::validate(request)?;
        let Some(&(_, current_price)) = prices.last() else {
            return Err(CoreError::ValidationError(format!(
                "No price history for {}",
                request.coin_id
            )));
        };
        if prices.iter().any(|&(_, p)| !p.is_finite() || p <= 0.0) {
            return Err(CoreError::ValidationError(
                "Price history contains non-positive prices".into(),
            ));
        }

        let purchases = request.frequency.purchases_over(request.duration_months) as usize;
        let interval = prices.len() / purchases;
        let amount = request.investment_amount;

        let mut total_invested = 0.0;
        let mut total_coins = 0.0;
        let mut schedule = Vec::with_capacity(purchases);

        for i in 0..purchases {
            let (timestamp_ms, price) = prices[(i * interval).min(prices.len() - 1)];
            let coins = amount / price;
            total_invested += amount;
            total_coins += coins;

            schedule.push(DcaScheduleEntry {
                date: DateTime::from_timestamp_millis(timestamp_ms as i64)
                    .unwrap_or_default()
                    .date_naive(),
                investment: amount,
                price,
                coins,
                total_coins,
                total_invested,
            });
        }

        let current_value = total_coins * current_price;
        let profit_loss = current_value - total_invested;
        Ok(DcaResult {
            total_invested,
            total_coins,
            average_price: total_invested / total_coins,
            current_value,
            profit_loss,
            profit_loss_percentage: profit_loss / total_invested * 100.0,
            investment_schedule: schedule,
        })
    }

    fn validate(request: &DcaRequest) -> Result<(), CoreError> {
        if request.coin_id.trim().is_empty() {
            return Err(CoreError::ValidationError("Coin id must not be empty".into()));
        }
        if !request.investment_amount.is_finite() || request.investment_amount <= 0.0 {
            return Err(CoreError::ValidationError(
                "Investment amount must be positive".into(),
            ));
        }
        if request.duration_months == 0 {
            return Err(CoreError::ValidationError(
                "Duration must be at least one month".into(),
            ));
        }
        if request.duration_months > MAX_DURATION_MONTHS {
            return Err(CoreError::ValidationError(format!(
                "Duration must be at most {MAX_DURATION_MONTHS} months"
            )));
        }
        Ok(())
    }
}
