use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crypto_assistant_core::models::wallet::{Chain, GasPrices, Transaction, WalletBalance};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiQuery;
use crate::{data, AppContext, Data};

const DEFAULT_TX_LIMIT: u32 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct AddressQuery {
    pub address: Option<String>,
    pub chain: Option<String>,
    pub limit: Option<u32>,
}

impl AddressQuery {
    fn address(&self) -> ApiResult<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ApiError::bad_request("Address is required"))
    }

    fn chain(&self) -> ApiResult<Chain> {
        match &self.chain {
            None => Ok(Chain::Ethereum),
            Some(name) => name
                .parse()
                .map_err(|_| ApiError::bad_request("Unsupported chain")),
        }
    }
}

pub fn router() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/api/blockchain/balance", get(balance))
        .route("/api/blockchain/transactions", get(transactions))
        .route("/api/blockchain/gas", get(gas))
}

async fn balance(
    State(ctx): State<Arc<AppContext>>,
    ApiQuery(q): ApiQuery<AddressQuery>,
) -> ApiResult<Json<Data<WalletBalance>>> {
    let address = q.address()?;
    let explorer = ctx.providers.explorers.explorer(q.chain()?)?;
    Ok(data(explorer.get_balance(address).await?))
}

async fn transactions(
    State(ctx): State<Arc<AppContext>>,
    ApiQuery(q): ApiQuery<AddressQuery>,
) -> ApiResult<Json<Data<Vec<Transaction>>>> {
    let address = q.address()?;
    let explorer = ctx.providers.explorers.explorer(q.chain()?)?;
    let limit = q.limit.unwrap_or(DEFAULT_TX_LIMIT).max(1);
    Ok(data(explorer.get_transactions(address, limit).await?))
}

async fn gas(State(ctx): State<Arc<AppContext>>) -> ApiResult<Json<Data<GasPrices>>> {
    let explorer = ctx.providers.explorers.explorer(Chain::Ethereum)?;
    Ok(data(explorer.get_gas_prices().await?))
}
