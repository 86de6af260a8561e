use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

use crate::errors::CoreError;
use crate::models::chat::ChatContext;
use crate::models::coin::{CoinData, TopMovers};
use crate::models::news::{NewsFilter, NewsItem};
use crate::models::portfolio::Portfolio;
use crate::models::wallet::{Chain, GasPrices, WalletBalance};
use crate::providers::registry::ExplorerRegistry;
use crate::providers::traits::{MarketDataProvider, NewsProvider};

/// How many coins the market-overview block lists.
const MARKET_OVERVIEW_SIZE: u32 = 10;
/// Page size scanned for top movers.
const MOVERS_SCAN_SIZE: u32 = 250;
const MOVERS_SHOWN: usize = 5;
const NEWS_SHOWN: usize = 5;

static WALLET_ADDRESS: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"0x[a-fA-F0-9]{40}"));

/// What the user seems to be asking for, in routing priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Price,
    MarketOverview,
    TopMovers,
    News,
    Wallet,
    Gas,
    Portfolio,
}

/// Label attached to a reply so the client knows how to render `tool_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    Price,
    Market,
    Movers,
    News,
    Wallet,
    Gas,
    Portfolio,
}

/// Raw data a handler fetched, returned alongside the reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolData {
    Price(CoinData),
    Market(Vec<CoinData>),
    Movers(TopMovers),
    News(Vec<NewsItem>),
    Wallet(WalletBalance),
    Gas(GasPrices),
    Portfolio(Portfolio),
}

/// Result of routing one message.
///
/// When no handler applies (or a handler failed), `enhanced_message` is the
/// original message and both tool fields are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub enhanced_message: String,
    pub tool_data: Option<ToolData>,
    pub tool_type: Option<ToolType>,
}

impl ToolOutcome {
    pub fn passthrough(message: &str) -> Self {
        Self {
            enhanced_message: message.to_string(),
            tool_data: None,
            tool_type: None,
        }
    }

    fn enhanced(message: String, data: ToolData, tool_type: ToolType) -> Self {
        Self {
            enhanced_message: message,
            tool_data: Some(data),
            tool_type: Some(tool_type),
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Pick the intent for an already-lowercased message. First match wins.
pub fn classify(lower: &str, has_portfolio: bool) -> Option<Intent> {
    let price = contains_any(lower, &["price", "cost", "worth", "value", "how much"])
        && (contains_any(lower, &["bitcoin", "btc", "ethereum", "eth", "crypto", "coin"])
            || lower.contains('$'));
    if price {
        return Some(Intent::Price);
    }

    if lower.contains("market") && contains_any(lower, &["overview", "summary", "top"]) {
        return Some(Intent::MarketOverview);
    }

    if contains_any(lower, &["top", "best", "worst"])
        && contains_any(lower, &["gainer", "loser", "performer"])
    {
        return Some(Intent::TopMovers);
    }

    if contains_any(lower, &["news", "latest", "headline"]) {
        return Some(Intent::News);
    }

    if contains_any(lower, &["wallet", "address", "balance"])
        && contains_any(lower, &["0x", "check", "look up"])
    {
        return Some(Intent::Wallet);
    }

    if lower.contains("gas") && contains_any(lower, &["fee", "price"]) {
        return Some(Intent::Gas);
    }

    if has_portfolio && contains_any(lower, &["portfolio", "my holdings", "my investment"]) {
        return Some(Intent::Portfolio);
    }

    None
}

/// "eth" anywhere except as the start of "etherscan".
fn mentions_eth(lower: &str) -> bool {
    lower
        .match_indices("eth")
        .any(|(i, _)| !lower[i + 3..].starts_with("erscan"))
}

/// Map a lowercased message to a market-data search term using a fixed
/// (name, ticker) table. Plain substring matching: "sol" also matches "solution".
pub fn extract_coin_name(lower: &str) -> Option<&'static str> {
    const TABLE: &[(&str, &str)] = &[
        ("bitcoin", "btc"),
        ("ethereum", "eth"),
        ("solana", "sol"),
        ("cardano", "ada"),
        ("ripple", "xrp"),
        ("polkadot", "dot"),
        ("dogecoin", "doge"),
        ("avalanche", "avax"),
        ("polygon", "matic"),
        ("chainlink", "link"),
    ];

    TABLE.iter().find_map(|&(name, ticker)| {
        let ticker_hit = match ticker {
            "eth" => mentions_eth(lower),
            _ => lower.contains(ticker),
        };
        (lower.contains(name) || ticker_hit).then_some(name)
    })
}

/// First Ethereum-style address (`0x` + 40 hex digits) in `message`.
pub fn extract_wallet_address(message: &str) -> Option<&str> {
    let pattern = WALLET_ADDRESS.as_ref().ok()?;
    pattern.find(message).map(|m| m.as_str())
}

fn group_thousands(int_part: &str) -> String {
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Thousands-grouped number with up to three decimals ("50,000.123").
pub fn format_grouped(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let text = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let grouped = group_thousands(int_part);
    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Dollar amount with grouping and two decimals ("$50,000.00").
pub fn format_usd(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let text = format!("{:.2}", value.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

fn billions(value: f64) -> String {
    format!("{:.2}", value / 1e9)
}

fn wrap(facts: &str, message: &str, instruction: &str) -> String {
    format!("{facts}\n\nUser Question: {message}\n\nPlease {instruction}.")
}

/// Intent router: augments a chat message with live data before it reaches
/// the language model.
pub struct ChatTools {
    market: Arc<dyn MarketDataProvider>,
    explorers: Arc<ExplorerRegistry>,
    news: Arc<dyn NewsProvider>,
}

impl ChatTools {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        explorers: Arc<ExplorerRegistry>,
        news: Arc<dyn NewsProvider>,
    ) -> Self {
        Self {
            market,
            explorers,
            news,
        }
    }

    /// Route `message` to at most one handler.
    ///
    /// Never fails: a handler error is logged and the message passes
    /// through unchanged.
    pub async fn process_user_message(
        &self,
        message: &str,
        context: Option<&ChatContext>,
    ) -> ToolOutcome {
        let lower = message.to_lowercase();
        let portfolio = context.and_then(|c| c.current_portfolio.as_ref());

        let Some(intent) = classify(&lower, portfolio.is_some()) else {
            return ToolOutcome::passthrough(message);
        };
        tracing::debug!(?intent, "routing chat message");

        let result = match intent {
            Intent::Price => self.handle_price(message, &lower).await,
            Intent::MarketOverview => self.handle_market_overview(message).await,
            Intent::TopMovers => self.handle_top_movers(message, &lower).await,
            Intent::News => Ok(Some(self.handle_news(message).await)),
            Intent::Wallet => self.handle_wallet(message).await,
            Intent::Gas => self.handle_gas(message).await.map(Some),
            Intent::Portfolio => Ok(portfolio.map(|p| Self::handle_portfolio(message, p))),
        };

        match result {
            Ok(Some(outcome)) => outcome,
            Ok(None) => ToolOutcome::passthrough(message),
            Err(e) => {
                tracing::error!(?intent, "tool handler failed: {e}");
                ToolOutcome::passthrough(message)
            }
        }
    }

    async fn handle_price(&self, message: &str, lower: &str) -> Result<Option<ToolOutcome>, CoreError> {
        let Some(coin_name) = extract_coin_name(lower) else {
            return Ok(None);
        };
        let results = self.market.search(coin_name).await?;
        let Some(hit) = results.first() else {
            return Ok(None);
        };
        let coin = self.market.get_coin(&hit.id).await?;

        let facts = format!(
            "[LIVE DATA FETCHED]\nCoin: {} ({})\nCurrent Price: ${}\n24h Change: {:.2}%\nMarket Cap: ${}B\n24h Volume: ${}B",
            coin.name,
            coin.symbol.to_uppercase(),
            format_grouped(coin.current_price),
            coin.price_change_percentage_24h,
            billions(coin.market_cap),
            billions(coin.total_volume),
        );
        let text = wrap(&facts, message, "provide a helpful response using this live data");
        Ok(Some(ToolOutcome::enhanced(text, ToolData::Price(coin), ToolType::Price)))
    }

    async fn handle_market_overview(&self, message: &str) -> Result<Option<ToolOutcome>, CoreError> {
        let coins = self.market.get_markets("usd", MARKET_OVERVIEW_SIZE, 1).await?;

        let entries: Vec<String> = coins
            .iter()
            .enumerate()
            .map(|(i, c)| {
                format!(
                    "{}. {} ({})\n   Price: ${}\n   24h Change: {:.2}%\n   Market Cap: ${}B",
                    i + 1,
                    c.name,
                    c.symbol.to_uppercase(),
                    format_grouped(c.current_price),
                    c.price_change_percentage_24h,
                    billions(c.market_cap),
                )
            })
            .collect();
        let facts = format!(
            "[LIVE MARKET DATA FETCHED]\nTop 10 Cryptocurrencies by Market Cap:\n\n{}",
            entries.join("\n\n")
        );
        let text = wrap(&facts, message, "provide a helpful market overview using this data");
        Ok(Some(ToolOutcome::enhanced(text, ToolData::Market(coins), ToolType::Market)))
    }

    async fn handle_top_movers(&self, message: &str, lower: &str) -> Result<Option<ToolOutcome>, CoreError> {
        let coins = self.market.get_markets("usd", MOVERS_SCAN_SIZE, 1).await?;
        let movers = TopMovers::from_market(&coins, MOVERS_SHOWN);

        let want_gainers = lower.contains("gainer") || lower.contains("best");
        let want_losers = lower.contains("loser") || lower.contains("worst");
        let both = !want_gainers && !want_losers;

        let list = |coins: &[CoinData], plus: &str| -> String {
            coins
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    format!(
                        "{}. {} ({}): {plus}{:.2}%",
                        i + 1,
                        c.name,
                        c.symbol.to_uppercase(),
                        c.price_change_percentage_24h
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let mut sections = Vec::new();
        if want_gainers || both {
            sections.push(format!("Top 5 Gainers (24h):\n{}", list(&movers.gainers, "+")));
        }
        if want_losers || both {
            sections.push(format!("Top 5 Losers (24h):\n{}", list(&movers.losers, "")));
        }
        let facts = format!("[LIVE DATA FETCHED]\n\n{}", sections.join("\n\n"));
        let text = wrap(&facts, message, "provide insights about these market movers");
        Ok(Some(ToolOutcome::enhanced(text, ToolData::Movers(movers), ToolType::Movers)))
    }

    async fn handle_news(&self, message: &str) -> ToolOutcome {
        let mut news = self.news.latest_news(NewsFilter::All, &[]).await;
        news.truncate(NEWS_SHOWN);

        let entries: Vec<String> = news
            .iter()
            .enumerate()
            .map(|(i, item)| {
                format!(
                    "{}. {}\n   Source: {}\n   Published: {}",
                    i + 1,
                    item.title,
                    item.source,
                    item.published_at.format("%Y-%m-%d %H:%M UTC")
                )
            })
            .collect();
        let facts = format!("[LATEST CRYPTO NEWS FETCHED]\n\n{}", entries.join("\n\n"));
        let text = wrap(&facts, message, "summarize these news items and provide insights");
        ToolOutcome::enhanced(text, ToolData::News(news), ToolType::News)
    }

    async fn handle_wallet(&self, message: &str) -> Result<Option<ToolOutcome>, CoreError> {
        let Some(address) = extract_wallet_address(message) else {
            return Ok(None);
        };
        let balance = self
            .explorers
            .explorer(Chain::Ethereum)?
            .get_balance(address)
            .await?;

        let facts = format!(
            "[WALLET DATA FETCHED]\nAddress: {address}\nBalance: {:.6} ETH\nChain: Ethereum",
            balance.balance
        );
        let text = wrap(&facts, message, "provide information about this wallet");
        Ok(Some(ToolOutcome::enhanced(text, ToolData::Wallet(balance), ToolType::Wallet)))
    }

    async fn handle_gas(&self, message: &str) -> Result<ToolOutcome, CoreError> {
        let gas = self.explorers.explorer(Chain::Ethereum)?.get_gas_prices().await?;

        let facts = format!(
            "[ETHEREUM GAS PRICES FETCHED]\nLow: {} Gwei\nAverage: {} Gwei\nHigh: {} Gwei",
            gas.low, gas.average, gas.high
        );
        let text = wrap(&facts, message, "explain the current gas fees");
        Ok(ToolOutcome::enhanced(text, ToolData::Gas(gas), ToolType::Gas))
    }

    fn handle_portfolio(message: &str, portfolio: &Portfolio) -> ToolOutcome {
        let holdings: Vec<String> = portfolio
            .holdings
            .iter()
            .map(|h| {
                format!(
                    "- {} ({}): {} @ ${}",
                    h.name,
                    h.symbol.to_uppercase(),
                    h.quantity,
                    h.purchase_price
                )
            })
            .collect();
        let facts = format!(
            "[USER PORTFOLIO DATA]\nTotal Value: ${:.2}\nTotal Cost: ${:.2}\nProfit/Loss: ${:.2} ({:.2}%)\n\nHoldings:\n{}",
            portfolio.total_value,
            portfolio.total_cost,
            portfolio.total_profit_loss,
            portfolio.total_profit_loss_percentage,
            holdings.join("\n")
        );
        let text = wrap(&facts, message, "provide portfolio analysis and insights");
        ToolOutcome::enhanced(text, ToolData::Portfolio(portfolio.clone()), ToolType::Portfolio)
    }
}
