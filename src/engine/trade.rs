use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::agent::Agent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

/// A validated trade instruction. Buyers say how much PROMPT they spend,
/// sellers say how many tokens they sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Buy {
        spend: Decimal,
        min_quantity: Option<Decimal>,
    },
    Sell {
        quantity: Decimal,
        min_proceeds: Option<Decimal>,
    },
}

impl Order {
    pub fn buy(spend: Decimal) -> Self {
        Order::Buy { spend, min_quantity: None }
    }

    pub fn sell(quantity: Decimal) -> Self {
        Order::Sell { quantity, min_proceeds: None }
    }

    pub fn side(&self) -> Side {
        match self {
            Order::Buy { .. } => Side::Buy,
            Order::Sell { .. } => Side::Sell,
        }
    }

    pub fn requested_amount(&self) -> Decimal {
        match self {
            Order::Buy { spend, .. } => *spend,
            Order::Sell { quantity, .. } => *quantity,
        }
    }
}

/// Priced outcome of an order, shared by quotes and executed trades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub agent_id: String,
    pub side: Side,
    pub requested_amount: Decimal,
    pub quantity: Decimal,
    pub gross_amount: Decimal,
    pub fee_amount: Decimal,
    pub creator_fee_share: Decimal,
    pub platform_fee_share: Decimal,
    /// PROMPT the buyer pays in total, or the seller receives after fees.
    pub net_amount: Decimal,
    pub supply_after: Decimal,
    pub reserve_after: Decimal,
    pub price_after: Decimal,
}

/// Immutable record of one settled trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub agent_id: String,
    pub side: Side,
    pub requested_amount: Decimal,
    pub settled_quantity: Decimal,
    pub settled_cost: Decimal,
    pub fee_amount: Decimal,
    pub creator_fee_share: Decimal,
    pub platform_fee_share: Decimal,
    pub net_amount: Decimal,
    pub supply_after: Decimal,
    pub reserve_after: Decimal,
    pub price_after: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    pub fn from_quote(quote: &Quote, version: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}:{}", quote.agent_id, version),
            agent_id: quote.agent_id.clone(),
            side: quote.side,
            requested_amount: quote.requested_amount,
            settled_quantity: quote.quantity,
            settled_cost: quote.gross_amount,
            fee_amount: quote.fee_amount,
            creator_fee_share: quote.creator_fee_share,
            platform_fee_share: quote.platform_fee_share,
            net_amount: quote.net_amount,
            supply_after: quote.supply_after,
            reserve_after: quote.reserve_after,
            price_after: quote.price_after,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResult {
    pub trade: Trade,
    pub agent: Agent,
    pub graduated: bool,
}
