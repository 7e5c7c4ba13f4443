//! Trade settlement: validate, price, split fees, then apply against the
//! agent with an optimistic version check. A conflicting write restarts the
//! whole settlement from a fresh read.

use chrono::Utc;
use log::{error, info, warn};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

use super::agent::{validate_agent_id, Agent, MarketInfo, NewAgent};
use super::graduation::{self, GraduationSink};
use super::store::{AgentStore, TradeLog};
use super::trade::{Order, Quote, Trade, TradeResult};
use crate::config::{
    MAX_SETTLE_RETRIES, PROMPT_DECIMALS, RETRY_BACKOFF_MS, TOKEN_DECIMALS, TRADEABLE_CAP,
};
use crate::curve::pricing::{
    cost_to_buy, cost_to_fill, price_at, proceeds_from_sell, quantity_for_spend,
    round_cost_up, round_proceeds_down, round_quantity_down,
};
use crate::curve::FeeSplit;
use crate::error::TradeError;

const TOKEN_UNIT: Decimal = dec!(0.000001);

pub struct TradingEngine {
    agents: Arc<dyn AgentStore>,
    trades: Arc<dyn TradeLog>,
    events: Arc<dyn GraduationSink>,
    max_retries: u32,
}

impl TradingEngine {
    pub fn new(
        agents: Arc<dyn AgentStore>,
        trades: Arc<dyn TradeLog>,
        events: Arc<dyn GraduationSink>,
    ) -> Self {
        Self {
            agents,
            trades,
            events,
            max_retries: MAX_SETTLE_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn create_agent(&self, new_agent: NewAgent) -> Result<Agent, TradeError> {
        new_agent.validate()?;
        let agent = Agent::new(new_agent, Utc::now());
        self.agents.insert_agent(agent.clone())?;
        info!("Created agent {} ({}) for creator {}", agent.id, agent.symbol, agent.creator);
        Ok(agent)
    }

    pub fn agent_info(&self, agent_id: &str) -> Result<MarketInfo, TradeError> {
        validate_agent_id(agent_id)?;
        MarketInfo::for_agent(self.agents.load_agent(agent_id)?)
    }

    pub fn trades(&self, agent_id: &str) -> Result<Vec<Trade>, TradeError> {
        validate_agent_id(agent_id)?;
        self.agents.load_agent(agent_id)?;
        self.trades.trades_for(agent_id)
    }

    /// Prices `order` against the agent's current state without changing anything.
    pub fn quote(&self, agent_id: &str, order: Order) -> Result<Quote, TradeError> {
        validate_agent_id(agent_id)?;
        validate_order(&order)?;
        let agent = self.agents.load_agent(agent_id)?;
        price_order(&agent, &order)
    }

    pub async fn execute_trade(&self, agent_id: &str, order: Order) -> Result<TradeResult, TradeError> {
        validate_agent_id(agent_id)?;
        validate_order(&order)?;

        let mut attempt: u32 = 0;
        loop {
            let agent = self.agents.load_agent(agent_id)?;
            let quote = price_order(&agent, &order)?;

            let now = Utc::now();
            let mut next = apply_quote(&agent, &quote);
            let graduation = graduation::detect(&mut next, now);

            match self.agents.save_agent(&next, agent.version) {
                Ok(version) => {
                    next.version = version;
                    let trade = Trade::from_quote(&quote, version, now);

                    // the agent row is committed, so graduation goes out even if the log fails
                    let graduated = graduation.is_some();
                    if let Some(event) = graduation {
                        self.events.emit_graduation(event);
                    }

                    self.trades.append_trade(trade.clone()).map_err(|err| {
                        error!("Trade {} committed but could not be logged: {}", trade.id, err);
                        TradeError::Storage(format!(
                            "trade {} was committed but not recorded in the trade log: {}",
                            trade.id, err
                        ))
                    })?;

                    info!(
                        "Settled {:?} on {}: quantity {} gross {} fee {} -> supply {} reserve {}",
                        trade.side,
                        agent_id,
                        trade.settled_quantity,
                        trade.settled_cost,
                        trade.fee_amount,
                        trade.supply_after,
                        trade.reserve_after
                    );

                    return Ok(TradeResult { trade, agent: next, graduated });
                }
                Err(TradeError::VersionConflict { .. }) if attempt < self.max_retries => {
                    attempt += 1;
                    let backoff = rand::thread_rng().gen_range(RETRY_BACKOFF_MS.0..=RETRY_BACKOFF_MS.1);
                    warn!(
                        "Version conflict on {} (attempt {}/{}), retrying in {}ms",
                        agent_id, attempt, self.max_retries, backoff
                    );
                    sleep(Duration::from_millis(backoff)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn check_amount(amount: Decimal, decimals: u32, what: &str) -> Result<(), TradeError> {
    if amount <= Decimal::ZERO {
        return Err(TradeError::InvalidAmount(format!("{} must be positive, got {}", what, amount)));
    }
    if amount.normalize().scale() > decimals {
        return Err(TradeError::InvalidAmount(format!(
            "{} {} has more than {} decimal places",
            what, amount, decimals
        )));
    }
    Ok(())
}

fn check_minimum(minimum: Option<Decimal>) -> Result<(), TradeError> {
    match minimum {
        Some(min) if min < Decimal::ZERO => Err(TradeError::InvalidAmount(format!(
            "minimum output cannot be negative, got {}",
            min
        ))),
        _ => Ok(()),
    }
}

pub fn validate_order(order: &Order) -> Result<(), TradeError> {
    match *order {
        Order::Buy { spend, min_quantity } => {
            check_amount(spend, PROMPT_DECIMALS, "spend")?;
            check_minimum(min_quantity)
        }
        Order::Sell { quantity, min_proceeds } => {
            check_amount(quantity, TOKEN_DECIMALS, "quantity")?;
            check_minimum(min_proceeds)
        }
    }
}

//Largest whole-unit quantity whose rounded-up cost fits in `spend`
fn settle_buy(supply: Decimal, spend: Decimal) -> Result<(Decimal, Decimal), TradeError> {
    let fill = cost_to_fill(supply)?;
    if spend > fill {
        return Err(TradeError::ExceedsCap { requested: spend, available: fill });
    }
    if spend == fill {
        return Ok((TRADEABLE_CAP - supply, fill));
    }

    let mut quantity = round_quantity_down(quantity_for_spend(supply, spend)?);
    let mut gross = round_cost_up(cost_to_buy(supply, quantity)?);
    while gross > spend && quantity > Decimal::ZERO {
        quantity -= TOKEN_UNIT;
        gross = round_cost_up(cost_to_buy(supply, quantity)?);
    }
    Ok((quantity, gross))
}

/// Runs the pricing and fee steps for `order` against `agent`.
pub fn price_order(agent: &Agent, order: &Order) -> Result<Quote, TradeError> {
    agent.ensure_tradeable()?;
    let supply = agent.tradeable_supply;
    let reserve = agent.reserve_balance;

    let (quantity, gross, fees, net, supply_after, reserve_after) = match *order {
        Order::Buy { spend, min_quantity } => {
            let (quantity, gross) = settle_buy(supply, spend)?;
            if quantity <= Decimal::ZERO || gross <= Decimal::ZERO {
                return Err(TradeError::InvalidAmount(format!(
                    "spend of {} PROMPT is too small to buy a token unit",
                    spend
                )));
            }
            if let Some(minimum) = min_quantity {
                if quantity < minimum {
                    return Err(TradeError::SlippageExceeded { actual: quantity, minimum });
                }
            }
            // buyer pays the fee on top of the curve cost
            let fees = FeeSplit::from_gross(gross);
            (quantity, gross, fees, gross + fees.fee, supply + quantity, reserve + gross)
        }
        Order::Sell { quantity, min_proceeds } => {
            let gross = round_proceeds_down(proceeds_from_sell(supply, quantity)?).min(reserve);
            if gross <= Decimal::ZERO {
                return Err(TradeError::InvalidAmount(format!(
                    "selling {} tokens returns no PROMPT",
                    quantity
                )));
            }
            // seller's fee comes out of the proceeds
            let fees = FeeSplit::from_gross(gross);
            let net = gross - fees.fee;
            if let Some(minimum) = min_proceeds {
                if net < minimum {
                    return Err(TradeError::SlippageExceeded { actual: net, minimum });
                }
            }
            (quantity, gross, fees, net, supply - quantity, reserve - gross)
        }
    };

    Ok(Quote {
        agent_id: agent.id.clone(),
        side: order.side(),
        requested_amount: order.requested_amount(),
        quantity,
        gross_amount: gross,
        fee_amount: fees.fee,
        creator_fee_share: fees.creator,
        platform_fee_share: fees.platform,
        net_amount: net,
        supply_after,
        reserve_after,
        price_after: price_at(supply_after)?,
    })
}

fn apply_quote(agent: &Agent, quote: &Quote) -> Agent {
    let mut next = agent.clone();
    next.tradeable_supply = quote.supply_after;
    next.reserve_balance = quote.reserve_after;
    next.creator_fees_accrued += quote.creator_fee_share;
    next.platform_fees_accrued += quote.platform_fee_share;
    next
}
