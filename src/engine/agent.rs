use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::config::{GRADUATION_THRESHOLD, TRADEABLE_CAP};
use crate::curve::pricing::{cost_to_fill, price_at};
use crate::error::TradeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Bonding,
    Graduated,
}

/// A token trading on the curve. Only settlement mutates it, always through a
/// versioned save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub creator: String,
    pub tradeable_supply: Decimal,
    pub reserve_balance: Decimal,
    pub status: AgentStatus,
    pub creator_fees_accrued: Decimal,
    pub platform_fees_accrued: Decimal,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub graduated_at: Option<DateTime<Utc>>,
}

/// Fields supplied when registering a new agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAgent {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub creator: String,
}

impl NewAgent {
    pub fn validate(&self) -> Result<(), TradeError> {
        validate_agent_id(&self.id)?;
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > 64 {
            return Err(TradeError::InvalidRequest(
                "name must be between 1 and 64 characters".to_string(),
            ));
        }
        let symbol = self.symbol.trim();
        if symbol.is_empty() || symbol.chars().count() > 10 {
            return Err(TradeError::InvalidRequest(
                "symbol must be between 1 and 10 characters".to_string(),
            ));
        }
        if self.creator.trim().is_empty() {
            return Err(TradeError::InvalidRequest("creator is required".to_string()));
        }
        Ok(())
    }
}

pub fn validate_agent_id(id: &str) -> Result<(), TradeError> {
    let valid = !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(TradeError::InvalidRequest(format!(
            "agent id {:?} must be 1-64 characters of [A-Za-z0-9_-]",
            id
        )));
    }
    Ok(())
}

impl Agent {
    pub fn new(new_agent: NewAgent, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_agent.id,
            name: new_agent.name.trim().to_string(),
            symbol: new_agent.symbol.trim().to_uppercase(),
            creator: new_agent.creator.trim().to_string(),
            tradeable_supply: Decimal::ZERO,
            reserve_balance: Decimal::ZERO,
            status: AgentStatus::Bonding,
            creator_fees_accrued: Decimal::ZERO,
            platform_fees_accrued: Decimal::ZERO,
            version: 0,
            created_at,
            graduated_at: None,
        }
    }

    pub fn is_graduated(&self) -> bool {
        self.status == AgentStatus::Graduated
    }

    pub fn ensure_tradeable(&self) -> Result<(), TradeError> {
        if self.is_graduated() {
            return Err(TradeError::AgentAlreadyGraduated(self.id.clone()));
        }
        Ok(())
    }
}

/// Snapshot of an agent's market for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInfo {
    pub agent: Agent,
    pub price: Decimal,
    pub market_cap: Decimal,
    pub graduation_progress: Decimal,
    pub remaining_supply: Decimal,
    pub cost_to_fill: Decimal,
}

impl MarketInfo {
    pub fn for_agent(agent: Agent) -> Result<Self, TradeError> {
        let price = price_at(agent.tradeable_supply)?;
        let market_cap = price * agent.tradeable_supply;
        let graduation_progress = (agent.reserve_balance / GRADUATION_THRESHOLD)
            .min(Decimal::ONE)
            .round_dp_with_strategy(4, RoundingStrategy::ToZero);
        let remaining_supply = TRADEABLE_CAP - agent.tradeable_supply;
        let cost_to_fill = cost_to_fill(agent.tradeable_supply)?;

        Ok(Self {
            agent,
            price,
            market_cap,
            graduation_progress,
            remaining_supply,
            cost_to_fill,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_agent(id: &str) -> NewAgent {
        NewAgent {
            id: id.to_string(),
            name: "Research Agent".to_string(),
            symbol: "rsch".to_string(),
            creator: "creator-1".to_string(),
        }
    }

    #[test]
    fn test_new_agent_starts_bonding_at_zero() {
        let agent = Agent::new(new_agent("agent-1"), Utc::now());
        assert_eq!(agent.tradeable_supply, Decimal::ZERO);
        assert_eq!(agent.reserve_balance, Decimal::ZERO);
        assert_eq!(agent.status, AgentStatus::Bonding);
        assert_eq!(agent.version, 0);
        assert_eq!(agent.symbol, "RSCH");
        assert!(agent.ensure_tradeable().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(new_agent("agent_1-x").validate().is_ok());
        assert!(new_agent("").validate().is_err());
        assert!(new_agent("has space").validate().is_err());
        assert!(new_agent(&"a".repeat(65)).validate().is_err());

        let mut bad_symbol = new_agent("agent-2");
        bad_symbol.symbol = "WAYTOOLONGSYMBOL".to_string();
        assert!(matches!(bad_symbol.validate(), Err(TradeError::InvalidRequest(_))));
    }

    #[test]
    fn test_graduated_agent_is_not_tradeable() {
        let mut agent = Agent::new(new_agent("agent-3"), Utc::now());
        agent.status = AgentStatus::Graduated;
        assert_eq!(
            agent.ensure_tradeable(),
            Err(TradeError::AgentAlreadyGraduated("agent-3".to_string()))
        );
    }

    #[test]
    fn test_market_info() {
        let mut agent = Agent::new(new_agent("agent-4"), Utc::now());
        agent.tradeable_supply = dec!(124000000);
        agent.reserve_balance = dec!(13640);
        let info = MarketInfo::for_agent(agent).unwrap();
        assert_eq!(info.price, dec!(0.00017));
        assert_eq!(info.market_cap, dec!(21080));
        assert_eq!(info.remaining_supply, dec!(124000000));
        assert_eq!(info.graduation_progress, dec!(0.3235));
        assert_eq!(info.cost_to_fill, dec!(29140));
    }

    #[test]
    fn test_progress_stays_below_one_until_threshold() {
        let mut agent = Agent::new(new_agent("agent-5"), Utc::now());
        agent.tradeable_supply = dec!(247999000);
        agent.reserve_balance = dec!(42159.999);
        let info = MarketInfo::for_agent(agent.clone()).unwrap();
        assert_eq!(info.graduation_progress, dec!(0.9999));

        agent.reserve_balance = GRADUATION_THRESHOLD;
        let info = MarketInfo::for_agent(agent).unwrap();
        assert_eq!(info.graduation_progress, Decimal::ONE);
    }
}
