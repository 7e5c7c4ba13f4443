//! Persistence ports used by settlement, and the in-memory backing used by the
//! service binary and tests.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::agent::Agent;
use super::trade::Trade;
use crate::error::TradeError;

pub trait AgentStore: Send + Sync {
    fn load_agent(&self, id: &str) -> Result<Agent, TradeError>;

    /// Stores `agent` only if the stored copy is still at `expected_version`.
    /// Returns the new version.
    fn save_agent(&self, agent: &Agent, expected_version: u64) -> Result<u64, TradeError>;

    fn insert_agent(&self, agent: Agent) -> Result<(), TradeError>;
}

pub trait TradeLog: Send + Sync {
    fn append_trade(&self, trade: Trade) -> Result<(), TradeError>;

    fn trades_for(&self, agent_id: &str) -> Result<Vec<Trade>, TradeError>;
}

#[derive(Default)]
pub struct MemoryStore {
    agents: RwLock<HashMap<String, Agent>>,
    trades: RwLock<HashMap<String, Vec<Trade>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AgentStore for MemoryStore {
    fn load_agent(&self, id: &str) -> Result<Agent, TradeError> {
        let agents = self.agents.read().unwrap_or_else(PoisonError::into_inner);
        agents
            .get(id)
            .cloned()
            .ok_or_else(|| TradeError::AgentNotFound(id.to_string()))
    }

    fn save_agent(&self, agent: &Agent, expected_version: u64) -> Result<u64, TradeError> {
        let mut agents = self.agents.write().unwrap_or_else(PoisonError::into_inner);
        let stored = agents
            .get_mut(&agent.id)
            .ok_or_else(|| TradeError::AgentNotFound(agent.id.clone()))?;

        if stored.version != expected_version {
            return Err(TradeError::VersionConflict {
                agent_id: agent.id.clone(),
                expected: expected_version,
                found: stored.version,
            });
        }

        let mut next = agent.clone();
        next.version = expected_version + 1;
        *stored = next;
        Ok(expected_version + 1)
    }

    fn insert_agent(&self, agent: Agent) -> Result<(), TradeError> {
        let mut agents = self.agents.write().unwrap_or_else(PoisonError::into_inner);
        if agents.contains_key(&agent.id) {
            return Err(TradeError::AgentAlreadyExists(agent.id));
        }
        agents.insert(agent.id.clone(), agent);
        Ok(())
    }
}

impl TradeLog for MemoryStore {
    fn append_trade(&self, trade: Trade) -> Result<(), TradeError> {
        let mut trades = self.trades.write().unwrap_or_else(PoisonError::into_inner);
        trades.entry(trade.agent_id.clone()).or_default().push(trade);
        Ok(())
    }

    fn trades_for(&self, agent_id: &str) -> Result<Vec<Trade>, TradeError> {
        let trades = self.trades.read().unwrap_or_else(PoisonError::into_inner);
        Ok(trades.get(agent_id).cloned().unwrap_or_default())
    }
}
