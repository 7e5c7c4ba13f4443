use chrono::{DateTime, Utc};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

use super::agent::{Agent, AgentStatus};
use crate::config::GRADUATION_THRESHOLD;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraduationEvent {
    pub agent_id: String,
    pub final_supply: Decimal,
    pub final_reserve: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Receives graduation events. Delivery is fire-and-forget.
pub trait GraduationSink: Send + Sync {
    fn emit_graduation(&self, event: GraduationEvent);
}

/// Flips a bonding agent to graduated once its reserve reaches the threshold.
/// Returns the event to emit, or `None` if nothing changed. An agent that is
/// already graduated never produces a second event.
pub fn detect(agent: &mut Agent, at: DateTime<Utc>) -> Option<GraduationEvent> {
    if agent.status != AgentStatus::Bonding || agent.reserve_balance < GRADUATION_THRESHOLD {
        return None;
    }

    agent.status = AgentStatus::Graduated;
    agent.graduated_at = Some(at);

    Some(GraduationEvent {
        agent_id: agent.id.clone(),
        final_supply: agent.tradeable_supply,
        final_reserve: agent.reserve_balance,
        timestamp: at,
    })
}

/// Writes graduation events to the service log, for the migration job to pick up.
pub struct LogSink;

impl GraduationSink for LogSink {
    fn emit_graduation(&self, event: GraduationEvent) {
        info!(
            "Agent {} graduated: supply {} reserve {} PROMPT at {}",
            event.agent_id, event.final_supply, event.final_reserve, event.timestamp
        );
    }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct MemoryEvents {
    events: Mutex<Vec<GraduationEvent>>,
}

impl MemoryEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GraduationEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl GraduationSink for MemoryEvents {
    fn emit_graduation(&self, event: GraduationEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::agent::NewAgent;
    use rust_decimal_macros::dec;

    fn agent_with_reserve(reserve: Decimal) -> Agent {
        let mut agent = Agent::new(
            NewAgent {
                id: "grad-agent".to_string(),
                name: "Grad".to_string(),
                symbol: "GRD".to_string(),
                creator: "creator".to_string(),
            },
            Utc::now(),
        );
        agent.reserve_balance = reserve;
        agent.tradeable_supply = dec!(247999000);
        agent
    }

    #[test]
    fn test_below_threshold_stays_bonding() {
        let mut agent = agent_with_reserve(dec!(42159.999999999));
        assert!(detect(&mut agent, Utc::now()).is_none());
        assert_eq!(agent.status, AgentStatus::Bonding);
    }

    #[test]
    fn test_threshold_graduates_once() {
        let mut agent = agent_with_reserve(dec!(42160));
        let now = Utc::now();

        let event = detect(&mut agent, now).expect("should graduate");
        assert_eq!(event.agent_id, "grad-agent");
        assert_eq!(event.final_reserve, dec!(42160));
        assert_eq!(agent.status, AgentStatus::Graduated);
        assert_eq!(agent.graduated_at, Some(now));

        // checking again is a no-op
        assert!(detect(&mut agent, Utc::now()).is_none());
        assert_eq!(agent.graduated_at, Some(now));
    }

    #[test]
    fn test_memory_events_collects() {
        let sink = MemoryEvents::new();
        let mut agent = agent_with_reserve(dec!(50000));
        if let Some(event) = detect(&mut agent, Utc::now()) {
            sink.emit_graduation(event);
        }
        assert_eq!(sink.events().len(), 1);
    }
}
