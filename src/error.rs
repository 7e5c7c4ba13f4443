use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Broad class of a rejection, used by callers to decide whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    CapacityError,
    SlippageError,
    ConcurrencyError,
    StateError,
    StorageError,
}

/// Every way a quote, trade or agent operation can be rejected.
/// None of these leave partial state behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeError {
    InvalidAmount(String),
    InvalidRequest(String),
    OutOfRange { supply: Decimal },
    ExceedsCap { requested: Decimal, available: Decimal },
    InsufficientSupply { requested: Decimal, available: Decimal },
    SlippageExceeded { actual: Decimal, minimum: Decimal },
    AgentNotFound(String),
    AgentAlreadyExists(String),
    AgentAlreadyGraduated(String),
    VersionConflict { agent_id: String, expected: u64, found: u64 },
    Storage(String),
}

impl TradeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TradeError::InvalidAmount(_) | TradeError::InvalidRequest(_) => ErrorKind::ValidationError,
            TradeError::OutOfRange { .. }
            | TradeError::ExceedsCap { .. }
            | TradeError::InsufficientSupply { .. } => ErrorKind::CapacityError,
            TradeError::SlippageExceeded { .. } => ErrorKind::SlippageError,
            TradeError::VersionConflict { .. } => ErrorKind::ConcurrencyError,
            TradeError::AgentNotFound(_)
            | TradeError::AgentAlreadyExists(_)
            | TradeError::AgentAlreadyGraduated(_) => ErrorKind::StateError,
            TradeError::Storage(_) => ErrorKind::StorageError,
        }
    }

    /// Stable machine-readable name of the variant.
    pub fn code(&self) -> &'static str {
        match self {
            TradeError::InvalidAmount(_) => "InvalidAmount",
            TradeError::InvalidRequest(_) => "InvalidRequest",
            TradeError::OutOfRange { .. } => "OutOfRange",
            TradeError::ExceedsCap { .. } => "ExceedsCap",
            TradeError::InsufficientSupply { .. } => "InsufficientSupply",
            TradeError::SlippageExceeded { .. } => "SlippageExceeded",
            TradeError::AgentNotFound(_) => "AgentNotFound",
            TradeError::AgentAlreadyExists(_) => "AgentAlreadyExists",
            TradeError::AgentAlreadyGraduated(_) => "AgentAlreadyGraduated",
            TradeError::VersionConflict { .. } => "VersionConflict",
            TradeError::Storage(_) => "Storage",
        }
    }
}

impl fmt::Display for TradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeError::InvalidAmount(reason) => write!(f, "invalid amount: {}", reason),
            TradeError::InvalidRequest(reason) => write!(f, "invalid request: {}", reason),
            TradeError::OutOfRange { supply } => {
                write!(f, "supply {} is outside the curve range", supply)
            }
            TradeError::ExceedsCap { requested, available } => write!(
                f,
                "request of {} exceeds what is left on the curve ({})",
                requested, available
            ),
            TradeError::InsufficientSupply { requested, available } => write!(
                f,
                "cannot sell {} tokens, only {} are outstanding",
                requested, available
            ),
            TradeError::SlippageExceeded { actual, minimum } => write!(
                f,
                "trade would settle at {} which is below the minimum {}",
                actual, minimum
            ),
            TradeError::AgentNotFound(id) => write!(f, "agent {} not found", id),
            TradeError::AgentAlreadyExists(id) => write!(f, "agent {} already exists", id),
            TradeError::AgentAlreadyGraduated(id) => {
                write!(f, "agent {} has graduated and no longer trades on the curve", id)
            }
            TradeError::VersionConflict { agent_id, expected, found } => write!(
                f,
                "agent {} changed while settling (expected version {}, found {}), retry",
                agent_id, expected, found
            ),
            TradeError::Storage(reason) => write!(f, "storage failure: {}", reason),
        }
    }
}

impl std::error::Error for TradeError {}
