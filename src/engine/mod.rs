pub mod agent;
pub mod graduation;
pub mod settlement;
pub mod store;
pub mod trade;

pub use agent::{Agent, AgentStatus, MarketInfo, NewAgent};
pub use graduation::{GraduationEvent, GraduationSink, LogSink, MemoryEvents};
pub use settlement::TradingEngine;
pub use store::{AgentStore, MemoryStore, TradeLog};
pub use trade::{Order, Quote, Side, Trade, TradeResult};
