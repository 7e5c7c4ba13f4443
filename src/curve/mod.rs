pub mod fees;
pub mod pricing;

pub use fees::FeeSplit;
pub use pricing::{cost_to_buy, cost_to_fill, price_at, proceeds_from_sell, quantity_for_spend};
