use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::config::{CREATOR_FEE_SHARE, FEE_RATE, PROMPT_DECIMALS};

/// Fee charged on one trade and how it is shared out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSplit {
    pub fee: Decimal,
    pub creator: Decimal,
    pub platform: Decimal,
}

impl FeeSplit {
    /// Rounds half-up once, on the total fee. The halves are then exact.
    pub fn from_gross(gross: Decimal) -> Self {
        let fee = (gross * FEE_RATE)
            .round_dp_with_strategy(PROMPT_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
        let creator = fee * CREATOR_FEE_SHARE;
        Self {
            fee,
            creator,
            platform: fee - creator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_five_percent_split_evenly() {
        let split = FeeSplit::from_gross(dec!(4));
        assert_eq!(split.fee, dec!(0.2));
        assert_eq!(split.creator, dec!(0.1));
        assert_eq!(split.platform, dec!(0.1));
    }

    #[test]
    fn test_round_half_up_once() {
        // 0.00000001 * 0.05 = 0.0000000005 -> rounds up to one unit
        let split = FeeSplit::from_gross(dec!(0.00000001));
        assert_eq!(split.fee, dec!(0.000000001));
        // halves stay exact instead of being rounded again
        assert_eq!(split.creator, dec!(0.0000000005));
        assert_eq!(split.creator, split.platform);
        assert_eq!(split.creator + split.platform, split.fee);
    }

    #[test]
    fn test_zero_gross() {
        let split = FeeSplit::from_gross(Decimal::ZERO);
        assert_eq!(split.fee, Decimal::ZERO);
        assert_eq!(split.platform, Decimal::ZERO);
    }
}
