//! Linear bonding curve between `P0` at zero supply and `P1` at `TRADEABLE_CAP`.
//!
//! Prices are handled internally as `price × TRADEABLE_CAP`, which is exact in
//! decimal (`P0·CAP + (P1 − P0)·supply`), so each public result needs only one
//! division.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::config::{P0, P1, PROMPT_DECIMALS, TOKEN_DECIMALS, TRADEABLE_CAP};
use crate::error::TradeError;

const TWO: Decimal = dec!(2);

fn check_supply(supply: Decimal) -> Result<(), TradeError> {
    if supply < Decimal::ZERO || supply > TRADEABLE_CAP {
        return Err(TradeError::OutOfRange { supply });
    }
    Ok(())
}

//price at `supply` multiplied by the cap
fn scaled_price(supply: Decimal) -> Decimal {
    P0 * TRADEABLE_CAP + (P1 - P0) * supply
}

/// Instantaneous price in PROMPT per token at the given supply.
pub fn price_at(supply: Decimal) -> Result<Decimal, TradeError> {
    check_supply(supply)?;
    Ok(scaled_price(supply) / TRADEABLE_CAP)
}

/// Exact cost of buying `quantity` tokens starting from `supply`
/// (area under the price line, a trapezoid).
pub fn cost_to_buy(supply: Decimal, quantity: Decimal) -> Result<Decimal, TradeError> {
    check_supply(supply)?;
    if quantity < Decimal::ZERO {
        return Err(TradeError::InvalidAmount(format!("negative quantity {}", quantity)));
    }
    let end = supply + quantity;
    if end > TRADEABLE_CAP {
        return Err(TradeError::ExceedsCap {
            requested: quantity,
            available: TRADEABLE_CAP - supply,
        });
    }
    Ok(quantity * (scaled_price(supply) + scaled_price(end)) / (TWO * TRADEABLE_CAP))
}

/// Exact proceeds of selling `quantity` tokens back down from `supply`.
pub fn proceeds_from_sell(supply: Decimal, quantity: Decimal) -> Result<Decimal, TradeError> {
    check_supply(supply)?;
    if quantity > supply {
        return Err(TradeError::InsufficientSupply {
            requested: quantity,
            available: supply,
        });
    }
    cost_to_buy(supply - quantity, quantity)
}

/// What it costs to buy every token still left on the curve, rounded up to
/// the PROMPT unit.
pub fn cost_to_fill(supply: Decimal) -> Result<Decimal, TradeError> {
    check_supply(supply)?;
    Ok(round_cost_up(cost_to_buy(supply, TRADEABLE_CAP - supply)?))
}

/// Inverse of `cost_to_buy`: how many tokens `spend` PROMPT buys at `supply`.
///
/// Solves `(P1 − P0)/2 · q² + P(s)·CAP · q − spend·CAP = 0` for the positive
/// root, written as `q = 2·spend·CAP / (P(s)·CAP + √((P(s)·CAP)² + 2·(P1 − P0)·spend·CAP))`
/// so no cancellation happens. The result is not rounded.
pub fn quantity_for_spend(supply: Decimal, spend: Decimal) -> Result<Decimal, TradeError> {
    check_supply(supply)?;
    if spend < Decimal::ZERO {
        return Err(TradeError::InvalidAmount(format!("negative spend {}", spend)));
    }
    let remaining = TRADEABLE_CAP - supply;
    let fill = cost_to_buy(supply, remaining)?;
    if spend > fill {
        return Err(TradeError::ExceedsCap {
            requested: spend,
            available: fill,
        });
    }
    if spend == fill {
        return Ok(remaining);
    }

    let b = scaled_price(supply);
    let scaled_spend = spend * TRADEABLE_CAP;
    let discriminant = b * b + TWO * (P1 - P0) * scaled_spend;
    let root = discriminant
        .sqrt()
        .ok_or(TradeError::OutOfRange { supply })?;

    Ok((TWO * scaled_spend / (b + root)).min(remaining))
}

pub fn round_quantity_down(quantity: Decimal) -> Decimal {
    quantity.round_dp_with_strategy(TOKEN_DECIMALS, RoundingStrategy::ToZero)
}

pub fn round_cost_up(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(PROMPT_DECIMALS, RoundingStrategy::AwayFromZero)
}

pub fn round_proceeds_down(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(PROMPT_DECIMALS, RoundingStrategy::ToZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_price_anchors() {
        assert_eq!(price_at(Decimal::ZERO).unwrap(), P0);
        assert_eq!(price_at(TRADEABLE_CAP).unwrap(), P1);
        assert_eq!(price_at(TRADEABLE_CAP / TWO).unwrap(), dec!(0.00017));
    }

    #[test]
    fn test_price_out_of_range() {
        assert_eq!(
            price_at(dec!(-1)),
            Err(TradeError::OutOfRange { supply: dec!(-1) })
        );
        assert!(matches!(
            price_at(TRADEABLE_CAP + dec!(0.000001)),
            Err(TradeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_price_monotonic_and_bounded() {
        let step = TRADEABLE_CAP / dec!(1000);
        let mut previous = price_at(Decimal::ZERO).unwrap();
        let mut supply = step;
        while supply <= TRADEABLE_CAP {
            let price = price_at(supply).unwrap();
            assert!(price > previous, "price must rise at supply {}", supply);
            assert!(price >= P0 && price <= P1);
            previous = price;
            supply += step;
        }
    }

    #[test]
    fn test_full_curve_cost() {
        assert_eq!(
            cost_to_buy(Decimal::ZERO, TRADEABLE_CAP).unwrap(),
            dec!(42160)
        );
        assert_eq!(cost_to_fill(Decimal::ZERO).unwrap(), dec!(42160));
        assert_eq!(cost_to_fill(TRADEABLE_CAP).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_cost_matches_trapezoid_of_prices() {
        let supply = dec!(12345678);
        let quantity = dec!(1000000);
        let expected = quantity
            * (price_at(supply).unwrap() + price_at(supply + quantity).unwrap())
            / TWO;
        assert!(close(
            cost_to_buy(supply, quantity).unwrap(),
            expected,
            dec!(0.000000000001)
        ));
    }

    #[test]
    fn test_cost_exceeds_cap() {
        let supply = TRADEABLE_CAP - dec!(10);
        let err = cost_to_buy(supply, dec!(11)).unwrap_err();
        assert_eq!(
            err,
            TradeError::ExceedsCap { requested: dec!(11), available: dec!(10) }
        );
        assert!(cost_to_buy(supply, dec!(10)).is_ok());
    }

    #[test]
    fn test_sell_insufficient_supply() {
        let err = proceeds_from_sell(dec!(100), dec!(100.5)).unwrap_err();
        assert!(matches!(err, TradeError::InsufficientSupply { .. }));
        assert!(proceeds_from_sell(dec!(100), dec!(100)).is_ok());
    }

    #[test]
    fn test_buy_then_sell_is_symmetric() {
        let supply = dec!(50000000);
        let quantity = dec!(2500000);
        let cost = cost_to_buy(supply, quantity).unwrap();
        let proceeds = proceeds_from_sell(supply + quantity, quantity).unwrap();
        assert!(close(cost, proceeds, dec!(0.000000001)));
    }

    #[test]
    fn test_quantity_for_spend_small_buy() {
        // At zero supply 4 PROMPT buys just under 4 / P0 = 100_000 tokens
        let quantity = quantity_for_spend(Decimal::ZERO, dec!(4)).unwrap();
        println!("4 PROMPT at zero supply -> {} tokens", quantity);
        assert!(quantity > dec!(99860) && quantity < dec!(99880));
    }

    #[test]
    fn test_quantity_for_spend_inverts_cost() {
        for (supply, spend) in [
            (Decimal::ZERO, dec!(1)),
            (dec!(1000000), dec!(250)),
            (dec!(120000000), dec!(5000)),
            (dec!(247000000), dec!(100)),
        ] {
            let quantity = quantity_for_spend(supply, spend).unwrap();
            let cost = cost_to_buy(supply, quantity).unwrap();
            assert!(
                close(cost, spend, dec!(0.000000001)),
                "spend {} at supply {} came back as {}",
                spend,
                supply,
                cost
            );
        }
    }

    #[test]
    fn test_quantity_for_spend_boundaries() {
        let supply = dec!(200000000);
        let fill = cost_to_buy(supply, TRADEABLE_CAP - supply).unwrap();
        assert_eq!(
            quantity_for_spend(supply, fill).unwrap(),
            TRADEABLE_CAP - supply
        );
        assert!(matches!(
            quantity_for_spend(supply, fill + dec!(0.000000001)),
            Err(TradeError::ExceedsCap { .. })
        ));
        assert_eq!(quantity_for_spend(supply, Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_rounding_directions() {
        assert_eq!(round_quantity_down(dec!(1.2345679)), dec!(1.234567));
        assert_eq!(round_cost_up(dec!(0.0000000001)), dec!(0.000000001));
        assert_eq!(round_proceeds_down(dec!(0.0000000019)), dec!(0.000000001));
    }
}
