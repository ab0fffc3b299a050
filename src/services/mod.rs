// src/services/mod.rs

pub mod advance;
pub mod compensation;
pub mod payroll;
pub mod run_manager;

use rust_decimal::{Decimal, RoundingStrategy};

pub(crate) const MONEY_DP: u32 = 2;

/// Round to cents, midpoint away from zero. Every amount the engine derives
/// goes through this before it is compared or persisted.
pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_midpoint_away_from_zero() {
        assert_eq!(round_money(dec!(250.505)), dec!(250.51));
        assert_eq!(round_money(dec!(250.504)), dec!(250.50));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_money(dec!(100)), dec!(100));
    }
}
