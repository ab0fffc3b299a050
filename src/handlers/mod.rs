// src/handlers/mod.rs

pub mod advance;
pub mod compensation;
pub mod employee;
pub mod general;
pub mod institution;
pub mod payroll;

use crate::{
    errors::{AppError, AppResult},
    models::Employee,
    services::round_money,
    store::LedgerStore,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Money fields must be positive and carry at most two decimal places.
pub(crate) fn check_positive_amount(field: &str, value: Decimal) -> AppResult<()> {
    if value <= dec!(0) {
        return Err(AppError::Validation(format!("{field} must be greater than zero")));
    }
    check_money_scale(field, value)
}

pub(crate) fn check_money_scale(field: &str, value: Decimal) -> AppResult<()> {
    if value != round_money(value) {
        return Err(AppError::Validation(format!(
            "{field} must have at most two decimal places"
        )));
    }
    Ok(())
}

pub(crate) async fn require_employee(
    store: &dyn LedgerStore,
    employee_id: Uuid,
) -> AppResult<Employee> {
    store
        .find_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sub_cent_amounts() {
        assert!(check_positive_amount("Amount", dec!(10.555)).is_err());
        assert!(check_positive_amount("Amount", dec!(0)).is_err());
        assert!(check_positive_amount("Amount", dec!(-5)).is_err());
        assert!(check_positive_amount("Amount", dec!(10.55)).is_ok());
        assert!(check_positive_amount("Amount", dec!(10)).is_ok());
    }
}
