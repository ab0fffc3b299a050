// src/services/advance.rs

use super::round_money;
use crate::models::{Advance, AdvanceStatus};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// One planned installment against one advance. Calculations only ever carry
/// these around; the run manager's commit is what makes them real.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AdvanceMutation {
    pub advance_id: Uuid,
    pub employee_id: Uuid,
    pub deduction_amount: Decimal,
    pub new_paid_amount: Decimal,
    pub new_status: AdvanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeductionPlan {
    pub total_deduction: Decimal,
    pub mutations: Vec<AdvanceMutation>,
}

pub struct AdvanceAmortizer;

impl AdvanceAmortizer {
    /// Plan this month's installment for every open advance, oldest first.
    /// The regular installment is `amount / installments` rounded to cents;
    /// the last one is capped at the remaining balance so an advance never
    /// overpays. An advance that reaches its full amount flips to `paid`.
    pub fn plan_deductions(advances: &[Advance]) -> DeductionPlan {
        let mut open: Vec<&Advance> = advances
            .iter()
            .filter(|a| a.status == AdvanceStatus::Approved && a.remaining_amount > Decimal::ZERO)
            .collect();
        open.sort_by_key(|a| (a.created_at, a.id));

        let mut plan = DeductionPlan {
            total_deduction: Decimal::ZERO,
            mutations: Vec::with_capacity(open.len()),
        };

        for advance in open {
            let per_installment = round_money(advance.amount / Decimal::from(advance.installments));
            let deduction = per_installment.min(advance.remaining_amount);
            let new_paid_amount = advance.paid_amount + deduction;
            let new_status = if new_paid_amount == advance.amount {
                AdvanceStatus::Paid
            } else {
                AdvanceStatus::Approved
            };

            plan.total_deduction += deduction;
            plan.mutations.push(AdvanceMutation {
                advance_id: advance.id,
                employee_id: advance.employee_id,
                deduction_amount: deduction,
                new_paid_amount,
                new_status,
            });
        }

        plan
    }
}
