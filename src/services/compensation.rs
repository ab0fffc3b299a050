// src/services/compensation.rs

use crate::models::{Compensation, CompensationKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// A compensation row as it appears in calculation detail lists.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CompensationRef {
    pub id: Uuid,
    pub amount: Decimal,
    pub reason: String,
    #[schema(example = "2026-02-14")]
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CompensationTotals {
    pub rewards: Decimal,
    pub deductions: Decimal,
    pub rewards_detail: Vec<CompensationRef>,
    pub deductions_detail: Vec<CompensationRef>,
}

pub struct CompensationAggregator;

impl CompensationAggregator {
    /// Split one employee's compensation rows for a month into rewards and
    /// deductions and sum each side. No rows is the normal case and yields
    /// zero totals with empty details.
    pub fn aggregate(rows: &[Compensation]) -> CompensationTotals {
        let mut totals = CompensationTotals {
            rewards: Decimal::ZERO,
            deductions: Decimal::ZERO,
            rewards_detail: Vec::new(),
            deductions_detail: Vec::new(),
        };

        for row in rows {
            let detail = CompensationRef {
                id: row.id,
                amount: row.amount,
                reason: row.reason.clone(),
                date: row.date,
            };
            match row.kind {
                CompensationKind::Reward => {
                    totals.rewards += row.amount;
                    totals.rewards_detail.push(detail);
                }
                CompensationKind::Deduction => {
                    totals.deductions += row.amount;
                    totals.deductions_detail.push(detail);
                }
            }
        }

        totals
    }
}
