// src/services/payroll.rs

use crate::{
    errors::{AppError, AppResult},
    models::{Employee, Month, PayrollRun},
    services::{
        advance::{AdvanceAmortizer, AdvanceMutation, DeductionPlan},
        compensation::{CompensationAggregator, CompensationRef, CompensationTotals},
        round_money,
        run_manager::PayrollRunManager,
    },
    store::LedgerStore,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-employee calculation warning. Warnings are data, not errors: the
/// month still calculates and commits.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayrollWarning {
    /// Deductions exceeded gross pay, so net pay was clamped to zero.
    /// `shortfall` is the amount that could not be withheld this month.
    NegativeNetPay { shortfall: Decimal },
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollCalculation {
    pub employee_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub base_salary: Decimal,
    pub rewards: Decimal,
    pub deductions: Decimal,
    pub advance_deduction: Decimal,
    pub gross_pay: Decimal,
    pub net_pay: Decimal,
    pub warnings: Vec<PayrollWarning>,
    pub rewards_detail: Vec<CompensationRef>,
    pub deductions_detail: Vec<CompensationRef>,
    pub advance_plan: Vec<AdvanceMutation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollSummary {
    pub total_employees: i32,
    pub total_gross: Decimal,
    pub total_deductions: Decimal,
    pub total_advance_deductions: Decimal,
    pub total_net: Decimal,
    pub average_gross_pay: Decimal,
    pub average_net_pay: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollCalculationResult {
    #[schema(value_type = String, example = "2026-02")]
    pub month: Month,
    pub institution_id: Option<Uuid>,
    pub employees: Vec<PayrollCalculation>,
    pub summary: PayrollSummary,
}

/// Monthly payroll calculator. `preview` only reads; `commit` hands the
/// same calculation to the run manager, which persists it atomically.
pub struct PayrollCalculator<'a> {
    store: &'a dyn LedgerStore,
}

impl<'a> PayrollCalculator<'a> {
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self { store }
    }

    /// Read-only calculation. It applies nothing, so repeating it for an
    /// untouched month gives identical results.
    pub async fn preview(&self, month: Month, institution_id: Option<Uuid>) -> AppResult<PayrollCalculationResult> {
        self.calculate(month, institution_id).await
    }

    /// Calculate and persist as a completed run.
    pub async fn commit(&self, month: Month, institution_id: Option<Uuid>) -> AppResult<PayrollRun> {
        let result = self.calculate(month, institution_id).await?;
        PayrollRunManager::new(self.store).commit(&result).await
    }

    async fn calculate(&self, month: Month, institution_id: Option<Uuid>) -> AppResult<PayrollCalculationResult> {
        if let Some(id) = institution_id {
            if !self.store.institution_exists(id).await? {
                return Err(AppError::Validation(format!("Unknown institution {id}")));
            }
        }

        let roster = self.store.list_active_employees(institution_id).await?;
        let mut employees = Vec::with_capacity(roster.len());
        for employee in &roster {
            let compensations = self.store.list_compensations(employee.id, Some(month)).await?;
            let advances = self.store.list_open_advances(employee.id).await?;
            employees.push(build_calculation(
                employee,
                CompensationAggregator::aggregate(&compensations),
                AdvanceAmortizer::plan_deductions(&advances),
            ));
        }

        let summary = summarize(&employees);
        Ok(PayrollCalculationResult { month, institution_id, employees, summary })
    }
}

fn build_calculation(
    employee: &Employee,
    totals: CompensationTotals,
    plan: DeductionPlan,
) -> PayrollCalculation {
    let gross_pay = employee.base_salary + totals.rewards;
    let raw_net = gross_pay - totals.deductions - plan.total_deduction;

    let mut warnings = Vec::new();
    let net_pay = if raw_net < dec!(0) {
        let shortfall = -raw_net;
        warn!(
            "Deductions exceed gross pay for employee {}; net pay clamped to zero (short {})",
            employee.id, shortfall
        );
        warnings.push(PayrollWarning::NegativeNetPay { shortfall });
        dec!(0)
    } else {
        raw_net
    };

    PayrollCalculation {
        employee_id: employee.id,
        first_name: employee.first_name.clone(),
        last_name: employee.last_name.clone(),
        base_salary: employee.base_salary,
        rewards: totals.rewards,
        deductions: totals.deductions,
        advance_deduction: plan.total_deduction,
        gross_pay,
        net_pay,
        warnings,
        rewards_detail: totals.rewards_detail,
        deductions_detail: totals.deductions_detail,
        advance_plan: plan.mutations,
    }
}

fn summarize(calculations: &[PayrollCalculation]) -> PayrollSummary {
    let mut summary = PayrollSummary {
        total_employees: calculations.len() as i32,
        total_gross: dec!(0),
        total_deductions: dec!(0),
        total_advance_deductions: dec!(0),
        total_net: dec!(0),
        average_gross_pay: dec!(0),
        average_net_pay: dec!(0),
    };

    for calculation in calculations {
        summary.total_gross += calculation.gross_pay;
        summary.total_deductions += calculation.deductions + calculation.advance_deduction;
        summary.total_advance_deductions += calculation.advance_deduction;
        summary.total_net += calculation.net_pay;
    }

    if summary.total_employees > 0 {
        let count = Decimal::from(summary.total_employees);
        summary.average_gross_pay = round_money(summary.total_gross / count);
        summary.average_net_pay = round_money(summary.total_net / count);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeStatus;
    use chrono::Utc;

    fn employee(base_salary: Decimal) -> Employee {
        let now = Utc::now();
        Employee {
            id: Uuid::new_v4(),
            first_name: "Ngozi".to_string(),
            last_name: "Eze".to_string(),
            institution_id: None,
            base_salary,
            status: EmployeeStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn totals(rewards: Decimal, deductions: Decimal) -> CompensationTotals {
        CompensationTotals {
            rewards,
            deductions,
            rewards_detail: Vec::new(),
            deductions_detail: Vec::new(),
        }
    }

    fn plan(total: Decimal) -> DeductionPlan {
        DeductionPlan { total_deduction: total, mutations: Vec::new() }
    }

    #[test]
    fn net_pay_is_salary_plus_rewards_minus_all_deductions() {
        let calc = build_calculation(&employee(dec!(2000)), totals(dec!(300), dec!(120.50)), plan(dec!(250)));
        assert_eq!(calc.gross_pay, dec!(2300));
        assert_eq!(calc.net_pay, dec!(1929.50));
        assert!(calc.warnings.is_empty());
    }

    #[test]
    fn net_pay_clamps_to_zero_and_warns() {
        // 1000 gross against 1200 of deductions.
        let calc = build_calculation(&employee(dec!(1000)), totals(dec!(0), dec!(1200)), plan(dec!(0)));
        assert_eq!(calc.net_pay, dec!(0));
        assert_eq!(calc.gross_pay, dec!(1000), "gross is reported unclamped");
        assert_eq!(calc.warnings, vec![PayrollWarning::NegativeNetPay { shortfall: dec!(200) }]);
    }

    #[test]
    fn clamp_does_not_hide_the_advance_deduction() {
        let calc = build_calculation(&employee(dec!(100)), totals(dec!(0), dec!(0)), plan(dec!(150)));
        assert_eq!(calc.net_pay, dec!(0));
        assert_eq!(calc.advance_deduction, dec!(150));
        assert_eq!(calc.warnings, vec![PayrollWarning::NegativeNetPay { shortfall: dec!(50) }]);
    }

    #[test]
    fn summary_totals_and_averages() {
        let calcs = vec![
            build_calculation(&employee(dec!(1000)), totals(dec!(0), dec!(0)), plan(dec!(0))),
            build_calculation(&employee(dec!(2001)), totals(dec!(0), dec!(500)), plan(dec!(0))),
        ];
        let summary = summarize(&calcs);
        assert_eq!(summary.total_employees, 2);
        assert_eq!(summary.total_gross, dec!(3001));
        assert_eq!(summary.total_deductions, dec!(500));
        assert_eq!(summary.total_net, dec!(2501));
        assert_eq!(summary.average_gross_pay, dec!(1500.50));
        assert_eq!(summary.average_net_pay, dec!(1250.50));
    }

    #[test]
    fn empty_roster_summary_has_zero_averages() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_employees, 0);
        assert_eq!(summary.average_gross_pay, dec!(0));
        assert_eq!(summary.average_net_pay, dec!(0));
    }
}
