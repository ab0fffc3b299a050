// src/services/run_manager.rs

use crate::{
    errors::{AppError, AppResult},
    models::{PayrollEntry, PayrollRun},
    services::payroll::PayrollCalculationResult,
    store::{LedgerStore, NewPayrollEntry, RunDraft},
};
use tracing::info;
use uuid::Uuid;

/// Owns the lifecycle of committed payroll runs. This is the only path that
/// turns a calculation's planned advance mutations into ledger state, and it
/// does so through one all-or-nothing store transaction.
pub struct PayrollRunManager<'a> {
    store: &'a dyn LedgerStore,
}

impl<'a> PayrollRunManager<'a> {
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self { store }
    }

    pub async fn commit(&self, result: &PayrollCalculationResult) -> AppResult<PayrollRun> {
        if result.employees.is_empty() {
            return Err(AppError::Validation(format!(
                "No active employees to pay for {}",
                result.month
            )));
        }

        // Fast pre-check; the store's unique key still catches races.
        if self
            .store
            .find_completed_run(result.month, result.institution_id)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateRun {
                month: result.month,
                institution_id: result.institution_id,
            });
        }

        let draft = RunDraft {
            month: result.month,
            institution_id: result.institution_id,
            total_employees: result.summary.total_employees,
            total_gross: result.summary.total_gross,
            total_deductions: result.summary.total_deductions,
            total_net: result.summary.total_net,
            entries: result
                .employees
                .iter()
                .map(|calc| NewPayrollEntry {
                    employee_id: calc.employee_id,
                    base_salary: calc.base_salary,
                    rewards: calc.rewards,
                    deductions: calc.deductions,
                    advance_deduction: calc.advance_deduction,
                    gross_pay: calc.gross_pay,
                    net_pay: calc.net_pay,
                })
                .collect(),
            advance_mutations: result
                .employees
                .iter()
                .flat_map(|calc| calc.advance_plan.iter().cloned())
                .collect(),
        };

        let run = self.store.commit_run(draft).await?;
        info!(
            "Payroll run {} committed for {}: {} employees, total net {}",
            run.id, run.month, run.total_employees, run.total_net
        );
        Ok(run)
    }

    pub async fn get(&self, run_id: Uuid) -> AppResult<(PayrollRun, Vec<PayrollEntry>)> {
        let run = self
            .store
            .find_run(run_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payroll run {run_id} not found")))?;
        let entries = self.store.list_entries(run_id).await?;
        Ok((run, entries))
    }

    pub async fn list(&self) -> AppResult<Vec<PayrollRun>> {
        Ok(self.store.list_runs().await?)
    }

    /// Removes a run and reverses every advance installment it withheld,
    /// reopening advances the run had settled.
    pub async fn delete(&self, run_id: Uuid) -> AppResult<()> {
        if self.store.delete_run(run_id).await? {
            info!("Payroll run {} deleted; advance deductions reversed", run_id);
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Payroll run {run_id} not found")))
        }
    }
}
