// src/store/memory.rs

use super::{LedgerStore, NewAdvance, NewCompensation, NewEmployee, RunDraft, StoreError};
use crate::models::{
    Advance, AdvanceDeduction, AdvanceStatus, Compensation, Employee, EmployeeStatus, Institution,
    Month, PayrollEntry, PayrollRun, PayrollRunStatus,
};
use crate::services::advance::AdvanceMutation;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Ledger {
    institutions: Vec<Institution>,
    employees: Vec<Employee>,
    compensations: Vec<Compensation>,
    advances: Vec<Advance>,
    runs: Vec<PayrollRun>,
    entries: Vec<PayrollEntry>,
    advance_deductions: Vec<AdvanceDeduction>,
}

/// In-memory [`LedgerStore`] with the same commit semantics as the Postgres
/// one: a run lands with all its writes or not at all. Backs the test suite.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    ledger: Mutex<Ledger>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().expect("ledger mutex poisoned")
    }
}

/// Same compare-and-set rule as the Postgres transaction, applied to a
/// scratch copy so a stale mutation leaves the real ledger untouched.
fn apply_mutations(advances: &mut [Advance], mutations: &[AdvanceMutation]) -> Result<(), StoreError> {
    for mutation in mutations {
        let expected_paid = mutation.new_paid_amount - mutation.deduction_amount;
        let advance = advances.iter_mut().find(|a| a.id == mutation.advance_id);
        match advance {
            Some(a) if a.status == AdvanceStatus::Approved && a.paid_amount == expected_paid => {
                a.paid_amount = mutation.new_paid_amount;
                a.remaining_amount = a.amount - a.paid_amount;
                a.status = mutation.new_status;
                a.updated_at = Utc::now();
            }
            _ => return Err(StoreError::LedgerConflict { advance_id: mutation.advance_id }),
        }
    }
    Ok(())
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    // ─── Institutions ─────────────────────────────────────────────────────

    async fn insert_institution(&self, name: String) -> Result<Institution, StoreError> {
        let institution = Institution { id: Uuid::new_v4(), name, created_at: Utc::now() };
        self.ledger().institutions.push(institution.clone());
        Ok(institution)
    }

    async fn list_institutions(&self) -> Result<Vec<Institution>, StoreError> {
        let mut institutions = self.ledger().institutions.clone();
        institutions.reverse();
        Ok(institutions)
    }

    async fn institution_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.ledger().institutions.iter().any(|i| i.id == id))
    }

    // ─── Employees ────────────────────────────────────────────────────────

    async fn insert_employee(&self, new: NewEmployee) -> Result<Employee, StoreError> {
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4(),
            first_name: new.first_name,
            last_name: new.last_name,
            institution_id: new.institution_id,
            base_salary: new.base_salary,
            status: EmployeeStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.ledger().employees.push(employee.clone());
        Ok(employee)
    }

    async fn list_employees(&self, institution_id: Option<Uuid>) -> Result<Vec<Employee>, StoreError> {
        let mut employees: Vec<Employee> = self
            .ledger()
            .employees
            .iter()
            .filter(|e| institution_id.is_none() || e.institution_id == institution_id)
            .cloned()
            .collect();
        employees.reverse();
        Ok(employees)
    }

    async fn list_active_employees(&self, institution_id: Option<Uuid>) -> Result<Vec<Employee>, StoreError> {
        Ok(self
            .ledger()
            .employees
            .iter()
            .filter(|e| e.status == EmployeeStatus::Active)
            .filter(|e| institution_id.is_none() || e.institution_id == institution_id)
            .cloned()
            .collect())
    }

    async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        Ok(self.ledger().employees.iter().find(|e| e.id == id).cloned())
    }

    async fn set_base_salary(&self, id: Uuid, base_salary: Decimal) -> Result<Option<Employee>, StoreError> {
        let mut ledger = self.ledger();
        match ledger.employees.iter_mut().find(|e| e.id == id) {
            Some(employee) => {
                employee.base_salary = base_salary;
                employee.updated_at = Utc::now();
                Ok(Some(employee.clone()))
            }
            None => Ok(None),
        }
    }

    async fn archive_employee(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut ledger = self.ledger();
        match ledger.employees.iter_mut().find(|e| e.id == id) {
            Some(employee) => {
                employee.status = EmployeeStatus::Archived;
                employee.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ─── Compensations ────────────────────────────────────────────────────

    async fn insert_compensation(&self, new: NewCompensation) -> Result<Compensation, StoreError> {
        let compensation = Compensation {
            id: Uuid::new_v4(),
            employee_id: new.employee_id,
            kind: new.kind,
            amount: new.amount,
            reason: new.reason,
            date: new.date,
            created_at: Utc::now(),
        };
        self.ledger().compensations.push(compensation.clone());
        Ok(compensation)
    }

    async fn list_compensations(&self, employee_id: Uuid, month: Option<Month>) -> Result<Vec<Compensation>, StoreError> {
        let mut compensations: Vec<Compensation> = self
            .ledger()
            .compensations
            .iter()
            .filter(|c| c.employee_id == employee_id)
            .filter(|c| month.is_none_or(|m| m.contains(c.date)))
            .cloned()
            .collect();
        compensations.sort_by_key(|c| (c.date, c.created_at));
        Ok(compensations)
    }

    async fn delete_compensation(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut ledger = self.ledger();
        let before = ledger.compensations.len();
        ledger.compensations.retain(|c| c.id != id);
        Ok(ledger.compensations.len() < before)
    }

    // ─── Advances ─────────────────────────────────────────────────────────

    async fn insert_advance(&self, new: NewAdvance) -> Result<Advance, StoreError> {
        let now = Utc::now();
        let advance = Advance {
            id: Uuid::new_v4(),
            employee_id: new.employee_id,
            amount: new.amount,
            installments: new.installments,
            paid_amount: Decimal::ZERO,
            remaining_amount: new.amount,
            status: AdvanceStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.ledger().advances.push(advance.clone());
        Ok(advance)
    }

    async fn list_advances(&self, employee_id: Uuid) -> Result<Vec<Advance>, StoreError> {
        let mut advances: Vec<Advance> = self
            .ledger()
            .advances
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .cloned()
            .collect();
        advances.reverse();
        Ok(advances)
    }

    async fn list_open_advances(&self, employee_id: Uuid) -> Result<Vec<Advance>, StoreError> {
        Ok(self
            .ledger()
            .advances
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .filter(|a| a.status == AdvanceStatus::Approved && a.remaining_amount > Decimal::ZERO)
            .cloned()
            .collect())
    }

    async fn find_advance(&self, id: Uuid) -> Result<Option<Advance>, StoreError> {
        Ok(self.ledger().advances.iter().find(|a| a.id == id).cloned())
    }

    async fn transition_advance(&self, id: Uuid, from: AdvanceStatus, to: AdvanceStatus) -> Result<Option<Advance>, StoreError> {
        let mut ledger = self.ledger();
        match ledger.advances.iter_mut().find(|a| a.id == id && a.status == from) {
            Some(advance) => {
                advance.status = to;
                advance.updated_at = Utc::now();
                Ok(Some(advance.clone()))
            }
            None => Ok(None),
        }
    }

    // ─── Payroll runs ─────────────────────────────────────────────────────

    async fn find_completed_run(&self, month: Month, institution_id: Option<Uuid>) -> Result<Option<PayrollRun>, StoreError> {
        Ok(self
            .ledger()
            .runs
            .iter()
            .find(|r| {
                r.month == month
                    && r.institution_id == institution_id
                    && r.status == PayrollRunStatus::Completed
            })
            .cloned())
    }

    async fn commit_run(&self, draft: RunDraft) -> Result<PayrollRun, StoreError> {
        let mut ledger = self.ledger();

        let duplicate = ledger.runs.iter().any(|r| {
            r.month == draft.month
                && r.institution_id == draft.institution_id
                && r.status == PayrollRunStatus::Completed
        });
        if duplicate {
            return Err(StoreError::DuplicateRun {
                month: draft.month,
                institution_id: draft.institution_id,
            });
        }

        let mut advances = ledger.advances.clone();
        apply_mutations(&mut advances, &draft.advance_mutations)?;

        let now = Utc::now();
        let run = PayrollRun {
            id: Uuid::new_v4(),
            month: draft.month,
            institution_id: draft.institution_id,
            run_date: now,
            status: PayrollRunStatus::Completed,
            total_employees: draft.total_employees,
            total_gross: draft.total_gross,
            total_deductions: draft.total_deductions,
            total_net: draft.total_net,
        };

        for entry in &draft.entries {
            ledger.entries.push(PayrollEntry {
                id: Uuid::new_v4(),
                payroll_run_id: run.id,
                employee_id: entry.employee_id,
                base_salary: entry.base_salary,
                rewards: entry.rewards,
                deductions: entry.deductions,
                advance_deduction: entry.advance_deduction,
                gross_pay: entry.gross_pay,
                net_pay: entry.net_pay,
                created_at: now,
            });
        }
        for mutation in &draft.advance_mutations {
            ledger.advance_deductions.push(AdvanceDeduction {
                id: Uuid::new_v4(),
                payroll_run_id: run.id,
                advance_id: mutation.advance_id,
                employee_id: mutation.employee_id,
                amount: mutation.deduction_amount,
                created_at: now,
            });
        }
        ledger.advances = advances;
        ledger.runs.push(run.clone());

        Ok(run)
    }

    async fn find_run(&self, id: Uuid) -> Result<Option<PayrollRun>, StoreError> {
        Ok(self.ledger().runs.iter().find(|r| r.id == id).cloned())
    }

    async fn list_runs(&self) -> Result<Vec<PayrollRun>, StoreError> {
        let mut runs = self.ledger().runs.clone();
        runs.reverse();
        Ok(runs)
    }

    async fn list_entries(&self, run_id: Uuid) -> Result<Vec<PayrollEntry>, StoreError> {
        Ok(self
            .ledger()
            .entries
            .iter()
            .filter(|e| e.payroll_run_id == run_id)
            .cloned()
            .collect())
    }

    async fn list_advance_deductions(&self, run_id: Uuid) -> Result<Vec<AdvanceDeduction>, StoreError> {
        Ok(self
            .ledger()
            .advance_deductions
            .iter()
            .filter(|d| d.payroll_run_id == run_id)
            .cloned()
            .collect())
    }

    async fn delete_run(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut ledger = self.ledger();
        if !ledger.runs.iter().any(|r| r.id == id) {
            return Ok(false);
        }

        let reversals: Vec<(Uuid, Decimal)> = ledger
            .advance_deductions
            .iter()
            .filter(|d| d.payroll_run_id == id)
            .map(|d| (d.advance_id, d.amount))
            .collect();
        for (advance_id, amount) in reversals {
            if let Some(advance) = ledger.advances.iter_mut().find(|a| a.id == advance_id) {
                advance.paid_amount -= amount;
                advance.remaining_amount = advance.amount - advance.paid_amount;
                if advance.status == AdvanceStatus::Paid {
                    advance.status = AdvanceStatus::Approved;
                }
                advance.updated_at = Utc::now();
            }
        }

        ledger.runs.retain(|r| r.id != id);
        ledger.entries.retain(|e| e.payroll_run_id != id);
        ledger.advance_deductions.retain(|d| d.payroll_run_id != id);
        Ok(true)
    }
}
