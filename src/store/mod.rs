// src/store/mod.rs

pub mod memory;
pub mod postgres;

pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

use crate::models::{
    Advance, AdvanceDeduction, AdvanceStatus, Compensation, CompensationKind, Employee,
    Institution, Month, PayrollEntry, PayrollRun,
};
use crate::services::advance::AdvanceMutation;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("A completed payroll run already exists for {month}")]
    DuplicateRun {
        month: Month,
        institution_id: Option<Uuid>,
    },

    #[error("Advance {advance_id} changed since the payroll was calculated")]
    LedgerConflict { advance_id: Uuid },
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub institution_id: Option<Uuid>,
    pub base_salary: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewCompensation {
    pub employee_id: Uuid,
    pub kind: CompensationKind,
    pub amount: Decimal,
    pub reason: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewAdvance {
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub installments: i32,
}

#[derive(Debug, Clone)]
pub struct NewPayrollEntry {
    pub employee_id: Uuid,
    pub base_salary: Decimal,
    pub rewards: Decimal,
    pub deductions: Decimal,
    pub advance_deduction: Decimal,
    pub gross_pay: Decimal,
    pub net_pay: Decimal,
}

/// Everything one payroll run writes, assembled by the run manager and
/// committed by the store in a single transaction. Either the run row, its
/// entries, the deduction log and every advance mutation all land, or none do.
#[derive(Debug, Clone)]
pub struct RunDraft {
    pub month: Month,
    pub institution_id: Option<Uuid>,
    pub total_employees: i32,
    pub total_gross: Decimal,
    pub total_deductions: Decimal,
    pub total_net: Decimal,
    pub entries: Vec<NewPayrollEntry>,
    pub advance_mutations: Vec<AdvanceMutation>,
}

/// Persistence seam for the payroll ledger. The Postgres implementation
/// backs the service; the in-memory one backs tests.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    // ─── Institutions ─────────────────────────────────────────────────────

    async fn insert_institution(&self, name: String) -> Result<Institution, StoreError>;
    async fn list_institutions(&self) -> Result<Vec<Institution>, StoreError>;
    async fn institution_exists(&self, id: Uuid) -> Result<bool, StoreError>;

    // ─── Employees ────────────────────────────────────────────────────────

    async fn insert_employee(&self, new: NewEmployee) -> Result<Employee, StoreError>;
    async fn list_employees(&self, institution_id: Option<Uuid>) -> Result<Vec<Employee>, StoreError>;
    /// Active employees in deterministic payroll order (oldest first).
    async fn list_active_employees(&self, institution_id: Option<Uuid>) -> Result<Vec<Employee>, StoreError>;
    async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError>;
    async fn set_base_salary(&self, id: Uuid, base_salary: Decimal) -> Result<Option<Employee>, StoreError>;
    async fn archive_employee(&self, id: Uuid) -> Result<bool, StoreError>;

    // ─── Compensations ────────────────────────────────────────────────────

    async fn insert_compensation(&self, new: NewCompensation) -> Result<Compensation, StoreError>;
    async fn list_compensations(&self, employee_id: Uuid, month: Option<Month>) -> Result<Vec<Compensation>, StoreError>;
    async fn delete_compensation(&self, id: Uuid) -> Result<bool, StoreError>;

    // ─── Advances ─────────────────────────────────────────────────────────

    async fn insert_advance(&self, new: NewAdvance) -> Result<Advance, StoreError>;
    async fn list_advances(&self, employee_id: Uuid) -> Result<Vec<Advance>, StoreError>;
    /// Approved advances with a remaining balance, oldest first.
    async fn list_open_advances(&self, employee_id: Uuid) -> Result<Vec<Advance>, StoreError>;
    async fn find_advance(&self, id: Uuid) -> Result<Option<Advance>, StoreError>;
    /// Compare-and-set status transition. Returns None when the advance is
    /// missing or no longer in `from`.
    async fn transition_advance(&self, id: Uuid, from: AdvanceStatus, to: AdvanceStatus) -> Result<Option<Advance>, StoreError>;

    // ─── Payroll runs ─────────────────────────────────────────────────────

    async fn find_completed_run(&self, month: Month, institution_id: Option<Uuid>) -> Result<Option<PayrollRun>, StoreError>;
    async fn commit_run(&self, draft: RunDraft) -> Result<PayrollRun, StoreError>;
    async fn find_run(&self, id: Uuid) -> Result<Option<PayrollRun>, StoreError>;
    async fn list_runs(&self) -> Result<Vec<PayrollRun>, StoreError>;
    async fn list_entries(&self, run_id: Uuid) -> Result<Vec<PayrollEntry>, StoreError>;
    async fn list_advance_deductions(&self, run_id: Uuid) -> Result<Vec<AdvanceDeduction>, StoreError>;
    /// Deletes a run and puts every logged installment back on its advance.
    /// Returns false when the run does not exist.
    async fn delete_run(&self, id: Uuid) -> Result<bool, StoreError>;
}
