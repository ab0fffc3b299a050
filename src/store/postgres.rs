// src/store/postgres.rs

use super::{LedgerStore, NewAdvance, NewCompensation, NewEmployee, RunDraft, StoreError};
use crate::models::{
    Advance, AdvanceDeduction, AdvanceStatus, Compensation, Employee, Institution, Month,
    PayrollEntry, PayrollRun,
};
use crate::services::advance::AdvanceMutation;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Partial unique index enforcing one completed run per (month, institution).
const RUN_KEY_INDEX: &str = "payroll_runs_completed_key";

#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_duplicate_run(err: sqlx::Error, month: Month, institution_id: Option<Uuid>) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.constraint() == Some(RUN_KEY_INDEX) => {
            StoreError::DuplicateRun { month, institution_id }
        }
        _ => StoreError::Database(err),
    }
}

/// Applies one planned installment inside the commit transaction. The
/// `paid_amount` guard makes this a compare-and-set: if the advance moved
/// since the calculation, zero rows match and the whole run rolls back.
async fn apply_advance_mutation(
    tx: &mut Transaction<'_, Postgres>,
    run_id: Uuid,
    mutation: &AdvanceMutation,
) -> Result<(), StoreError> {
    let expected_paid = mutation.new_paid_amount - mutation.deduction_amount;
    let updated = sqlx::query(
        r#"
        UPDATE advances
        SET paid_amount = $1, status = $2, updated_at = NOW()
        WHERE id = $3 AND status = 'approved' AND paid_amount = $4
        "#,
    )
    .bind(mutation.new_paid_amount)
    .bind(mutation.new_status)
    .bind(mutation.advance_id)
    .bind(expected_paid)
    .execute(&mut **tx)
    .await?;

    if updated.rows_affected() != 1 {
        return Err(StoreError::LedgerConflict { advance_id: mutation.advance_id });
    }

    sqlx::query(
        r#"
        INSERT INTO advance_deductions (id, payroll_run_id, advance_id, employee_id, amount, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(run_id)
    .bind(mutation.advance_id)
    .bind(mutation.employee_id)
    .bind(mutation.deduction_amount)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ─── Institutions ─────────────────────────────────────────────────────

    async fn insert_institution(&self, name: String) -> Result<Institution, StoreError> {
        let institution = sqlx::query_as::<_, Institution>(
            r#"
            INSERT INTO institutions (id, name, created_at)
            VALUES ($1, $2, NOW())
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(institution)
    }

    async fn list_institutions(&self) -> Result<Vec<Institution>, StoreError> {
        let institutions = sqlx::query_as::<_, Institution>(
            "SELECT id, name, created_at FROM institutions ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(institutions)
    }

    async fn institution_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM institutions WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    // ─── Employees ────────────────────────────────────────────────────────

    async fn insert_employee(&self, new: NewEmployee) -> Result<Employee, StoreError> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (id, first_name, last_name, institution_id, base_salary, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'active', NOW(), NOW())
            RETURNING id, first_name, last_name, institution_id, base_salary, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.institution_id)
        .bind(new.base_salary)
        .fetch_one(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn list_employees(&self, institution_id: Option<Uuid>) -> Result<Vec<Employee>, StoreError> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, first_name, last_name, institution_id, base_salary, status, created_at, updated_at
            FROM employees
            WHERE ($1::uuid IS NULL OR institution_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(institution_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    async fn list_active_employees(&self, institution_id: Option<Uuid>) -> Result<Vec<Employee>, StoreError> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, first_name, last_name, institution_id, base_salary, status, created_at, updated_at
            FROM employees
            WHERE status = 'active' AND ($1::uuid IS NULL OR institution_id = $1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(institution_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, first_name, last_name, institution_id, base_salary, status, created_at, updated_at
            FROM employees
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn set_base_salary(&self, id: Uuid, base_salary: Decimal) -> Result<Option<Employee>, StoreError> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET base_salary = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, first_name, last_name, institution_id, base_salary, status, created_at, updated_at
            "#,
        )
        .bind(base_salary)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn archive_employee(&self, id: Uuid) -> Result<bool, StoreError> {
        let updated = sqlx::query(
            "UPDATE employees SET status = 'archived', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(updated.rows_affected() > 0)
    }

    // ─── Compensations ────────────────────────────────────────────────────

    async fn insert_compensation(&self, new: NewCompensation) -> Result<Compensation, StoreError> {
        let compensation = sqlx::query_as::<_, Compensation>(
            r#"
            INSERT INTO compensations (id, employee_id, kind, amount, reason, date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING id, employee_id, kind, amount, reason, date, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.employee_id)
        .bind(new.kind)
        .bind(new.amount)
        .bind(new.reason)
        .bind(new.date)
        .fetch_one(&self.pool)
        .await?;
        Ok(compensation)
    }

    async fn list_compensations(&self, employee_id: Uuid, month: Option<Month>) -> Result<Vec<Compensation>, StoreError> {
        let compensations = match month {
            Some(month) => {
                sqlx::query_as::<_, Compensation>(
                    r#"
                    SELECT id, employee_id, kind, amount, reason, date, created_at
                    FROM compensations
                    WHERE employee_id = $1 AND date >= $2 AND date < $3
                    ORDER BY date ASC, created_at ASC
                    "#,
                )
                .bind(employee_id)
                .bind(month.first_day())
                .bind(month.next().first_day())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Compensation>(
                    r#"
                    SELECT id, employee_id, kind, amount, reason, date, created_at
                    FROM compensations
                    WHERE employee_id = $1
                    ORDER BY date ASC, created_at ASC
                    "#,
                )
                .bind(employee_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(compensations)
    }

    async fn delete_compensation(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = sqlx::query("DELETE FROM compensations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }

    // ─── Advances ─────────────────────────────────────────────────────────

    async fn insert_advance(&self, new: NewAdvance) -> Result<Advance, StoreError> {
        let advance = sqlx::query_as::<_, Advance>(
            r#"
            INSERT INTO advances (id, employee_id, amount, installments, paid_amount, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, 'pending', NOW(), NOW())
            RETURNING id, employee_id, amount, installments, paid_amount, remaining_amount, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.employee_id)
        .bind(new.amount)
        .bind(new.installments)
        .fetch_one(&self.pool)
        .await?;
        Ok(advance)
    }

    async fn list_advances(&self, employee_id: Uuid) -> Result<Vec<Advance>, StoreError> {
        let advances = sqlx::query_as::<_, Advance>(
            r#"
            SELECT id, employee_id, amount, installments, paid_amount, remaining_amount, status, created_at, updated_at
            FROM advances
            WHERE employee_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(advances)
    }

    async fn list_open_advances(&self, employee_id: Uuid) -> Result<Vec<Advance>, StoreError> {
        let advances = sqlx::query_as::<_, Advance>(
            r#"
            SELECT id, employee_id, amount, installments, paid_amount, remaining_amount, status, created_at, updated_at
            FROM advances
            WHERE employee_id = $1 AND status = 'approved' AND remaining_amount > 0
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(advances)
    }

    async fn find_advance(&self, id: Uuid) -> Result<Option<Advance>, StoreError> {
        let advance = sqlx::query_as::<_, Advance>(
            r#"
            SELECT id, employee_id, amount, installments, paid_amount, remaining_amount, status, created_at, updated_at
            FROM advances
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(advance)
    }

    async fn transition_advance(&self, id: Uuid, from: AdvanceStatus, to: AdvanceStatus) -> Result<Option<Advance>, StoreError> {
        let advance = sqlx::query_as::<_, Advance>(
            r#"
            UPDATE advances
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            RETURNING id, employee_id, amount, installments, paid_amount, remaining_amount, status, created_at, updated_at
            "#,
        )
        .bind(to)
        .bind(id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await?;
        Ok(advance)
    }

    // ─── Payroll runs ─────────────────────────────────────────────────────

    async fn find_completed_run(&self, month: Month, institution_id: Option<Uuid>) -> Result<Option<PayrollRun>, StoreError> {
        let run = sqlx::query_as::<_, PayrollRun>(
            r#"
            SELECT id, month, institution_id, run_date, status, total_employees, total_gross, total_deductions, total_net
            FROM payroll_runs
            WHERE month = $1 AND institution_id IS NOT DISTINCT FROM $2 AND status = 'completed'
            "#,
        )
        .bind(month)
        .bind(institution_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(run)
    }

    async fn commit_run(&self, draft: RunDraft) -> Result<PayrollRun, StoreError> {
        let mut tx = self.pool.begin().await?;
        let run_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO payroll_runs (id, month, institution_id, run_date, status, total_employees, total_gross, total_deductions, total_net)
            VALUES ($1, $2, $3, NOW(), 'pending', $4, $5, $6, $7)
            "#,
        )
        .bind(run_id)
        .bind(draft.month)
        .bind(draft.institution_id)
        .bind(draft.total_employees)
        .bind(draft.total_gross)
        .bind(draft.total_deductions)
        .bind(draft.total_net)
        .execute(&mut *tx)
        .await?;

        for entry in &draft.entries {
            sqlx::query(
                r#"
                INSERT INTO payroll_entries (id, payroll_run_id, employee_id, base_salary, rewards, deductions, advance_deduction, gross_pay, net_pay, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, clock_timestamp())
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(run_id)
            .bind(entry.employee_id)
            .bind(entry.base_salary)
            .bind(entry.rewards)
            .bind(entry.deductions)
            .bind(entry.advance_deduction)
            .bind(entry.gross_pay)
            .bind(entry.net_pay)
            .execute(&mut *tx)
            .await?;
        }

        for mutation in &draft.advance_mutations {
            apply_advance_mutation(&mut tx, run_id, mutation).await?;
        }

        // Flipping to completed is what arms the unique (month, institution)
        // index, so a concurrent duplicate surfaces right here.
        let run = sqlx::query_as::<_, PayrollRun>(
            r#"
            UPDATE payroll_runs
            SET status = 'completed'
            WHERE id = $1
            RETURNING id, month, institution_id, run_date, status, total_employees, total_gross, total_deductions, total_net
            "#,
        )
        .bind(run_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| map_duplicate_run(err, draft.month, draft.institution_id))?;

        tx.commit().await?;
        Ok(run)
    }

    async fn find_run(&self, id: Uuid) -> Result<Option<PayrollRun>, StoreError> {
        let run = sqlx::query_as::<_, PayrollRun>(
            r#"
            SELECT id, month, institution_id, run_date, status, total_employees, total_gross, total_deductions, total_net
            FROM payroll_runs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(run)
    }

    async fn list_runs(&self) -> Result<Vec<PayrollRun>, StoreError> {
        let runs = sqlx::query_as::<_, PayrollRun>(
            r#"
            SELECT id, month, institution_id, run_date, status, total_employees, total_gross, total_deductions, total_net
            FROM payroll_runs
            ORDER BY run_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(runs)
    }

    async fn list_entries(&self, run_id: Uuid) -> Result<Vec<PayrollEntry>, StoreError> {
        let entries = sqlx::query_as::<_, PayrollEntry>(
            r#"
            SELECT id, payroll_run_id, employee_id, base_salary, rewards, deductions, advance_deduction, gross_pay, net_pay, created_at
            FROM payroll_entries
            WHERE payroll_run_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn list_advance_deductions(&self, run_id: Uuid) -> Result<Vec<AdvanceDeduction>, StoreError> {
        let deductions = sqlx::query_as::<_, AdvanceDeduction>(
            r#"
            SELECT id, payroll_run_id, advance_id, employee_id, amount, created_at
            FROM advance_deductions
            WHERE payroll_run_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(deductions)
    }

    async fn delete_run(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let deductions = sqlx::query_as::<_, AdvanceDeduction>(
            r#"
            SELECT id, payroll_run_id, advance_id, employee_id, amount, created_at
            FROM advance_deductions
            WHERE payroll_run_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        // Reverse each logged installment before the cascade wipes the log.
        for deduction in &deductions {
            sqlx::query(
                r#"
                UPDATE advances
                SET paid_amount = paid_amount - $1,
                    status = CASE WHEN status = 'paid' THEN 'approved'::advance_status ELSE status END,
                    updated_at = NOW()
                WHERE id = $2
                "#,
            )
            .bind(deduction.amount)
            .bind(deduction.advance_id)
            .execute(&mut *tx)
            .await?;
        }

        let deleted = sqlx::query("DELETE FROM payroll_runs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted.rows_affected() > 0)
    }
}
