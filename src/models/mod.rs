// src/models/mod.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ─── Month ────────────────────────────────────────────────────────────────────

/// Calendar month in `YYYY-MM` form. Every payroll run is scoped to exactly
/// one of these, and compensations are bucketed by the month of their date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

#[derive(Debug, Error)]
#[error("Invalid month {0:?}. Use YYYY-MM")]
pub struct ParseMonthError(String);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Month { year, month })
        } else {
            None
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("constructor keeps year and month in range")
    }

    pub fn next(&self) -> Month {
        if self.month == 12 {
            Month { year: self.year + 1, month: 1 }
        } else {
            Month { year: self.year, month: self.month + 1 }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthError(raw.to_string());
        let (year, month) = raw.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Month::new(year, month).ok_or_else(err)
    }
}

impl Serialize for Month {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// Stored as TEXT; sqlx 0.8 only needs Type + Encode + Decode to bind and
// read it like any built-in.
impl sqlx::Type<sqlx::Postgres> for Month {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for Month {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'_, sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Month {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(raw.parse::<Month>()?)
    }
}

// ─── Institution ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Institution {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInstitutionRequest {
    pub name: String,
}

// ─── Employee ─────────────────────────────────────────────────────────────────

// sqlx 0.8: custom Postgres enums need #[sqlx(type_name = "...")] on the enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq)]
#[sqlx(type_name = "employee_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// None means the employee is not attached to any institution.
    pub institution_id: Option<Uuid>,
    pub base_salary: Decimal,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub institution_id: Option<Uuid>,
    pub base_salary: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetBaseSalaryRequest {
    pub base_salary: Decimal,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeQuery {
    pub institution_id: Option<Uuid>,
}

// ─── Compensation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq)]
#[sqlx(type_name = "compensation_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CompensationKind {
    Reward,
    Deduction,
}

/// A one-off reward or deduction. It counts toward the payroll of the
/// calendar month its `date` falls in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Compensation {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub kind: CompensationKind,
    pub amount: Decimal,
    pub reason: String,
    #[schema(example = "2026-02-14")]
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCompensationRequest {
    pub amount: Decimal,
    pub reason: String,
    #[schema(example = "2026-02-14")]
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CompensationQuery {
    /// Format: "YYYY-MM"
    #[param(example = "2026-02")]
    pub month: Option<String>,
}

// ─── Advance ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq)]
#[sqlx(type_name = "advance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdvanceStatus {
    Pending,
    Approved,
    Paid,
    Rejected,
}

/// A salary advance repaid in equal monthly installments. Only `approved`
/// advances with a remaining balance participate in payroll.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Advance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub installments: i32,
    pub paid_amount: Decimal,
    /// Maintained by the store as `amount - paid_amount`.
    pub remaining_amount: Decimal,
    pub status: AdvanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdvanceRequest {
    pub amount: Decimal,
    pub installments: i32,
}

// ─── Payroll Run ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq)]
#[sqlx(type_name = "payroll_run_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayrollRunStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PayrollRun {
    pub id: Uuid,
    #[schema(value_type = String, example = "2026-02")]
    pub month: Month,
    /// None means the run covered every institution.
    pub institution_id: Option<Uuid>,
    pub run_date: DateTime<Utc>,
    pub status: PayrollRunStatus,
    pub total_employees: i32,
    pub total_gross: Decimal,
    pub total_deductions: Decimal,
    pub total_net: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PayrollEntry {
    pub id: Uuid,
    pub payroll_run_id: Uuid,
    pub employee_id: Uuid,
    pub base_salary: Decimal,
    pub rewards: Decimal,
    pub deductions: Decimal,
    pub advance_deduction: Decimal,
    pub gross_pay: Decimal,
    pub net_pay: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One advance installment withheld by a committed run. Kept so deleting
/// the run can put the exact amount back on the advance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AdvanceDeduction {
    pub id: Uuid,
    pub payroll_run_id: Uuid,
    pub advance_id: Uuid,
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PayrollScopeRequest {
    /// Format: "YYYY-MM"
    #[schema(example = "2026-02")]
    pub month: String,
    /// Omit to run payroll across every institution.
    pub institution_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayrollRunDetail {
    pub run: PayrollRun,
    pub entries: Vec<PayrollEntry>,
}
