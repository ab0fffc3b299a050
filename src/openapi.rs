// src/openapi.rs

use crate::models::{
    AddCompensationRequest, Advance, AdvanceDeduction, AdvanceStatus, Compensation,
    CompensationKind, CreateAdvanceRequest, CreateEmployeeRequest, CreateInstitutionRequest,
    Employee, EmployeeStatus, Institution, PayrollEntry, PayrollRun, PayrollRunDetail,
    PayrollRunStatus, PayrollScopeRequest, SetBaseSalaryRequest,
};
use crate::services::{
    advance::{AdvanceMutation, DeductionPlan},
    compensation::{CompensationRef, CompensationTotals},
    payroll::{PayrollCalculation, PayrollCalculationResult, PayrollSummary, PayrollWarning},
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll Engine API",
        version = "1.0.0",
        description = "A payroll calculation and advance amortization engine built with Rust and Axum. \
            Supports institutions, employee rosters, per-month rewards and deductions, salary \
            advances repaid in equal installments, and atomic monthly payroll runs with a \
            side-effect-free preview.",
        contact(
            name = "Payroll Engine Support",
            email = "support@yourcompany.com"
        ),
        license(name = "MIT")
    ),
    paths(
        // Institutions
        crate::handlers::institution::create_institution,
        crate::handlers::institution::list_institutions,
        // Employees
        crate::handlers::employee::create_employee,
        crate::handlers::employee::list_employees,
        crate::handlers::employee::get_employee,
        crate::handlers::employee::set_base_salary,
        crate::handlers::employee::archive_employee,
        // Compensations
        crate::handlers::compensation::add_reward,
        crate::handlers::compensation::add_deduction,
        crate::handlers::compensation::list_compensations,
        crate::handlers::compensation::delete_compensation,
        // Advances
        crate::handlers::advance::create_advance,
        crate::handlers::advance::list_advances,
        crate::handlers::advance::approve_advance,
        crate::handlers::advance::reject_advance,
        // Payroll
        crate::handlers::payroll::preview_payroll,
        crate::handlers::payroll::create_payroll_run,
        crate::handlers::payroll::list_payroll_runs,
        crate::handlers::payroll::get_payroll_run,
        crate::handlers::payroll::delete_payroll_run,
    ),
    components(
        schemas(
            CreateInstitutionRequest, Institution,
            CreateEmployeeRequest, Employee, EmployeeStatus, SetBaseSalaryRequest,
            AddCompensationRequest, Compensation, CompensationKind,
            CreateAdvanceRequest, Advance, AdvanceStatus,
            PayrollScopeRequest, PayrollCalculationResult, PayrollCalculation, PayrollSummary,
            PayrollWarning, CompensationRef, CompensationTotals, DeductionPlan, AdvanceMutation,
            PayrollRun, PayrollRunStatus, PayrollEntry, PayrollRunDetail, AdvanceDeduction,
        )
    ),
    tags(
        (name = "Institutions", description = "Group employees under an institution"),
        (name = "Employees", description = "Onboard and manage employees"),
        (name = "Compensations", description = "Record one-off rewards and deductions"),
        (name = "Advances", description = "Request, approve and track salary advances"),
        (name = "Payroll", description = "Preview and commit monthly payroll runs"),
    )
)]
pub struct ApiDoc;
