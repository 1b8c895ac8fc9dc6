//! Salary ledger reconciliation.
//!
//! Decides what has to happen to `employee_salary_current` and
//! `employee_salary_history` for a create or update. The SQL lives with the
//! employee lifecycle; this module only plans, so the diff-before-write rule
//! can be checked without a database.

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::database::models::SalarySnapshot;

pub const DEFAULT_SALARY_TYPE: &str = "CTC";
pub const DEFAULT_CURRENCY: &str = "INR";

/// Scale of the `ctc_lpa` columns (`NUMERIC(12,2)`)
pub const AMOUNT_SCALE: u32 = 2;

/// Remark stamped on history rows written when a snapshot is superseded
pub const ARCHIVE_REMARK: &str = "Archived on salary revision";

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Optional salary fields of a create/update request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalaryInput {
    pub ctc_lpa: Option<Decimal>,
    pub salary_type: Option<String>,
    pub effective_from: Option<NaiveDate>,
    pub currency: Option<String>,
    pub remarks: Option<String>,
}

impl SalaryInput {
    /// Updates only reconcile when both an amount and an effective date are given.
    pub fn is_reconcilable(&self) -> bool {
        self.ctc_lpa.is_some() && self.effective_from.is_some()
    }
}

/// Values written to a snapshot row (and mirrored into history)
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryValues {
    pub ctc_lpa: Decimal,
    pub salary_type: String,
    pub effective_from: NaiveDate,
    pub currency: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SalaryPlan {
    /// Nothing to reconcile
    Skip,
    /// No snapshot yet: insert it and an open-ended history row
    Open(SalaryValues),
    /// Same compensation: refresh remarks and timestamp only
    Touch { remarks: Option<String> },
    /// Archive `archived` into history, then overwrite the snapshot with `next`
    Revise {
        archived: SalarySnapshot,
        next: SalaryValues,
    },
}

impl SalaryPlan {
    pub fn label(&self) -> &'static str {
        match self {
            SalaryPlan::Skip => "skip",
            SalaryPlan::Open(_) => "open",
            SalaryPlan::Touch { .. } => "touch",
            SalaryPlan::Revise { .. } => "revise",
        }
    }
}

/// Round an amount the way PostgreSQL stores it in a `NUMERIC(12,2)`
/// column, so a resubmitted value compares equal to the stored one.
pub fn stored_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn normalized(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_ascii_uppercase()
}

/// Salary rows for a new employee. Only a positive amount opens a snapshot;
/// its effective date falls back to the joining date, then to `today`.
pub fn plan_create(
    input: &SalaryInput,
    joining_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<SalaryValues> {
    let ctc_lpa = input.ctc_lpa.map(stored_amount).filter(|amount| *amount > Decimal::ZERO)?;

    Some(SalaryValues {
        ctc_lpa,
        salary_type: normalized(input.salary_type.as_deref(), DEFAULT_SALARY_TYPE),
        effective_from: input.effective_from.or(joining_date).unwrap_or(today),
        currency: normalized(input.currency.as_deref(), DEFAULT_CURRENCY),
        remarks: input.remarks.clone(),
    })
}

/// Compare the requested salary against the stored snapshot. A change in
/// amount, effective date or salary type revises; anything else touches.
pub fn plan_update(current: Option<&SalarySnapshot>, input: &SalaryInput) -> SalaryPlan {
    let (Some(ctc_lpa), Some(effective_from)) = (input.ctc_lpa.map(stored_amount), input.effective_from) else {
        return SalaryPlan::Skip;
    };

    let Some(current) = current else {
        return SalaryPlan::Open(SalaryValues {
            ctc_lpa,
            salary_type: normalized(input.salary_type.as_deref(), DEFAULT_SALARY_TYPE),
            effective_from,
            currency: normalized(input.currency.as_deref(), DEFAULT_CURRENCY),
            remarks: input.remarks.clone(),
        });
    };

    let salary_type = normalized(input.salary_type.as_deref(), &current.salary_type);
    let unchanged = current.ctc_lpa == ctc_lpa
        && current.effective_from == effective_from
        && current.salary_type == salary_type;

    if unchanged {
        return SalaryPlan::Touch {
            remarks: input.remarks.clone(),
        };
    }

    SalaryPlan::Revise {
        archived: current.clone(),
        next: SalaryValues {
            ctc_lpa,
            salary_type,
            effective_from,
            currency: normalized(input.currency.as_deref(), &current.currency),
            remarks: input.remarks.clone(),
        },
    }
}
