//! Loan applicant data structures

use serde::{Deserialize, Serialize};

/// Home ownership status. Spellings match the training data exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HomeOwnership {
    Rent,
    Mortgage,
    Own,
}

impl HomeOwnership {
    /// Ordinal code used by the trained transformer's input schema.
    pub fn code(self) -> f32 {
        match self {
            HomeOwnership::Rent => 0.0,
            HomeOwnership::Mortgage => 1.0,
            HomeOwnership::Own => 2.0,
        }
    }
}

/// Purpose of the loan. Spellings match the training data exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanIntent {
    Education,
    Medical,
    Venture,
    Personal,
    #[serde(rename = "DEBTCONSOLIDATION")]
    DebtConsolidation,
    #[serde(rename = "HOMEIMPROVEMENT")]
    HomeImprovement,
}

impl LoanIntent {
    /// Ordinal code used by the trained transformer's input schema.
    pub fn code(self) -> f32 {
        match self {
            LoanIntent::Education => 0.0,
            LoanIntent::Medical => 1.0,
            LoanIntent::Venture => 2.0,
            LoanIntent::Personal => 3.0,
            LoanIntent::DebtConsolidation => 4.0,
            LoanIntent::HomeImprovement => 5.0,
        }
    }
}

/// Loan grade assigned by the originator, A (best) through G.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoanGrade {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl LoanGrade {
    /// Ordinal code used by the trained transformer's input schema.
    pub fn code(self) -> f32 {
        self as u8 as f32
    }
}

/// A fully-populated loan applicant record as handed over by the request
/// boundary. Range and enum constraints are enforced upstream; this struct
/// only carries the values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantRecord {
    /// Applicant age in years (18-80)
    #[serde(alias = "person_age")]
    pub age: u32,

    /// Annual income, non-negative
    #[serde(alias = "person_income")]
    pub income: f64,

    /// Employment length in years, non-negative, may be fractional
    #[serde(alias = "person_emp_length")]
    pub emp_length: f64,

    /// Home ownership status
    #[serde(alias = "person_home_ownership")]
    pub home_ownership: HomeOwnership,

    /// Requested loan amount, non-negative
    pub loan_amnt: f64,

    /// Interest rate in percent (0-30)
    #[serde(alias = "loan_int_rate")]
    pub int_rate: f64,

    /// Purpose of the loan
    pub loan_intent: LoanIntent,

    /// Loan grade
    pub loan_grade: LoanGrade,

    /// Whether the applicant has a historical default on file
    #[serde(alias = "cb_person_default_on_file")]
    pub default_on_file: bool,

    /// Credit history length in years
    #[serde(alias = "cb_person_cred_hist_length")]
    pub cred_hist_length: u32,
}

impl ApplicantRecord {
    /// Create a record with the given core fields and neutral defaults for
    /// the rest. Primarily for tests and tooling.
    pub fn new(age: u32, income: f64, loan_amnt: f64) -> Self {
        Self {
            age,
            income,
            emp_length: 2.0,
            home_ownership: HomeOwnership::Rent,
            loan_amnt,
            int_rate: 11.0,
            loan_intent: LoanIntent::Education,
            loan_grade: LoanGrade::B,
            default_on_file: false,
            cred_hist_length: 5,
        }
    }
}
