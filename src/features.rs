//! Feature derivation for credit default risk scoring.
//!
//! This module turns a raw applicant record into the exact column set the
//! trained preprocessing transformer expects. Column order and presence
//! are a strict contract with the external artifacts: the transformer was
//! fitted against this schema, and a mismatch produces silently wrong
//! scores rather than an error.

use crate::types::ApplicantRecord;

/// Guard against division by zero in the derived ratios. Matches the
/// constant used during training, so derived values reproduce the
/// training-time feature distributions exactly.
pub const EPSILON: f64 = 1e-6;

/// Number of columns in the transformer's input schema.
pub const COLUMN_COUNT: usize = 15;

/// Column names in the exact order the transformer was trained against.
/// `loan_percent_income` and `loan_to_income` are numerically identical;
/// the trained transformer expects both, so both are kept.
pub const COLUMN_NAMES: [&str; COLUMN_COUNT] = [
    "person_age",
    "person_income",
    "person_emp_length",
    "loan_amnt",
    "loan_intent",
    "loan_grade",
    "loan_int_rate",
    "person_home_ownership",
    "cb_person_default_on_file",
    "cb_person_cred_hist_length",
    "loan_percent_income",
    "loan_to_income",
    "loan_per_emp_year",
    "loan_per_age",
    "is_new_worker",
];

/// An applicant record extended with the engineered features, in the
/// transformer's column order. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub person_age: f64,
    pub person_income: f64,
    pub person_emp_length: f64,
    pub loan_amnt: f64,
    pub loan_intent: f32,
    pub loan_grade: f32,
    pub loan_int_rate: f64,
    pub person_home_ownership: f32,
    pub cb_person_default_on_file: f64,
    pub cb_person_cred_hist_length: f64,
    pub loan_percent_income: f64,
    pub loan_to_income: f64,
    pub loan_per_emp_year: f64,
    pub loan_per_age: f64,
    pub is_new_worker: f64,
}

impl FeatureRecord {
    /// Serialize the record as a single row in the transformer's column
    /// order. Enum fields carry the ordinal codes from the training schema.
    pub fn to_row(&self) -> Vec<f32> {
        vec![
            self.person_age as f32,
            self.person_income as f32,
            self.person_emp_length as f32,
            self.loan_amnt as f32,
            self.loan_intent,
            self.loan_grade,
            self.loan_int_rate as f32,
            self.person_home_ownership,
            self.cb_person_default_on_file as f32,
            self.cb_person_cred_hist_length as f32,
            self.loan_percent_income as f32,
            self.loan_to_income as f32,
            self.loan_per_emp_year as f32,
            self.loan_per_age as f32,
            self.is_new_worker as f32,
        ]
    }

    /// Column names matching `to_row` positions.
    pub fn column_names() -> &'static [&'static str] {
        &COLUMN_NAMES
    }
}

/// Builds [`FeatureRecord`]s from raw applicant data.
///
/// Pure and deterministic: same applicant in, same record out, no side
/// effects. Inputs are range-checked by the request boundary; the builder
/// must still produce finite values at the boundary cases (income = 0,
/// emp_length = 0, loan_amnt = 0), which the ε-guarded divisions ensure.
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Derive the full feature record for an applicant.
    pub fn build(&self, applicant: &ApplicantRecord) -> FeatureRecord {
        let age = applicant.age as f64;
        let income = applicant.income;
        let emp_length = applicant.emp_length;
        let loan_amnt = applicant.loan_amnt;

        let loan_percent_income = loan_amnt / (income + EPSILON);

        FeatureRecord {
            person_age: age,
            person_income: income,
            person_emp_length: emp_length,
            loan_amnt,
            loan_intent: applicant.loan_intent.code(),
            loan_grade: applicant.loan_grade.code(),
            loan_int_rate: applicant.int_rate,
            person_home_ownership: applicant.home_ownership.code(),
            cb_person_default_on_file: if applicant.default_on_file { 1.0 } else { 0.0 },
            cb_person_cred_hist_length: applicant.cred_hist_length as f64,
            loan_percent_income,
            // Same formula as loan_percent_income. The trained transformer
            // expects both columns, so both are computed.
            loan_to_income: loan_amnt / (income + EPSILON),
            loan_per_emp_year: loan_amnt / (emp_length + EPSILON),
            loan_per_age: loan_amnt / (age + EPSILON),
            is_new_worker: if emp_length == 0.0 { 1.0 } else { 0.0 },
        }
    }
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApplicantRecord, HomeOwnership, LoanGrade, LoanIntent};

    fn applicant() -> ApplicantRecord {
        ApplicantRecord {
            age: 25,
            income: 50000.0,
            emp_length: 2.0,
            home_ownership: HomeOwnership::Rent,
            loan_amnt: 10000.0,
            int_rate: 11.0,
            loan_intent: LoanIntent::Education,
            loan_grade: LoanGrade::B,
            default_on_file: false,
            cred_hist_length: 5,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let record = FeatureBuilder::new().build(&applicant());

        // 10000 / (50000 + 1e-6) ~= 0.2
        assert!((record.loan_to_income - 0.2).abs() < 1e-6);
        assert!((record.loan_percent_income - 0.2).abs() < 1e-6);
        assert_eq!(record.is_new_worker, 0.0);
        assert!((record.loan_per_emp_year - 5000.0).abs() < 1e-2);
        assert!((record.loan_per_age - 400.0).abs() < 1e-2);
    }

    #[test]
    fn test_boundary_inputs_stay_finite() {
        let cases = [
            ApplicantRecord {
                income: 0.0,
                ..applicant()
            },
            ApplicantRecord {
                emp_length: 0.0,
                ..applicant()
            },
            ApplicantRecord {
                loan_amnt: 0.0,
                ..applicant()
            },
            ApplicantRecord {
                age: 18,
                income: 0.0,
                emp_length: 0.0,
                loan_amnt: 0.0,
                ..applicant()
            },
        ];

        let builder = FeatureBuilder::new();
        for case in &cases {
            let record = builder.build(case);
            for (name, value) in COLUMN_NAMES.iter().zip(record.to_row()) {
                assert!(
                    value.is_finite(),
                    "column {} not finite for boundary input",
                    name
                );
            }
        }
    }

    #[test]
    fn test_redundant_pair_identical() {
        let builder = FeatureBuilder::new();
        let incomes = [0.0, 1.0, 37500.5, 50000.0, 1_000_000.0];
        let amounts = [0.0, 500.0, 10000.0, 100_000.0];

        for &income in &incomes {
            for &loan_amnt in &amounts {
                let record = builder.build(&ApplicantRecord {
                    income,
                    loan_amnt,
                    ..applicant()
                });
                assert_eq!(record.loan_percent_income, record.loan_to_income);
            }
        }
    }

    #[test]
    fn test_is_new_worker_exact_zero_only() {
        let builder = FeatureBuilder::new();

        let record = builder.build(&ApplicantRecord {
            emp_length: 0.0,
            ..applicant()
        });
        assert_eq!(record.is_new_worker, 1.0);
        // emp_length 0 divides by epsilon alone: huge but finite
        assert!(record.loan_per_emp_year.is_finite());
        assert!((record.loan_per_emp_year - 10000.0 / 1e-6).abs() < 1.0);

        // Fractional lengths approaching zero still count as employed
        for emp_length in [0.5, 0.1, 0.01, 1e-9] {
            let record = builder.build(&ApplicantRecord {
                emp_length,
                ..applicant()
            });
            assert_eq!(record.is_new_worker, 0.0, "emp_length = {}", emp_length);
        }
    }

    #[test]
    fn test_monotonic_in_loan_amount() {
        let builder = FeatureBuilder::new();
        let mut prev_per_age = f64::NEG_INFINITY;
        let mut prev_to_income = f64::NEG_INFINITY;

        for loan_amnt in (0..=100_000).step_by(2500) {
            let record = builder.build(&ApplicantRecord {
                loan_amnt: loan_amnt as f64,
                ..applicant()
            });
            assert!(record.loan_per_age >= prev_per_age);
            assert!(record.loan_to_income >= prev_to_income);
            prev_per_age = record.loan_per_age;
            prev_to_income = record.loan_to_income;
        }
    }

    #[test]
    fn test_column_order_contract() {
        // The transformer is schema-sensitive: this locks both the order
        // and the count of serialized columns.
        assert_eq!(COLUMN_NAMES.len(), COLUMN_COUNT);
        assert_eq!(COLUMN_NAMES[0], "person_age");
        assert_eq!(COLUMN_NAMES[10], "loan_percent_income");
        assert_eq!(COLUMN_NAMES[11], "loan_to_income");
        assert_eq!(COLUMN_NAMES[14], "is_new_worker");

        let record = FeatureBuilder::new().build(&applicant());
        let row = record.to_row();
        assert_eq!(row.len(), COLUMN_COUNT);
        assert_eq!(row[0], 25.0); // person_age
        assert_eq!(row[3], 10000.0); // loan_amnt
        assert_eq!(row[8], 0.0); // cb_person_default_on_file
        assert_eq!(row[10], row[11]); // redundant pair travels together
    }

    #[test]
    fn test_deterministic() {
        let builder = FeatureBuilder::new();
        let a = builder.build(&applicant());
        let b = builder.build(&applicant());
        assert_eq!(a, b);
    }
}
