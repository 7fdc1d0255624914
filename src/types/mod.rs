//! Type definitions for the credit risk pipeline

pub mod applicant;
pub mod decision;

pub use applicant::{ApplicantRecord, HomeOwnership, LoanGrade, LoanIntent};
pub use decision::{RiskLabel, ScoredResult};
