//! Test Applicant Producer
//!
//! Generates random valid applicant records and publishes them to NATS for
//! pipeline testing. Optionally uses request/reply to print the decisions.

use anyhow::Result;
use credit_risk_pipeline::types::{
    ApplicantRecord, HomeOwnership, LoanGrade, LoanIntent, ScoredResult,
};
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

const SUBJECT: &str = "applicants";

fn random_applicant(rng: &mut impl Rng) -> ApplicantRecord {
    let home_ownership = match rng.gen_range(0..3) {
        0 => HomeOwnership::Rent,
        1 => HomeOwnership::Mortgage,
        _ => HomeOwnership::Own,
    };
    let loan_intent = match rng.gen_range(0..6) {
        0 => LoanIntent::Education,
        1 => LoanIntent::Medical,
        2 => LoanIntent::Venture,
        3 => LoanIntent::Personal,
        4 => LoanIntent::DebtConsolidation,
        _ => LoanIntent::HomeImprovement,
    };
    let loan_grade = match rng.gen_range(0..7) {
        0 => LoanGrade::A,
        1 => LoanGrade::B,
        2 => LoanGrade::C,
        3 => LoanGrade::D,
        4 => LoanGrade::E,
        5 => LoanGrade::F,
        _ => LoanGrade::G,
    };

    ApplicantRecord {
        age: rng.gen_range(18..=80),
        income: rng.gen_range(0.0..250_000.0),
        // Roughly one in ten applicants is a new worker
        emp_length: if rng.gen_bool(0.1) {
            0.0
        } else {
            rng.gen_range(0.5..40.0)
        },
        home_ownership,
        loan_amnt: rng.gen_range(500.0..60_000.0),
        int_rate: rng.gen_range(0.0..30.0),
        loan_intent,
        loan_grade,
        default_on_file: rng.gen_bool(0.15),
        cred_hist_length: rng.gen_range(0..30),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let url = std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string());
    let count: usize = std::env::var("APPLICANT_COUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);

    let client = async_nats::connect(&url).await?;
    info!(url = %url, count, "Connected, publishing test applicants");

    let mut rng = rand::thread_rng();
    for i in 0..count {
        let applicant = random_applicant(&mut rng);
        let payload = serde_json::to_vec(&applicant)?;

        match tokio::time::timeout(
            Duration::from_secs(2),
            client.request(SUBJECT, payload.into()),
        )
        .await
        {
            Ok(Ok(response)) => match serde_json::from_slice::<ScoredResult>(&response.payload) {
                Ok(result) => info!(
                    applicant = i,
                    probability = result.probability,
                    label = ?result.label,
                    "Decision received"
                ),
                Err(e) => warn!(applicant = i, error = %e, "Unparseable decision payload"),
            },
            Ok(Err(e)) => warn!(applicant = i, error = %e, "Request failed"),
            Err(_) => warn!(applicant = i, "Decision request timed out"),
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    info!("Done");
    Ok(())
}
