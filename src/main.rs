//! Credit Risk Pipeline - Main Entry Point
//!
//! Consumes applicant records from NATS, scores them against the loaded
//! artifacts, replies with the decision, and publishes high-risk results.

use anyhow::Result;
use credit_risk_pipeline::{
    artifacts::Artifacts,
    config::AppConfig,
    consumer::ApplicantConsumer,
    engine::DecisionEngine,
    metrics::{MetricsReporter, ScoringMetrics},
    producer::DecisionProducer,
    types::{ApplicantRecord, RiskLabel},
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("credit_risk_pipeline=info".parse()?),
        )
        .init();

    info!("Starting Credit Risk Pipeline");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Load the three artifacts. Failure here is fatal: the process must
    // not serve without model, preprocessor, and threshold. They are
    // loaded exactly once and shared read-only from this point on.
    let artifacts = match Artifacts::load(&config.artifacts) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!(error = %e, "Artifact loading failed, refusing to serve");
            return Err(e.into());
        }
    };
    info!(
        threshold = artifacts.threshold,
        "Artifacts loaded (model, preprocessor, threshold)"
    );

    let engine = Arc::new(DecisionEngine::from_artifacts(&artifacts));
    let metrics = Arc::new(ScoringMetrics::new());

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = ApplicantConsumer::new(client.clone(), &config.nats.applicant_subject);
    let producer = Arc::new(DecisionProducer::new(
        client.clone(),
        &config.nats.decision_subject,
    ));

    let num_workers = config.pipeline.workers;
    info!(
        workers = num_workers,
        applicant_subject = %config.nats.applicant_subject,
        decision_subject = %config.nats.decision_subject,
        "Starting scoring loop"
    );

    // Semaphore to limit concurrent scorings
    let semaphore = Arc::new(Semaphore::new(num_workers));

    // Periodic metrics summary
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        let permit = semaphore.clone().acquire_owned().await?;

        let engine = engine.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let start_time = Instant::now();

            match serde_json::from_slice::<ApplicantRecord>(&message.payload) {
                Ok(applicant) => match engine.score_applicant(&applicant) {
                    Ok(result) => {
                        let latency = start_time.elapsed();
                        metrics.record_scoring(latency, result.probability, result.label);

                        if let Some(reply) = message.reply {
                            if let Err(e) = producer.reply(reply.to_string(), &result).await {
                                error!(
                                    result_id = %result.result_id,
                                    error = %e,
                                    "Failed to reply with scored result"
                                );
                            }
                        }

                        if result.label == RiskLabel::HighRisk {
                            if let Err(e) = producer.publish(&result).await {
                                error!(
                                    result_id = %result.result_id,
                                    error = %e,
                                    "Failed to publish high-risk decision"
                                );
                            } else {
                                info!(
                                    result_id = %result.result_id,
                                    probability = result.probability,
                                    latency_us = latency.as_micros(),
                                    "High-risk decision published"
                                );
                            }
                        } else {
                            debug!(
                                result_id = %result.result_id,
                                probability = result.probability,
                                latency_us = latency.as_micros(),
                                "Applicant scored low risk"
                            );
                        }
                    }
                    Err(e) => {
                        // Request-level failure: report and keep serving.
                        metrics.record_failure();
                        error!(error = %e, "Scoring failed for applicant");
                    }
                },
                Err(e) => {
                    metrics.record_malformed();
                    warn!(error = %e, "Failed to deserialize applicant record");
                }
            }

            drop(permit);
        });
    }

    info!("Pipeline shutting down...");
    metrics.log_summary();

    Ok(())
}
