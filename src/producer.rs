//! NATS message producer for scored decisions

use crate::types::ScoredResult;
use anyhow::Result;
use async_nats::Client;
use tracing::debug;

/// Producer for publishing scored decisions to NATS
#[derive(Clone)]
pub struct DecisionProducer {
    client: Client,
    subject: String,
}

impl DecisionProducer {
    /// Create a new decision producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a scored decision
    pub async fn publish(&self, result: &ScoredResult) -> Result<()> {
        let payload = serde_json::to_vec(result)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            result_id = %result.result_id,
            probability = result.probability,
            label = ?result.label,
            "Published scored decision"
        );

        Ok(())
    }

    /// Reply directly to a request's reply subject
    pub async fn reply(&self, reply_subject: String, result: &ScoredResult) -> Result<()> {
        let payload = serde_json::to_vec(result)?;
        self.client.publish(reply_subject, payload.into()).await?;
        Ok(())
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
