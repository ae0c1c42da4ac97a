use crate::error::DeliveryError;
use crate::feedback::FeedbackItem;
use reqwest::Client;
use std::time::Duration;

/// Performs the network round trip delivering one item to the remote
/// collector. Single attempt per call; retry policy lives in the scheduler.
pub struct FeedbackGateway {
    client: Client,
    feedback_url: String,
}

fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
}

impl FeedbackGateway {
    pub fn new(feedback_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            feedback_url: feedback_url.into(),
        }
    }

    /// Deliver the item's full payload to the collector endpoint.
    ///
    /// Success is a 2xx status with a JSON-parseable body. Failures are
    /// classified: 4xx is a permanent rejection, 5xx and network/timeout
    /// errors are transient.
    pub async fn submit(&self, item: &FeedbackItem) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.feedback_url)
            .json(item)
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status.is_client_error() {
                return Err(DeliveryError::Rejected {
                    status: status.as_u16(),
                });
            }
            return Err(DeliveryError::Upstream {
                status: status.as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| DeliveryError::BadResponse(e.to_string()))?;

        Ok(())
    }
}
