//! Outbound lead sinks.
//!
//! Delivery is best-effort: a sink failure is logged and reported as a
//! [`DeliveryStatus`], never raised to the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::DeliveryError;

use super::payload::LeadPayload;

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Failed { reason: String },
}

impl DeliveryStatus {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// A destination for lead payloads.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Post the payload once.
    async fn send(&self, payload: &LeadPayload) -> Result<(), DeliveryError>;

    /// Post the payload within `limit` and fold any error into a status.
    async fn deliver(&self, payload: &LeadPayload, limit: Duration) -> DeliveryStatus {
        let result = match tokio::time::timeout(limit, self.send(payload)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::TimedOut {
                sink: self.name().to_string(),
                after_ms: limit.as_millis() as u64,
            }),
        };
        match result {
            Ok(()) => {
                info!(sink = self.name(), "Lead delivered");
                DeliveryStatus::Delivered
            }
            Err(e) => {
                warn!(sink = self.name(), "Lead delivery failed: {}", e);
                DeliveryStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// How an HTTP sink decides a 2xx response was actually accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Any 2xx status.
    AnySuccess,
    /// 2xx and a JSON body with `"success": true`.
    SuccessFlag,
}

/// JSON-over-HTTP sink.
pub struct HttpSink {
    name: String,
    url: String,
    acceptance: Acceptance,
    client: reqwest::Client,
}

impl HttpSink {
    pub fn new(name: impl Into<String>, url: impl Into<String>, acceptance: Acceptance) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            acceptance,
            client: reqwest::Client::new(),
        }
    }

    /// The primary lead API.
    pub fn api(url: impl Into<String>) -> Self {
        Self::new("api", url, Acceptance::SuccessFlag)
    }

    /// The CRM webhook.
    pub fn webhook(url: impl Into<String>) -> Self {
        Self::new("webhook", url, Acceptance::AnySuccess)
    }

    fn request_failed(&self, e: impl std::fmt::Display) -> DeliveryError {
        DeliveryError::RequestFailed {
            sink: self.name.clone(),
            reason: e.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ApiAck {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl Sink for HttpSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, payload: &LeadPayload) -> Result<(), DeliveryError> {
        if self.url.trim().is_empty() {
            return Err(DeliveryError::NotConfigured {
                sink: self.name.clone(),
            });
        }

        let resp = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
            .json(payload)
            .send()
            .await
            .map_err(|e| self.request_failed(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                sink: self.name.clone(),
                status: status.as_u16(),
                body,
            });
        }

        match self.acceptance {
            Acceptance::AnySuccess => Ok(()),
            Acceptance::SuccessFlag => {
                let ack: ApiAck = resp.json().await.map_err(|e| self.request_failed(e))?;
                if ack.success {
                    Ok(())
                } else {
                    Err(DeliveryError::Rejected {
                        sink: self.name.clone(),
                        message: ack
                            .message
                            .unwrap_or_else(|| "Failed to submit form".to_string()),
                    })
                }
            }
        }
    }
}

/// Aggregate verdict over every sink in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success,
    Partial,
    Failed,
}

/// Per-sink delivery statuses, in attempt order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub deliveries: Vec<(String, DeliveryStatus)>,
}

impl DeliveryReport {
    pub fn record(&mut self, sink: &str, status: DeliveryStatus) {
        self.deliveries.push((sink.to_string(), status));
    }

    pub fn outcome(&self) -> DeliveryOutcome {
        let delivered = self
            .deliveries
            .iter()
            .filter(|(_, s)| s.is_delivered())
            .count();
        match delivered {
            0 => DeliveryOutcome::Failed,
            n if n == self.deliveries.len() => DeliveryOutcome::Success,
            _ => DeliveryOutcome::Partial,
        }
    }
}
