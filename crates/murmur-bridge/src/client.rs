//! HTTP client for the messaging backend

use crate::wire::{response_error, SendRequest};
use crate::{BridgeError, BridgeResult};
use async_trait::async_trait;
use murmur_core::{MessageSender, OutgoingMessage, SendError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// RPC endpoint receiving `send_message` calls
    pub endpoint: String,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/rpc".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Sends messages to the backend over HTTP
pub struct HttpBridge {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpBridge {
    /// Create a new bridge from configuration
    pub fn new(config: &BridgeConfig) -> BridgeResult<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| BridgeError::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BridgeError::ClientBuildFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            token: config.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Deliver one message and wait for the backend's answer
    pub async fn send_message(&self, message: &OutgoingMessage) -> BridgeResult<()> {
        let request = SendRequest::from_message(message);
        debug!("Posting {} message to {}", message.kind().wire_name(), self.endpoint);

        let mut builder = self.client.post(self.endpoint.clone()).json(&request);
        if let Some(ref token) = self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BridgeError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            warn!("Backend returned {} for message to {}", status, message.target);
            return Err(BridgeError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        if let Some(error) = response_error(&body) {
            warn!("Backend refused message to {}: {}", message.target, error);
            return Err(BridgeError::Rejected {
                status: status.as_u16(),
                body: error,
            });
        }

        info!("Message delivered to {}", message.target);
        Ok(())
    }
}

#[async_trait]
impl MessageSender for HttpBridge {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), SendError> {
        self.send_message(message).await.map_err(SendError::from)
    }
}

/// Logs each request instead of sending it
#[derive(Debug, Default)]
pub struct DryRunBridge;

impl DryRunBridge {
    /// Encode the request that would have been sent
    pub fn encode(&self, message: &OutgoingMessage) -> BridgeResult<String> {
        Ok(serde_json::to_string(&SendRequest::from_message(message))?)
    }
}

#[async_trait]
impl MessageSender for DryRunBridge {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), SendError> {
        let encoded = self.encode(message)?;
        info!("Dry run, not sending: {}", encoded);
        Ok(())
    }
}
