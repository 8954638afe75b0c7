use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::StatusCode;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::controller::discord::registry::{CommandRegistry, InteractionContext};
use crate::shared::structs::discord::interaction::{Interaction, InteractionKind};
use crate::shared::structs::discord::response::InteractionResponse;
use crate::shared::utility::signature::{self, SignatureError};

/// Process-wide bot settings. Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub public_key: String,
    pub command_handlers: CommandRegistry,
}

impl BotConfig {
    /// Fails if `public_key` is not a hex encoded 32 byte key.
    pub fn new(
        public_key: impl Into<String>,
        command_handlers: CommandRegistry,
    ) -> Result<Self, SignatureError> {
        let public_key = public_key.into();
        signature::decode_public_key(&public_key)?;

        Ok(BotConfig {
            public_key,
            command_handlers,
        })
    }
}

/// What the hosting layer hands over for one request.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub body: Bytes,
    pub signature: String,
    pub timestamp: String,
    pub request_id: Uuid,
}

/// What the hosting layer sends back. `body` is empty for every non-200 status.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl OutboundResponse {
    fn ok(body: Vec<u8>) -> Self {
        OutboundResponse {
            status: StatusCode::OK,
            body: Bytes::from(body),
        }
    }

    fn empty(status: StatusCode) -> Self {
        OutboundResponse {
            status,
            body: Bytes::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("failed to parse request body as an interaction: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),
    #[error("signature artifacts could not be decoded: {0}")]
    MalformedSignature(#[from] SignatureError),
    #[error("signature validation failed")]
    InvalidSignature,
    #[error("signature timestamp `{0}` is outside the accepted window")]
    StaleTimestamp(String),
    #[error("application command interaction carried no data")]
    MissingCommandData,
    #[error("failed to parse application command: {0}")]
    MalformedCommand(#[source] serde_json::Error),
    #[error("unsupported interaction type {0}")]
    UnsupportedInteractionType(i32),
    #[error("command handler `{command}` failed: {source:#}")]
    Handler {
        command: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to encode interaction response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl InteractionError {
    /// The only status the caller ever learns about a failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            InteractionError::MalformedSignature(_)
            | InteractionError::InvalidSignature
            | InteractionError::StaleTimestamp(_) => StatusCode::UNAUTHORIZED,
            InteractionError::MalformedEnvelope(_)
            | InteractionError::UnsupportedInteractionType(_)
            | InteractionError::MissingCommandData
            | InteractionError::MalformedCommand(_)
            | InteractionError::Handler { .. }
            | InteractionError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Decode, authenticate, route, encode.
#[derive(Debug, Clone)]
pub struct InteractionPipeline {
    config: Arc<BotConfig>,
    max_timestamp_age: Option<Duration>,
}

impl InteractionPipeline {
    pub fn new(config: BotConfig) -> Self {
        InteractionPipeline {
            config: Arc::new(config),
            max_timestamp_age: None,
        }
    }

    /// Rejects requests whose signature timestamp is further than `max_age` from now.
    pub fn with_max_timestamp_age(mut self, max_age: Duration) -> Self {
        self.max_timestamp_age = Some(max_age);
        self
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Runs one request to completion. Never fails: every error becomes an empty-bodied
    /// response with the matching status.
    pub async fn handle(&self, request: InboundRequest) -> OutboundResponse {
        let request_id = request.request_id;

        match self.process(request).await {
            Ok(body) => {
                tracing::info!(
                    %request_id,
                    response = %String::from_utf8_lossy(&body),
                    "Sending response"
                );
                OutboundResponse::ok(body)
            }
            Err(e) => {
                let status = e.status_code();
                if status == StatusCode::UNAUTHORIZED {
                    tracing::warn!(%request_id, error = %e, "Request unauthorized");
                } else {
                    tracing::error!(%request_id, error = %e, status = status.as_u16(), "Request failed");
                }
                OutboundResponse::empty(status)
            }
        }
    }

    pub async fn process(&self, request: InboundRequest) -> Result<Vec<u8>, InteractionError> {
        let InboundRequest {
            body,
            signature,
            timestamp,
            request_id,
        } = request;

        let interaction =
            Interaction::from_slice(&body).map_err(InteractionError::MalformedEnvelope)?;

        self.authenticate(&body, &signature, &timestamp)?;
        tracing::debug!(%request_id, "Signature validation passed");

        let response = match interaction.kind() {
            InteractionKind::Ping => {
                tracing::info!(%request_id, "Ping interaction received");
                InteractionResponse::pong()
            }
            InteractionKind::ApplicationCommand => {
                tracing::info!(%request_id, "Application command interaction received");
                let command = interaction
                    .application_command()
                    .ok_or(InteractionError::MissingCommandData)?
                    .map_err(InteractionError::MalformedCommand)?;
                let command_name = command.name.clone();
                let ctx = InteractionContext::new(request_id, &interaction);

                self.config
                    .command_handlers
                    .dispatch(ctx, command)
                    .await
                    .map_err(|source| InteractionError::Handler {
                        command: command_name,
                        source,
                    })?
            }
            InteractionKind::Unsupported(other) => {
                return Err(InteractionError::UnsupportedInteractionType(other));
            }
        };

        serde_json::to_vec(&response).map_err(InteractionError::Encode)
    }

    fn authenticate(
        &self,
        body: &[u8],
        signature: &str,
        timestamp: &str,
    ) -> Result<(), InteractionError> {
        if !signature::verify(&self.config.public_key, body, signature, timestamp)? {
            return Err(InteractionError::InvalidSignature);
        }

        if let Some(max_age) = self.max_timestamp_age {
            if !is_fresh(timestamp, max_age, OffsetDateTime::now_utc()) {
                return Err(InteractionError::StaleTimestamp(timestamp.to_string()));
            }
        }

        Ok(())
    }
}

/// `timestamp` must be unix seconds within `max_age` of `now`, in either direction.
fn is_fresh(timestamp: &str, max_age: Duration, now: OffsetDateTime) -> bool {
    let Ok(seconds) = timestamp.trim().parse::<i64>() else {
        return false;
    };
    let Ok(signed_at) = OffsetDateTime::from_unix_timestamp(seconds) else {
        return false;
    };

    (now - signed_at).unsigned_abs() <= max_age
}
