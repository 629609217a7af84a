//! Pairing wire JSON.
//!
//! The poll and submit exchanges are plain JSON with a `status` tag, shaped
//! exactly as the setup wizard and firmware expect them. Unknown or
//! malformed codes surface as `not_found` (a client error on the wire,
//! never a server fault).

use serde::{Deserialize, Serialize};

use crate::registry::{BoundConfig, PollOutcome, SubmitOutcome};

/// Reply to `GET /pair/<code>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PollResponse {
    Waiting,
    Paired {
        #[serde(rename = "webhookUrl")]
        webhook_url: String,
        config: serde_json::Value,
    },
    NotFound,
}

impl From<PollOutcome> for PollResponse {
    fn from(outcome: PollOutcome) -> Self {
        match outcome {
            PollOutcome::Waiting => PollResponse::Waiting,
            PollOutcome::Paired(bound) => PollResponse::Paired {
                webhook_url: bound.webhook_url,
                config: bound.config,
            },
            PollOutcome::NotFound => PollResponse::NotFound,
        }
    }
}

/// Body of `POST /pair/<code>` from the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(rename = "webhookUrl")]
    pub webhook_url: String,
    pub config: serde_json::Value,
}

impl From<SubmitRequest> for BoundConfig {
    fn from(req: SubmitRequest) -> Self {
        Self {
            webhook_url: req.webhook_url,
            config: req.config,
        }
    }
}

/// Reply to a wizard submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitResponse {
    Configured,
    AlreadyPaired,
    NotFound,
}

impl From<SubmitOutcome> for SubmitResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Configured => SubmitResponse::Configured,
            SubmitOutcome::AlreadyPaired => SubmitResponse::AlreadyPaired,
            SubmitOutcome::NotFound => SubmitResponse::NotFound,
        }
    }
}
