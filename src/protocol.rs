use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    pipeline::{PipelineState, PipelineStatus},
    types::{Recommendation, TriggerOutcome, UserProfile},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Detect,
    Setup(UserProfile),
    Profile,
    Status,
    Exit,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: WireMessageType,
    #[serde(default)]
    conditions: Option<Vec<String>>,
    #[serde(default)]
    restrictions: Option<Vec<String>>,
    #[serde(default)]
    goals: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum WireMessageType {
    Detect,
    Setup,
    Profile,
    Status,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    pub message: String,
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProtocolError {}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: format!("invalid message: {err}"),
        }
    }
}

pub fn parse_client_message(line: &str) -> Result<ClientMessage, ProtocolError> {
    let wire: WireMessage = serde_json::from_str(line)?;
    let has_profile_fields =
        wire.conditions.is_some() || wire.restrictions.is_some() || wire.goals.is_some();

    let message = match wire.kind {
        WireMessageType::Setup => {
            // a missing goal arrives blank and normalizes to the update default
            let profile = UserProfile {
                conditions: wire.conditions.unwrap_or_default(),
                restrictions: wire.restrictions.unwrap_or_default(),
                goals: wire.goals.unwrap_or_default(),
            };
            ClientMessage::Setup(profile.normalized())
        }
        _ if has_profile_fields => {
            return Err(ProtocolError {
                message: "profile fields are only accepted on setup messages".to_string(),
            });
        }
        WireMessageType::Detect => ClientMessage::Detect,
        WireMessageType::Profile => ClientMessage::Profile,
        WireMessageType::Status => ClientMessage::Status,
        WireMessageType::Exit => ClientMessage::Exit,
    };
    Ok(message)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServerMessage {
    Monitoring {
        count: usize,
    },
    Muted,
    Ordered {
        order: Recommendation,
    },
    ProfileSaved,
    Profile {
        profile: UserProfile,
    },
    State {
        state: PipelineState,
        count: usize,
        mute_remaining_secs: Option<u64>,
    },
    Error {
        message: String,
    },
}

impl From<TriggerOutcome> for ServerMessage {
    fn from(outcome: TriggerOutcome) -> Self {
        match outcome {
            TriggerOutcome::Monitoring { count } => ServerMessage::Monitoring { count },
            TriggerOutcome::Muted => ServerMessage::Muted,
            TriggerOutcome::Ordered { order } => ServerMessage::Ordered { order },
        }
    }
}

impl From<PipelineStatus> for ServerMessage {
    fn from(status: PipelineStatus) -> Self {
        ServerMessage::State {
            state: status.state,
            count: status.count,
            mute_remaining_secs: status.mute_remaining.map(ceil_secs),
        }
    }
}

fn ceil_secs(remaining: Duration) -> u64 {
    let secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}

/// Encodes one response line, newline included.
pub fn encode_server_message(message: &ServerMessage) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}
