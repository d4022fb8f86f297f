//! Shareable match codes encoding the settings needed to replay a setup.
//!
//! A match code is a single line of the form `witch:v1:<payload>` where the
//! payload is the URL-safe-free standard base64 (without padding) of the JSON
//! serialized [`MatchSettings`]. Codes are versioned so a future format bump
//! can keep rejecting old payloads with a precise error.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};
use witch_battle_core::WitchId;

const PREFIX: &str = "witch";
const VERSION: &str = "v1";

/// Everything required to reconstruct a match deterministically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Seed driving the enemy spawn sequence.
    pub seed: u64,
    /// Witch defending the player base.
    pub player_witch: WitchId,
    /// Witch defending the enemy base.
    pub enemy_witch: WitchId,
}

impl MatchSettings {
    /// Serializes the settings into a shareable match code.
    #[must_use]
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        format!("{PREFIX}:{VERSION}:{}", STANDARD_NO_PAD.encode(json))
    }

    /// Parses a match code produced by [`MatchSettings::encode`].
    pub fn decode(code: &str) -> Result<Self, MatchCodeError> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(MatchCodeError::Empty);
        }

        let mut segments = trimmed.splitn(3, ':');
        let prefix = segments.next().unwrap_or_default();
        if prefix != PREFIX {
            return Err(MatchCodeError::InvalidPrefix(prefix.to_owned()));
        }
        let version = segments.next().ok_or(MatchCodeError::MissingVersion)?;
        if version != VERSION {
            return Err(MatchCodeError::UnsupportedVersion(version.to_owned()));
        }
        let payload = segments.next().ok_or(MatchCodeError::MissingPayload)?;

        let bytes = STANDARD_NO_PAD
            .decode(payload)
            .map_err(MatchCodeError::InvalidEncoding)?;
        serde_json::from_slice(&bytes).map_err(MatchCodeError::InvalidPayload)
    }
}

/// Errors produced when parsing a match code.
#[derive(Debug)]
pub enum MatchCodeError {
    /// The provided code was empty or whitespace.
    Empty,
    /// The code did not start with the expected `witch` prefix.
    InvalidPrefix(String),
    /// The code stopped after the prefix.
    MissingVersion,
    /// The version segment named a format this build cannot read.
    UnsupportedVersion(String),
    /// The code stopped after the version segment.
    MissingPayload,
    /// The payload was not valid base64.
    InvalidEncoding(base64::DecodeError),
    /// The payload decoded but did not contain valid settings JSON.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for MatchCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "match code is empty"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "match code must start with '{PREFIX}', found '{prefix}'")
            }
            Self::MissingVersion => write!(f, "match code is missing its version segment"),
            Self::UnsupportedVersion(version) => {
                write!(f, "unsupported match code version '{version}'")
            }
            Self::MissingPayload => write!(f, "match code is missing its payload segment"),
            Self::InvalidEncoding(source) => {
                write!(f, "match code payload is not valid base64: {source}")
            }
            Self::InvalidPayload(source) => {
                write!(f, "match code payload is not valid settings JSON: {source}")
            }
        }
    }
}

impl Error for MatchCodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(source) => Some(source),
            Self::InvalidPayload(source) => Some(source),
            _ => None,
        }
    }
}
