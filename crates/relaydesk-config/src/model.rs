// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Relaydesk handoff engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Relaydesk configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelaydeskConfig {
    /// Coordinator behavior settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Canned reply texts sent by the coordinator.
    #[serde(default)]
    pub replies: ReplyConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Transcript lookup settings.
    #[serde(default)]
    pub transcripts: TranscriptConfig,
}

/// Coordinator behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// The agent message that ends an active support case.
    #[serde(default = "default_end_keyword")]
    pub end_keyword: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            end_keyword: default_end_keyword(),
            log_level: default_log_level(),
        }
    }
}

fn default_end_keyword() -> String {
    "end".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Reply texts the coordinator renders into the sender's own session or
/// delivers proactively into the counterpart's session.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyConfig {
    /// To the user when their request is first enqueued.
    #[serde(default = "default_waiting")]
    pub waiting: String,

    /// To the user when they message while the request is still pending.
    #[serde(default = "default_still_waiting")]
    pub still_waiting: String,

    /// To the user when they message a case the agent already closed.
    #[serde(default = "default_feedback_thanks")]
    pub feedback_thanks: String,

    /// Delivered proactively to the user when the agent closes the case.
    #[serde(default = "default_feedback_prompt")]
    pub feedback_prompt: String,

    /// Delivered proactively to the user when an agent claims their case.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// To the agent after they close a case.
    #[serde(default = "default_case_closed")]
    pub case_closed: String,

    /// To the agent when they claim with an empty queue.
    #[serde(default = "default_no_work")]
    pub no_work: String,

    /// To the user when their session starts.
    #[serde(default = "default_welcome")]
    pub welcome: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            waiting: default_waiting(),
            still_waiting: default_still_waiting(),
            feedback_thanks: default_feedback_thanks(),
            feedback_prompt: default_feedback_prompt(),
            greeting: default_greeting(),
            case_closed: default_case_closed(),
            no_work: default_no_work(),
            welcome: default_welcome(),
        }
    }
}

fn default_waiting() -> String {
    "Waiting for an available agent, please wait".to_string()
}

fn default_still_waiting() -> String {
    "We are doing what we can to get you an agent".to_string()
}

fn default_feedback_thanks() -> String {
    "Thank you for your feedback".to_string()
}

fn default_feedback_prompt() -> String {
    "Your case is closed now, please let us know how satisfied you were from 1 to 10".to_string()
}

fn default_greeting() -> String {
    "Hello, I am an agent and I am going to help you".to_string()
}

fn default_case_closed() -> String {
    "Support case successfully closed, you can now close the window".to_string()
}

fn default_no_work() -> String {
    "No work for you at this point".to_string()
}

fn default_welcome() -> String {
    "Welcome to the support desk!".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "relaydesk.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Transcript lookup configuration.
///
/// Some channels store conversation history under an escaped form of the
/// conversation id. The encoding table is a pure function of `channel_id`;
/// channels without an entry pass their id through unchanged.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriptConfig {
    /// Per-channel conversation-id substitutions applied before lookup.
    #[serde(default = "default_encodings")]
    pub encodings: Vec<ChannelEncoding>,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            encodings: default_encodings(),
        }
    }
}

/// One channel's conversation-id substitution rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelEncoding {
    /// Channel the rule applies to.
    pub channel_id: String,
    /// Substring to replace.
    pub from: String,
    /// Replacement text.
    pub to: String,
}

fn default_encodings() -> Vec<ChannelEncoding> {
    vec![
        ChannelEncoding {
            channel_id: "emulator".to_string(),
            from: "|".to_string(),
            to: "%7C".to_string(),
        },
        ChannelEncoding {
            channel_id: "teams".to_string(),
            from: ":".to_string(),
            to: "%3A".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_encoding_table_covers_known_channels() {
        let config = TranscriptConfig::default();
        assert_eq!(config.encodings.len(), 2);
        assert!(config.encodings.iter().any(|e| e.channel_id == "emulator"));
        assert!(config.encodings.iter().any(|e| e.channel_id == "teams"));
    }

    #[test]
    fn default_end_keyword_is_end() {
        let config = EngineConfig::default();
        assert_eq!(config.end_keyword, "end");
    }

    #[test]
    fn encodings_array_deserializes_from_toml() {
        let toml_str = r#"
[[transcripts.encodings]]
channel_id = "emulator"
from = "|"
to = "%7C"
"#;
        let config: RelaydeskConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.transcripts.encodings.len(), 1);
        assert_eq!(config.transcripts.encodings[0].channel_id, "emulator");
        // Untouched sections keep their compiled defaults.
        assert_eq!(config.engine.end_keyword, "end");
    }

    #[test]
    fn sections_deny_unknown_fields() {
        let toml_str = r#"
[engine]
end_keyword = "end"
unknown_field = "bad"
"#;
        let result = toml::from_str::<RelaydeskConfig>(toml_str);
        assert!(result.is_err());
    }
}
