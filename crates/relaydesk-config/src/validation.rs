// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty keywords and a well-formed encoding table.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::RelaydeskConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RelaydeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.engine.end_keyword.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "engine.end_keyword must not be empty".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Every reply text must be non-empty; an empty reply would render a
    // blank turn to a participant.
    for (name, text) in [
        ("waiting", &config.replies.waiting),
        ("still_waiting", &config.replies.still_waiting),
        ("feedback_thanks", &config.replies.feedback_thanks),
        ("feedback_prompt", &config.replies.feedback_prompt),
        ("greeting", &config.replies.greeting),
        ("case_closed", &config.replies.case_closed),
        ("no_work", &config.replies.no_work),
        ("welcome", &config.replies.welcome),
    ] {
        if text.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("replies.{name} must not be empty"),
            });
        }
    }

    // Encoding table: channel ids unique, substitutions non-degenerate.
    let mut seen_channels = HashSet::new();
    for (i, encoding) in config.transcripts.encodings.iter().enumerate() {
        if encoding.channel_id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("transcripts.encodings[{i}].channel_id must not be empty"),
            });
        }
        if encoding.from.is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("transcripts.encodings[{i}].from must not be empty"),
            });
        }
        if !seen_channels.insert(&encoding.channel_id) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate channel `{}` in transcripts.encodings",
                    encoding.channel_id
                ),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
