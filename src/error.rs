// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NestError {
    /// Caller identity missing or unknown. Raised before any work happens.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// A stored template payload could not be decoded. Recovered per item.
    #[error("Template {template_id} has a malformed payload: {reason}")]
    MalformedPayload { template_id: i64, reason: String },

    /// The inputs admit no contribution schedule (e.g. zero periods left).
    #[error("No valid contribution plan: {0}")]
    NoValidPlan(String),

    #[error("Could not decode stored value: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, NestError>;
