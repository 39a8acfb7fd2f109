// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for upsync-report

use thiserror::Error;

/// Errors that can occur while building a prompt or generating a report
///
/// Every variant is fatal for a run: no partial report is written.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Error serializing or parsing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] minreq::Error),

    /// The service answered with a non-success status
    #[error("Generation API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: i32,
        /// Error message extracted from the response body
        message: String,
    },

    /// The service answered but produced no text
    #[error("Generation API returned no text content")]
    EmptyResponse,
}
