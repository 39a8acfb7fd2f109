// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! upsync-report: turn unhandled upstream commits into a backport report
//!
//! The report itself is written by an external text-generation service. This
//! crate packs commit metadata into a single prompt ([`render_prompt`]) and
//! sends it through a [`ReportGenerator`]; the response is returned verbatim.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use upsync_report::{AnthropicClient, ReportGenerator, ReportRequest, render_prompt};
//!
//! let request = ReportRequest {
//!     merge_base: "1945ab9c752534e733c38ba0109dc3b741f0a6eb".to_string(),
//!     upstream: Vec::new(),
//!     downstream: Vec::new(),
//!     already_backported: 0,
//! };
//! let prompt = render_prompt(&request).expect("render prompt");
//! let client = AnthropicClient::new("sk-ant-...");
//! let report = client.generate(&prompt).expect("generate");
//! println!("{report}");
//! ```

pub mod client;
pub mod error;
pub mod prompt;

pub use client::{AnthropicClient, PromptOnly, ReportGenerator};
pub use error::ReportError;
pub use prompt::{
    MAX_DOWNSTREAM_SUMMARY, PER_COMMIT_DIFF_BYTES, ReportRequest, render_prompt,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::{AnthropicClient, PromptOnly, ReportGenerator};
    pub use crate::error::ReportError;
    pub use crate::prompt::{ReportRequest, render_prompt};
}
