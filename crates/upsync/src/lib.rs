// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! upsync library
//!
//! This module exports the pipeline behind the `upsync` binary for use in
//! integration tests and as a library.

#![warn(missing_docs)]

pub mod config;
pub mod progress;
pub mod sync;
