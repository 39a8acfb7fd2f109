// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Terminal rendering of sync progress
//!
//! Stages with a known size get a bar, the rest a spinner. Everything is
//! drawn on stderr so stdout only carries the report preview.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::sync::{ProgressCallback, ProgressEvent, Stage};

const TICK_STRINGS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"];

/// Renders [`ProgressEvent`]s with `indicatif`
pub struct ConsoleProgress {
    current: Mutex<Option<ProgressBar>>,
    warnings: AtomicUsize,
    hidden: bool,
}

impl ConsoleProgress {
    /// Render progress on stderr
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            warnings: AtomicUsize::new(0),
            hidden: false,
        }
    }

    /// Track events without drawing anything
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Self::new()
        }
    }

    /// Number of warning events seen so far
    #[must_use]
    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    /// Box this renderer as a progress callback
    #[must_use]
    pub fn into_callback(self) -> ProgressCallback {
        Box::new(move |event| self.handle(event))
    }

    /// Update the display for one event
    pub fn handle(&self, event: &ProgressEvent) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };

        match event {
            ProgressEvent::Started { stage, total } => {
                if let Some(previous) = current.take() {
                    previous.finish_and_clear();
                }
                let bar = self.start_bar(*stage, *total);
                *current = Some(bar);
            }
            ProgressEvent::Progress { processed, .. } => {
                if let Some(ref bar) = *current {
                    bar.set_position(*processed as u64);
                }
            }
            ProgressEvent::Warning { .. } => {
                // Already logged through tracing
                self.warnings.fetch_add(1, Ordering::Relaxed);
            }
            ProgressEvent::Completed { stage, count } => {
                if let Some(bar) = current.take() {
                    bar.finish_and_clear();
                }
                if !self.hidden {
                    eprintln!("\x1b[1;32m✓ {}\x1b[0m", completion_line(*stage, *count));
                }
            }
        }
    }

    fn start_bar(&self, stage: Stage, total: Option<usize>) -> ProgressBar {
        let bar = match total {
            Some(len) => {
                let bar = ProgressBar::new(len as u64);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("=> "),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner())
                        .tick_strings(TICK_STRINGS),
                );
                bar
            }
        };

        if self.hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        bar.set_message(stage.label());
        bar
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Line printed when a stage finishes
#[must_use]
pub fn completion_line(stage: Stage, count: usize) -> String {
    match stage {
        Stage::Fetch => "Fetched upstream".to_string(),
        Stage::Downstream => format!("Read {count} fork commits"),
        Stage::Upstream => format!("Read {count} upstream commits to review"),
        Stage::Generate => format!("Generated report ({count} bytes)"),
    }
}
