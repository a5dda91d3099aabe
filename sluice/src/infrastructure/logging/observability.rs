// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Span/field helpers for instrumenting pipe lifecycle transitions and
//! bucket I/O. Kept separate from subscriber setup so call sites can
//! `use` these without pulling in `tracing_subscriber`.

use tracing::{debug, info, span, warn, Level, Span};

/// Opens a span for one pipe's lifetime, tagged with its type name.
pub fn pipe_span(pipe_kind: &'static str) -> Span {
    span!(Level::DEBUG, "pipe", kind = pipe_kind)
}

pub fn log_pipe_started(pipe_kind: &'static str) {
    debug!(kind = pipe_kind, "pipe started");
}

pub fn log_pipe_closed(pipe_kind: &'static str) {
    debug!(kind = pipe_kind, "pipe closed");
}

pub fn log_pipe_failed(pipe_kind: &'static str, error: &sluice_domain::PipeError) {
    warn!(kind = pipe_kind, error = %error, "pipe failed");
}

pub fn log_bucket_write(url: &str, bytes: u64) {
    info!(url, bytes, "bucket write");
}

pub fn log_bucket_retry(url: &str, attempt: u32, error: &sluice_domain::PipeError) {
    warn!(url, attempt, error = %error, "bucket write retrying");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_do_not_panic_without_a_subscriber_installed() {
        log_pipe_started("Filter");
        log_pipe_closed("Filter");
        log_pipe_failed("Filter", &sluice_domain::PipeError::internal("boom"));
        log_bucket_write("file:///tmp/x", 1024);
        log_bucket_retry("file:///tmp/x", 2, &sluice_domain::PipeError::internal("boom"));
        let _span = pipe_span("Filter");
    }
}
