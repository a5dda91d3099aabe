// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Signal Handling
//!
//! Graceful-shutdown signal handling. `sluice` is a long-running batch
//! process over potentially unbounded input, so it needs to notice
//! SIGTERM/SIGINT/SIGHUP and drain in-flight pipe state rather than die
//! mid-write.
//!
//! Use [`create_signal_handler`] to get the right implementation for the
//! current platform, or [`NoOpSignalHandler`] in tests that shouldn't
//! install real signal handlers.

use async_trait::async_trait;

/// Callback invoked when a shutdown-triggering signal arrives.
pub type ShutdownCallback = Box<dyn Fn() + Send + Sync>;

/// A source of OS shutdown signals.
#[async_trait]
pub trait SystemSignals: Send + Sync {
    /// Waits until a shutdown-triggering signal is received.
    async fn wait_for_signal(&self) -> SignalKind;
}

/// Which signal triggered shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Terminate,
    Interrupt,
    Hangup,
}

#[cfg(unix)]
pub struct UnixSignalHandler;

#[cfg(unix)]
impl UnixSignalHandler {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl Default for UnixSignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
#[async_trait]
impl SystemSignals for UnixSignalHandler {
    async fn wait_for_signal(&self) -> SignalKind {
        use tokio::signal::unix::{signal, SignalKind as UnixSignalKind};

        let mut sigterm =
            signal(UnixSignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint =
            signal(UnixSignalKind::interrupt()).expect("failed to install SIGINT handler");
        let mut sighup =
            signal(UnixSignalKind::hangup()).expect("failed to install SIGHUP handler");

        tokio::select! {
            _ = sigterm.recv() => SignalKind::Terminate,
            _ = sigint.recv() => SignalKind::Interrupt,
            _ = sighup.recv() => SignalKind::Hangup,
        }
    }
}

#[cfg(windows)]
pub struct WindowsSignalHandler;

#[cfg(windows)]
impl WindowsSignalHandler {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl Default for WindowsSignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(windows)]
#[async_trait]
impl SystemSignals for WindowsSignalHandler {
    async fn wait_for_signal(&self) -> SignalKind {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        SignalKind::Interrupt
    }
}

/// A signal handler that never completes, for tests that exercise code
/// paths which select! against a signal future but shouldn't actually
/// install one.
pub struct NoOpSignalHandler;

#[async_trait]
impl SystemSignals for NoOpSignalHandler {
    async fn wait_for_signal(&self) -> SignalKind {
        std::future::pending().await
    }
}

/// Creates the appropriate signal handler for the current platform.
#[cfg(unix)]
pub fn create_signal_handler() -> Box<dyn SystemSignals> {
    Box::new(UnixSignalHandler::new())
}

/// Creates the appropriate signal handler for the current platform.
#[cfg(windows)]
pub fn create_signal_handler() -> Box<dyn SystemSignals> {
    Box::new(WindowsSignalHandler::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn no_op_handler_never_resolves() {
        let handler = NoOpSignalHandler;
        let result = tokio::time::timeout(Duration::from_millis(50), handler.wait_for_signal()).await;
        assert!(result.is_err(), "NoOpSignalHandler should never resolve");
    }

    #[test]
    fn signal_kinds_are_distinct() {
        assert_ne!(SignalKind::Terminate, SignalKind::Interrupt);
        assert_ne!(SignalKind::Interrupt, SignalKind::Hangup);
    }
}
