// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Codes
//!
//! Process exit codes following the BSD `sysexits.h` convention, so
//! `sluice`'s exit status is meaningful to shell scripts and other
//! process supervisors wrapping it.

use std::fmt;

/// Process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Successful termination.
    Success,
    /// Catchall for general errors.
    Error,
    /// Command line usage error.
    UsageError,
    /// Input data was incorrect in some way.
    DataError,
    /// An input file did not exist or was not readable.
    NoInput,
    /// User specified did not exist.
    NoUser,
    /// Host specified did not exist.
    NoHost,
    /// Service is unavailable.
    Unavailable,
    /// An internal software error was detected.
    Software,
    /// An operating system error was detected.
    OsError,
    /// Some system file did not exist or could not be opened.
    OsFile,
    /// A (user specified) output file cannot be created.
    CantCreate,
    /// An error occurred while doing I/O on some file.
    IoError,
    /// Temporary failure, indicating something that is not really an error.
    TempFail,
    /// The remote system returned something invalid during a protocol exchange.
    Protocol,
    /// Insufficient permission to perform the operation.
    NoPerm,
    /// Something was found in an unconfigured or misconfigured state.
    Config,
    /// Process was interrupted (SIGINT).
    Interrupted,
    /// Process was terminated (SIGTERM).
    Terminated,
}

impl ExitCode {
    pub fn as_i32(&self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Error => 1,
            ExitCode::UsageError => 64,
            ExitCode::DataError => 65,
            ExitCode::NoInput => 66,
            ExitCode::NoUser => 67,
            ExitCode::NoHost => 68,
            ExitCode::Unavailable => 69,
            ExitCode::Software => 70,
            ExitCode::OsError => 71,
            ExitCode::OsFile => 72,
            ExitCode::CantCreate => 73,
            ExitCode::IoError => 74,
            ExitCode::TempFail => 75,
            ExitCode::Protocol => 76,
            ExitCode::NoPerm => 77,
            ExitCode::Config => 78,
            ExitCode::Interrupted => 130,
            ExitCode::Terminated => 143,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExitCode::Success => "successful termination",
            ExitCode::Error => "general error",
            ExitCode::UsageError => "command line usage error",
            ExitCode::DataError => "input data was incorrect",
            ExitCode::NoInput => "input file did not exist or was not readable",
            ExitCode::NoUser => "user specified did not exist",
            ExitCode::NoHost => "host specified did not exist",
            ExitCode::Unavailable => "service is unavailable",
            ExitCode::Software => "internal software error",
            ExitCode::OsError => "operating system error",
            ExitCode::OsFile => "system file did not exist or could not be opened",
            ExitCode::CantCreate => "output file cannot be created",
            ExitCode::IoError => "I/O error",
            ExitCode::TempFail => "temporary failure",
            ExitCode::Protocol => "protocol error",
            ExitCode::NoPerm => "insufficient permission",
            ExitCode::Config => "unconfigured or misconfigured state",
            ExitCode::Interrupted => "interrupted (SIGINT)",
            ExitCode::Terminated => "terminated (SIGTERM)",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    pub fn is_signal(&self) -> bool {
        matches!(self, ExitCode::Interrupted | ExitCode::Terminated)
    }

    /// Classify an error by matching common phrases in its display string.
    ///
    /// This is a best-effort heuristic for mapping arbitrary `anyhow::Error`
    /// chains onto a sysexits code; callers that have a more specific error
    /// type should match on it directly instead of calling this.
    pub fn from_error(error: &anyhow::Error) -> Self {
        let message = error.to_string().to_lowercase();

        if message.contains("permission denied") {
            ExitCode::NoPerm
        } else if message.contains("no such file") || message.contains("not found") {
            ExitCode::NoInput
        } else if message.contains("invalid configuration") || message.contains("config") {
            ExitCode::Config
        } else if message.contains("usage") || message.contains("invalid argument") {
            ExitCode::UsageError
        } else if message.contains("invalid data")
            || message.contains("parse")
            || message.contains("malformed")
        {
            ExitCode::DataError
        } else if message.contains("i/o") || message.contains("io error") {
            ExitCode::IoError
        } else if message.contains("unavailable") || message.contains("connection") {
            ExitCode::Unavailable
        } else if message.contains("protocol") {
            ExitCode::Protocol
        } else {
            ExitCode::Software
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_i32(), self.description())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}
