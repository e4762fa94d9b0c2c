// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for SCP transfers.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running an SCP transfer.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote peer rejected a protocol step. The message is the peer's
    /// text verbatim; operators diagnose failed transfers from it.
    #[error("{0}")]
    Remote(String),

    /// Stream read/write failure on the session.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// SSH channel failure from the russh-backed session.
    #[error("ssh channel error: {0}")]
    Ssh(#[from] russh::Error),

    /// Header line did not start with `C`.
    #[error("line '{line}' is not a file header")]
    NotAFileHeader { line: String },

    /// Mode field of a header line is not an octal integer.
    #[error("invalid mode '{value}' in header '{line}'")]
    InvalidMode { line: String, value: String },

    /// Size field of a header line is not a non-negative decimal integer.
    #[error("invalid size '{value}' in header '{line}'")]
    InvalidSize { line: String, value: String },

    /// Header line carries no file name token.
    #[error("missing file name in header '{line}'")]
    MissingFileName { line: String },

    /// File names on the wire are base names only.
    #[error("file name '{name}' must not contain a path separator")]
    FileNameHasPath { name: String },

    /// Timestamp line did not start with `T`.
    #[error("line '{line}' is not a timestamp line")]
    NotATimestamp { line: String },

    /// A field of a timestamp line is not a decimal integer.
    #[error("invalid timestamp field '{value}' in line '{line}'")]
    InvalidTimestamp { line: String, value: String },

    /// Remote path is empty or cannot be quoted for the remote shell.
    #[error("invalid remote path: {reason}")]
    InvalidRemotePath { reason: String },

    /// The caller's cancellation signal fired before the transfer finished.
    #[error("transfer cancelled")]
    Cancelled,

    /// The configured per-transfer timeout elapsed.
    #[error("transfer timed out after {0:?}")]
    Timeout(Duration),

    /// The remote command exited with a non-zero status.
    #[error("remote process exited with status {0}")]
    RemoteExit(u32),

    /// The channel closed without the remote reporting an exit status.
    #[error("remote process closed the channel without an exit status")]
    NoExitStatus,

    /// A byte copy ended before the declared number of bytes moved.
    #[error("transfer ended after {copied} of {expected} bytes")]
    ShortTransfer { copied: u64, expected: u64 },
}

/// Result type for SCP transfer operations.
pub type Result<T> = std::result::Result<T, Error>;
