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

//! The remote-command session a transfer runs over.
//!
//! The session itself is owned by the caller; a transfer consumes it,
//! starts the remote scp command on it, and takes exclusive ownership of
//! its stream handles until the transfer returns. Running two transfers
//! over one session is not supported.

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;

pub mod russh_session;

pub use russh_session::RusshSession;

/// A started remote command, split into the handles one transfer needs.
pub struct CommandChannel {
    /// Write handle to the remote command's standard input.
    pub stdin: Box<dyn AsyncWrite + Send + Unpin>,
    /// Read handle to the remote command's standard output.
    pub stdout: Box<dyn AsyncRead + Send + Unpin>,
    /// Resolves once the remote command exits: `Ok(())` for status zero,
    /// an error for a non-zero status or a channel that closed without
    /// reporting one.
    pub exit: BoxFuture<'static, Result<()>>,
}

/// An opened, authenticated remote-command-execution channel.
#[async_trait]
pub trait RemoteSession: Send {
    /// Execute `command` on the remote side and split the running command
    /// into its transfer-facing handles.
    async fn start(self, command: &str) -> Result<CommandChannel>;
}
