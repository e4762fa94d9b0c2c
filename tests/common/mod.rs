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

//! A scripted in-memory peer standing in for a remote scp process.

// not every test binary uses every helper
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bscp::{CommandChannel, RemoteSession, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

/// Session whose remote side plays back a fixed byte script.
pub struct MockSession {
    script: Vec<u8>,
    exit: BoxFuture<'static, Result<()>>,
    close_stdout_after_script: bool,
    client_stdin: DuplexStream,
    client_stdout: DuplexStream,
    peer_writer: DuplexStream,
    command: Arc<Mutex<Option<String>>>,
    keepalive: Arc<Mutex<Option<DuplexStream>>>,
}

/// Test-side view of the mock peer.
pub struct MockPeer {
    command: Arc<Mutex<Option<String>>>,
    sent: DuplexStream,
    keepalive: Arc<Mutex<Option<DuplexStream>>>,
}

impl MockSession {
    /// Peer that plays `script`, keeps its output open afterwards, and
    /// reports the given process outcome.
    pub fn new(script: &[u8], exit: Result<()>) -> (Self, MockPeer) {
        Self::build(script, futures::future::ready(exit).boxed(), false)
    }

    /// Peer whose process-exit future is supplied by the test, e.g.
    /// `futures::future::pending()` for a process that never exits.
    pub fn with_exit_future(
        script: &[u8],
        exit: BoxFuture<'static, Result<()>>,
    ) -> (Self, MockPeer) {
        Self::build(script, exit, false)
    }

    /// Peer that closes its output stream once the script has played.
    pub fn closing(script: &[u8], exit: Result<()>) -> (Self, MockPeer) {
        Self::build(script, futures::future::ready(exit).boxed(), true)
    }

    fn build(
        script: &[u8],
        exit: BoxFuture<'static, Result<()>>,
        close_stdout_after_script: bool,
    ) -> (Self, MockPeer) {
        let (client_stdin, peer_stdin_view) = tokio::io::duplex(64 * 1024);
        let (peer_writer, client_stdout) = tokio::io::duplex(script.len() + 1024);
        let command = Arc::new(Mutex::new(None));
        let keepalive = Arc::new(Mutex::new(None));

        let session = Self {
            script: script.to_vec(),
            exit,
            close_stdout_after_script,
            client_stdin,
            client_stdout,
            peer_writer,
            command: Arc::clone(&command),
            keepalive: Arc::clone(&keepalive),
        };
        let peer = MockPeer {
            command,
            sent: peer_stdin_view,
            keepalive,
        };
        (session, peer)
    }
}

#[async_trait]
impl RemoteSession for MockSession {
    async fn start(mut self, command: &str) -> Result<CommandChannel> {
        *self.command.lock().unwrap() = Some(command.to_string());
        self.peer_writer
            .write_all(&self.script)
            .await
            .map_err(bscp::Error::Io)?;
        if !self.close_stdout_after_script {
            *self.keepalive.lock().unwrap() = Some(self.peer_writer);
        }
        Ok(CommandChannel {
            stdin: Box::new(self.client_stdin),
            stdout: Box::new(self.client_stdout),
            exit: self.exit,
        })
    }
}

impl MockPeer {
    /// The remote command line the client started.
    pub fn command(&self) -> Option<String> {
        self.command.lock().unwrap().clone()
    }

    /// Everything the client wrote to the remote command's stdin.
    /// Blocks until the client side has been dropped.
    pub async fn sent_bytes(mut self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.sent.read_to_end(&mut bytes).await.unwrap();
        bytes
    }
}

/// Progress recorder usable as a `ProgressFn`.
pub fn progress_recorder() -> (Arc<Mutex<Vec<f64>>>, bscp::ProgressFn) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: bscp::ProgressFn = Box::new(move |fraction| sink.lock().unwrap().push(fraction));
    (seen, callback)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
