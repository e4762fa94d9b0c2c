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

//! [`RemoteSession`] over a russh channel.
//!
//! Adapts an already-opened session channel of an authenticated russh
//! connection. Connecting and authenticating are the caller's business;
//! this module only runs one command on the channel and bridges its data
//! stream to the byte-stream handles a transfer consumes.

use futures::FutureExt;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::oneshot;

use super::{CommandChannel, RemoteSession};
use crate::error::{Error, Result};

/// Capacity of the in-memory pipes between the channel pump and the
/// transfer. 8KB matches typical SSH channel window sizes.
const PIPE_CAPACITY: usize = 8192;

/// A russh session channel ready to run one remote command.
pub struct RusshSession {
    channel: Channel<Msg>,
}

impl RusshSession {
    /// Wrap an opened session channel. The channel must not have run a
    /// command yet.
    pub fn new(channel: Channel<Msg>) -> Self {
        Self { channel }
    }
}

#[async_trait::async_trait]
impl RemoteSession for RusshSession {
    async fn start(mut self, command: &str) -> Result<CommandChannel> {
        tracing::debug!("starting remote command: {command}");
        self.channel.exec(true, command).await?;

        let (stdin_handle, stdin_pump) = tokio::io::duplex(PIPE_CAPACITY);
        let (stdout_pump, stdout_handle) = tokio::io::duplex(PIPE_CAPACITY);
        let (exit_tx, exit_rx) = oneshot::channel();

        tokio::spawn(pump_channel(self.channel, stdin_pump, stdout_pump, exit_tx));

        let exit = async move {
            match exit_rx.await {
                Ok(Some(0)) => Ok(()),
                Ok(Some(status)) => Err(Error::RemoteExit(status)),
                Ok(None) | Err(_) => Err(Error::NoExitStatus),
            }
        }
        .boxed();

        Ok(CommandChannel {
            stdin: Box::new(stdin_handle),
            stdout: Box::new(stdout_handle),
            exit,
        })
    }
}

/// Bridge channel messages to the stream handles until the channel ends.
///
/// Closing the stdin handle sends EOF on the channel; the remote scp
/// process sees its input end the way it would from a real pipe.
async fn pump_channel(
    mut channel: Channel<Msg>,
    mut stdin: DuplexStream,
    mut stdout: DuplexStream,
    exit_tx: oneshot::Sender<Option<u32>>,
) {
    let mut buf = vec![0u8; PIPE_CAPACITY];
    let mut status = None;
    let mut stdin_open = true;

    loop {
        tokio::select! {
            read = stdin.read(&mut buf), if stdin_open => match read {
                Ok(0) | Err(_) => {
                    stdin_open = false;
                    if channel.eof().await.is_err() {
                        break;
                    }
                }
                Ok(n) => {
                    if channel.data(&buf[..n]).await.is_err() {
                        break;
                    }
                }
            },
            msg = channel.wait() => match msg {
                Some(ChannelMsg::Data { ref data }) => {
                    // the transfer side may already be gone; keep draining
                    // until the exit status arrives
                    let _ = stdout.write_all(data).await;
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => status = Some(exit_status),
                Some(_) => {}
                None => break,
            },
        }
    }

    tracing::trace!("remote command ended, exit status {status:?}");
    let _ = exit_tx.send(status);
}
