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

//! The upload state machine.
//!
//! Header, ack, payload, terminator, ack. The remote side runs
//! `scp -qt <path>` and confirms each step; a failure response at either
//! checkpoint aborts the transfer with the peer's message.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::progress::{ProgressFn, ProgressReader};
use crate::protocol::FileInfo;

use super::{check_response, copy_exact};

pub(crate) async fn send_file(
    mut stdin: Box<dyn AsyncWrite + Send + Unpin>,
    mut stdout: Box<dyn AsyncRead + Send + Unpin>,
    source: Box<dyn AsyncRead + Send + Unpin>,
    header: FileInfo,
    progress: Option<ProgressFn>,
) -> Result<()> {
    stdin.write_all(header.header_line().as_bytes()).await?;
    stdin.flush().await?;
    check_response(&mut stdout).await?;

    let mut source: Box<dyn AsyncRead + Send + Unpin> = match progress {
        Some(callback) => Box::new(ProgressReader::new(source, header.size, callback)),
        None => source,
    };
    copy_exact(&mut source, &mut stdin, header.size).await?;

    stdin.write_all(&[0]).await?;
    stdin.flush().await?;
    check_response(&mut stdout).await?;

    stdin.shutdown().await?;
    tracing::debug!("uploaded {} bytes as {}", header.size, header.name);
    Ok(())
}
