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

//! The download state machines, plain and preserve-mode.
//!
//! The client acks first; the remote `scp -f` then announces the file
//! with a `C` header (preceded by a `T` timestamp line under `-p`), the
//! client acks each line, streams exactly the announced number of bytes
//! into the sink, and acks once more.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::progress::{ProgressFn, ProgressWriter};
use crate::protocol::{write_ack, FileInfo, FileTimes, Response, ResponseKind};

use super::copy_exact;

pub(crate) async fn fetch_file<W>(
    mut stdin: Box<dyn AsyncWrite + Send + Unpin>,
    mut stdout: Box<dyn AsyncRead + Send + Unpin>,
    mut sink: W,
    preserve_times: bool,
    progress: Option<ProgressFn>,
) -> Result<(FileInfo, W)>
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    write_ack(&mut stdin).await?;

    let mut times = None;
    if preserve_times {
        let response = read_preserve_line(&mut stdout).await?;
        times = Some(FileTimes::parse(&response.raw_line())?);
        write_ack(&mut stdin).await?;
    }

    let mut info = if preserve_times {
        let response = read_preserve_line(&mut stdout).await?;
        FileInfo::parse(&response.raw_line())?
    } else {
        let response = Response::read(&mut stdout).await?;
        if response.is_failure() {
            return Err(Error::Remote(response.into_message()));
        }
        FileInfo::parse(&response.raw_line())?
    };
    if let Some(times) = times {
        info.apply_times(times);
    }

    write_ack(&mut stdin).await?;

    match progress {
        Some(callback) => {
            let mut writer = ProgressWriter::new(sink, info.size, callback);
            copy_exact(&mut stdout, &mut writer, info.size).await?;
            writer.flush().await?;
            sink = writer.into_inner();
        }
        None => {
            copy_exact(&mut stdout, &mut sink, info.size).await?;
            sink.flush().await?;
        }
    }

    write_ack(&mut stdin).await?;
    tracing::debug!("downloaded {} bytes of {}", info.size, info.name);
    Ok((info, sink))
}

/// Read one metadata line of the preserve phase.
///
/// Some peers frame these lines without a standard status byte, so only a
/// standard-framed failure aborts here. The waiver covers the preserve
/// phase only; the plain download path validates responses strictly.
async fn read_preserve_line(
    stdout: &mut Box<dyn AsyncRead + Send + Unpin>,
) -> Result<Response> {
    let response = Response::read(stdout).await?;
    if response.is_fatal() {
        return Err(Error::Remote(response.into_message()));
    }
    if response.kind() == ResponseKind::Warning {
        tracing::warn!("peer warning during preserve phase: {}", response.message());
    }
    Ok(response)
}
