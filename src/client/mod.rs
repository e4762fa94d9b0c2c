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

//! SCP transfer entry points.
//!
//! [`ScpClient`] drives single-file uploads and downloads over a
//! [`RemoteSession`]. Every call consumes one session, runs the protocol
//! and the remote-process waiter as two supervised tasks, and is bounded
//! by the caller's cancellation token plus the configured timeout.

mod download;
mod supervisor;
mod upload;

use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio_util::sync::CancellationToken;

use crate::config::ScpConfig;
use crate::error::{Error, Result};
use crate::progress::ProgressFn;
use crate::protocol::{FileInfo, Response};
use crate::session::RemoteSession;
use crate::utils::{quote_remote_path, remote_file_name};

use supervisor::supervise;

/// Client for single-file SCP transfers.
///
/// The client itself is cheap and reusable; each transfer call consumes
/// its own session. Remote paths are shell-quoted before interpolation
/// into the remote command line, but quoting is a trust boundary: callers
/// passing untrusted paths should restrict the characters they accept.
#[derive(Debug, Clone, Default)]
pub struct ScpClient {
    config: ScpConfig,
}

impl ScpClient {
    pub fn new() -> Self {
        Self::with_config(ScpConfig::default())
    }

    pub fn with_config(config: ScpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScpConfig {
        &self.config
    }

    /// Upload `size` bytes from `source` to `remote_path`.
    ///
    /// `mode` carries the permission bits for the created remote file.
    /// A source that ends before `size` bytes is an error. The optional
    /// `progress` callback receives the fraction uploaded so far.
    pub async fn upload<S, R>(
        &self,
        cancel: &CancellationToken,
        session: S,
        source: R,
        remote_path: &str,
        mode: u32,
        size: u64,
        progress: Option<ProgressFn>,
    ) -> Result<()>
    where
        S: RemoteSession,
        R: AsyncRead + Send + Unpin + 'static,
    {
        let name = remote_file_name(remote_path)?;
        let header = FileInfo::new(mode, size, name);
        let command = format!(
            "{} -qt {}",
            self.config.remote_binary,
            quote_remote_path(remote_path)?
        );

        let channel = session.start(&command).await?;
        let protocol = upload::send_file(
            channel.stdin,
            channel.stdout,
            Box::new(source),
            header,
            progress,
        );
        supervise(cancel, self.config.timeout, protocol, channel.exit).await
    }

    /// Upload a local file; size and permission bits come from its
    /// filesystem metadata.
    pub async fn upload_file<S>(
        &self,
        cancel: &CancellationToken,
        session: S,
        local_path: &Path,
        remote_path: &str,
        progress: Option<ProgressFn>,
    ) -> Result<()>
    where
        S: RemoteSession,
    {
        let file = tokio::fs::File::open(local_path).await?;
        let metadata = file.metadata().await?;
        #[cfg(unix)]
        let mode = std::os::unix::fs::PermissionsExt::mode(&metadata.permissions()) & 0o7777;
        #[cfg(not(unix))]
        let mode = 0o644;

        self.upload(
            cancel,
            session,
            file,
            remote_path,
            mode,
            metadata.len(),
            progress,
        )
        .await
    }

    /// Download `remote_path` into `sink`.
    ///
    /// Returns the file's metadata and hands the sink back once the
    /// payload has been flushed into it.
    pub async fn download<S, W>(
        &self,
        cancel: &CancellationToken,
        session: S,
        sink: W,
        remote_path: &str,
        progress: Option<ProgressFn>,
    ) -> Result<(FileInfo, W)>
    where
        S: RemoteSession,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.download_inner(cancel, session, sink, remote_path, false, progress)
            .await
    }

    /// Download `remote_path` with its timestamps (`scp -p`).
    ///
    /// The returned metadata carries the remote file's modification and
    /// access times, merged from the timestamp line the peer sends ahead
    /// of the header.
    pub async fn download_with_times<S, W>(
        &self,
        cancel: &CancellationToken,
        session: S,
        sink: W,
        remote_path: &str,
        progress: Option<ProgressFn>,
    ) -> Result<(FileInfo, W)>
    where
        S: RemoteSession,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.download_inner(cancel, session, sink, remote_path, true, progress)
            .await
    }

    /// Download `remote_path` into a local file.
    pub async fn download_file<S>(
        &self,
        cancel: &CancellationToken,
        session: S,
        remote_path: &str,
        local_path: &Path,
        progress: Option<ProgressFn>,
    ) -> Result<FileInfo>
    where
        S: RemoteSession,
    {
        let file = tokio::fs::File::create(local_path).await?;
        let (info, file) = self
            .download(cancel, session, file, remote_path, progress)
            .await?;
        file.sync_all().await?;
        Ok(info)
    }

    async fn download_inner<S, W>(
        &self,
        cancel: &CancellationToken,
        session: S,
        sink: W,
        remote_path: &str,
        preserve_times: bool,
        progress: Option<ProgressFn>,
    ) -> Result<(FileInfo, W)>
    where
        S: RemoteSession,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let flags = if preserve_times { "-f -p" } else { "-f" };
        let command = format!(
            "{} {} {}",
            self.config.remote_binary,
            flags,
            quote_remote_path(remote_path)?
        );

        let channel = session.start(&command).await?;
        let protocol = download::fetch_file(
            channel.stdin,
            channel.stdout,
            sink,
            preserve_times,
            progress,
        );
        supervise(cancel, self.config.timeout, protocol, channel.exit).await
    }
}

/// Read one response and fail with the peer's message on a warning or
/// failure status.
pub(crate) async fn check_response<R>(reader: &mut R) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let response = Response::read(reader).await?;
    if response.is_failure() {
        return Err(Error::Remote(response.into_message()));
    }
    Ok(())
}

/// Copy exactly `expected` bytes; a stream that ends early is an error.
pub(crate) async fn copy_exact<R, W>(reader: R, writer: &mut W, expected: u64) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut limited = reader.take(expected);
    let copied = tokio::io::copy(&mut limited, writer).await?;
    if copied != expected {
        return Err(Error::ShortTransfer { copied, expected });
    }
    Ok(copied)
}
