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

//! Byte-level progress instrumentation.
//!
//! [`ProgressReader`] and [`ProgressWriter`] decorate a transfer's payload
//! stream and report the fraction moved so far to a caller-supplied
//! callback. They are transparent: bytes are neither buffered, reordered
//! nor dropped, and errors from the underlying stream propagate unchanged
//! after already-delivered bytes have been credited.
//!
//! Each decorator is owned by the single transfer invocation that created
//! it and is dropped when that invocation returns.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Callback invoked with the fraction of the payload moved so far.
pub type ProgressFn = Box<dyn FnMut(f64) + Send + 'static>;

/// Counts bytes read through it and reports `observed / total`.
///
/// The callback is never invoked when `total` is zero.
pub struct ProgressReader<R> {
    inner: R,
    total: u64,
    observed: u64,
    callback: ProgressFn,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, total: u64, callback: ProgressFn) -> Self {
        Self {
            inner,
            total,
            observed: 0,
            callback,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> AsyncRead for ProgressReader<R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let result = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = result {
            let delivered = (buf.filled().len() - before) as u64;
            if delivered > 0 {
                this.observed += delivered;
                if this.total > 0 {
                    (this.callback)(this.observed as f64 / this.total as f64);
                }
            }
        }
        result
    }
}

/// Counts bytes written through it and reports `observed / total`.
///
/// The callback is never invoked when `total` is zero.
pub struct ProgressWriter<W> {
    inner: W,
    total: u64,
    observed: u64,
    callback: ProgressFn,
}

impl<W> ProgressWriter<W> {
    pub fn new(inner: W, total: u64, callback: ProgressFn) -> Self {
        Self {
            inner,
            total,
            observed: 0,
            callback,
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W> AsyncWrite for ProgressWriter<W>
where
    W: AsyncWrite + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let result = Pin::new(&mut this.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(written)) = result {
            if written > 0 {
                this.observed += written as u64;
                if this.total > 0 {
                    (this.callback)(this.observed as f64 / this.total as f64);
                }
            }
        }
        result
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn recorder() -> (Arc<Mutex<Vec<f64>>>, ProgressFn) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressFn = Box::new(move |fraction| sink.lock().unwrap().push(fraction));
        (seen, callback)
    }

    #[tokio::test]
    async fn test_reader_reports_monotone_fractions() {
        let payload = vec![7u8; 64];
        let (seen, callback) = recorder();
        let mut reader = ProgressReader::new(payload.as_slice(), 64, callback);

        let mut chunk = [0u8; 16];
        for _ in 0..4 {
            reader.read_exact(&mut chunk).await.unwrap();
        }

        let seen = seen.lock().unwrap();
        assert_eq!(*seen.last().unwrap(), 1.0);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_writer_reports_fractions_and_passes_bytes() {
        let (seen, callback) = recorder();
        let mut writer = ProgressWriter::new(Vec::new(), 10, callback);

        writer.write_all(b"hello").await.unwrap();
        writer.write_all(b"world").await.unwrap();

        assert_eq!(writer.into_inner(), b"helloworld");
        let seen = seen.lock().unwrap();
        assert_eq!(*seen.last().unwrap(), 1.0);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_zero_total_never_invokes_callback() {
        let (seen, callback) = recorder();
        let mut reader = ProgressReader::new(&b"data"[..], 0, callback);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"data");
        assert!(seen.lock().unwrap().is_empty());
    }
}
