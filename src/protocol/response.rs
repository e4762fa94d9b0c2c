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

//! SCP control responses and acknowledgments.
//!
//! Every protocol step of an SCP exchange is confirmed by a one-byte
//! status, optionally followed by a message line:
//! - `0x00` success, no message
//! - `0x01` warning, message up to newline
//! - `0x02` failure, message up to newline
//!
//! Lines with any other leading byte (the `C` header and `T` timestamp
//! lines among them) are surfaced as [`ResponseKind::Unrecognized`] so the
//! caller can decide whether to parse or reject them.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;

/// Classification of a control line received from the remote peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// `0x00` acknowledgment.
    Ok,
    /// `0x01` warning.
    Warning,
    /// `0x02` fatal protocol failure.
    Failure,
    /// Any other leading byte; not a standard status line.
    Unrecognized(u8),
}

/// One decoded control message from the remote peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    kind: ResponseKind,
    message: String,
}

impl Response {
    /// Read exactly one control message from the stream.
    ///
    /// A success status is a single byte; every other status byte is
    /// followed by a message terminated by a newline. Reads are byte-wise
    /// so no payload data past the newline is consumed.
    pub async fn read<R>(reader: &mut R) -> Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let status = reader.read_u8().await?;
        if status == 0 {
            return Ok(Self {
                kind: ResponseKind::Ok,
                message: String::new(),
            });
        }

        let mut line = Vec::new();
        loop {
            let byte = reader.read_u8().await?;
            if byte == b'\n' {
                break;
            }
            line.push(byte);
        }

        let kind = match status {
            1 => ResponseKind::Warning,
            2 => ResponseKind::Failure,
            other => ResponseKind::Unrecognized(other),
        };
        Ok(Self {
            kind,
            message: String::from_utf8_lossy(&line).into_owned(),
        })
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    /// The message text following the status byte, without the newline.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }

    /// True for a warning or failure status. The status byte alone decides
    /// this; an empty message is still fatal.
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, ResponseKind::Warning | ResponseKind::Failure)
    }

    /// True for a standard-framed `0x02` failure.
    pub fn is_fatal(&self) -> bool {
        self.kind == ResponseKind::Failure
    }

    /// Reconstruct the full line as sent by the peer. For unrecognized
    /// responses this restores the leading byte, which is part of the
    /// header/timestamp grammar.
    pub fn raw_line(&self) -> String {
        match self.kind {
            ResponseKind::Unrecognized(byte) => {
                let mut line = String::with_capacity(self.message.len() + 1);
                line.push(byte as char);
                line.push_str(&self.message);
                line
            }
            _ => self.message.clone(),
        }
    }
}

/// Write a single `0x00` acknowledgment byte.
pub async fn write_ack<W>(writer: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&[0]).await?;
    writer.flush().await?;
    Ok(())
}
