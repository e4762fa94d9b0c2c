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

//! File metadata lines of the SCP exchange.
//!
//! A transfer announces its file with a `C` header line and, in
//! preserve mode, a preceding `T` timestamp line:
//!
//! ```text
//! T<mtime> 0 <atime> 0
//! C<mode> <size> <name>
//! ```

use crate::error::{Error, Result};

/// Metadata describing one transferred file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Permission bits, octal semantics.
    pub mode: u32,
    /// Payload size in bytes.
    pub size: u64,
    /// Base name only; never contains a path separator.
    pub name: String,
    /// Modification time in epoch seconds, when the peer sent one.
    pub modified: Option<u64>,
    /// Access time in epoch seconds, when the peer sent one.
    pub accessed: Option<u64>,
}

/// Timestamps carried by a preserve-mode `T` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    /// Modification time in epoch seconds.
    pub modified: u64,
    /// Access time in epoch seconds.
    pub accessed: u64,
}

impl FileInfo {
    pub fn new(mode: u32, size: u64, name: impl Into<String>) -> Self {
        Self {
            mode,
            size,
            name: name.into(),
            modified: None,
            accessed: None,
        }
    }

    /// Parse a `C<mode> <size> <name>` header line.
    ///
    /// The name is everything after the second space, so names containing
    /// spaces survive.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches('\n');
        let rest = line.strip_prefix('C').ok_or_else(|| Error::NotAFileHeader {
            line: line.to_string(),
        })?;

        let mut parts = rest.splitn(3, ' ');
        let mode_field = parts.next().unwrap_or_default();
        let mode = u32::from_str_radix(mode_field, 8).map_err(|_| Error::InvalidMode {
            line: line.to_string(),
            value: mode_field.to_string(),
        })?;

        let size_field = parts.next().ok_or_else(|| Error::MissingFileName {
            line: line.to_string(),
        })?;
        let size: u64 = size_field.parse().map_err(|_| Error::InvalidSize {
            line: line.to_string(),
            value: size_field.to_string(),
        })?;

        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(Error::MissingFileName {
                line: line.to_string(),
            });
        }
        if name.contains('/') {
            return Err(Error::FileNameHasPath {
                name: name.to_string(),
            });
        }

        Ok(Self::new(mode, size, name))
    }

    /// Encode the upload header line, `C<mode> <size> <name>` plus newline.
    pub fn header_line(&self) -> String {
        format!("C{:04o} {} {}\n", self.mode, self.size, self.name)
    }

    /// Merge timestamps parsed from a preceding `T` line.
    pub fn apply_times(&mut self, times: FileTimes) {
        self.modified = Some(times.modified);
        self.accessed = Some(times.accessed);
    }
}

impl FileTimes {
    /// Parse a `T<mtime> <unused> <atime> <unused>` timestamp line.
    /// Every field must be a decimal integer.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches('\n');
        let rest = line.strip_prefix('T').ok_or_else(|| Error::NotATimestamp {
            line: line.to_string(),
        })?;

        let fields: Vec<&str> = rest.split(' ').collect();
        if fields.len() != 4 {
            return Err(Error::NotATimestamp {
                line: line.to_string(),
            });
        }

        let mut parsed = [0u64; 4];
        for (slot, field) in parsed.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| Error::InvalidTimestamp {
                line: line.to_string(),
                value: field.to_string(),
            })?;
        }

        Ok(Self {
            modified: parsed[0],
            accessed: parsed[2],
        })
    }
}
