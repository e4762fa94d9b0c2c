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

//! Remote-path validation and quoting.

use crate::error::{Error, Result};

// Matches the command-length cap used when sanitizing SSH commands.
const MAX_PATH_LENGTH: usize = 16384;

/// Quote a remote path for interpolation into the remote scp command line.
///
/// The path is wrapped in single quotes with embedded quotes escaped, so
/// whitespace and most metacharacters reach the remote scp binary intact.
/// The quoted path still travels through the remote user's shell: callers
/// handing untrusted input to a transfer should restrict the characters
/// they accept rather than rely on quoting alone.
pub fn quote_remote_path(path: &str) -> Result<String> {
    if path.is_empty() {
        return Err(Error::InvalidRemotePath {
            reason: "path is empty".to_string(),
        });
    }
    if path.len() > MAX_PATH_LENGTH {
        return Err(Error::InvalidRemotePath {
            reason: format!("path is {} bytes (max {})", path.len(), MAX_PATH_LENGTH),
        });
    }
    if path.contains('\0') {
        return Err(Error::InvalidRemotePath {
            reason: "path contains a null byte".to_string(),
        });
    }
    if path.contains('\n') || path.contains('\r') {
        return Err(Error::InvalidRemotePath {
            reason: "path contains a line break".to_string(),
        });
    }

    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push('\'');
    for ch in path.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    Ok(quoted)
}

/// Base name of a remote path, for the upload header line.
pub fn remote_file_name(path: &str) -> Result<&str> {
    let name = path.rsplit('/').next().unwrap_or_default();
    if name.is_empty() {
        return Err(Error::InvalidRemotePath {
            reason: format!("'{path}' has no file name component"),
        });
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain_path() {
        assert_eq!(quote_remote_path("/tmp/file.txt").unwrap(), "'/tmp/file.txt'");
    }

    #[test]
    fn test_quote_path_with_spaces_and_metacharacters() {
        assert_eq!(
            quote_remote_path("/tmp/my file; rm -rf $HOME").unwrap(),
            "'/tmp/my file; rm -rf $HOME'"
        );
    }

    #[test]
    fn test_quote_escapes_single_quotes() {
        assert_eq!(quote_remote_path("it's").unwrap(), r"'it'\''s'");
    }

    #[test]
    fn test_quote_rejects_bad_input() {
        assert!(quote_remote_path("").is_err());
        assert!(quote_remote_path("a\0b").is_err());
        assert!(quote_remote_path("a\nb").is_err());
    }

    #[test]
    fn test_remote_file_name() {
        assert_eq!(remote_file_name("/var/log/app.log").unwrap(), "app.log");
        assert_eq!(remote_file_name("app.log").unwrap(), "app.log");
        assert!(remote_file_name("/var/log/").is_err());
    }
}
