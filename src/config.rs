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

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for an [`ScpClient`](crate::client::ScpClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScpConfig {
    /// Path to the scp binary on the remote host.
    #[serde(default = "default_remote_binary")]
    pub remote_binary: String,

    /// Upper bound on the wall-clock duration of a single transfer call.
    /// Combined with the caller's cancellation token, whichever fires
    /// first. `None` leaves transfers bounded only by the token.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

fn default_remote_binary() -> String {
    "scp".to_string()
}

impl Default for ScpConfig {
    fn default() -> Self {
        Self {
            remote_binary: default_remote_binary(),
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScpConfig::default();
        assert_eq!(config.remote_binary, "scp");
        assert_eq!(config.timeout, None);
    }
}
