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

//! Supervision of one transfer's two execution paths.
//!
//! Every transfer runs as two spawned tasks: the protocol state machine
//! and the remote-process-exit waiter. The supervisor waits for both, or
//! for the caller's cancellation signal or the configured timeout,
//! whichever comes first.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Run the protocol future and the process-exit future as independent
/// tasks and wait for both.
///
/// Errors from either task land in a bounded buffer in the order they
/// were observed; once both tasks finish, the first recorded error wins.
/// If the cancellation token or the timeout fires before then, both tasks
/// are aborted and the call returns immediately. Aborting does not
/// interrupt I/O blocked inside the session; tearing the session down is
/// the caller's responsibility.
pub(crate) async fn supervise<T, P, E>(
    cancel: &CancellationToken,
    limit: Option<Duration>,
    protocol: P,
    exit: E,
) -> Result<T>
where
    T: Send + 'static,
    P: Future<Output = Result<T>> + Send + 'static,
    E: Future<Output = Result<()>> + Send + 'static,
{
    let (err_tx, mut err_rx) = mpsc::channel::<Error>(2);

    let protocol_err = err_tx.clone();
    let mut protocol_task = tokio::spawn(async move {
        match protocol.await {
            Ok(value) => Some(value),
            Err(e) => {
                let _ = protocol_err.send(e).await;
                None
            }
        }
    });
    let mut exit_task = tokio::spawn(async move {
        if let Err(e) = exit.await {
            let _ = err_tx.send(e).await;
        }
    });

    enum Outcome<T> {
        Finished(std::result::Result<Option<T>, tokio::task::JoinError>),
        Cancelled,
        TimedOut(Duration),
    }

    let outcome = {
        let joined = async {
            let value = (&mut protocol_task).await;
            let _ = (&mut exit_task).await;
            value
        };
        let deadline = async {
            match limit {
                Some(duration) => {
                    tokio::time::sleep(duration).await;
                    duration
                }
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            value = joined => Outcome::Finished(value),
            _ = cancel.cancelled() => Outcome::Cancelled,
            duration = deadline => Outcome::TimedOut(duration),
        }
    };

    match outcome {
        Outcome::Cancelled => {
            protocol_task.abort();
            exit_task.abort();
            Err(Error::Cancelled)
        }
        Outcome::TimedOut(duration) => {
            protocol_task.abort();
            exit_task.abort();
            Err(Error::Timeout(duration))
        }
        Outcome::Finished(join_result) => {
            if let Ok(err) = err_rx.try_recv() {
                return Err(err);
            }
            match join_result {
                Ok(Some(value)) => Ok(value),
                Ok(None) => Err(Error::Io(io::Error::other(
                    "protocol task ended without a result",
                ))),
                Err(join_err) => Err(Error::Io(io::Error::other(join_err))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_both_paths_succeed() {
        let cancel = CancellationToken::new();
        let value = supervise(&cancel, None, async { Ok(42u32) }, async { Ok(()) })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_protocol_error_is_surfaced() {
        let cancel = CancellationToken::new();
        let result: Result<u32> = supervise(
            &cancel,
            None,
            async { Err(Error::Remote("denied".to_string())) },
            async { Ok(()) },
        )
        .await;
        assert!(matches!(result, Err(Error::Remote(msg)) if msg == "denied"));
    }

    #[tokio::test]
    async fn test_process_error_is_surfaced() {
        let cancel = CancellationToken::new();
        let result: Result<u32> = supervise(
            &cancel,
            None,
            async { Ok(7u32) },
            async { Err(Error::RemoteExit(1)) },
        )
        .await;
        assert!(matches!(result, Err(Error::RemoteExit(1))));
    }

    #[tokio::test]
    async fn test_cancellation_returns_without_waiting() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<u32> = supervise(
            &cancel,
            None,
            std::future::pending(),
            std::future::pending(),
        )
        .await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires() {
        let cancel = CancellationToken::new();
        let result: Result<u32> = supervise(
            &cancel,
            Some(Duration::from_secs(5)),
            std::future::pending(),
            std::future::pending(),
        )
        .await;
        assert!(matches!(result, Err(Error::Timeout(d)) if d == Duration::from_secs(5)));
    }
}
