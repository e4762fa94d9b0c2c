pub mod client;
pub mod config;
pub mod error;
pub mod progress;
pub mod protocol;
pub mod session;
pub mod utils;

pub use client::ScpClient;
pub use config::ScpConfig;
pub use error::{Error, Result};
pub use progress::{ProgressFn, ProgressReader, ProgressWriter};
pub use protocol::{FileInfo, FileTimes, Response, ResponseKind};
pub use session::{CommandChannel, RemoteSession, RusshSession};
