//! Interactive SSH terminal for GPON OLTs and similar network devices,
//! optionally reached through a SOCKS5 proxy.
//!
//! ```no_run
//! use olt_terminal::{ConnectionParams, Session};
//!
//! # async fn demo() -> olt_terminal::Result<()> {
//! let params = ConnectionParams::new("10.0.0.1", "root", "admin")
//!     .with_proxy("192.168.1.10", 1080);
//! let mut session = Session::open(&params).await?;
//! session.send("display version\n").await?;
//! println!("{}", session.read().await?);
//! session.close().await
//! # }
//! ```

pub mod error;
pub mod model;
pub mod socks5;
pub mod terminal;
pub mod transport;
pub mod util;

pub use error::{ErrorKind, Result, TerminalError};
pub use model::{ConnectionParams, ProxySpec};
pub use terminal::{Session, Shell, SshShell};
