use std::io;
use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = TerminalError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connect,
    Protocol,
    Auth,
    Timeout,
    Ssh,
    Closed,
    Io,
}

#[derive(Debug, Error)]
pub enum TerminalError {
    /// The proxy or the target could not be reached, including connect timeouts.
    #[error("cannot connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The SOCKS5 exchange went wrong. `reply` holds whatever the proxy sent back.
    #[error("SOCKS5 handshake failed: {reason}")]
    Protocol {
        reason: String,
        reply: Option<Vec<u8>>,
    },

    #[error("Login failed!")]
    Auth { login: String },

    #[error("no output within {0:?}")]
    Timeout(Duration),

    #[error("ssh: {0}")]
    Ssh(#[from] russh::Error),

    #[error("shell channel closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TerminalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TerminalError::Connect { .. } => ErrorKind::Connect,
            TerminalError::Protocol { .. } => ErrorKind::Protocol,
            TerminalError::Auth { .. } => ErrorKind::Auth,
            TerminalError::Timeout(_) => ErrorKind::Timeout,
            TerminalError::Ssh(_) => ErrorKind::Ssh,
            TerminalError::Closed => ErrorKind::Closed,
            TerminalError::Io(_) => ErrorKind::Io,
        }
    }

    /// Raw proxy reply attached to a protocol failure, for diagnostics.
    pub fn reply(&self) -> Option<&[u8]> {
        match self {
            TerminalError::Protocol { reply, .. } => reply.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn protocol(reason: impl Into<String>) -> Self {
        TerminalError::Protocol {
            reason: reason.into(),
            reply: None,
        }
    }

    pub(crate) fn rejected(reason: impl Into<String>, reply: Vec<u8>) -> Self {
        TerminalError::Protocol {
            reason: reason.into(),
            reply: Some(reply),
        }
    }

    pub(crate) fn connect(addr: impl Into<String>, source: io::Error) -> Self {
        TerminalError::Connect {
            addr: addr.into(),
            source,
        }
    }

    pub(crate) fn connect_timeout(addr: impl Into<String>, limit: Duration) -> Self {
        Self::connect(
            addr,
            io::Error::new(io::ErrorKind::TimedOut, format!("timed out after {limit:?}")),
        )
    }
}
