mod shell;
mod ssh;

pub use shell::Shell;
pub use ssh::{DeviceHandler, SshShell};

use crate::error::{Result, TerminalError};
use crate::model::ConnectionParams;
use crate::transport;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

/// A logged-in terminal on the device.
///
/// The session owns the shell, which owns the SSH connection and its socket;
/// dropping the session releases all of them. `close` does the same but also
/// tells the device goodbye.
pub struct Session<S: Shell = SshShell> {
    shell: S,
    timeout: Option<Duration>,
    eof: bool,
}

impl Session<SshShell> {
    #[instrument(skip(params), fields(addr = %params.target(), login = %params.login()))]
    pub async fn open(params: &ConnectionParams) -> Result<Self> {
        let stream = transport::open_stream(params).await?;
        let establish = SshShell::establish(stream, params);
        let shell = match params.operation_timeout() {
            Some(limit) => timeout(limit, establish)
                .await
                .map_err(|_| TerminalError::Timeout(limit))??,
            None => establish.await?,
        };
        info!(proxied = params.proxy().is_some(), "terminal session ready");
        Ok(Self::with_shell(shell, params.operation_timeout()))
    }
}

impl<S: Shell> Session<S> {
    /// Wraps an already established shell. `None` means reads never time out.
    pub fn with_shell(shell: S, timeout: Option<Duration>) -> Self {
        Self {
            shell,
            timeout,
            eof: false,
        }
    }

    /// Writes `command` as-is; add the line ending yourself.
    pub async fn send(&mut self, command: impl AsRef<[u8]>) -> Result<&mut Self> {
        let bytes = command.as_ref();
        debug!(len = bytes.len(), "sending");
        self.shell.write(bytes).await?;
        Ok(self)
    }

    /// Everything the device printed since the last read, decoded lossily.
    pub async fn read(&mut self) -> Result<String> {
        let bytes = self.read_bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Waits for the first chunk of output, up to the timeout if one is set,
    /// then takes every chunk that is already there without waiting further.
    /// Returns empty once the remote side has closed.
    pub async fn read_bytes(&mut self) -> Result<Vec<u8>> {
        if self.eof {
            return Ok(Vec::new());
        }
        let first = match self.timeout {
            Some(limit) => timeout(limit, self.shell.next_chunk())
                .await
                .map_err(|_| TerminalError::Timeout(limit))??,
            None => self.shell.next_chunk().await?,
        };
        let Some(mut output) = first else {
            self.eof = true;
            return Ok(Vec::new());
        };
        while let Some(chunk) = self.shell.try_next_chunk()? {
            output.extend_from_slice(&chunk);
        }
        debug!(len = output.len(), "read");
        Ok(output)
    }

    pub fn is_closed(&self) -> bool {
        self.eof
    }

    pub async fn close(mut self) -> Result<()> {
        self.shell.close().await?;
        info!("terminal session closed");
        Ok(())
    }
}
