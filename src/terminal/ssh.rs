use crate::error::{Result, TerminalError};
use crate::model::ConnectionParams;
use async_trait::async_trait;
use russh::client::{self, Handle, Handler, Msg};
use russh::keys::PublicKey;
use russh::{Channel, ChannelMsg, Disconnect};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use super::Shell;

const TERM: &str = "vt100";
const COLUMNS: u32 = 80;
const ROWS: u32 = 24;

/// OLT management interfaces rarely have stable host keys, so any key is accepted.
pub struct DeviceHandler {
    addr: String,
}

impl Handler for DeviceHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        debug!(
            addr = %self.addr,
            algorithm = server_public_key.algorithm().as_str(),
            "accepting server host key"
        );
        Ok(true)
    }
}

/// A password-authenticated SSH connection with one PTY-backed shell channel.
pub struct SshShell {
    handle: Handle<DeviceHandler>,
    channel: Channel<Msg>,
    closed: bool,
}

impl SshShell {
    /// Runs SSH over `stream`, logs in and opens the shell.
    pub async fn establish<S>(stream: S, params: &ConnectionParams) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let config = Arc::new(client::Config {
            inactivity_timeout: None,
            ..Default::default()
        });
        let handler = DeviceHandler {
            addr: params.target(),
        };

        let mut handle = client::connect_stream(config, stream, handler).await?;

        let auth = handle
            .authenticate_password(params.login(), params.password())
            .await?;
        if !auth.success() {
            warn!(addr = %params.target(), login = %params.login(), "password authentication rejected");
            return Err(TerminalError::Auth {
                login: params.login().to_string(),
            });
        }
        debug!(login = %params.login(), "authenticated");

        let channel = handle.channel_open_session().await?;
        channel
            .request_pty(false, TERM, COLUMNS, ROWS, 0, 0, &[])
            .await?;
        channel.request_shell(false).await?;

        Ok(Self {
            handle,
            channel,
            closed: false,
        })
    }
}

#[async_trait]
impl Shell for SshShell {
    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(TerminalError::Closed);
        }
        self.channel.data(bytes).await?;
        Ok(())
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        while !self.closed {
            match self.channel.wait().await {
                Some(ChannelMsg::Data { data }) => return Ok(Some(data.to_vec())),
                // A PTY shell interleaves stderr with stdout anyway.
                Some(ChannelMsg::ExtendedData { data, .. }) => return Ok(Some(data.to_vec())),
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    debug!(exit_status, "remote shell exited");
                }
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                    debug!("shell channel closed by remote");
                    self.closed = true;
                }
                Some(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<()> {
        let was_open = !self.closed;
        if was_open {
            self.closed = true;
            if let Err(err) = self.channel.eof().await {
                debug!(error = %err, "failed to send EOF on shell channel");
            }
        }
        match self
            .handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            // The transport is usually gone already when the remote closed first.
            Err(err) if was_open => Err(err.into()),
            _ => Ok(()),
        }
    }
}
