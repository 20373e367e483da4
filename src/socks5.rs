//! One-shot SOCKS5 CONNECT: greet the proxy without authentication, ask it to
//! connect to the target, then hand the raw stream back. The proxy is not
//! involved after that; SSH is spoken over the returned stream directly.
//!
//! The target is always sent with the domain-name address type, IP literals
//! included.

use crate::error::{Result, TerminalError};
use crate::transport::connect_tcp;
use crate::util::hex::to_hex;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

const SOCKS_VERSION: u8 = 0x05;
const METHOD_NO_AUTH: u8 = 0x00;
const CMD_CONNECT: u8 = 0x01;
const RESERVED: u8 = 0x00;
const ATYP_DOMAIN: u8 = 0x03;
const REPLY_SUCCEEDED: u8 = 0x00;

const GREETING: [u8; 3] = [SOCKS_VERSION, 0x01, METHOD_NO_AUTH];

/// Connect timeout for the hop to the proxy itself.
pub const PROXY_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn connect(
    proxy_host: &str,
    proxy_port: u16,
    target_host: &str,
    target_port: u16,
    connect_timeout: Duration,
) -> Result<TcpStream> {
    let mut stream = connect_tcp(proxy_host, proxy_port, connect_timeout).await?;
    debug!(proxy = %format!("{proxy_host}:{proxy_port}"), "connected to SOCKS5 proxy");
    handshake(&mut stream, target_host, target_port).await?;
    Ok(stream)
}

/// Runs the greeting and CONNECT exchange over an already open stream.
///
/// Exactly two writes and two reads are issued. Nothing is retried: a short
/// write, a short read or an unexpected byte fails the handshake at once.
pub async fn handshake<S>(stream: &mut S, target_host: &str, target_port: u16) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = encode_connect_request(target_host, target_port)?;

    write_once(stream, &GREETING).await?;

    let mut selection = [0u8; 2];
    if let Err(err) = stream.read_exact(&mut selection).await {
        return Err(short_read(err, "proxy closed before selecting a method"));
    }
    if selection != [SOCKS_VERSION, METHOD_NO_AUTH] {
        warn!(reply = %to_hex(&selection), "proxy refused the no-auth method");
        return Err(TerminalError::rejected(
            "unsupported protocol or unsupported method",
            selection.to_vec(),
        ));
    }
    debug!("proxy accepted no-auth method");

    write_once(stream, &request).await?;

    // Sized for a reply echoing our domain address (header, length byte, host,
    // port) so nothing of it is left in front of the tunneled bytes. A proxy
    // answering with an IPv4 bound address sends less; only the status is checked.
    let mut reply = vec![0u8; connect_reply_len(target_host)];
    let n = stream.read(&mut reply).await?;
    reply.truncate(n);
    if reply.len() < 2 || reply[..2] != [SOCKS_VERSION, REPLY_SUCCEEDED] {
        warn!(reply = %to_hex(&reply), "proxy rejected CONNECT");
        return Err(TerminalError::rejected(
            "unsupported protocol or connection refused",
            reply,
        ));
    }
    debug!(host = %target_host, port = target_port, "proxy tunnel established");
    Ok(())
}

/// `05 00 00 03 <len> <host> <port BE16>` is the longest reply a CONNECT for
/// `host` gets when the proxy echoes the domain address back.
fn connect_reply_len(host: &str) -> usize {
    host.len() + 7
}

/// `05 01 00 03 <len> <host> <port BE16>`.
pub fn encode_connect_request(host: &str, port: u16) -> Result<Vec<u8>> {
    let len = u8::try_from(host.len()).map_err(|_| {
        TerminalError::protocol(format!(
            "target host is {} bytes, at most 255 fit a domain address",
            host.len()
        ))
    })?;
    let mut request = Vec::with_capacity(host.len() + 7);
    request.extend_from_slice(&[SOCKS_VERSION, CMD_CONNECT, RESERVED, ATYP_DOMAIN, len]);
    request.extend_from_slice(host.as_bytes());
    request.extend_from_slice(&port.to_be_bytes());
    Ok(request)
}

async fn write_once<S: AsyncWrite + Unpin>(stream: &mut S, bytes: &[u8]) -> Result<()> {
    let written = stream.write(bytes).await?;
    if written != bytes.len() {
        return Err(TerminalError::protocol("premature termination"));
    }
    stream.flush().await?;
    Ok(())
}

fn short_read(err: io::Error, reason: &str) -> TerminalError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        TerminalError::protocol(reason)
    } else {
        err.into()
    }
}
