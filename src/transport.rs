use crate::error::{Result, TerminalError};
use crate::model::ConnectionParams;
use crate::socks5::{self, PROXY_CONNECT_TIMEOUT};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Used for direct connections when the operation timeout is disabled.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens the byte stream the SSH session runs over: straight to the target,
/// or through the configured SOCKS5 proxy.
pub async fn open_stream(params: &ConnectionParams) -> Result<TcpStream> {
    let stream = match params.proxy() {
        Some(proxy) => {
            debug!(proxy = %proxy, addr = %params.target(), "opening stream through SOCKS5 proxy");
            socks5::connect(
                &proxy.host,
                proxy.port,
                params.host(),
                params.port(),
                PROXY_CONNECT_TIMEOUT,
            )
            .await?
        }
        None => {
            let limit = params
                .operation_timeout()
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT);
            debug!(addr = %params.target(), ?limit, "opening direct stream");
            connect_tcp(params.host(), params.port(), limit).await?
        }
    };
    stream.set_nodelay(true)?;
    Ok(stream)
}

pub(crate) async fn connect_tcp(host: &str, port: u16, limit: Duration) -> Result<TcpStream> {
    let addr = format!("{host}:{port}");
    match timeout(limit, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(err)) => Err(TerminalError::connect(addr, err)),
        Err(_) => Err(TerminalError::connect_timeout(addr, limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn direct_stream_reaches_target() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"SSH-2.0-HUAWEI-1.5\r\n").await.unwrap();
        });

        let params = ConnectionParams::new("127.0.0.1", "root", "admin").with_port(addr.port());
        let mut stream = open_stream(&params).await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"SSH-2.0-HUAWEI-1.5\r\n");
    }

    #[tokio::test]
    async fn refused_target_is_a_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let params = ConnectionParams::new("127.0.0.1", "root", "admin").with_port(port);
        let err = open_stream(&params).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connect);
    }
}
