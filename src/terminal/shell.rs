use crate::error::Result;
use async_trait::async_trait;
use futures::FutureExt;

/// An interactive remote shell: raw bytes in, raw output chunks out.
#[async_trait]
pub trait Shell: Send {
    async fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Waits for the next chunk of output. `None` once the remote side has closed.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;

    /// Returns a chunk only if one is ready right now.
    fn try_next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        self.next_chunk().now_or_never().unwrap_or(Ok(None))
    }

    async fn close(&mut self) -> Result<()>;
}
