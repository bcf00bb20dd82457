//! async-std runtime implementation.

use std::future::Future;
use std::io;
use std::time::Duration;

use async_std::io::{BufReadExt, BufReader, WriteExt};
use async_std::net::TcpStream as AsyncStdTcpStream;

use super::{AsyncTcpStream, Spawner, TimedOut};

/// async-std-based buffered TCP stream.
pub struct TcpStream(BufReader<AsyncStdTcpStream>);

impl AsyncTcpStream for TcpStream {
    async fn connect(addr: &str) -> io::Result<Self> {
        let stream = AsyncStdTcpStream::connect(addr).await?;
        Ok(TcpStream(BufReader::new(stream)))
    }

    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let stream = self.0.get_mut();
        stream.write_all(buf).await?;
        stream.flush().await
    }

    async fn read_line(&mut self, line: &mut String) -> io::Result<usize> {
        self.0.read_line(line).await
    }
}

/// async-std task spawner.
pub struct AsyncStdSpawner;

impl Spawner for AsyncStdSpawner {
    type JoinHandle<T: Send + 'static> = AsyncStdJoinHandle<T>;

    fn spawn<F, T>(future: F) -> Self::JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        AsyncStdJoinHandle(async_std::task::spawn(future))
    }
}

/// Wrapper around async-std's JoinHandle.
pub struct AsyncStdJoinHandle<T>(async_std::task::JoinHandle<T>);

impl<T> Future for AsyncStdJoinHandle<T> {
    type Output = T;

    fn poll(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        std::pin::Pin::new(&mut self.0).poll(cx)
    }
}

impl<T: Send + 'static> AsyncStdJoinHandle<T> {
    /// Cancel the task.
    ///
    /// async-std's JoinHandle has no abort; dropping the handle detaches the
    /// task, which then exits on its own once it observes the stop flag.
    pub fn abort(&self) {}
}

/// Sleep for the specified duration using async-std.
pub async fn sleep_impl(duration: Duration) {
    async_std::task::sleep(duration).await
}

/// Run a future with a timeout using async-std.
pub async fn timeout_impl<F, T>(duration: Duration, future: F) -> Result<T, TimedOut>
where
    F: Future<Output = T>,
{
    async_std::future::timeout(duration, future)
        .await
        .map_err(|_| TimedOut)
}

/// Spawn a task using async-std.
pub fn spawn<F, T>(future: F) -> AsyncStdJoinHandle<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    AsyncStdSpawner::spawn(future)
}
