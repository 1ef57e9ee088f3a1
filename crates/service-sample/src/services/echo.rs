//! # Echo Server
//!
//! A TCP server that writes back every byte it receives. Its accept loop is a
//! textbook blocking entry point: it runs until its context is cancelled.

use service_framework::{BlockingService, ServiceConfig};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// A bound TCP echo server.
#[derive(Clone)]
pub struct EchoServer {
    listener: Arc<TcpListener>,
    connections: Arc<AtomicUsize>,
    accept_errors: Arc<AtomicUsize>,
}

impl EchoServer {
    /// Binds the listening socket. Bind errors surface here, before the
    /// service is ever started.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener: Arc::new(listener),
            connections: Arc::new(AtomicUsize::new(0)),
            accept_errors: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Number of connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Number of failed `accept` calls the loop has survived.
    pub fn accept_errors(&self) -> usize {
        self.accept_errors.load(Ordering::SeqCst)
    }

    pub fn into_service(self, config: ServiceConfig) -> BlockingService {
        BlockingService::builder()
            .config(config)
            .on_start(move |ctx: CancellationToken| {
                let server = self.clone();
                async move { server.serve(ctx).await }
            })
            .spawn()
    }

    async fn serve(self, ctx: CancellationToken) -> io::Result<()> {
        info!(addr = %self.local_addr()?, "Accepting connections");
        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("Accept loop cancelled");
                    return Ok(());
                }
                accepted = self.listener.accept() => self.handle_accept(accepted, &ctx).await,
            }
        }
    }

    /// Hands an accepted socket to its own task. Accept errors such as
    /// `EMFILE` are transient, so they only pause the loop briefly.
    async fn handle_accept(
        &self,
        accepted: io::Result<(TcpStream, SocketAddr)>,
        ctx: &CancellationToken,
    ) {
        let (socket, peer) = match accepted {
            Ok(accepted) => accepted,
            Err(e) => {
                self.accept_errors.fetch_add(1, Ordering::SeqCst);
                warn!(error = %e, "Accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                return;
            }
        };

        let total = self.connections.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%peer, total, "Accepted");

        let ctx = ctx.clone();
        tokio::spawn(async move {
            if let Err(e) = echo(socket, ctx).await {
                debug!(%peer, error = %e, "Connection failed");
            }
        });
    }
}

async fn echo(mut socket: TcpStream, ctx: CancellationToken) -> io::Result<()> {
    let (mut reader, mut writer) = socket.split();
    tokio::select! {
        copied = tokio::io::copy(&mut reader, &mut writer) => copied.map(|_| ()),
        _ = ctx.cancelled() => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_accept_error_keeps_serving() {
        let server = EchoServer::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let ctx = CancellationToken::new();

        // Too many open files
        server
            .handle_accept(Err(io::Error::from_raw_os_error(24)), &ctx)
            .await;
        assert_eq!(server.accept_errors(), 1);
        assert_eq!(server.connections(), 0);

        // The next connection is still served.
        let mut client = TcpStream::connect(addr).await.unwrap();
        server
            .handle_accept(server.listener.accept().await, &ctx)
            .await;
        client.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");
        assert_eq!(server.connections(), 1);
        ctx.cancel();
    }
}
