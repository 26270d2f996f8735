//! HTTPS server bootstrap.
//!
//! [`HttpsServer::prepare`] captures a validated configuration and the
//! request-handling router; [`HttpsServer::create`] binds a TLS listener,
//! hunting upward from the preferred port when it is taken, and spawns the
//! serve task. The terminal outcome of each attempt, success handle or
//! fatal error, is the return value of `create`.

use std::io;
use std::net::SocketAddr;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::hunt::hunt;
use crate::config::ServerConfig;

/// Server bootstrap error.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to load TLS configuration: {0}")]
    Tls(#[source] io::Error),

    #[error("failed to bind {host}:{port}: {source}")]
    Bind {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Server(#[from] io::Error),
}

/// A prepared HTTPS server.
///
/// Holds the validated configuration, the router, and the effective bind
/// parameters. Reusable: every [`create`](Self::create) call is an
/// independent bootstrap attempt that hunts again from the original
/// preferred port.
pub struct HttpsServer {
    config: ServerConfig,
    app: Router,
    port: u16,
    maxport: u16,
}

impl HttpsServer {
    /// Captures a validated configuration and request handler.
    ///
    /// The effective starting port is the configured one, or 0
    /// (platform-assigned). The effective ceiling is `maxport`, or equal to
    /// the starting port, in which case no retries ever occur. Callers
    /// with no application of their own pass an empty `Router`.
    pub fn prepare(config: ServerConfig, app: Router) -> Self {
        let port = config.port.unwrap_or(0);
        let maxport = config.maxport.unwrap_or(port);
        Self {
            config,
            app,
            port,
            maxport,
        }
    }

    /// Binds a TLS listener and starts serving.
    ///
    /// Ports are probed upward from the preferred one while bind attempts
    /// fail with address-in-use, up to the configured maximum. Resolves
    /// exactly once, with the handle of the running server or with the
    /// first fatal error.
    pub async fn create(&self) -> Result<ServerHandle, ServerError> {
        let tls = RustlsConfig::from_pem(
            self.config.cert.clone().into_bytes(),
            self.config.key.clone().into_bytes(),
        )
        .await
        .map_err(ServerError::Tls)?;

        let host = self.config.bind_host();
        let listener = hunt(host, self.port, self.maxport, |port| {
            let host = host.to_string();
            async move { TcpListener::bind((host.as_str(), port)).await }
        })
        .await?;

        let addr = listener.local_addr()?;
        let handle = Handle::new();
        let server = axum_server::from_tcp_rustls(listener.into_std()?, tls)
            .handle(handle.clone());
        let task = tokio::spawn(server.serve(self.app.clone().into_make_service()));

        tracing::info!(%addr, "HTTPS server initialized, listening for requests");
        Ok(ServerHandle { addr, handle, task })
    }
}

/// Handle to a running HTTPS server.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: Handle,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    /// The address the listener actually bound, as reported by the
    /// platform. With a platform-assigned port this is where the assignment
    /// shows up.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops the server. In-flight connections are dropped.
    pub fn close(&self) {
        self.handle.shutdown();
    }

    /// Waits for the serve task to exit.
    pub async fn join(self) -> io::Result<()> {
        self.task.await.map_err(io::Error::other)?
    }
}
