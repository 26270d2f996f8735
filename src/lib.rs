//! Roost: a TLS web server bootstrap with port hunting.
//!
//! Validates server options, loading key and certificate material from
//! disk, then binds an HTTPS listener, probing upward from the preferred
//! port until a bind succeeds or the configured ceiling is exhausted.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use roost::{validate, HttpsServer, ServerOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ServerOptions::load("config/default.toml")?;
//! let config = validate(&options)?;
//!
//! let app = Router::new().route("/healthz", get(|| async { "ok" }));
//! let server = HttpsServer::prepare(config, app).create().await?;
//! tracing::info!("Server ready at https://{}", server.addr());
//!
//! server.join().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod http;

pub use config::{validate, OptionsError, ServerConfig, ServerOptions};
pub use http::{HttpsServer, ServerError, ServerHandle};
