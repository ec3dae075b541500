//! # Taakl Sync Server
//!
//! Account registry, bearer-token authentication, and request handlers for
//! the Taakl sync server.
//!
//! This crate is the collaborator boundary around the sync core: it
//! resolves a bearer token to exactly one account and dispatches the sync
//! surface (incremental sync, full import/export, settings). HTTP framing,
//! CORS, and response envelopes live outside; an HTTP layer calls
//! [`TaaklServer`] with raw tokens and parsed JSON bodies.
//!
//! # Authentication
//!
//! Tokens are 32 random bytes, hex-encoded for transport and stored
//! server-side only as their SHA-256 digest with an expiry. Passwords are
//! stored as salted SHA-256 digests.
//!
//! ```
//! use taakl_sync_server::{ServerConfig, TaaklServer};
//!
//! let server = TaaklServer::new(ServerConfig::default()).unwrap();
//! let session = server.register("mara", "correct-horse", None).unwrap();
//! let account = server.me(&session.token).unwrap();
//! assert_eq!(account.username, "mara");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod error;
mod handler;
mod server;

pub use auth::{AuthSession, Authenticator};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use server::TaaklServer;
