//! # relay-server
//!
//! HTTP surface of alert-relay: accepts Grafana webhooks, applies
//! acknowledgment suppression, relays the alerts to Telegram or Discord, and
//! handles the signed Discord callbacks that create acknowledgments.
//!
//! ## Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use relay_server::{RelayConfig, RelayServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RelayConfig::parse();
//!     config.validate()?;
//!     let server = RelayServer::from_config(&config)?;
//!     server.serve(config.listen_addr).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/health` | GET | Liveness probe, answers `UP` |
//! | `/telegram` | POST | Relay a webhook batch to Telegram |
//! | `/discord` | POST | Relay a webhook batch to Discord |
//! | `/discord/interactions` | POST | Signed acknowledgment callbacks |
//! | `/suppressions` | GET | Active acknowledgments |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod interaction;
pub mod routes;
pub mod server;
pub mod state;
pub mod verify;

pub use config::RelayConfig;
pub use dispatcher::{Acknowledgement, AlertDispatcher, DispatchReport, MessageOrigin};
pub use error::{RelayError, RelayResult};
pub use interaction::{Interaction, InteractionKind, InteractionResponse};
pub use routes::create_router;
pub use server::RelayServer;
pub use state::AppState;
pub use verify::{InteractionVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER, verify_signature};
