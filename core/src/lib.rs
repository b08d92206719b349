//! Blocking client for the EMQX broker's HTTP admin API (`/clients`).
//!
//! # Overview
//! Lists, inspects, kicks, subscribes and unsubscribes MQTT clients managed
//! by an EMQX cluster. Every operation is one authenticated request/response
//! round trip; nothing is cached or retried.
//!
//! # Design
//! - `Credentials` holds the base URL and the application id/secret and
//!   derives the Basic `Authorization` header.
//! - `ClientQueryFilter` encodes list filters into a stable query string.
//! - `EmqxClient` splits each operation into `build_*` (produces an
//!   `HttpRequest`) and `parse_*` (consumes an `HttpResponse`), with an
//!   `HttpTransport` executing the exchange in between. `UreqTransport` is
//!   the default.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//!
//! ```no_run
//! use emqx_admin_core::{ClientQueryFilter, ConnectionState, EmqxClient};
//!
//! let client = EmqxClient::new("http://127.0.0.1:8081/api/v4", "admin", "public");
//! let page = client.list_clients(&ClientQueryFilter {
//!     conn_state: Some(ConnectionState::Connected),
//!     ..Default::default()
//! })?;
//! for id in page.client_ids() {
//!     println!("{id}");
//! }
//! # Ok::<(), emqx_admin_core::ApiError>(())
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod filter;
pub mod http;
pub mod types;

pub use auth::Credentials;
pub use client::EmqxClient;
pub use error::{ApiError, ConfigError};
pub use filter::{ClientQueryFilter, ConnectionState};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError, UreqTransport};
pub use types::{ClientListPage, ClientRecord, PageMeta, QoS, SubscribeRequest, UnsubscribeRequest};
