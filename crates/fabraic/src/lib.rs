//! # fabraic
//!
//! Rust SDK core for the Fabraic API.
//!
//! The crate builds authenticated, versioned REST requests against a
//! configurable base endpoint and decodes JSON responses into
//! [`serde_json::Value`]. Two pieces do the work:
//!
//! 1. [`FabraicClient`] — base endpoint, default `Accept`/auth headers and the
//!    `reqwest` transport. Cheap to clone and safe to share across tasks.
//! 2. [`ServiceClient`] — a view scoped to one service and API version that
//!    templates `{name}` path parameters.
//!
//! Responses come back as `Option<Value>`: `None` is a successful response
//! with an empty body (e.g. `204 No Content`).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fabraic::{ClientConfig, FabraicClient, RequestOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FabraicClient::new(ClientConfig::new().with_api_key("my-key"))?;
//!     let orders = client.service("orders", None)?;
//!
//!     let order = orders
//!         .get("/{id}", &[("id", "42")], RequestOptions::new().query("expand", "lines"))
//!         .await?;
//!     println!("{order:?}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;

/// Production endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.fabraic.co";

/// API version segment used when a service is created without one.
pub const DEFAULT_SERVICE_VERSION: &str = "v1";

// Re-export primary types
pub use client::{FabraicClient, RequestOptions, API_KEY_HEADER};
pub use config::ClientConfig;
pub use error::{FabraicError, FabraicResult};
pub use service::ServiceClient;
pub use telemetry::init_logging;

// Re-exported so callers can build methods, headers and values without
// depending on matching crate versions themselves.
pub use reqwest::header;
pub use reqwest::Method;
pub use serde_json::Value;
