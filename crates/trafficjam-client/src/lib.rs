//! TrafficJam REST API Client
//!
//! Transport layer for reconciling interfaces and VRFs on a TrafficJam
//! instance. The engine only depends on the [`Requester`] trait; this crate
//! provides the reqwest-backed implementation and, behind the `test-util`
//! feature, a recording mock.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use trafficjam_client::{HttpMethod, Requester, TrafficJamClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TrafficJamClient::new()?;
//!
//! let result = client
//!     .request(
//!         HttpMethod::Get,
//!         "http://trafficjam:80/trafficjam/api/vrfs",
//!         None,
//!         Duration::from_secs(10),
//!     )
//!     .await?;
//!
//! println!("{} -> {:?}", result.status_code, result.response);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod requester_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::TrafficJamClient;
pub use error::TransportError;
pub use models::*;
pub use requester_trait::Requester;
#[cfg(feature = "test-util")]
pub use mock::{MockRequester, RecordedRequest};
