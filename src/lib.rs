//! # Neurio Client
//! The goal of this library is to make it extremely easy to pull energy and power sample data from the Neurio sensor cloud API.
//! The client is based on the `Reqwest` library: it authenticates with oauth 2.0 client credentials and issues plain `json` GET requests.
//!
//! Responses are returned as generic `serde_json::Value` trees - whatever the server sends back.
//!
//! ## Usage
//! Add this library as a dependency to your project.
//! ```toml
//! [dependencies]
//! neurio_client = "0.1"
//! ```
//!
//! ## Example code
//! ```no_run
//!# async fn doc_test() -> neurio_client::Result<()> {
//! use neurio_client::{Granularity, NeurioClient, SamplesQuery, Settings};
//!
//! // Set up the client
//! let settings = Settings::new("xxxxxxxxxx", "xxxxxxxxxx", "0x0000000000000001");
//!
//! // Create a new client and exchange the key and secret for a bearer token.
//! // If this fails your credentials are probably wrong.
//! let mut client = NeurioClient::new(settings)?;
//! client.connect().await?;
//!
//! let last = client.fetch_last_live().await?;
//! println!("last live sample: {}", last);
//!
//! let query = SamplesQuery::new("2014-06-18T19:20:21Z", Granularity::Hours)
//!     .end("2014-06-19T19:20:21Z");
//! let samples = client.fetch_samples(&query).await?;
//! println!("samples: {}", samples);
//!
//!# Ok(())
//!# }
//! ```
mod error;
mod neurio_client;
mod samples;
mod settings;

pub use crate::error::{NeurioError, Result};
pub use crate::neurio_client::{NeurioClient, DEFAULT_BASE_URL};
pub use crate::samples::{Granularity, SamplesQuery};
pub use crate::settings::Settings;
