//! Service discovery for core data clients
//!
//! Looks up running instances of a named application in a service registry
//! and turns one of them into a connection URI.
//!
//! ## Features
//!
//! - **Registry trait** - [`ServiceDiscovery`] over any registry backend
//! - **Consul** - healthy-instance lookup through the Consul HTTP API
//! - **In-memory** - registry for tests and local development
//! - **Selection** - first, round-robin or random instance choice
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coredata_discovery::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let consul = ConsulDiscovery::new("http://localhost:8500")?;
//!     let resolver = DiscoveryResolver::new(Arc::new(consul), SelectionStrategy::First);
//!
//!     // `None` when Consul is down or nothing is registered
//!     if let Some(uri) = resolver.lookup("edgex-core-data").await {
//!         println!("core data at {}", uri);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod consul;
pub mod memory;
pub mod resolver;
pub mod service;

pub use consul::ConsulDiscovery;
pub use memory::InMemoryDiscovery;
pub use resolver::DiscoveryResolver;
pub use service::{
    DiscoveryError, InstanceSelector, SelectionStrategy, ServiceDiscovery, ServiceInstance,
};
