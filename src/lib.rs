//! Discovery-backed REST clients for the EdgeX core data service.
//!
//! Each client is bound to one core data resource (events, readings,
//! value descriptors, ping). Before every call it asks the service
//! registry where core data currently lives and falls back to the
//! statically configured URL when the registry has no answer.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coredata_client::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigService::builder()
//!         .add_file("coredata.toml", FileFormat::Toml)
//!         .with_prefix("COREDATA")
//!         .load_env()
//!         .build()?;
//!
//!     let clients = CoreDataClients::from_config(&config).await?;
//!     println!("{}", clients.ping().ping().await?);
//!
//!     let id = clients
//!         .event()
//!         .add(&Event::new("thermostat").with_reading(Reading::new("temperature", "21.5")))
//!         .await?;
//!     println!("stored event {}", id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! | Key | Default |
//! |-----|---------|
//! | `client.is-cache-discovery-result` | `false` |
//! | `client.retry-unresolved-discovery` | `false` |
//! | `client.application-id` | `edgex-core-data` |
//! | `client.timeout-ms` | `30000` |
//! | `client.connect-timeout-ms` | `10000` |
//! | `discovery.url` | unset, discovery disabled |
//! | `discovery.token` / `discovery.datacenter` | unset |
//! | `discovery.strategy` | `first` |
//! | `discovery.timeout-ms` | `client.timeout-ms` |
//! | `core.db.{event,reading,valuedescriptor,ping}.url` | `http://localhost:48080/api/v1/...` |

pub mod clients;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod model;
pub mod ping;
pub mod proxy;
pub mod reading;
pub mod settings;
pub mod value_descriptor;

pub use clients::CoreDataClients;
pub use endpoint::{Endpoint, EndpointResolver, PathExtractor, ResolverPolicy, path_from_url};
pub use error::{ClientError, Result};
pub use event::EventClient;
pub use model::{Event, IoTType, Reading, ValueDescriptor};
pub use ping::PingClient;
pub use proxy::EntityProxy;
pub use reading::ReadingClient;
pub use settings::{
    ClientSettings, DEFAULT_APPLICATION_ID, EndpointUrls, Entity, RegistrySettings,
};
pub use value_descriptor::ValueDescriptorClient;

pub use coredata_config::{ConfigManager, ConfigService, FileFormat};
pub use coredata_discovery::{
    ConsulDiscovery, DiscoveryResolver, InMemoryDiscovery, SelectionStrategy, ServiceDiscovery,
    ServiceInstance,
};
pub use coredata_http::{HttpClient, HttpClientConfig};

pub mod prelude {
    pub use crate::{
        ClientError, ClientSettings, CoreDataClients, Event, EventClient, IoTType, PingClient,
        Reading, ReadingClient, ValueDescriptor, ValueDescriptorClient,
    };
}
