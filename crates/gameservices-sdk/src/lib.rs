//! # Game Services SDK
//!
//! Client for the game services resource provider of the cloud management
//! API: provision compute instances, upload game server packages, assets,
//! certificates and game modes, and read deployment and usage reports.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gameservices_sdk::{ClientConfig, GameServicesClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let client = GameServicesClient::from_config(&config)?;
//!
//!     for instance in client.list_compute_instances().await? {
//!         println!("{} ({:?})", instance.name, instance.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Uploads
//!
//! Packages and assets are created in three steps: the metadata POST returns
//! a pre-authorized blob URL, the file goes straight to blob storage, then a
//! metadata PUT confirms the entity. A failed blob upload surfaces as
//! [`SdkError::Storage`] and the entity is left unconfirmed.
//!
//! ```no_run
//! # use gameservices_sdk::{GameServicesClient, NewAsset, UploadFile};
//! # async fn upload(client: &GameServicesClient) -> gameservices_sdk::Result<()> {
//! let staged = client
//!     .new_asset(
//!         "shooter",
//!         NewAsset {
//!             name: "maps".to_string(),
//!             file: UploadFile::from_path("maps.zip").await?,
//!         },
//!     )
//!     .await?;
//! println!("asset {}", staged.asset_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Compute instances
//!
//! The service creates compute instances asynchronously.
//! [`GameServicesClient::new_compute`] polls the instance listing according
//! to the configured [`PollPolicy`] and reports a [`CreationOutcome`].

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod poller;
pub mod resources;
pub mod transport;
pub mod upload;
pub mod uri;

pub use client::{GameServicesClient, NewCompute, SchemaSource};
pub use config::{ClientCertificate, ClientConfig};
pub use envelope::{DecodedResources, EnvelopeFailure};
pub use error::{Result, SdkError};
pub use poller::{CreationOutcome, PollPolicy};
pub use resources::{NewAsset, NewCertificate, NewGameMode, NewPackage};
pub use transport::{MediaType, Transport};
pub use upload::{BlobUploader, HttpBlobUploader, UploadError, UploadFile};

pub use gameservices_common as types;
