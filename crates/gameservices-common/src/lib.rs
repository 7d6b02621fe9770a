//! Wire contracts for the game services resource provider.
//!
//! Every type here mirrors a JSON (or, for [`CloudService`], XML) document the
//! service exchanges. The server is the source of truth: nothing in this crate
//! enforces relationships between entities, it only carries them.

// Re-export dependencies used in public interfaces of common types
pub use serde::{Deserialize, Serialize};
use thiserror::Error;
pub use uuid;
use uuid::Uuid;

mod compute;
mod content;
mod diagnostics;
mod reports;

pub use compute::{
    CloudService, ComputeInstance, ComputeRequest, GameModeSchema, GameModeSchemaUpload,
    GameServicesProperties,
};
pub use content::{
    Asset, AssetRequest, AssetStaged, Certificate, CertificateCreated, CertificateRequest,
    GameMode, GameModeCreated, GameModeRequest, Package, PackageRequest, PackageStaged,
};
pub use diagnostics::{ClusterInfo, ClusterListing, DiagnosticFile, DiagnosticFileListing};
pub use reports::{
    ChartData, DashboardSummary, DeploymentReport, GeoRegionDeploymentInfo, GeoRegionPoolInfo,
    PackageDeploymentInfo, PoolReport, UsageData,
};

/// Values of the `type` discriminator the service stamps on entities.
pub mod entity_type {
    pub const COMPUTE: &str = "XblCompute";
    pub const PACKAGE: &str = "XblPackage";
    pub const CERTIFICATE: &str = "XblCertificate";
    pub const GAME_MODE: &str = "XblGameMode";
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("Invalid identifier for {field}: {value}")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, ContractError>;

/// Parse a server-assigned GUID, naming the field on failure.
pub fn parse_identifier(field: &'static str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| ContractError::InvalidIdentifier {
        field,
        value: value.to_string(),
    })
}

/// Reject empty or whitespace-only values for mandatory fields.
pub fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ContractError::MissingField(field));
    }
    Ok(())
}

/// Serialize to JSON and back, asserting nothing was lost on the way.
#[cfg(test)]
pub(crate) fn assert_json_round_trip<T>(value: &T)
where
    T: Serialize + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let json = serde_json::to_string(value).expect("serialize");
    let decoded: T = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(&decoded, value, "round trip through {}", json);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier() {
        let id = parse_identifier("schemaId", " 6f1c2a1e-7d55-4d7b-9a43-0e1c9f7b2a10 ").unwrap();
        assert_eq!(id.to_string(), "6f1c2a1e-7d55-4d7b-9a43-0e1c9f7b2a10");

        let err = parse_identifier("schemaId", "not-a-guid").unwrap_err();
        assert_eq!(
            err,
            ContractError::InvalidIdentifier {
                field: "schemaId",
                value: "not-a-guid".to_string()
            }
        );
        assert!(err.to_string().contains("schemaId"));
    }

    #[test]
    fn test_require() {
        assert!(require("name", "game").is_ok());
        assert_eq!(require("name", "  "), Err(ContractError::MissingField("name")));
    }
}
