use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::entity_type;

fn game_mode_type() -> String {
    entity_type::GAME_MODE.to_string()
}

/// A game server image as listed by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub gsi_id: Option<Uuid>,
    #[serde(default)]
    pub min_required_players: i32,
    #[serde(default)]
    pub max_required_players: i32,
    #[serde(default)]
    pub cspkg_file_name: Option<String>,
    #[serde(default)]
    pub cscfg_file_name: Option<String>,
    #[serde(default)]
    pub gsi_set_id: Option<Uuid>,
    #[serde(default)]
    pub certificate_ids: Vec<Uuid>,
    #[serde(default)]
    pub gsi_asset_ids: Vec<Uuid>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Metadata part of a package upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRequest {
    pub name: String,
    pub cspkg_file_name: String,
    pub cscfg_file_name: String,
    /// Always serialized; the service accepts only null or a GUID.
    pub asset_id: Option<String>,
    pub min_required_players: i32,
    pub max_required_players: i32,
}

impl PackageRequest {
    pub fn new(
        name: impl Into<String>,
        cspkg_file_name: impl Into<String>,
        cscfg_file_name: impl Into<String>,
        max_players: i32,
        asset_id: Option<&str>,
    ) -> Self {
        let asset_id = asset_id
            .map(str::trim)
            .filter(|id| Uuid::parse_str(id).is_ok())
            .map(str::to_string);
        Self {
            name: name.into(),
            cspkg_file_name: cspkg_file_name.into(),
            cscfg_file_name: cscfg_file_name.into(),
            asset_id,
            min_required_players: 1,
            max_required_players: max_players,
        }
    }
}

/// Answer to the package metadata POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageStaged {
    pub gsi_id: String,
    pub cspkg_pre_auth_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub asset_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
    pub name: String,
    pub file_name: String,
}

/// Answer to the asset metadata POST. Older service revisions used the
/// `gameAsset*` field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStaged {
    #[serde(alias = "gameAssetId")]
    pub asset_id: String,
    #[serde(alias = "gameAssetUrl")]
    pub asset_pre_auth_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub name: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub thumbprint: Option<String>,
    #[serde(default)]
    pub expires_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequest {
    pub name: String,
    pub file_name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateCreated {
    #[serde(default, alias = "certificateId")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMode {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "type", default = "game_mode_type")]
    pub entity_type: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameModeRequest {
    pub name: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameModeCreated {
    #[serde(default, alias = "gameModeId", alias = "variantId")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
