use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity_type;

fn compute_type() -> String {
    entity_type::COMPUTE.to_string()
}

/// A game-hosting service container. Travels inside the XML resource envelope
/// as the CDATA JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeInstance {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub can_deploy: bool,
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Comma-delimited resource set ids.
    #[serde(default)]
    pub resource_sets: Option<String>,
    /// Comma-delimited sandbox names.
    #[serde(default)]
    pub sandboxes: Option<String>,
    #[serde(default)]
    pub schema_id: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub gsi_set_id: Option<String>,
    #[serde(default)]
    pub title_id: Option<String>,
    #[serde(default)]
    pub publisher_id: Option<String>,
    #[serde(default)]
    pub selection_order: i32,
    #[serde(rename = "type", default = "compute_type")]
    pub entity_type: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Set by the envelope decoder, never sent or received.
    #[serde(skip)]
    pub in_error_state: bool,
}

impl ComputeInstance {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: Some(name.clone()),
            name,
            status: None,
            can_deploy: false,
            subscription_id: None,
            resource_sets: None,
            sandboxes: None,
            schema_id: None,
            schema_name: None,
            gsi_set_id: None,
            title_id: None,
            publisher_id: None,
            selection_order: 0,
            entity_type: compute_type(),
            id: None,
            in_error_state: false,
        }
    }

    /// Placeholder for a resource whose payload could not be read.
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self {
            in_error_state: true,
            ..Self::new(name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameModeSchema {
    pub name: String,
    pub file_name: String,
    pub title_id: String,
}

/// An inline game mode schema shipped with a compute creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameModeSchemaUpload {
    pub metadata: GameModeSchema,
    /// The schema file text.
    pub content: String,
}

/// Body of the compute creation envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRequest {
    pub xbl_compute: ComputeInstance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xbl_game_mode_schema: Option<GameModeSchemaUpload>,
}

/// The per-subscription cloud service container that owns every compute
/// instance. Exchanged as XML.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloudService {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub geo_region: String,
    #[serde(default)]
    pub label: String,
}

impl CloudService {
    /// A container whose name, description and label are all `name`.
    pub fn named(name: impl Into<String>, geo_region: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            label: name.clone(),
            name,
            geo_region: geo_region.into(),
        }
    }
}

/// Publisher information returned by the resource provider properties
/// endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameServicesProperties {
    #[serde(default)]
    pub sandboxes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
