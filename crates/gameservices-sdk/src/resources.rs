//! Resource kinds managed under a compute instance.
//!
//! Each kind plugs its routes, wire types and upload layout into the
//! generic operations on [`GameServicesClient`](crate::GameServicesClient).

use gameservices_common::{
    Asset, AssetRequest, AssetStaged, Certificate, CertificateCreated, CertificateRequest,
    DashboardSummary, DeploymentReport, GameMode, GameModeCreated, GameModeRequest, Package,
    PackageRequest, PackageStaged, PoolReport,
};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, SdkError};
use crate::upload::UploadFile;
use crate::uri::{self, Route};

/// Where phase two of a staged upload goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedTarget {
    pub id: String,
    pub upload_url: String,
}

/// Everything needed to create one entity.
#[derive(Debug, Clone)]
pub struct CreatePlan {
    /// JSON for the `metadata` form part.
    pub metadata: String,
    /// Extra form parts sent with the metadata POST.
    pub attachments: Vec<(&'static str, UploadFile)>,
    /// Payload streamed to blob storage after the POST, if the kind stages
    /// one.
    pub blob: Option<UploadFile>,
}

impl CreatePlan {
    fn new(metadata: String) -> Self {
        Self {
            metadata,
            attachments: Vec::new(),
            blob: None,
        }
    }

    /// Form for the initial POST.
    pub fn submit_form(&self) -> Form {
        self.attachments
            .iter()
            .fold(self.metadata_form(), |form, (part, file)| {
                form.part(
                    *part,
                    Part::bytes(file.data.clone()).file_name(file.file_name.clone()),
                )
            })
    }

    /// Metadata-only form used to confirm a staged upload.
    pub fn metadata_form(&self) -> Form {
        Form::new().text("metadata", self.metadata.clone())
    }
}

pub trait ResourceKind {
    const LABEL: &'static str;
    /// Key the service wraps collection responses in.
    const LIST_KEY: &'static str;

    type Item: DeserializeOwned;
    type NewRequest;
    type Created: DeserializeOwned;

    fn collection(instance: &str) -> Route;
    fn item(instance: &str, id: &str) -> Route;
    fn plan(request: Self::NewRequest) -> Result<CreatePlan>;

    /// Staging target carried by the POST response, for kinds that upload
    /// through blob storage.
    fn staged(_created: &Self::Created) -> Option<StagedTarget> {
        None
    }
}

/// Game server image upload. The cscfg goes with the metadata, the cspkg is
/// staged through blob storage.
#[derive(Debug, Clone)]
pub struct NewPackage {
    pub name: String,
    pub max_players: i32,
    /// Dropped unless it is a GUID.
    pub asset_id: Option<String>,
    pub cspkg: UploadFile,
    pub cscfg: UploadFile,
}

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub name: String,
    pub file: UploadFile,
}

#[derive(Debug, Clone)]
pub struct NewCertificate {
    pub name: String,
    pub password: String,
    pub file: UploadFile,
}

#[derive(Debug, Clone)]
pub struct NewGameMode {
    pub name: String,
    pub file: UploadFile,
}

pub enum Packages {}
pub enum Assets {}
pub enum Certificates {}
pub enum GameModes {}

impl ResourceKind for Packages {
    const LABEL: &'static str = "package";
    const LIST_KEY: &'static str = "xblPackages";

    type Item = Package;
    type NewRequest = NewPackage;
    type Created = PackageStaged;

    fn collection(instance: &str) -> Route {
        uri::images(instance)
    }

    fn item(instance: &str, id: &str) -> Route {
        uri::image(instance, id)
    }

    fn plan(request: NewPackage) -> Result<CreatePlan> {
        gameservices_common::require("name", &request.name)?;
        let metadata = PackageRequest::new(
            request.name,
            request.cspkg.file_name.clone(),
            request.cscfg.file_name.clone(),
            request.max_players,
            request.asset_id.as_deref(),
        );
        let mut plan = CreatePlan::new(serde_json::to_string(&metadata)?);
        plan.attachments.push(("packageconfig", request.cscfg));
        plan.blob = Some(request.cspkg);
        Ok(plan)
    }

    fn staged(created: &PackageStaged) -> Option<StagedTarget> {
        Some(StagedTarget {
            id: created.gsi_id.clone(),
            upload_url: created.cspkg_pre_auth_url.clone(),
        })
    }
}

impl ResourceKind for Assets {
    const LABEL: &'static str = "asset";
    const LIST_KEY: &'static str = "xblAssets";

    type Item = Asset;
    type NewRequest = NewAsset;
    type Created = AssetStaged;

    fn collection(instance: &str) -> Route {
        uri::assets(instance)
    }

    fn item(instance: &str, id: &str) -> Route {
        uri::asset(instance, id)
    }

    fn plan(request: NewAsset) -> Result<CreatePlan> {
        gameservices_common::require("name", &request.name)?;
        let metadata = AssetRequest {
            name: request.name,
            file_name: request.file.file_name.clone(),
        };
        let mut plan = CreatePlan::new(serde_json::to_string(&metadata)?);
        plan.blob = Some(request.file);
        Ok(plan)
    }

    fn staged(created: &AssetStaged) -> Option<StagedTarget> {
        Some(StagedTarget {
            id: created.asset_id.clone(),
            upload_url: created.asset_pre_auth_url.clone(),
        })
    }
}

impl ResourceKind for Certificates {
    const LABEL: &'static str = "certificate";
    const LIST_KEY: &'static str = "xblCertificates";

    type Item = Certificate;
    type NewRequest = NewCertificate;
    type Created = CertificateCreated;

    fn collection(instance: &str) -> Route {
        uri::certificates(instance)
    }

    fn item(instance: &str, id: &str) -> Route {
        uri::certificate(instance, id)
    }

    fn plan(request: NewCertificate) -> Result<CreatePlan> {
        gameservices_common::require("name", &request.name)?;
        let metadata = CertificateRequest {
            name: request.name,
            file_name: request.file.file_name.clone(),
            password: request.password,
        };
        let mut plan = CreatePlan::new(serde_json::to_string(&metadata)?);
        plan.attachments.push(("certificate", request.file));
        Ok(plan)
    }
}

impl ResourceKind for GameModes {
    const LABEL: &'static str = "game mode";
    const LIST_KEY: &'static str = "xblGameModes";

    type Item = GameMode;
    type NewRequest = NewGameMode;
    type Created = GameModeCreated;

    fn collection(instance: &str) -> Route {
        uri::variants(instance)
    }

    fn item(instance: &str, id: &str) -> Route {
        uri::variant(instance, id)
    }

    fn plan(request: NewGameMode) -> Result<CreatePlan> {
        gameservices_common::require("name", &request.name)?;
        let metadata = GameModeRequest {
            name: request.name,
            file_name: request.file.file_name.clone(),
        };
        let mut plan = CreatePlan::new(serde_json::to_string(&metadata)?);
        plan.attachments.push(("variant", request.file));
        Ok(plan)
    }
}

/// A read-only report under a compute instance.
pub trait ReportKind {
    type Report: DeserializeOwned;

    fn route(instance: &str) -> Route;
}

pub enum Summary {}
pub enum Deployments {}
pub enum Pools {}

impl ReportKind for Summary {
    type Report = DashboardSummary;

    fn route(instance: &str) -> Route {
        uri::dashboard_summary(instance)
    }
}

impl ReportKind for Deployments {
    type Report = DeploymentReport;

    fn route(instance: &str) -> Route {
        uri::deployments_report(instance)
    }
}

impl ReportKind for Pools {
    type Report = PoolReport;

    fn route(instance: &str) -> Route {
        uri::pools_report(instance)
    }
}

/// Read a collection response, which is either a bare array or an object
/// holding one.
pub fn decode_listing<T: DeserializeOwned>(body: Value, key: &str) -> Result<Vec<T>> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => Ok(serde_json::from_value(body)?),
        Value::Object(mut map) => {
            if let Some(items) = map.remove(key) {
                return decode_listing(items, key);
            }
            match map.into_iter().map(|(_, v)| v).find(Value::is_array) {
                Some(items) => Ok(serde_json::from_value(items)?),
                None => Ok(Vec::new()),
            }
        }
        other => Err(SdkError::UnexpectedResponse(format!(
            "expected a collection, got {}",
            other
        ))),
    }
}
