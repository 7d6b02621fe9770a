use std::sync::Arc;

use gameservices_common::{
    parse_identifier, require, Asset, AssetStaged, Certificate, CertificateCreated, CloudService,
    ClusterListing, ComputeInstance, ComputeRequest, DashboardSummary, DeploymentReport,
    DiagnosticFileListing, GameMode, GameModeCreated, GameModeSchema, GameModeSchemaUpload,
    GameServicesProperties, Package, PackageStaged, PoolReport,
};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::{ClientConfig, DEFAULT_GEO_REGION};
use crate::envelope::{self, DecodedResources};
use crate::error::{Result, SdkError};
use crate::poller::{poll_until, CreationOutcome, PollOutcome, PollPolicy};
use crate::resources::{
    decode_listing, Assets, Certificates, Deployments, GameModes, NewAsset, NewCertificate,
    NewGameMode, NewPackage, Packages, Pools, ReportKind, ResourceKind, Summary,
};
use crate::transport::{MediaType, Payload, Transport};
use crate::upload::{BlobUploader, HttpBlobUploader, UploadFile};
use crate::uri::{self, CLOUD_SERVICE_NAME};

/// Game mode schema for a new compute instance.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Id of a schema already known to the service. Must be a GUID.
    Existing(String),
    /// Schema shipped inline with the creation request.
    Upload { name: String, file: UploadFile },
}

#[derive(Debug, Clone)]
pub struct NewCompute {
    pub name: String,
    /// Decimal title id.
    pub title_id: String,
    pub selection_order: i32,
    /// Comma-delimited sandbox names.
    pub sandboxes: Option<String>,
    /// Comma-delimited resource set ids.
    pub resource_set_ids: Option<String>,
    pub schema: SchemaSource,
}

impl NewCompute {
    /// Check the request and build the envelope payload.
    fn into_request(self) -> Result<ComputeRequest> {
        require("name", &self.name)?;
        require("titleId", &self.title_id)?;

        let mut compute = ComputeInstance::new(self.name);
        compute.title_id = Some(self.title_id.clone());
        compute.selection_order = self.selection_order;
        compute.sandboxes = self.sandboxes;
        compute.resource_sets = self.resource_set_ids;

        let schema_upload = match self.schema {
            SchemaSource::Existing(id) => {
                compute.schema_id = Some(parse_identifier("schemaId", &id)?.to_string());
                None
            }
            SchemaSource::Upload { name, file } => {
                if name.trim().is_empty() || file.file_name.trim().is_empty() {
                    return Err(SdkError::Validation(
                        "game mode schema needs a name and a file name".to_string(),
                    ));
                }
                compute.schema_name = Some(name.clone());
                Some(GameModeSchemaUpload {
                    metadata: GameModeSchema {
                        name,
                        file_name: file.file_name.clone(),
                        title_id: self.title_id,
                    },
                    content: file.text(),
                })
            }
        };

        Ok(ComputeRequest {
            xbl_compute: compute,
            xbl_game_mode_schema: schema_upload,
        })
    }
}

/// Client for the game services resource provider.
///
/// Holds one JSON and one XML transport sharing a correlation id, the blob
/// uploader used for staged uploads, and the poll policy for asynchronous
/// creations. Cheap to clone.
#[derive(Clone)]
pub struct GameServicesClient {
    json: Transport,
    xml: Transport,
    uploader: Arc<dyn BlobUploader>,
    poll: PollPolicy,
    geo_region: String,
}

impl GameServicesClient {
    pub fn new(
        json: Transport,
        xml: Transport,
        uploader: Arc<dyn BlobUploader>,
        mut poll: PollPolicy,
    ) -> Self {
        poll.max_attempts = poll.max_attempts.max(1);
        Self {
            json,
            xml,
            uploader,
            poll,
            geo_region: DEFAULT_GEO_REGION.to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let correlation_id = Uuid::new_v4();
        let json = Transport::new(config, correlation_id, MediaType::Json)?;
        let xml = Transport::new(config, correlation_id, MediaType::Xml)?;

        info!(
            endpoint = %config.endpoint,
            correlation_id = %correlation_id,
            "Game services client ready"
        );
        Ok(Self::new(json, xml, Arc::new(HttpBlobUploader::new()), config.poll)
            .with_geo_region(config.geo_region.clone()))
    }

    pub fn with_geo_region(mut self, region: impl Into<String>) -> Self {
        self.geo_region = region.into();
        self
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.poll
    }

    pub async fn list<K: ResourceKind>(&self, instance: &str) -> Result<Vec<K::Item>> {
        let body: Value = self.json.get_json(&K::collection(instance)).await?;
        decode_listing(body, K::LIST_KEY)
    }

    /// Create an entity. Kinds that stage a blob go through three phases:
    /// metadata POST, blob upload, metadata PUT to confirm.
    #[instrument(skip(self, request), fields(kind = K::LABEL))]
    pub async fn create<K: ResourceKind>(
        &self,
        instance: &str,
        request: K::NewRequest,
    ) -> Result<K::Created> {
        let plan = K::plan(request)?;
        let created: K::Created = self
            .json
            .post_form(&K::collection(instance), plan.submit_form())
            .await?;

        let Some(blob) = plan.blob.as_ref() else {
            info!("Created {}", K::LABEL);
            return Ok(created);
        };
        let target = K::staged(&created).ok_or_else(|| {
            SdkError::UnexpectedResponse(format!("no upload location for {}", K::LABEL))
        })?;

        info!(entity_id = %target.id, file = %blob.file_name, "Uploading to blob storage");
        if let Err(err) = self.uploader.upload(&target.upload_url, &blob.data).await {
            warn!(entity_id = %target.id, error = %err, "Blob upload failed");
            return Err(SdkError::Storage {
                instance: instance.to_string(),
                entity_id: target.id,
                file_name: blob.file_name.clone(),
                message: err.to_string(),
            });
        }

        self.json
            .put_form(&K::item(instance, &target.id), plan.metadata_form())
            .await?;
        info!(entity_id = %target.id, "Confirmed {}", K::LABEL);
        Ok(created)
    }

    pub async fn remove<K: ResourceKind>(&self, instance: &str, id: &str) -> Result<()> {
        self.json.delete(&K::item(instance, id)).await
    }

    pub async fn report<R: ReportKind>(&self, instance: &str) -> Result<R::Report> {
        self.json.get_json(&R::route(instance)).await
    }

    pub async fn list_packages(&self, instance: &str) -> Result<Vec<Package>> {
        self.list::<Packages>(instance).await
    }

    pub async fn new_package(&self, instance: &str, package: NewPackage) -> Result<PackageStaged> {
        self.create::<Packages>(instance, package).await
    }

    /// Create `asset` first and reference it from the new package.
    pub async fn new_package_with_asset(
        &self,
        instance: &str,
        mut package: NewPackage,
        asset: NewAsset,
    ) -> Result<PackageStaged> {
        let staged = self.new_asset(instance, asset).await?;
        package.asset_id = Some(staged.asset_id);
        self.new_package(instance, package).await
    }

    pub async fn remove_package(&self, instance: &str, id: Uuid) -> Result<()> {
        self.remove::<Packages>(instance, &id.to_string()).await
    }

    pub async fn list_game_modes(&self, instance: &str) -> Result<Vec<GameMode>> {
        self.list::<GameModes>(instance).await
    }

    pub async fn new_game_mode(
        &self,
        instance: &str,
        game_mode: NewGameMode,
    ) -> Result<GameModeCreated> {
        self.create::<GameModes>(instance, game_mode).await
    }

    pub async fn remove_game_mode(&self, instance: &str, id: Uuid) -> Result<()> {
        self.remove::<GameModes>(instance, &id.to_string()).await
    }

    pub async fn list_certificates(&self, instance: &str) -> Result<Vec<Certificate>> {
        self.list::<Certificates>(instance).await
    }

    pub async fn new_certificate(
        &self,
        instance: &str,
        certificate: NewCertificate,
    ) -> Result<CertificateCreated> {
        self.create::<Certificates>(instance, certificate).await
    }

    pub async fn remove_certificate(&self, instance: &str, id: Uuid) -> Result<()> {
        self.remove::<Certificates>(instance, &id.to_string()).await
    }

    pub async fn list_assets(&self, instance: &str) -> Result<Vec<Asset>> {
        self.list::<Assets>(instance).await
    }

    pub async fn new_asset(&self, instance: &str, asset: NewAsset) -> Result<AssetStaged> {
        self.create::<Assets>(instance, asset).await
    }

    pub async fn remove_asset(&self, instance: &str, id: Uuid) -> Result<()> {
        self.remove::<Assets>(instance, &id.to_string()).await
    }

    pub async fn summary_report(&self, instance: &str) -> Result<DashboardSummary> {
        self.report::<Summary>(instance).await
    }

    pub async fn deployments_report(&self, instance: &str) -> Result<DeploymentReport> {
        self.report::<Deployments>(instance).await
    }

    pub async fn pools_report(&self, instance: &str) -> Result<PoolReport> {
        self.report::<Pools>(instance).await
    }

    /// Every compute instance in the subscription, plus the resources whose
    /// payload could not be read.
    pub async fn compute_resources(&self) -> Result<DecodedResources<ComputeInstance>> {
        let body = self.xml.get_text(&uri::compute_instances()).await?;
        envelope::decode_resources(&body)
    }

    pub async fn list_compute_instances(&self) -> Result<Vec<ComputeInstance>> {
        Ok(self.compute_resources().await?.items)
    }

    /// Submit a compute instance and wait for it to show up in the listing.
    ///
    /// The request is validated before anything is sent. Running out of poll
    /// attempts yields [`CreationOutcome::Pending`], not an error.
    #[instrument(skip(self, compute), fields(name = %compute.name))]
    pub async fn new_compute(&self, compute: NewCompute) -> Result<CreationOutcome> {
        let request = compute.into_request()?;
        let name = request.xbl_compute.name.clone();

        self.ensure_cloud_service().await?;

        let body = envelope::encode_resource(&name, &Uuid::new_v4().to_string(), &request)?;
        self.xml.put_xml(&uri::compute_resource(&name), body).await?;
        info!("Compute instance submitted");

        let client = self;
        let wanted = name.as_str();
        let outcome = poll_until(&self.poll, move |_| async move {
            let instances = client.list_compute_instances().await?;
            Ok::<_, SdkError>(instances.into_iter().find(|i| i.name == wanted))
        })
        .await?;

        Ok(match outcome {
            PollOutcome::Found { value, attempts } if value.in_error_state => {
                warn!(attempts, "Compute instance reported an error");
                CreationOutcome::Failed {
                    reason: value
                        .status
                        .unwrap_or_else(|| "service reported an error".to_string()),
                }
            }
            PollOutcome::Found { attempts, .. } => {
                info!(attempts, "Compute instance created");
                CreationOutcome::Created
            }
            PollOutcome::Exhausted { attempts } => {
                warn!(attempts, "Compute instance not visible yet");
                CreationOutcome::Pending { attempts }
            }
        })
    }

    pub async fn remove_compute(&self, instance: &str) -> Result<()> {
        self.json.delete(&uri::compute_resource(instance)).await
    }

    /// Deploy to the given comma-delimited sandboxes and regions.
    pub async fn deploy_compute(
        &self,
        instance: &str,
        sandboxes: &str,
        geo_regions: &str,
    ) -> Result<()> {
        self.json
            .put_empty(&uri::deploy(instance, sandboxes, geo_regions))
            .await
    }

    pub async fn stop_compute(&self, instance: &str) -> Result<()> {
        self.json.put_empty(&uri::stop(instance)).await
    }

    pub async fn publish_compute(&self, instance: &str) -> Result<()> {
        self.json.put_empty(&uri::publish(instance)).await
    }

    /// Publisher information, or `None` when the provider does not expose
    /// any.
    pub async fn properties(&self) -> Result<Option<GameServicesProperties>> {
        let body = self.xml.get_text(&uri::provider_properties()).await?;
        let properties = envelope::decode_properties(&body)?;
        properties
            .into_iter()
            .find(|(key, _)| key == "publisherInfo")
            .map(|(_, value)| serde_json::from_str(&value).map_err(SdkError::from))
            .transpose()
    }

    pub async fn clusters(
        &self,
        instance: &str,
        geo_region: &str,
        status: &str,
    ) -> Result<ClusterListing> {
        self.json
            .get_json(&uri::clusters(instance, geo_region, status))
            .await
    }

    pub async fn log_files(&self, instance: &str, instance_id: &str) -> Result<DiagnosticFileListing> {
        self.json.get_json(&uri::log_files(instance, instance_id)).await
    }

    pub async fn dump_files(&self, instance: &str, instance_id: &str) -> Result<DiagnosticFileListing> {
        self.json.get_json(&uri::dump_files(instance, instance_id)).await
    }

    /// Register the resource provider and make sure the subscription has the
    /// cloud service container compute instances live in. Idempotent.
    #[instrument(skip(self))]
    pub async fn ensure_cloud_service(&self) -> Result<()> {
        let response = self
            .json
            .send(Method::PUT, &uri::register_provider(), Payload::Empty)
            .await?;
        let status = response.status();
        if !(status.is_success() || status == StatusCode::CONFLICT) {
            return Err(self.json.error_from(response).await);
        }

        let route = uri::cloud_service();
        match self.xml.get_text(&route).await {
            Ok(body) => {
                if envelope::decode_cloud_service(&body)?.name == CLOUD_SERVICE_NAME {
                    return Ok(());
                }
            }
            Err(SdkError::NotFound { .. }) => {}
            Err(err) => return Err(err),
        }

        let service = CloudService::named(CLOUD_SERVICE_NAME, self.geo_region.as_str());
        self.xml
            .put_xml(&route, envelope::encode_cloud_service(&service))
            .await?;
        info!(region = %self.geo_region, "Cloud service submitted");

        let xml = &self.xml;
        let route = &route;
        let outcome = poll_until(&self.poll, move |_| async move {
            let response = xml.send(Method::GET, route, Payload::Empty).await?;
            Ok::<_, SdkError>(response.status().is_success().then_some(()))
        })
        .await?;

        match outcome {
            PollOutcome::Found { .. } => Ok(()),
            PollOutcome::Exhausted { attempts } => Err(SdkError::Api {
                status: 500,
                message: format!(
                    "cloud service {} did not appear after {} attempts",
                    CLOUD_SERVICE_NAME, attempts
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(schema: SchemaSource) -> NewCompute {
        NewCompute {
            name: "shooter".to_string(),
            title_id: "123456".to_string(),
            selection_order: 1,
            sandboxes: Some("XDKS.1".to_string()),
            resource_set_ids: None,
            schema,
        }
    }

    #[test]
    fn test_existing_schema_must_be_guid() {
        let err = compute(SchemaSource::Existing("modes-v1".to_string()))
            .into_request()
            .unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
        assert_eq!(err.status_code(), Some(400));

        let request = compute(SchemaSource::Existing(
            "6f1c2a1e-7d55-4d7b-9a43-0e1c9f7b2a10".to_string(),
        ))
        .into_request()
        .unwrap();
        assert_eq!(
            request.xbl_compute.schema_id.as_deref(),
            Some("6f1c2a1e-7d55-4d7b-9a43-0e1c9f7b2a10")
        );
        assert!(request.xbl_game_mode_schema.is_none());
    }

    #[test]
    fn test_uploaded_schema_is_inlined() {
        let request = compute(SchemaSource::Upload {
            name: "modes".to_string(),
            file: UploadFile::new("modes.json", br#"{"modes":[]}"#.to_vec()),
        })
        .into_request()
        .unwrap();

        assert_eq!(request.xbl_compute.schema_name.as_deref(), Some("modes"));
        assert!(request.xbl_compute.schema_id.is_none());
        let schema = request.xbl_game_mode_schema.unwrap();
        assert_eq!(schema.metadata.title_id, "123456");
        assert_eq!(schema.metadata.file_name, "modes.json");
        assert_eq!(schema.content, r#"{"modes":[]}"#);
    }

    #[test]
    fn test_uploaded_schema_needs_names() {
        let err = compute(SchemaSource::Upload {
            name: String::new(),
            file: UploadFile::new("modes.json", Vec::new()),
        })
        .into_request()
        .unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
    }
}
