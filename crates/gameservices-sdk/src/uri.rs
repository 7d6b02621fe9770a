//! Path templates of the game services resource provider.
//!
//! Every route is relative to `<endpoint>/<subscriptionId>`. Instance names
//! and entity ids are percent-encoded as single path segments.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const NAMESPACE: &str = "gameservices";
pub const RESOURCE_TYPE: &str = "xboxlivecompute";
pub const SCHEMA_VERSION: &str = "1.0";
/// Name of the cloud service container every compute instance lives in.
pub const CLOUD_SERVICE_NAME: &str = "gameservices";
pub const XML_NAMESPACE: &str = "http://schemas.microsoft.com/windowsazure";

// Must stay lowercase, `HeaderName::from_static` panics otherwise.
pub const API_VERSION_HEADER: &str = "x-ms-version";
pub const CORRELATION_HEADER: &str = "x-xblcorrelationid";
pub const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";
pub const BLOCK_BLOB: &str = "BlockBlob";

pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const XML_MEDIA_TYPE: &str = "application/xml";

const CLOUD_SERVICE: &str = "/cloudservices/gameservices";
const COMPUTE_ROOT: &str = "/cloudservices/gameservices/resources/gameservices/~/xboxlivecompute";
const REPORTS_ROOT: &str = "/cloudservices/gameservices/resources/~/xboxlivecompute";

/// Everything but RFC 3986 unreserved characters.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// A path plus its query pairs. Query values are encoded when the URL is
/// built, so callers pass them raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }
}

fn compute(instance: &str) -> String {
    format!("{}/{}", COMPUTE_ROOT, segment(instance))
}

pub fn images(instance: &str) -> Route {
    Route::new(format!("{}/images", compute(instance)))
}

pub fn image(instance: &str, id: &str) -> Route {
    Route::new(format!("{}/images/{}", compute(instance), segment(id)))
}

pub fn assets(instance: &str) -> Route {
    Route::new(format!("{}/assets", compute(instance)))
}

pub fn asset(instance: &str, id: &str) -> Route {
    Route::new(format!("{}/assets/{}", compute(instance), segment(id)))
}

pub fn variants(instance: &str) -> Route {
    Route::new(format!("{}/variants", compute(instance)))
}

pub fn variant(instance: &str, id: &str) -> Route {
    Route::new(format!("{}/variants/{}", compute(instance), segment(id)))
}

pub fn certificates(instance: &str) -> Route {
    Route::new(format!("{}/certificates", compute(instance)))
}

pub fn certificate(instance: &str, id: &str) -> Route {
    Route::new(format!("{}/certificates/{}", compute(instance), segment(id)))
}

pub fn dashboard_summary(instance: &str) -> Route {
    Route::new(format!("{}/monitoring", compute(instance))).query("Details", "DashboardSummary")
}

pub fn deployments_report(instance: &str) -> Route {
    Route::new(format!(
        "{}/{}/poolunits/reports/deployments",
        REPORTS_ROOT,
        segment(instance)
    ))
}

pub fn pools_report(instance: &str) -> Route {
    Route::new(format!(
        "{}/{}/poolunits/reports/servicepools",
        REPORTS_ROOT,
        segment(instance)
    ))
}

/// Target of the compute envelope PUT and of compute deletion.
pub fn compute_resource(instance: &str) -> Route {
    Route::new(format!(
        "{}/resources/{}/{}/{}",
        CLOUD_SERVICE,
        NAMESPACE,
        RESOURCE_TYPE,
        segment(instance)
    ))
}

pub fn compute_instances() -> Route {
    Route::new(CLOUD_SERVICE).query("detailLevel", "full")
}

pub fn cloud_service() -> Route {
    Route::new(CLOUD_SERVICE)
}

pub fn register_provider() -> Route {
    Route::new("/services")
        .query("service", format!("{}.{}", NAMESPACE, RESOURCE_TYPE))
        .query("action", "register")
}

pub fn provider_properties() -> Route {
    Route::new(format!("/resourceproviders/{}/Properties", NAMESPACE))
        .query("resourceType", RESOURCE_TYPE)
}

pub fn publish(instance: &str) -> Route {
    Route::new(compute(instance)).query("operation", "publish")
}

pub fn deploy(instance: &str, sandboxes: &str, geo_regions: &str) -> Route {
    Route::new(compute(instance))
        .query("operation", "deploy")
        .query("sandboxes", sandboxes)
        .query("geoRegions", geo_regions)
}

pub fn stop(instance: &str) -> Route {
    Route::new(compute(instance)).query("operation", "stop")
}

pub fn clusters(instance: &str, geo_region: &str, status: &str) -> Route {
    Route::new(format!("{}/clusters", compute(instance)))
        .query("geoRegion", geo_region)
        .query("status", status)
}

pub fn log_files(instance: &str, instance_id: &str) -> Route {
    Route::new(format!("{}/diagnostics/logs", compute(instance))).query("instanceId", instance_id)
}

pub fn dump_files(instance: &str, instance_id: &str) -> Route {
    Route::new(format!("{}/diagnostics/dumps", compute(instance))).query("instanceId", instance_id)
}
