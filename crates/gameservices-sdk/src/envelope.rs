//! The XML resource envelope used by the cloud service endpoints.
//!
//! Compute instances are carried as JSON inside a CDATA section of a
//! `Resource` element's `IntrinsicSettings`. Elements are matched by local
//! name only; the service is not consistent about namespaces.

use gameservices_common::{CloudService, ComputeInstance};
use roxmltree::{Document, Node};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{Result, SdkError};
use crate::uri::{NAMESPACE, RESOURCE_TYPE, SCHEMA_VERSION, XML_NAMESPACE};

/// A domain object that can ride in a resource envelope.
pub trait EnvelopePayload: DeserializeOwned {
    /// Stand-in for a resource whose payload is missing or unreadable.
    fn unavailable(name: &str) -> Self;
    fn mark_error(&mut self);
}

impl EnvelopePayload for ComputeInstance {
    fn unavailable(name: &str) -> Self {
        ComputeInstance::unavailable(name)
    }

    fn mark_error(&mut self) {
        self.in_error_state = true;
    }
}

/// A resource whose payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeFailure {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResources<T> {
    /// One entry per `Resource` element, in document order.
    pub items: Vec<T>,
    pub failures: Vec<EnvelopeFailure>,
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name).map(|n| collect_text(n).trim().to_string())
}

/// Concatenated text and CDATA content of the direct children.
fn collect_text(node: Node) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Decode every `Resource` element in a cloud service document.
pub fn decode_resources<T: EnvelopePayload>(xml: &str) -> Result<DecodedResources<T>> {
    let doc = Document::parse(xml)?;
    let mut items = Vec::new();
    let mut failures = Vec::new();

    let resources = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Resource");

    for resource in resources {
        let name = child_text(resource, "Name").unwrap_or_default();
        let payload = child(resource, "IntrinsicSettings")
            .map(|n| collect_text(n).trim().to_string())
            .filter(|text| !text.is_empty());

        let Some(payload) = payload else {
            items.push(T::unavailable(&name));
            continue;
        };

        match serde_json::from_str::<T>(&payload) {
            Ok(mut item) => {
                let errored = child(resource, "OperationStatus")
                    .and_then(|status| child(status, "Error"))
                    .is_some();
                if errored {
                    item.mark_error();
                }
                items.push(item);
            }
            Err(err) => {
                warn!(resource = %name, error = %err, "Unreadable resource payload");
                failures.push(EnvelopeFailure {
                    name: name.clone(),
                    message: err.to_string(),
                });
                items.push(T::unavailable(&name));
            }
        }
    }

    Ok(DecodedResources { items, failures })
}

pub fn decode_cloud_service(xml: &str) -> Result<CloudService> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    if root.tag_name().name() != "CloudService" {
        return Err(SdkError::Xml(format!(
            "expected CloudService, found {}",
            root.tag_name().name()
        )));
    }

    Ok(CloudService {
        name: child_text(root, "Name").unwrap_or_default(),
        description: child_text(root, "Description").unwrap_or_default(),
        geo_region: child_text(root, "GeoRegion").unwrap_or_default(),
        label: child_text(root, "Label").unwrap_or_default(),
    })
}

/// Key/value pairs of a `ResourceProviderProperties` document.
pub fn decode_properties(xml: &str) -> Result<Vec<(String, String)>> {
    let doc = Document::parse(xml)?;
    Ok(doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "ResourceProviderProperty")
        .filter_map(|prop| Some((child_text(prop, "Key")?, child_text(prop, "Value")?)))
        .collect())
}

/// `Message` of an XML service error body, if the body is one.
pub fn decode_service_error(xml: &str) -> Option<String> {
    let doc = Document::parse(xml).ok()?;
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Message")
        .map(|n| collect_text(n).trim().to_string())
        .filter(|message| !message.is_empty())
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap `text` in CDATA, splitting any `]]>` it contains across sections.
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

fn element(name: &str, text: &str) -> String {
    format!("<{0}>{1}</{0}>", name, escape(text))
}

/// Encode a `Resource` document whose payload is `payload` as JSON.
pub fn encode_resource<T: Serialize>(name: &str, etag: &str, payload: &T) -> Result<String> {
    let json = serde_json::to_string(payload)?;
    Ok(format!(
        "<Resource xmlns=\"{ns}\">{etag}<IntrinsicSettings>{settings}</IntrinsicSettings>{name}<Plan />{provider}{schema}{kind}</Resource>",
        ns = XML_NAMESPACE,
        etag = element("ETag", etag),
        settings = cdata(&json),
        name = element("Name", name),
        provider = element("ResourceProviderNamespace", NAMESPACE),
        schema = element("SchemaVersion", SCHEMA_VERSION),
        kind = element("Type", RESOURCE_TYPE),
    ))
}

pub fn encode_cloud_service(service: &CloudService) -> String {
    format!(
        "<CloudService xmlns=\"{ns}\">{name}{description}{region}{label}</CloudService>",
        ns = XML_NAMESPACE,
        name = element("Name", &service.name),
        description = element("Description", &service.description),
        region = element("GeoRegion", &service.geo_region),
        label = element("Label", &service.label),
    )
}
