use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::envelope::decode_service_error;
use crate::error::{Result, SdkError};
use crate::uri::{self, Route};

/// Media type a transport asks for, and the error body format it expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Json,
    Xml,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Json => uri::JSON_MEDIA_TYPE,
            MediaType::Xml => uri::XML_MEDIA_TYPE,
        }
    }
}

pub enum Payload {
    Empty,
    Form(Form),
    Xml(String),
}

/// HTTP client bound to one subscription and one media type. Headers are
/// fixed at construction.
#[derive(Debug, Clone)]
pub struct Transport {
    http: Client,
    base_url: String,
    media: MediaType,
}

impl Transport {
    pub fn new(config: &ClientConfig, correlation_id: Uuid, media: MediaType) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(uri::API_VERSION_HEADER),
            header_value(&config.api_version)?,
        );
        headers.insert(
            HeaderName::from_static(uri::CORRELATION_HEADER),
            header_value(&correlation_id.to_string())?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(media.as_str()));

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout);
        if let Some(certificate) = &config.certificate {
            builder = builder.identity(certificate.identity()?);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url(),
            media,
        })
    }

    /// Wrap an already configured client, e.g. one pointed at a test server.
    pub fn from_parts(http: Client, base_url: impl Into<String>, media: MediaType) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            media,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn media(&self) -> MediaType {
        self.media
    }

    pub fn url(&self, route: &Route) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, route.path);
        let mut url = Url::parse(&raw)
            .map_err(|e| SdkError::Config(format!("invalid request URL {}: {}", raw, e)))?;
        if !route.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &route.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send a request and return the response whatever its status.
    pub async fn send(&self, method: Method, route: &Route, payload: Payload) -> Result<Response> {
        let url = self.url(route)?;
        debug!(method = %method, url = %url, "Sending request");

        let request = self.http.request(method, url);
        let request = match payload {
            Payload::Empty => request,
            Payload::Form(form) => request.multipart(form),
            Payload::Xml(body) => request.header(CONTENT_TYPE, uri::XML_MEDIA_TYPE).body(body),
        };
        Ok(request.send().await?)
    }

    /// Send a request, turning any non-success status into an error.
    pub async fn execute(&self, method: Method, route: &Route, payload: Payload) -> Result<Response> {
        let response = self.send(method, route, payload).await?;
        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }
        Ok(response)
    }

    pub async fn error_from(&self, response: Response) -> SdkError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = match self.media {
            MediaType::Json => body,
            MediaType::Xml => decode_service_error(&body).unwrap_or(body),
        };

        if status == StatusCode::NOT_FOUND {
            SdkError::NotFound { message }
        } else {
            SdkError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, route: &Route) -> Result<T> {
        let response = self.execute(Method::GET, route, Payload::Empty).await?;
        decode_json(response).await
    }

    pub async fn get_text(&self, route: &Route) -> Result<String> {
        let response = self.execute(Method::GET, route, Payload::Empty).await?;
        Ok(response.text().await?)
    }

    pub async fn delete(&self, route: &Route) -> Result<()> {
        self.execute(Method::DELETE, route, Payload::Empty).await?;
        Ok(())
    }

    pub async fn put_empty(&self, route: &Route) -> Result<()> {
        self.execute(Method::PUT, route, Payload::Empty).await?;
        Ok(())
    }

    pub async fn post_form<T: DeserializeOwned>(&self, route: &Route, form: Form) -> Result<T> {
        let response = self.execute(Method::POST, route, Payload::Form(form)).await?;
        decode_json(response).await
    }

    pub async fn put_form(&self, route: &Route, form: Form) -> Result<()> {
        self.execute(Method::PUT, route, Payload::Form(form)).await?;
        Ok(())
    }

    pub async fn put_xml(&self, route: &Route, body: String) -> Result<()> {
        self.execute(Method::PUT, route, Payload::Xml(body)).await?;
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| SdkError::Config(format!("invalid header value {:?}: {}", value, e)))
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Err(SdkError::UnexpectedResponse(
            "expected a JSON body, got an empty response".to_string(),
        ));
    }
    Ok(serde_json::from_str(&body)?)
}
