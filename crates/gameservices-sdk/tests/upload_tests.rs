//! Three-phase staged uploads: metadata POST, blob PUT, confirmation PUT.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::*;
use gameservices_sdk::*;
use mockito::{Matcher, Server};
use serde_json::json;
use uuid::Uuid;

const GSI_ID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";
const ASSET_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

fn package() -> NewPackage {
    NewPackage {
        name: "srv".to_string(),
        max_players: 16,
        asset_id: None,
        cspkg: UploadFile::new("srv.cspkg", b"CSPKG-BYTES".to_vec()),
        cscfg: UploadFile::new("srv.cscfg", b"<ServiceConfiguration/>".to_vec()),
    }
}

/// Records uploads and answers with a canned result.
struct RecordingUploader {
    fail: bool,
    calls: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingUploader {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl BlobUploader for RecordingUploader {
    async fn upload(&self, url: &str, data: &[u8]) -> std::result::Result<(), UploadError> {
        self.calls.lock().unwrap().push((url.to_string(), data.to_vec()));
        if self.fail {
            return Err(UploadError::Rejected {
                status: 403,
                body: "AuthenticationFailed".to_string(),
            });
        }
        Ok(())
    }
}

fn client_with_uploader(server: &mockito::ServerGuard, uploader: Arc<dyn BlobUploader>) -> GameServicesClient {
    let config = config_for(server);
    let correlation_id = Uuid::new_v4();
    let json = Transport::new(&config, correlation_id, MediaType::Json).unwrap();
    let xml = Transport::new(&config, correlation_id, MediaType::Xml).unwrap();
    GameServicesClient::new(json, xml, uploader, config.poll)
}

#[tokio::test]
async fn test_new_package_three_phases() {
    let mut server = Server::new_async().await;
    let blob_url = format!("{}/blob/srv.cspkg?sig=abc", server.url());

    let submit = server
        .mock("POST", compute_path("shooter", "/images"))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="metadata""#.to_string()),
            Matcher::Regex(r#""cspkgFileName":"srv.cspkg""#.to_string()),
            Matcher::Regex(r#""assetId":null"#.to_string()),
            Matcher::Regex(r#"name="packageconfig"; filename="srv.cscfg""#.to_string()),
        ]))
        .with_status(200)
        .with_body(json!({"gsiId": GSI_ID, "cspkgPreAuthUrl": blob_url}).to_string())
        .expect(1)
        .create_async()
        .await;
    let blob = server
        .mock("PUT", Matcher::Regex(r"^/blob/srv\.cspkg(\?|$)".to_string()))
        .match_query(Matcher::UrlEncoded("sig".to_string(), "abc".to_string()))
        .match_header("x-ms-blob-type", "BlockBlob")
        .match_body("CSPKG-BYTES")
        .with_status(201)
        .expect(1)
        .create_async()
        .await;
    let confirm = server
        .mock("PUT", compute_path("shooter", &format!("/images/{}", GSI_ID)))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="metadata""#.to_string()),
            Matcher::Regex(r#""name":"srv""#.to_string()),
        ]))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let staged = client.new_package("shooter", package()).await.unwrap();

    assert_eq!(staged.gsi_id, GSI_ID);
    submit.assert_async().await;
    blob.assert_async().await;
    confirm.assert_async().await;
}

#[tokio::test]
async fn test_blob_failure_is_storage_error_without_confirmation() {
    let mut server = Server::new_async().await;
    let blob_url = format!("{}/blob/srv.cspkg", server.url());

    let _submit = server
        .mock("POST", compute_path("shooter", "/images"))
        .with_status(200)
        .with_body(json!({"gsiId": GSI_ID, "cspkgPreAuthUrl": blob_url}).to_string())
        .create_async()
        .await;
    let blob = server
        .mock("PUT", Matcher::Regex(r"^/blob/srv\.cspkg(\?|$)".to_string()))
        .with_status(403)
        .with_body("AuthenticationFailed")
        .expect(1)
        .create_async()
        .await;
    let confirm = server
        .mock("PUT", compute_path("shooter", &format!("/images/{}", GSI_ID)))
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.new_package("shooter", package()).await.unwrap_err();

    match &err {
        SdkError::Storage {
            instance,
            entity_id,
            file_name,
            message,
        } => {
            assert_eq!(instance, "shooter");
            assert_eq!(entity_id, GSI_ID);
            assert_eq!(file_name, "srv.cspkg");
            assert!(message.contains("403"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.status_code(), None);
    blob.assert_async().await;
    confirm.assert_async().await;
}

#[tokio::test]
async fn test_injected_uploader_receives_payload() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", compute_path("shooter", "/assets"))
        .with_status(200)
        .with_body(json!({"gameAssetId": ASSET_ID, "gameAssetUrl": "https://storage.example/a?sig=1"}).to_string())
        .create_async()
        .await;
    let confirm = server
        .mock("PUT", compute_path("shooter", &format!("/assets/{}", ASSET_ID)))
        .match_body(Matcher::Regex(r#""fileName":"maps.zip""#.to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let uploader = RecordingUploader::new(false);
    let client = client_with_uploader(&server, uploader.clone());
    let staged = client
        .new_asset(
            "shooter",
            NewAsset {
                name: "maps".to_string(),
                file: UploadFile::new("maps.zip", b"ZIP".to_vec()),
            },
        )
        .await
        .unwrap();

    assert_eq!(staged.asset_id, ASSET_ID);
    let calls = uploader.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![("https://storage.example/a?sig=1".to_string(), b"ZIP".to_vec())]
    );
    confirm.assert_async().await;
}

#[tokio::test]
async fn test_injected_uploader_failure() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", compute_path("shooter", "/assets"))
        .with_status(200)
        .with_body(json!({"assetId": ASSET_ID, "assetPreAuthUrl": "https://storage.example/a"}).to_string())
        .create_async()
        .await;
    let confirm = server
        .mock("PUT", compute_path("shooter", &format!("/assets/{}", ASSET_ID)))
        .expect(0)
        .create_async()
        .await;

    let client = client_with_uploader(&server, RecordingUploader::new(true));
    let err = client
        .new_asset(
            "shooter",
            NewAsset {
                name: "maps".to_string(),
                file: UploadFile::new("maps.zip", b"ZIP".to_vec()),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::Storage { ref entity_id, .. } if entity_id == ASSET_ID));
    confirm.assert_async().await;
}

#[tokio::test]
async fn test_metadata_rejection_skips_upload() {
    let mut server = Server::new_async().await;
    let submit = server
        .mock("POST", compute_path("shooter", "/images"))
        .with_status(400)
        .with_body("maxRequiredPlayers out of range")
        .create_async()
        .await;

    let uploader = RecordingUploader::new(false);
    let client = client_with_uploader(&server, uploader.clone());
    let err = client.new_package("shooter", package()).await.unwrap_err();

    assert_eq!(err.status_code(), Some(400));
    assert!(uploader.calls.lock().unwrap().is_empty());
    submit.assert_async().await;
}

#[tokio::test]
async fn test_package_with_inline_asset() {
    let mut server = Server::new_async().await;
    let uploader = RecordingUploader::new(false);

    let asset_submit = server
        .mock("POST", compute_path("shooter", "/assets"))
        .with_status(200)
        .with_body(json!({"assetId": ASSET_ID, "assetPreAuthUrl": "https://storage.example/asset"}).to_string())
        .create_async()
        .await;
    let asset_confirm = server
        .mock("PUT", compute_path("shooter", &format!("/assets/{}", ASSET_ID)))
        .with_status(200)
        .create_async()
        .await;
    let package_submit = server
        .mock("POST", compute_path("shooter", "/images"))
        .match_body(Matcher::Regex(format!(r#""assetId":"{}""#, ASSET_ID)))
        .with_status(200)
        .with_body(json!({"gsiId": GSI_ID, "cspkgPreAuthUrl": "https://storage.example/pkg"}).to_string())
        .create_async()
        .await;
    let package_confirm = server
        .mock("PUT", compute_path("shooter", &format!("/images/{}", GSI_ID)))
        .with_status(200)
        .create_async()
        .await;

    let client = client_with_uploader(&server, uploader.clone());
    let staged = client
        .new_package_with_asset(
            "shooter",
            package(),
            NewAsset {
                name: "maps".to_string(),
                file: UploadFile::new("maps.zip", b"ZIP".to_vec()),
            },
        )
        .await
        .unwrap();

    assert_eq!(staged.gsi_id, GSI_ID);
    let urls: Vec<String> = uploader
        .calls
        .lock()
        .unwrap()
        .iter()
        .map(|(url, _)| url.clone())
        .collect();
    assert_eq!(urls, ["https://storage.example/asset", "https://storage.example/pkg"]);

    asset_submit.assert_async().await;
    asset_confirm.assert_async().await;
    package_submit.assert_async().await;
    package_confirm.assert_async().await;
}
