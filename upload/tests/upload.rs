use capture::ImageData;
use httpmock::prelude::*;
use upload::{ObjectStore, UploadError};

fn image() -> ImageData {
    ImageData::new("image/jpeg", vec![0xD8; 256]).unwrap()
}

#[tokio::test]
async fn successful_upload_returns_the_secure_url() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(200).json_body(serde_json::json!({
                "secure_url": "https://res.example.com/demo/image/upload/v1/photo.jpg"
            }));
        })
        .await;

    let store = ObjectStore::new(server.url("/upload"), "unsigned-preset");
    let url = store.upload(&image()).await.unwrap();
    assert_eq!(
        url,
        "https://res.example.com/demo/image/upload/v1/photo.jpg"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn rejection_carries_the_store_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(400)
                .json_body(serde_json::json!({"message": "Upload preset not found"}));
        })
        .await;

    let store = ObjectStore::new(server.url("/upload"), "missing-preset");
    match store.upload(&image()).await {
        Err(UploadError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Upload preset not found");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn nested_error_message_is_used_too() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(401)
                .json_body(serde_json::json!({"error": {"message": "Invalid signature"}}));
        })
        .await;

    let store = ObjectStore::new(server.url("/upload"), "preset");
    match store.upload(&image()).await {
        Err(UploadError::Rejected { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid signature");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn success_without_secure_url_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(200).json_body(serde_json::json!({"ok": true}));
        })
        .await;

    let store = ObjectStore::new(server.url("/upload"), "preset");
    match store.upload(&image()).await {
        Err(UploadError::MissingUrl) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn from_env_fails_fast_when_unconfigured() {
    std::env::remove_var("MUSECAM_UPLOAD_URL");
    std::env::remove_var("MUSECAM_UPLOAD_PRESET");
    match ObjectStore::from_env() {
        Err(UploadError::Misconfigured(var)) => assert_eq!(var, "MUSECAM_UPLOAD_URL is unset"),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }

    std::env::set_var("MUSECAM_UPLOAD_URL", "https://store.example/upload");
    std::env::set_var("MUSECAM_UPLOAD_PRESET", "unsigned");
    assert!(ObjectStore::from_env().is_ok());
    std::env::remove_var("MUSECAM_UPLOAD_URL");
    std::env::remove_var("MUSECAM_UPLOAD_PRESET");
}
