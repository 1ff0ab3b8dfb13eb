
use crate::errors::Error;
use crate::files::{UPLOAD_PATH, UploadRequest, UploadResult};
use crate::http::HttpSender;
use crate::{Client, Config};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use utils::{parse_multipart, sample_upload_json, write_temp_file};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config {
        base_url: Url::parse(&server.uri()).unwrap(),
        api_key: Some("app-test".to_string()),
        ..Default::default()
    }
}

/// End-to-end upload over a real socket: the service sees a two-part form and its
/// `201` body comes back decoded.
#[test_log::test(tokio::test)]
async fn test_e2e_upload_with_mocked_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .and(header("authorization", "Bearer app-test"))
        .respond_with(ResponseTemplate::new(201).set_body_string(sample_upload_json("contract.docx", 11)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = write_temp_file(&dir, "contract.docx", b"hello world");

    let client = Client::new(&config_for(&mock_server)).unwrap();
    let result = client
        .upload_file(&UploadRequest::new(&file_path, "abc-123"))
        .await
        .expect("upload succeeds");

    assert_eq!(result.name, "contract.docx");
    assert_eq!(result.size, 11);
    assert_eq!(result.extension, "docx");
    assert_eq!(result.created_at, 1_700_000_000);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let content_type = requests[0].headers.get(CONTENT_TYPE).unwrap().to_str().unwrap();
    let parts = parse_multipart(content_type, requests[0].body.clone()).await;
    assert_eq!(parts.len(), 2);

    let file = parts.iter().find(|p| p.name == "file").unwrap();
    assert_eq!(file.file_name.as_deref(), Some("contract.docx"));
    assert_eq!(file.data.as_ref(), b"hello world");

    let user = parts.iter().find(|p| p.name == "user").unwrap();
    assert_eq!(user.data.as_ref(), b"abc-123");
}

#[tokio::test]
async fn test_e2e_error_status_carries_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(413).set_body_string(r#"{"code":"file_too_large","message":"File size exceeded."}"#))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = write_temp_file(&dir, "big.pdf", b"%PDF");

    let client = Client::new(&config_for(&mock_server)).unwrap();
    let err = client
        .upload_file(&UploadRequest::new(&file_path, "abc-123"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::PAYLOAD_TOO_LARGE));
    assert!(err.to_string().contains("file_too_large"));
}

#[tokio::test]
async fn test_e2e_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = write_temp_file(&dir, "slow.pdf", b"%PDF");

    let config = Config {
        request_timeout: Duration::from_millis(200),
        ..config_for(&mock_server)
    };
    let client = Client::new(&config).unwrap();
    let err = client
        .upload_file(&UploadRequest::new(&file_path, "abc-123"))
        .await
        .unwrap_err();

    match err {
        Error::Transport { source, .. } => {
            let source = source.downcast_ref::<reqwest::Error>().expect("reqwest error");
            assert!(source.is_timeout());
        }
        other => panic!("expected Transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_e2e_unreachable_service_is_transport_error() {
    // Bind then drop a listener so the port is known to be closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let file_path = write_temp_file(&dir, "report.pdf", b"%PDF");

    let config = Config {
        base_url: Url::parse(&format!("http://{addr}")).unwrap(),
        ..Default::default()
    };
    let client = Client::new(&config).unwrap();
    let err = client
        .upload_file(&UploadRequest::new(&file_path, "abc-123"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { .. }), "got {err:?}");
    assert_eq!(err.status(), None);
}

/// Sender that answers every upload with metadata derived from the form it received.
#[derive(Clone, Default)]
struct EchoSender;

#[async_trait]
impl HttpSender for EchoSender {
    async fn send(&self, mut request: reqwest::Request) -> crate::Result<reqwest::Response> {
        use http_body_util::BodyExt;

        let content_type = request.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
        let body = request.body_mut().take().unwrap().collect().await.unwrap().to_bytes();
        let parts = parse_multipart(&content_type, body).await;

        let file = parts.iter().find(|p| p.name == "file").unwrap();
        let user = parts.iter().find(|p| p.name == "user").unwrap();
        let name = file.file_name.clone().unwrap();

        // Yield so concurrent uploads interleave.
        tokio::task::yield_now().await;

        let json = serde_json::json!({
            "id": format!("id-{name}"),
            "name": name,
            "size": file.data.len(),
            "extension": "txt",
            "mime_type": "text/plain",
            "created_by": String::from_utf8(user.data.to_vec()).unwrap(),
            "created_at": 1_700_000_000
        });

        Ok(crate::http::MockResponse::new(201, json.to_string()).into())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(Client::with_sender(&Config::default(), EchoSender));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let contents = vec![b'a' + i as u8; 100 + i * 37];
            let path = write_temp_file(&dir, &format!("doc-{i}.txt"), &contents);
            let client = client.clone();
            tokio::spawn(async move {
                let result = client.upload_file(&UploadRequest::new(path, format!("user-{i}"))).await;
                (i, contents.len(), result)
            })
        })
        .collect();

    for (i, len, result) in futures::future::join_all(handles).await.into_iter().map(Result::unwrap) {
        let result: UploadResult = result.unwrap();
        assert_eq!(result.name, format!("doc-{i}.txt"));
        assert_eq!(result.id, format!("id-doc-{i}.txt"));
        assert_eq!(result.size, len as u64);
        assert_eq!(result.created_by, format!("user-{i}"));
    }
}
