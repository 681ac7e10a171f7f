use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use vault_manager_vault::{VaultClient, VaultConfig, VaultError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> VaultClient {
    VaultClient::new(VaultConfig::new(server.uri(), "s.test-token")).unwrap()
}

#[tokio::test]
async fn test_list_policies_sends_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sys/policy"))
        .and(header("X-Vault-Token", "s.test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "policies": ["default", "ops", "root"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let names = client(&server).list_policies().await.unwrap();
    assert_eq!(names, vec!["default", "ops", "root"]);
}

#[tokio::test]
async fn test_list_policies_accepts_data_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sys/policy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "policies": ["default"] }
        })))
        .mount(&server)
        .await;

    let names = client(&server).list_policies().await.unwrap();
    assert_eq!(names, vec!["default"]);
}

#[tokio::test]
async fn test_list_policies_rejects_unexpected_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sys/policy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": 3 })))
        .mount(&server)
        .await;

    let err = client(&server).list_policies().await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_read_policy_returns_rules() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sys/policy/ops"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "ops",
            "rules": "path \"secret/*\" { capabilities = [\"read\"] }"
        })))
        .mount(&server)
        .await;

    let rules = client(&server).read_policy("ops").await.unwrap();
    assert_eq!(rules, "path \"secret/*\" { capabilities = [\"read\"] }");
}

#[tokio::test]
async fn test_put_policy_sends_policy_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/sys/policy/ops"))
        .and(header("X-Vault-Token", "s.test-token"))
        .and(body_json(json!({ "policy": "path \"a\" {}" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .put_policy("ops", "path \"a\" {}")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_policy() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/sys/policy/ops"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete_policy("ops").await.unwrap();
}

#[tokio::test]
async fn test_vault_errors_are_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/sys/policy/ops"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": ["permission denied"]
        })))
        .mount(&server)
        .await;

    let err = client(&server).put_policy("ops", "x").await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));
    assert!(err.to_string().contains("permission denied"));
}

#[tokio::test]
async fn test_namespace_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sys/policy"))
        .and(header("X-Vault-Namespace", "team-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "policies": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = VaultClient::new(
        VaultConfig::new(server.uri(), "t").with_namespace(Some("team-a".to_string())),
    )
    .unwrap();
    assert!(client.list_policies().await.unwrap().is_empty());
}

/// Serves one response whose body ends before its declared length.
async fn truncated_body_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 200\r\n\r\n{\"policies\": [")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_body_read_failure_is_a_transport_error() {
    let address = truncated_body_server().await;
    let client = VaultClient::new(VaultConfig::new(address, "s.test-token")).unwrap();

    let err = client.list_policies().await.unwrap_err();
    assert!(matches!(err, VaultError::Http(_)), "got {err:?}");
}
