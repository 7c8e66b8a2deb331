// Integration tests for `ApiClient` using wiremock.
#![allow(clippy::unwrap_used)]

use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use schoolbus_api::{ApiClient, Error, ListParams, Page, TransportConfig};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Bus {
    id: u64,
    plate_number: String,
    capacity: u32,
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn list_forwards_paging_and_filters() {
    let (server, client) = setup().await;

    let body = json!({
        "data": [
            { "id": 1, "plateNumber": "AB-123-CD", "capacity": 40 },
            { "id": 2, "plateNumber": "EF-456-GH", "capacity": 30 }
        ],
        "pagination": { "page": 2, "limit": 2, "totalPages": 3 }
    });

    Mock::given(method("GET"))
        .and(path("/buses"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "2"))
        .and(query_param("establishmentId", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let params = ListParams::new(2, 2).with_param("establishmentId", 7);
    let page: Page<Bus> = client.list("buses", &params).await.unwrap();

    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[1].plate_number, "EF-456-GH");
}

#[tokio::test]
async fn base_url_with_path_prefix_is_preserved() {
    let server = MockServer::start().await;
    let client =
        ApiClient::from_reqwest(&format!("{}/api", server.uri()), reqwest::Client::new())
            .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/buses/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4, "plateNumber": "ZZ-000-ZZ", "capacity": 12
        })))
        .mount(&server)
        .await;

    let bus: Bus = client.get("buses", 4).await.unwrap();
    assert_eq!(bus.id, 4);
}

#[tokio::test]
async fn create_posts_payload_and_returns_backend_identity() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/buses"))
        .and(body_json(json!({ "plateNumber": "NEW-1", "capacity": 20 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 99, "plateNumber": "NEW-1", "capacity": 20
        })))
        .mount(&server)
        .await;

    let created: Bus = client
        .create("buses", &json!({ "plateNumber": "NEW-1", "capacity": 20 }))
        .await
        .unwrap();
    assert_eq!(created.id, 99);
}

#[tokio::test]
async fn bearer_token_is_sent() {
    let server = MockServer::start().await;
    let token = secrecy::SecretString::from("s3cret".to_owned());
    let client = ApiClient::new(&server.uri(), Some(&token), &TransportConfig::default()).unwrap();

    Mock::given(method("DELETE"))
        .and(path("/buses/3"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.delete("buses", 3).await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn unauthorized_maps_to_invalid_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result: Result<Page<Bus>, _> = client.list("buses", &ListParams::default()).await;
    assert!(matches!(result, Err(Error::InvalidToken)));
}

#[tokio::test]
async fn backend_message_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/students/5"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Élève introuvable" })),
        )
        .mount(&server)
        .await;

    let err = client
        .update::<serde_json::Value, _>("students", 5, &json!({ "firstName": "A" }))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::Api { message, status } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Élève introuvable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_message_falls_back_to_reason_phrase() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.delete("routes", 1).await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.to_string(), "Backend error (HTTP 500): Internal Server Error");
}

#[tokio::test]
async fn malformed_body_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/buses/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.get::<Bus>("buses", 1).await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { ref body, .. } if body == "not json"));
}
