//! End-to-end reconciliation against a mocked TrafficJam instance
//!
//! Runs the reqwest-backed client through the full pipeline so the wire
//! encoding, guard listing and outcome interpretation are checked together.

use serde_json::json;
use trafficjam_client::{PayloadEncoding, TrafficJamClient};
use trafficjam_reconciler::{Connection, DesiredState, Reconciler, ResourceDescriptor, ResourceKind};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn connection(server: &MockServer) -> Connection {
    let address = server.address();
    let mut connection = Connection::new(address.ip().to_string());
    connection.port = address.port();
    connection.timeout = 5;
    connection
}

fn reconciler() -> Reconciler {
    Reconciler::new(TrafficJamClient::new().expect("Failed to create client"))
}

#[tokio::test]
async fn test_vrf_created_with_query_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trafficjam/api/vrfs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "mgmt", "table": 10}])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/trafficjam/api/vrfs"))
        .and(query_param("name", "testvrf"))
        .and(query_param("table", "111"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 2, "name": "testvrf", "table": 111})))
        .expect(1)
        .mount(&server)
        .await;

    let descriptor = ResourceDescriptor::new(ResourceKind::Vrf, DesiredState::Present, connection(&server))
        .with_field("vrf_name", "testvrf")
        .with_field("vrf_table_id", 111);

    let outcome = reconciler().reconcile(&descriptor).await.expect("Reconcile should succeed");

    assert!(outcome.changed);
    assert!(!outcome.failed);
    assert_eq!(outcome.status_code, Some(201));
    assert_eq!(outcome.response.unwrap()["id"], 2);
}

#[tokio::test]
async fn test_existing_bridge_blocks_post() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trafficjam/api/interfaces/bridges"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 10, "name": "test_bridge"}])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let descriptor = ResourceDescriptor::new(ResourceKind::Bridge, DesiredState::Present, connection(&server))
        .with_field("name", "test_bridge");

    let outcome = reconciler().reconcile(&descriptor).await.expect("Reconcile should succeed");

    assert!(outcome.failed);
    assert_eq!(outcome.msg.as_deref(), Some("bridge interface already exists"));
}

#[tokio::test]
async fn test_json_encoding_subinterface_update() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/trafficjam/api/interfaces/physicals/2/subinterfaces/7"))
        .and(wiremock::matchers::body_json(json!({"description": "uplink"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let descriptor = ResourceDescriptor::new(ResourceKind::Physical, DesiredState::Present, connection(&server))
        .with_subinterface(true)
        .with_field("physical_id", 2)
        .with_field("subinterface_id", 7)
        .with_field("description", "uplink");

    let client = TrafficJamClient::with_encoding(PayloadEncoding::Json).expect("Failed to create client");
    let outcome = Reconciler::new(client)
        .reconcile(&descriptor)
        .await
        .expect("Reconcile should succeed");

    assert!(outcome.changed);
    assert_eq!(outcome.status_code, Some(200));
}

#[tokio::test]
async fn test_query_with_undecodable_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trafficjam/api/interfaces"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let descriptor = ResourceDescriptor::new(ResourceKind::InterfaceCollection, DesiredState::Query, connection(&server));
    let outcome = reconciler().reconcile(&descriptor).await.expect("Reconcile should succeed");

    assert!(outcome.failed);
    assert!(!outcome.changed);
    assert_eq!(outcome.status_code, Some(500));
    assert!(outcome.response.is_none());
}
