//! Integration tests for the GraphQL execution path, against a mock server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopify_admin_api::{ApiError, Credential, GraphqlClient, RetryPolicy, ShopDomain};

fn create_test_credential() -> Arc<Credential> {
    Arc::new(Credential::offline(
        ShopDomain::new("test-store").unwrap(),
        "shpat_test_token",
        "read_products".parse().unwrap(),
    ))
}

async fn create_test_client(server: &MockServer) -> (GraphqlClient, Arc<Credential>) {
    let credential = create_test_credential();
    let client = GraphqlClient::with_transport(Arc::clone(&credential), reqwest::Client::new())
        .with_api_base(server.uri())
        .with_retry_policy(RetryPolicy::new(
            3,
            Duration::from_millis(1),
            Duration::from_millis(5),
        ));
    (client, credential)
}

#[tokio::test]
async fn test_successful_query_returns_data_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .and(header("X-Shopify-Access-Token", "shpat_test_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"shop": {"name": "Test Shop"}}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let data = client
        .execute("query { shop { name } }", None, None, false)
        .await
        .unwrap();

    assert_eq!(data["shop"]["name"], "Test Shop");
}

#[tokio::test]
async fn test_success_with_cost_envelope_syncs_throttle_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"shop": {"name": "Test Shop"}},
            "extensions": {
                "cost": {
                    "requestedQueryCost": 42,
                    "actualQueryCost": 37,
                    "throttleStatus": {
                        "maximumAvailable": 1000.0,
                        "currentlyAvailable": 963.0,
                        "restoreRate": 50.0
                    }
                }
            }
        })))
        .mount(&server)
        .await;

    let (client, credential) = create_test_client(&server).await;
    client
        .execute("query { shop { name } }", None, None, false)
        .await
        .unwrap();

    let state = credential.graphql_state().await;
    assert_eq!(state.tokens(), 963);
    assert_eq!(state.leak_rate(), 50);
    assert_eq!(state.bucket_max(), 1000);
}

#[tokio::test]
async fn test_data_with_errors_is_hard_failure_unless_suppressed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"shop": null},
            "errors": [{"message": "Access denied for shop field"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let error = client
        .execute("query { shop { name } }", None, None, false)
        .await
        .unwrap_err();

    // The full payload is preserved for the caller to inspect.
    match error {
        ApiError::PlatformFault { message } => {
            assert!(message.contains("Access denied for shop field"));
            assert!(message.contains("\"data\""));
        }
        other => panic!("expected PlatformFault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_suppressed_errors_still_classify_by_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"shop": null},
            "errors": [{"message": "Field 'bogus' doesn't exist on type 'Shop'"}]
        })))
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let error = client
        .execute("query { shop { bogus } }", None, None, true)
        .await
        .unwrap_err();

    match error {
        ApiError::PlatformFault { message } => {
            assert!(message.contains("GraphQL query is incorrect"));
            assert!(message.contains("'bogus'"));
        }
        other => panic!("expected PlatformFault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_token_string_flags_credential_and_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": "[API] Invalid API key or access token (unrecognized login or wrong password)"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, credential) = create_test_client(&server).await;
    assert!(!credential.access_token_invalid());

    let error = client
        .execute("query { shop { name } }", None, None, false)
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::InvalidAccessToken { .. }));
    assert!(credential.access_token_invalid());
}

#[tokio::test]
async fn test_max_cost_exceeded_is_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{
                "message": "Query cost is 25000, which exceeds the single query max cost limit (1000)",
                "extensions": {"code": "MAX_COST_EXCEEDED"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let error = client
        .execute("query { everything }", None, None, false)
        .await
        .unwrap_err();

    // Exactly one network call: the query can never succeed as written.
    assert!(matches!(error, ApiError::ExceedingMaxCost { .. }));
}

#[tokio::test]
async fn test_throttled_sleeps_then_retries_and_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{
                "message": "Throttled",
                "extensions": {"code": "THROTTLED"}
            }],
            "extensions": {
                "cost": {
                    "requestedQueryCost": 100,
                    "actualQueryCost": null,
                    "throttleStatus": {
                        "maximumAvailable": 1000.0,
                        "currentlyAvailable": 50.0,
                        "restoreRate": 50.0
                    }
                }
            }
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"orders": []}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let started = Instant::now();
    let data = client
        .execute("query { orders { id } }", None, None, false)
        .await
        .unwrap();

    // Exactly two network calls with one computed sleep in between:
    // ceil((100 - 50) / 50) = 1 second.
    assert_eq!(data, json!({"orders": []}));
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_operation_name_required_is_caller_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "An operation name is required"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let error = client
        .execute(
            "query A { shop { name } } query B { shop { id } }",
            None,
            None,
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::CallerFault { .. }));
}

#[tokio::test]
async fn test_wrong_operation_name_is_caller_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "No operation named \"GetShop\""}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let error = client
        .execute(
            "query Different { shop { name } }",
            None,
            Some("GetShop"),
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::CallerFault { .. }));
}

#[tokio::test]
async fn test_500_is_intermittent_and_retried_until_exhaustion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let error = client
        .execute("query { shop { name } }", None, None, false)
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Intermittent { status: 500 }));
}

#[tokio::test]
async fn test_503_retry_can_recover() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let data = client
        .execute("query { shop { name } }", None, None, false)
        .await
        .unwrap();
    assert_eq!(data["ok"], true);
}

#[tokio::test]
async fn test_other_non_200_is_hard_failure_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"errors": "Unavailable Shop"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let error = client
        .execute("query { shop { name } }", None, None, false)
        .await
        .unwrap_err();

    match error {
        ApiError::PlatformFault { message } => {
            assert!(message.contains("GQL query failed, status code: 403"));
            assert!(message.contains("Unavailable Shop"));
        }
        other => panic!("expected PlatformFault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_corrupt_body_is_retried_then_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>garbage</html>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let data = client
        .execute("query { shop { name } }", None, None, false)
        .await
        .unwrap();
    assert_eq!(data["ok"], true);
}

#[tokio::test]
async fn test_missing_data_field_on_clean_response_is_platform_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"extensions": {}})))
        .mount(&server)
        .await;

    let (client, _credential) = create_test_client(&server).await;
    let error = client
        .execute("query { shop { name } }", None, None, false)
        .await
        .unwrap_err();

    match error {
        ApiError::PlatformFault { message } => {
            assert!(message.contains("no data field"));
        }
        other => panic!("expected PlatformFault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_access_token_fails_without_network_call() {
    let server = MockServer::start().await;

    let credential = Arc::new(Credential::uninitialized(
        ShopDomain::new("test-store").unwrap(),
    ));
    let client = GraphqlClient::with_transport(Arc::clone(&credential), reqwest::Client::new())
        .with_api_base(server.uri());

    let error = client
        .execute("query { shop { name } }", None, None, false)
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::MissingAccessToken { .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}
