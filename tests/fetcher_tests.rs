/// Pagination and envelope-handling tests for the Sportmonks client,
/// run against a mocked provider.
use sportmonks_sync::client::SportmonksClient;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(mock_server: &MockServer) -> SportmonksClient {
    SportmonksClient::new(mock_server.uri(), "test_token".to_string())
        .expect("client should build")
}

fn page(ids: std::ops::Range<i64>, current_page: u32, has_more: bool) -> serde_json::Value {
    serde_json::json!({
        "data": ids.map(|id| serde_json::json!({"id": id})).collect::<Vec<_>>(),
        "pagination": { "current_page": current_page, "has_more": has_more }
    })
}

#[tokio::test]
async fn concatenates_pages_in_order() {
    let mock_server = MockServer::start().await;

    // First request carries the token but no page cursor
    Mock::given(method("GET"))
        .and(path("/v3/football/teams"))
        .and(query_param("api_token", "test_token"))
        .and(query_param("filter", "populate"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1..6, 1, true)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/football/teams"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(6..8, 2, false)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let records = client
        .fetch("v3/football/teams", &[("filter", "populate")], None)
        .await
        .unwrap();

    let ids: Vec<i64> = records.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
}

#[tokio::test]
async fn no_results_message_is_a_valid_empty_set() {
    let mock_server = MockServer::start().await;

    // The sentinel wins even when a data array is present
    let body = serde_json::json!({
        "message": "No result(s) found matching your request.",
        "data": [ {"id": 1} ]
    });
    Mock::given(method("GET"))
        .and(path("/v3/football/venues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let records = client
        .fetch("v3/football/venues", &[], None)
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn other_messages_do_not_abort_the_fetch() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({
        "message": "You have reached 80% of your plan quota.",
        "data": [ {"id": 1}, {"id": 2} ]
    });
    Mock::given(method("GET"))
        .and(path("/v3/core/types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let records = client.fetch("v3/core/types", &[], None).await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn missing_data_without_sentinel_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/core/types"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"subscription": {}})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch("v3/core/types", &[], None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn limit_stops_pagination_without_truncating_a_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/football/players"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1..6, 1, true)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/football/players"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(6..11, 2, true)))
        .expect(1)
        .mount(&mock_server)
        .await;
    // The provider has a third page, but the limit is met after two
    Mock::given(method("GET"))
        .and(path("/v3/football/players"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(11..16, 3, true)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let records = client
        .fetch("v3/football/players", &[], Some(10))
        .await
        .unwrap();
    assert_eq!(records.len(), 10);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/football/fixtures"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch("v3/football/fixtures", &[], None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn single_object_data_becomes_a_one_record_list() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({
        "data": { "id": 10, "name": "2024/2025" }
    });
    Mock::given(method("GET"))
        .and(path("/v3/football/seasons/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let records = client
        .fetch("v3/football/seasons/10", &[], None)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], 10);
}
