//! HTTP-level tests for the backend client
//!
//! A mockito server stands in for the hosted API.

use atelier_common::config::{AirtableConfig, BackendCredentials};
use atelier_site::airtable::{
    AirtableClient, Backend, BackendError, Filter, SelectQuery, SortDirection, Table,
};
use atelier_site::{DataAccessContext, DataAccessOptions};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;

const ARTISTS_PATH: &str = "/v0/appTEST/Artists";

fn client_for(server: &ServerGuard) -> AirtableClient {
    let settings = AirtableConfig {
        api_url: format!("{}/v0", server.url()),
        request_timeout_secs: 5,
        ..AirtableConfig::default()
    };
    let credentials = BackendCredentials {
        api_key: "keyTEST".to_string(),
        base_id: "appTEST".to_string(),
    };
    AirtableClient::new(credentials, &settings).unwrap()
}

fn artist_json(id: &str, name: &str) -> serde_json::Value {
    json!({ "id": id, "createdTime": "2024-01-01T00:00:00.000Z", "fields": { "Name": name } })
}

#[tokio::test]
async fn test_select_sends_auth_and_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", ARTISTS_PATH)
        .match_header("authorization", "Bearer keyTEST")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("pageSize".into(), "100".into()),
            Matcher::UrlEncoded("sort[0][field]".into(), "Name".into()),
            Matcher::UrlEncoded("sort[0][direction]".into(), "asc".into()),
            Matcher::UrlEncoded("filterByFormula".into(), "{Featured} = 1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "records": [artist_json("rec1", "Sarah Chen")] }).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let query = SelectQuery::all()
        .sort_by("Name", SortDirection::Asc)
        .filter(Filter::FeaturedOnly);
    let records = client.select(Table::Artists, &query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "rec1");
    assert_eq!(records[0].field("Name"), Some(&json!("Sarah Chen")));
}

#[tokio::test]
async fn test_select_follows_pages() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", ARTISTS_PATH)
        .match_query(Matcher::Regex("^pageSize=100$".into()))
        .with_status(200)
        .with_body(
            json!({
                "records": [artist_json("rec1", "A"), artist_json("rec2", "B")],
                "offset": "page2"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", ARTISTS_PATH)
        .match_query(Matcher::UrlEncoded("offset".into(), "page2".into()))
        .with_status(200)
        .with_body(json!({ "records": [artist_json("rec3", "C")] }).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let records = client.select(Table::Artists, &SelectQuery::all()).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["rec1", "rec2", "rec3"]);
}

#[tokio::test]
async fn test_table_name_with_space() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex(r"^/v0/appTEST/Quick(%20| )Facts".into()))
        .match_query(Matcher::UrlEncoded("pageSize".into(), "100".into()))
        .with_status(200)
        .with_body(r#"{"records":[]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let records = client.select(Table::QuickFacts, &SelectQuery::all()).await.unwrap();

    mock.assert_async().await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_status_mapping() {
    let mut server = Server::new_async().await;
    let client = client_for(&server);

    let unauthorized = server
        .mock("GET", ARTISTS_PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error":"AUTHENTICATION_REQUIRED"}"#)
        .create_async()
        .await;
    let result = client.select(Table::Artists, &SelectQuery::all()).await;
    assert!(matches!(result, Err(BackendError::Unauthorized(401))));
    unauthorized.remove_async().await;

    let limited = server
        .mock("GET", ARTISTS_PATH)
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;
    let result = client.select(Table::Artists, &SelectQuery::all()).await;
    assert!(matches!(result, Err(BackendError::RateLimitExceeded)));
    limited.remove_async().await;

    server
        .mock("GET", ARTISTS_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;
    match client.select(Table::Artists, &SelectQuery::all()).await {
        Err(BackendError::ApiError(500, body)) => assert_eq!(body, "upstream exploded"),
        other => panic!("expected ApiError(500), got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", ARTISTS_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client.select(Table::Artists, &SelectQuery::all()).await;
    assert!(matches!(result, Err(BackendError::ParseError(_))));
}

#[tokio::test]
async fn test_data_access_over_http() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", ARTISTS_PATH)
        .match_query(Matcher::UrlEncoded("filterByFormula".into(), "RECORD_ID() = 'rec7'".into()))
        .with_status(200)
        .with_body(
            json!({
                "records": [{
                    "id": "rec7",
                    "fields": {
                        "Name": "Elena Petrov",
                        "Tags": ["installation"],
                        "Featured": true,
                        "ThemePrimaryColor": "#17624A"
                    }
                }]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let ctx = DataAccessContext::new(Arc::new(client_for(&server)), DataAccessOptions::default());

    let artist = ctx.get_artist_by_id("rec7").await.unwrap();
    assert_eq!(artist.name, "Elena Petrov");
    assert_eq!(artist.tags(), ["installation".to_string()]);
    assert!(artist.is_featured());

    // Served from cache the second time
    ctx.get_artist_by_id("rec7").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_repeated_offset_stops_paging() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", ARTISTS_PATH)
        .match_query(Matcher::Regex("^pageSize=100$".into()))
        .with_status(200)
        .with_body(json!({ "records": [artist_json("rec1", "A")], "offset": "stuck" }).to_string())
        .expect(1)
        .create_async()
        .await;
    let stuck = server
        .mock("GET", ARTISTS_PATH)
        .match_query(Matcher::UrlEncoded("offset".into(), "stuck".into()))
        .with_status(200)
        .with_body(json!({ "records": [artist_json("rec2", "B")], "offset": "stuck" }).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let records = client.select(Table::Artists, &SelectQuery::all()).await.unwrap();

    first.assert_async().await;
    stuck.assert_async().await;
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["rec1", "rec2"]);
}
