use super::*;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use shared::protocol::ALBUM_PAGE_OPERATION;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct GraphqlServerState {
    status: StatusCode,
    body: Value,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn handle_graphql(
    State(state): State<GraphqlServerState>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state.seen.lock().await.push((auth, request));
    (state.status, Json(state.body.clone()))
}

async fn spawn_graphql_server(
    status: StatusCode,
    body: Value,
) -> Result<(String, Arc<Mutex<Vec<(Option<String>, Value)>>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = GraphqlServerState {
        status,
        body,
        seen: Arc::clone(&seen),
    };
    let app = Router::new()
        .route("/api/graphql", post(handle_graphql))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api/graphql"), seen))
}

fn album_body(media: Value) -> Value {
    json!({
        "data": {
            "album": {
                "__typename": "Album",
                "id": "5",
                "title": "Mountains",
                "subAlbums": [
                    {
                        "id": "6",
                        "title": "Peaks",
                        "thumbnail": { "thumbnail": { "url": "https://photos.example/6.jpg" } }
                    }
                ],
                "media": media
            }
        }
    })
}

#[tokio::test]
async fn fetches_album_page_with_paging_variables() {
    let body = album_body(json!([
        { "id": "1", "blurhash": "abc", "thumbnail": null, "favorite": true },
        { "id": "2", "blurhash": null, "thumbnail": { "url": "u", "width": 3, "height": 4 }, "favorite": false }
    ]));
    let (url, seen) = spawn_graphql_server(StatusCode::OK, body)
        .await
        .expect("spawn server");
    let client = GraphqlAlbumClient::new(&url)
        .expect("client")
        .with_auth_token("secret-token");

    let page = client
        .fetch_album_page(&AlbumId::from("5"), 200, 400)
        .await
        .expect("page");

    let album = page.album.expect("album");
    assert_eq!(album.title, "Mountains");
    assert_eq!(album.media.len(), 2);
    assert_eq!(
        album.sub_albums[0].thumbnail_url(),
        Some("https://photos.example/6.jpg")
    );

    let seen = seen.lock().await;
    assert_eq!(seen.len(), 1);
    let (auth, request) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer secret-token"));
    assert_eq!(request["operationName"], ALBUM_PAGE_OPERATION);
    assert_eq!(request["variables"]["albumID"], "5");
    assert_eq!(request["variables"]["limit"], 200);
    assert_eq!(request["variables"]["offset"], 400);
}

#[tokio::test]
async fn null_album_maps_to_missing_album() {
    let (url, _seen) = spawn_graphql_server(StatusCode::OK, json!({ "data": { "album": null } }))
        .await
        .expect("spawn server");
    let client = GraphqlAlbumClient::new(&url).expect("client");

    let page = client
        .fetch_album_page(&AlbumId::from("5"), 200, 0)
        .await
        .expect("page");

    assert!(page.album.is_none());
}

#[tokio::test]
async fn graphql_errors_fail_the_fetch() {
    let (url, _seen) = spawn_graphql_server(
        StatusCode::OK,
        json!({ "data": null, "errors": [{ "message": "album not found", "path": ["album"] }] }),
    )
    .await
    .expect("spawn server");
    let client = GraphqlAlbumClient::new(&url).expect("client");

    let err = client
        .fetch_album_page(&AlbumId::from("5"), 200, 0)
        .await
        .expect_err("must fail");

    assert!(err.to_string().contains("album not found"), "unexpected error: {err}");
}

#[tokio::test]
async fn server_error_status_fails_the_fetch() {
    let (url, _seen) = spawn_graphql_server(StatusCode::INTERNAL_SERVER_ERROR, json!({}))
        .await
        .expect("spawn server");
    let client = GraphqlAlbumClient::new(&url).expect("client");

    let err = client
        .fetch_album_page(&AlbumId::from("5"), 200, 0)
        .await
        .expect_err("must fail");

    assert!(err.to_string().contains("500"), "unexpected error: {err}");
}

#[tokio::test]
async fn paginator_pages_through_graphql_endpoint() {
    let body = album_body(json!([
        { "id": 10, "favorite": false },
        { "id": 11, "favorite": true }
    ]));
    let (url, seen) = spawn_graphql_server(StatusCode::OK, body)
        .await
        .expect("spawn server");
    let client = Arc::new(GraphqlAlbumClient::new(&url).expect("client"));
    let media = crate::media_state::MediaListState::new();
    let paginator = crate::paginator::AlbumPaginator::new(client, Arc::clone(&media));

    let outcome = paginator.start_session(AlbumId::from("5")).await;

    assert!(matches!(
        outcome,
        crate::paginator::LoadOutcome::Appended { count: 2, total: 2 }
    ));
    let ids: Vec<String> = media
        .items()
        .await
        .expect("items")
        .into_iter()
        .map(|item| item.id.0)
        .collect();
    assert_eq!(ids, vec!["10", "11"]);
    assert_eq!(seen.lock().await.len(), 1);
}

#[test]
fn rejects_non_http_endpoints() {
    assert!(GraphqlAlbumClient::new("not a url").is_err());
    assert!(GraphqlAlbumClient::new("ftp://photos.example/graphql").is_err());
    let client = GraphqlAlbumClient::new("https://photos.example/api/graphql").expect("client");
    assert_eq!(client.endpoint().path(), "/api/graphql");
}
