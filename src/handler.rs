//! HTTP surface
//!
//! Routes the whole protocol: the root redirect, the long-lived streaming
//! room view, the one-shot CSS trigger endpoints, and the health snapshot.
//! Path ids that fail to parse are rejected here with a 400 and never reach
//! the core.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::debug;
use uuid::Uuid;

use crate::action::Action;
use crate::registry::RoomRegistry;
use crate::session::ClientSession;
use crate::types::{Key, RoomId, SenderId};

/// Per-session fragment channel capacity
const FRAGMENT_BUFFER_SIZE: usize = 32;

/// Build the application router
pub fn router(registry: RoomRegistry) -> Router {
    Router::new()
        .route("/", get(redirect_to_fresh_room))
        .route("/health", get(health))
        .route("/key-down/:room_id/:sender_id/:key/:nonce", get(key_down))
        .route("/key-up/:room_id/:sender_id/:key/:nonce", get(key_up))
        .route("/send-down/:room_id/:sender_id/:nonce", get(send_down))
        .route("/send-up/:room_id/:sender_id/:nonce", get(send_up))
        .route("/:room_id", get(watch_room))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// `GET /` - every visit gets its own room
async fn redirect_to_fresh_room() -> Redirect {
    Redirect::to(&format!("/{}", RoomId::new()))
}

/// `GET /{room_id}` - the long-lived viewing connection
///
/// Joins (or creates) the room, spawns the session loop, and hands the
/// session's fragment channel back as a streaming body. When the client
/// goes away the body and its receiver are dropped together; the watcher
/// task turns that into a cancellation, and the session's teardown releases
/// the room reference.
async fn watch_room(
    State(registry): State<RoomRegistry>,
    Path(room_id): Path<RoomId>,
) -> Response {
    let room = registry.get_or_create(room_id);
    let (tx, rx) = mpsc::channel(FRAGMENT_BUFFER_SIZE);
    let cancel = CancellationToken::new();

    let disconnected = tx.clone();
    let on_disconnect = cancel.clone();
    tokio::spawn(async move {
        disconnected.closed().await;
        on_disconnect.cancel();
    });

    let session = ClientSession::new(room, tx);
    debug!("session {} opened for room {}", session.id(), room_id);
    tokio::spawn(session.run(cancel));

    let fragments = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        Body::from_stream(fragments),
    )
        .into_response()
}

/// `GET /key-down/{room_id}/{sender_id}/{key}/{nonce}`
async fn key_down(
    State(registry): State<RoomRegistry>,
    Path((room_id, sender_id, key, _nonce)): Path<(RoomId, SenderId, Key, Uuid)>,
) -> StatusCode {
    publish(&registry, room_id, Action::KeyDown {
        sender: sender_id,
        key,
    })
}

/// `GET /key-up/{room_id}/{sender_id}/{key}/{nonce}`
async fn key_up(
    State(registry): State<RoomRegistry>,
    Path((room_id, sender_id, key, _nonce)): Path<(RoomId, SenderId, Key, Uuid)>,
) -> StatusCode {
    publish(&registry, room_id, Action::KeyUp {
        sender: sender_id,
        key,
    })
}

/// `GET /send-down/{room_id}/{sender_id}/{nonce}`
async fn send_down(
    State(registry): State<RoomRegistry>,
    Path((room_id, sender_id, _nonce)): Path<(RoomId, SenderId, Uuid)>,
) -> StatusCode {
    publish(&registry, room_id, Action::SendDown { sender: sender_id })
}

/// `GET /send-up/{room_id}/{sender_id}/{nonce}`
async fn send_up(
    State(registry): State<RoomRegistry>,
    Path((room_id, sender_id, _nonce)): Path<(RoomId, SenderId, Uuid)>,
) -> StatusCode {
    publish(&registry, room_id, Action::SendUp { sender: sender_id })
}

/// Publish a one-shot action without taking a room reference
///
/// An action aimed at a room nobody is watching is dropped - the trigger
/// endpoints never create rooms. Always 204: the browser only cares that
/// the background-image request completes.
fn publish(registry: &RoomRegistry, room_id: RoomId, action: Action) -> StatusCode {
    match registry.find(room_id) {
        Some(room) => room.publish(action),
        None => debug!("dropping {:?} for absent room {}", action, room_id),
    }
    StatusCode::NO_CONTENT
}

/// `GET /health` - plain-text room listing
async fn health(State(registry): State<RoomRegistry>) -> String {
    let rooms = registry.snapshot();
    let mut body = format!("Rooms: ({})\n", rooms.len());
    for (id, members) in rooms {
        body.push_str(&format!("\t{}: {}\n", id, members));
    }
    body
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::to_bytes;
    use axum::http::Request;
    use tokio::time::timeout;
    use tower::ServiceExt;

    use super::*;

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root_redirects_to_fresh_room() {
        let app = router(RoomRegistry::new());
        let response = app.oneshot(get_request("/")).await.unwrap();

        assert!(response.status().is_redirection());
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        let room_id = location.strip_prefix('/').unwrap();
        assert!(room_id.parse::<Uuid>().is_ok());
    }

    #[tokio::test]
    async fn test_health_lists_rooms_and_members() {
        let registry = RoomRegistry::new();
        let room_id = RoomId::new();
        let _a = registry.get_or_create(room_id);
        let _b = registry.get_or_create(room_id);

        let app = router(registry);
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.starts_with("Rooms: (1)\n"));
        assert!(body.contains(&format!("\t{}: 2\n", room_id)));
    }

    #[tokio::test]
    async fn test_health_with_no_rooms() {
        let app = router(RoomRegistry::new());
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(body_string(response).await, "Rooms: (0)\n");
    }

    #[tokio::test]
    async fn test_trigger_on_absent_room_is_a_no_op() {
        let registry = RoomRegistry::new();
        let app = router(registry.clone());

        let uri = format!(
            "/key-down/{}/{}/cowboy/{}",
            RoomId::new(),
            SenderId::new(),
            Uuid::new_v4()
        );
        let response = app.oneshot(get_request(&uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        // The trigger did not conjure a room.
        assert_eq!(registry.room_count(), 0);
    }

    #[tokio::test]
    async fn test_trigger_reaches_a_watched_room() {
        let registry = RoomRegistry::new();
        let room_id = RoomId::new();
        let guard = registry.get_or_create(room_id);
        let mut subscription = guard.subscribe();

        let sender = SenderId::new();
        let uri = format!("/send-down/{}/{}/{}", room_id, sender, Uuid::new_v4());
        let app = router(registry.clone());
        let response = app.oneshot(get_request(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let cancel = CancellationToken::new();
        let action = subscription.next_action(&cancel).await.unwrap();
        assert_eq!(action, Action::SendDown { sender });
    }

    #[tokio::test]
    async fn test_malformed_ids_are_rejected() {
        let app = router(RoomRegistry::new());

        let bad_room = format!(
            "/key-up/not-a-uuid/{}/cowboy/{}",
            SenderId::new(),
            Uuid::new_v4()
        );
        let response = app.clone().oneshot(get_request(&bad_room)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bad_key = format!(
            "/key-down/{}/{}/banana/{}",
            RoomId::new(),
            SenderId::new(),
            Uuid::new_v4()
        );
        let response = app.oneshot(get_request(&bad_key)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_watch_room_streams_html_and_joins() {
        let registry = RoomRegistry::new();
        let room_id = RoomId::new();
        let app = router(registry.clone());

        let response = app
            .oneshot(get_request(&format!("/{}", room_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(registry.find(room_id).unwrap().member_count(), 1);

        // Dropping the response drops the body stream; the session notices
        // and releases the room.
        drop(response);
        timeout(Duration::from_secs(1), async {
            while registry.find(room_id).is_some() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }
}
