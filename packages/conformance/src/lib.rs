//! Shared helpers for the maki-remote conformance test suite.
//!
//! Provides [`spawn_mock_node`] — binds a `TcpListener` on an ephemeral
//! port and serves a small Maki node from memory — and
//! [`spawn_with_discovery`] for nodes whose `OPTIONS /` answer is supplied
//! by the test.
//!
//! # Mock node routes
//!
//! | Method | Path | Behaviour |
//! |--------|------|-----------|
//! | OPTIONS | `/` | [`discovery_document`] |
//! | GET | `/people` | all stored people, in id order |
//! | POST | `/people` | store body, answer `303` to `/people/{id}` |
//! | GET | `/people/{id}` | one person, `404` if unknown |
//! | PATCH | `/people/{id}` | shallow-merge body into the person |
//! | PUT | `/echo` | answer with the request body |
//! | GET | `/empty` | `204`, no body |
//! | GET | `/broken` | `500` |
//! | GET | `/garbage` | `200` with a non-JSON body |

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, options, put},
    Json, Router,
};
use maki_remote_api::{DiscoveryResponse, ResourceDescriptor};
use serde_json::{json, Value};

/// In-memory people collection behind the mock node.
#[derive(Default)]
pub struct MockStore {
    people: RwLock<BTreeMap<u64, Value>>,
    next_id: AtomicU64,
}

impl MockStore {
    pub fn person(&self, id: u64) -> Option<Value> {
        self.people.read().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.people.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, mut person: Value) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(obj) = person.as_object_mut() {
            obj.insert("id".into(), json!(id));
        }
        self.people.write().unwrap().insert(id, person);
        id
    }
}

/// What the mock node answers to `OPTIONS /`.
///
/// `Person` has no components, `Place` overrides `get`, `Thing` adds a role.
pub fn discovery_document() -> Value {
    let mut person = serde_json::to_value(
        ResourceDescriptor::new("Person").with_description("Somebody we know."),
    )
    .unwrap();
    // Leave components out entirely; the client must fill them in.
    person.as_object_mut().unwrap().remove("components");
    person["routes"] = json!({ "query": "/people", "get": "/people/:id" });
    person["attributes"] = json!({ "name": { "type": "String", "required": true } });

    let place = json!({
        "name": "Place",
        "components": { "get": "custom-get" },
        "names": { "plural": "Places" }
    });

    let thing = serde_json::to_value(
        ResourceDescriptor::new("Thing").with_component("list", "thing-list"),
    )
    .unwrap();

    json!({ "name": "mock maki node", "resources": [person, place, thing] })
}

/// Start the full mock node. Returns `(host:port, store)`.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn spawn_mock_node() -> (String, Arc<MockStore>) {
    let store = Arc::new(MockStore::default());
    let router = Router::new()
        .route("/", options(|| async { Json(discovery_document()) }))
        .route("/people", get(list_people).post(create_person))
        .route("/people/{id}", get(get_person).patch(patch_person))
        .route("/echo", put(|Json(body): Json<Value>| async move { Json(body) }))
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/garbage", get(|| async { "<html>not json</html>" }))
        .with_state(Arc::clone(&store));

    (serve(router).await, store)
}

/// Start a node whose only route is `OPTIONS /`, answering `discovery`.
pub async fn spawn_with_discovery(discovery: Value) -> String {
    let router = Router::new().route(
        "/",
        options(move || {
            let body = discovery.clone();
            async move { Json(body) }
        }),
    );
    serve(router).await
}

/// A discovery body built from typed descriptors, as a real node would send.
pub fn typed_discovery(resources: Vec<ResourceDescriptor>) -> Value {
    serde_json::to_value(DiscoveryResponse { resources }).unwrap()
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock node error");
    });
    addr.to_string()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_people(State(store): State<Arc<MockStore>>) -> Json<Vec<Value>> {
    Json(store.people.read().unwrap().values().cloned().collect())
}

async fn create_person(State(store): State<Arc<MockStore>>, Json(body): Json<Value>) -> Response {
    if !body.is_object() {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    }
    let id = store.insert(body);
    Redirect::to(&format!("/people/{id}")).into_response()
}

async fn get_person(State(store): State<Arc<MockStore>>, Path(id): Path<u64>) -> Response {
    match store.person(id) {
        Some(p) => Json(p).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn patch_person(
    State(store): State<Arc<MockStore>>,
    Path(id): Path<u64>,
    Json(patch): Json<Value>,
) -> Response {
    let mut people = store.people.write().unwrap();
    let (Some(person), Some(fields)) = (
        people.get_mut(&id).and_then(Value::as_object_mut),
        patch.as_object(),
    ) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    for (k, v) in fields {
        person.insert(k.clone(), v.clone());
    }
    Json(Value::Object(person.clone())).into_response()
}
