//! End-to-end conformance tests for `maki-remote`.
//!
//! Each test spawns an in-process mock node (real TCP, real HTTP) via
//! [`maki_remote_conformance::spawn_mock_node`] or
//! [`maki_remote_conformance::spawn_with_discovery`] and drives it through a
//! [`Remote`].
//!
//! # Coverage
//!
//! | Test | Behaviour |
//! |------|-----------|
//! | `enumerate_fills_default_components` | missing components → both defaults |
//! | `enumerate_override_wins` | supplied `get` replaces the default only |
//! | `enumerate_passes_through_extra_fields` | routes / attributes / names / extra roles |
//! | `enumerate_preserves_order` | output order = remote order |
//! | `enumerate_keeps_non_string_values` | odd roles / descriptions do not sink the list |
//! | `enumerate_unreachable_node_is_empty` | transport failure → `[]` |
//! | `enumerate_without_resources_is_malformed` | explicit malformed condition |
//! | `put_echo_round_trips_any_json` | PUT echo returns the body deep-equal |
//! | `post_then_redirect_then_fetch` | 303 followed, caller sees created entity |
//! | `patch_merges_partial_body` | PATCH answer is the merged entity |
//! | `empty_body_is_distinct_from_failure` | 204 → `Ok(None)`, 500 → `Err` |
//! | `garbage_body_is_a_decode_failure` | non-JSON 200 → `Err(Decode)` |
//! | `concurrent_reads_share_one_node` | overlapping GETs on one `Remote` |
//! | `discovered_resources_can_be_remembered` | causal registry fed by enumerate |

use maki_remote::{Method, Remote, RemoteConfig, RemoteError, ResourceDescriptor};
use maki_remote_conformance::{spawn_mock_node, spawn_with_discovery, typed_discovery};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn remote_for(host: &str) -> Remote {
    Remote::new(RemoteConfig::new(host)).expect("build remote")
}

fn components(d: &ResourceDescriptor) -> Value {
    serde_json::to_value(&d.components).unwrap()
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enumerate_fills_default_components() {
    let (host, _) = spawn_mock_node().await;
    let resources = remote_for(&host).enumerate().await.unwrap();

    let person = &resources[0];
    assert_eq!(person.name, "Person");
    assert_eq!(
        components(person),
        json!({ "query": "maki-resource-query", "get": "maki-resource-get" })
    );
}

#[tokio::test]
async fn enumerate_override_wins() {
    let (host, _) = spawn_mock_node().await;
    let resources = remote_for(&host).enumerate().await.unwrap();

    assert_eq!(
        components(&resources[1]),
        json!({ "query": "maki-resource-query", "get": "custom-get" })
    );
}

#[tokio::test]
async fn enumerate_passes_through_extra_fields() {
    let (host, _) = spawn_mock_node().await;
    let resources = remote_for(&host).enumerate().await.unwrap();

    let person = &resources[0];
    assert_eq!(person.description_text(), Some("Somebody we know."));
    assert_eq!(
        person.routes,
        Some(json!({ "query": "/people", "get": "/people/:id" }))
    );
    assert_eq!(
        person.attributes,
        Some(json!({ "name": { "type": "String", "required": true } }))
    );
    assert_eq!(resources[1].names, Some(json!({ "plural": "Places" })));
    assert_eq!(resources[2].component("list"), Some("thing-list"));
    assert_eq!(resources[2].components.len(), 3);
}

#[tokio::test]
async fn enumerate_preserves_order() {
    let names = ["Zebra", "Apple", "Mango", "Kiwi"];
    let discovery = typed_discovery(names.iter().map(|n| ResourceDescriptor::new(*n)).collect());
    let host = spawn_with_discovery(discovery).await;

    let got: Vec<String> = remote_for(&host)
        .enumerate()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(got, names);
}

#[tokio::test]
async fn enumerate_keeps_non_string_values() {
    let host = spawn_with_discovery(json!({
        "resources": [
            { "name": "Good" },
            { "name": "Odd", "components": { "view": { "tag": "x" } } },
            { "name": "Intl", "description": { "en": "hi" } }
        ]
    }))
    .await;

    let resources = remote_for(&host).enumerate().await.unwrap();
    assert_eq!(resources.len(), 3);
    assert_eq!(resources[0].name, "Good");
    assert_eq!(resources[1].components["view"], json!({ "tag": "x" }));
    assert_eq!(resources[2].description, Some(json!({ "en": "hi" })));
}

#[tokio::test]
async fn enumerate_unreachable_node_is_empty() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let resources = remote_for(&addr.to_string()).enumerate().await.unwrap();
    assert!(resources.is_empty());
}

#[tokio::test]
async fn enumerate_without_resources_is_malformed() {
    let host = spawn_with_discovery(json!({ "name": "a node without resources" })).await;

    match remote_for(&host).enumerate().await {
        Err(RemoteError::MalformedDiscovery(_)) => {}
        other => panic!("expected MalformedDiscovery, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Verbs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn put_echo_round_trips_any_json() {
    let (host, _) = spawn_mock_node().await;
    let remote = remote_for(&host);

    for body in [
        json!({ "nested": { "list": [1, 2.5, "three", null, false] } }),
        json!([]),
        json!("just a string"),
        json!(-17),
        json!(true),
        json!({ "unicode": "naïve café ✓" }),
    ] {
        assert_eq!(remote.put("/echo", &body).await.unwrap(), Some(body));
    }
}

#[tokio::test]
async fn post_then_redirect_then_fetch() {
    let (host, store) = spawn_mock_node().await;
    let remote = remote_for(&host);

    let created = remote
        .post("/people", &json!({ "name": "Ada" }))
        .await
        .unwrap();

    assert_eq!(created, Some(json!({ "id": 1, "name": "Ada" })));
    assert_eq!(store.person(1), created);

    let listed = remote.get("/people").await.unwrap();
    assert_eq!(listed, Some(json!([{ "id": 1, "name": "Ada" }])));
}

#[tokio::test]
async fn patch_merges_partial_body() {
    let (host, _) = spawn_mock_node().await;
    let remote = remote_for(&host);

    remote
        .post("/people", &json!({ "name": "Ada", "born": 1815 }))
        .await
        .unwrap();
    let patched = remote
        .patch("/people/1", &json!({ "name": "Ada Lovelace" }))
        .await
        .unwrap();

    assert_eq!(
        patched,
        Some(json!({ "id": 1, "name": "Ada Lovelace", "born": 1815 }))
    );
}

#[tokio::test]
async fn empty_body_is_distinct_from_failure() {
    let (host, _) = spawn_mock_node().await;
    let remote = remote_for(&host);

    assert!(remote.get("/empty").await.unwrap().is_none());

    let err = remote.get("/broken").await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let err = remote.get("/people/99").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn garbage_body_is_a_decode_failure() {
    let (host, _) = spawn_mock_node().await;
    assert!(matches!(
        remote_for(&host).get("/garbage").await,
        Err(RemoteError::Decode(_))
    ));
}

#[tokio::test]
async fn concurrent_reads_share_one_node() {
    let (host, _) = spawn_mock_node().await;
    let remote = remote_for(&host);
    remote.post("/people", &json!({ "name": "Ada" })).await.unwrap();

    let (a, b, c) = tokio::join!(
        remote.get("/people/1"),
        remote.get("/people/1"),
        remote.options("/"),
    );
    assert_eq!(a.unwrap(), b.unwrap());
    assert!(c.unwrap().unwrap().get("resources").is_some());
}

// ---------------------------------------------------------------------------
// Causal state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn discovered_resources_can_be_remembered() {
    let (host, _) = spawn_mock_node().await;
    let mut remote = remote_for(&host);

    let resources = remote.enumerate().await.unwrap();
    for resource in resources {
        let name = resource.name.clone();
        remote
            .causal
            .remember(name, serde_json::to_value(resource).unwrap());
    }
    remote.causal.record(Method::Options, "/", None);

    assert_eq!(remote.causal.known_ids(), ["Person", "Place", "Thing"]);
    assert_eq!(remote.causal.clock, 1);
    assert_eq!(remote.causal.stack[0].method, Method::Options);
}
