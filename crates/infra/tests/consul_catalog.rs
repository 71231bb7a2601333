use std::net::TcpListener;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use invsync_core::CanonicalInventory;
use invsync_infra::{ConsulCatalog, RegistryError, ServiceRegistry, overlay_from_url};
use serde_json::json;

async fn catalog_service(Path(name): Path<String>) -> Response {
    match name.as_str() {
        "web" => Json(json!([
            {"Node": "n1", "Address": "192.168.0.1", "ServiceAddress": "10.0.0.1"},
            {"Node": "n2", "Address": "192.168.0.2", "ServiceAddress": "10.0.0.2"}
        ]))
        .into_response(),
        "cache" => Json(json!([{"Node": "n3", "Address": "192.168.0.3", "ServiceAddress": ""}]))
            .into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "garbled" => "not json".into_response(),
        _ => Json(json!([])).into_response(),
    }
}

/// Serve a fake catalog on an ephemeral port; returns the `/v1` base url.
///
/// The server runs on its own thread and runtime so the blocking client under
/// test never runs inside an async context.
fn spawn_fake_consul() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind ephemeral port");
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let app = Router::new().route("/v1/catalog/service/:name", get(catalog_service));
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    format!("http://{addr}/v1")
}

fn catalog(url: &str) -> ConsulCatalog {
    ConsulCatalog::new(url, Duration::from_secs(5)).unwrap()
}

#[test]
fn lists_service_addresses_in_order() {
    let url = spawn_fake_consul();
    assert_eq!(
        catalog(&url).service_addresses("web").unwrap(),
        ["10.0.0.1", "10.0.0.2"]
    );
}

#[test]
fn falls_back_to_node_address() {
    let url = spawn_fake_consul();
    assert_eq!(catalog(&url).service_addresses("cache").unwrap(), ["192.168.0.3"]);
}

#[test]
fn unknown_service_is_empty() {
    let url = spawn_fake_consul();
    assert!(catalog(&url).service_addresses("db").unwrap().is_empty());
}

#[test]
fn error_status_and_bad_bodies_are_errors() {
    let url = spawn_fake_consul();
    let catalog = catalog(&url);

    assert!(matches!(
        catalog.service_addresses("broken"),
        Err(RegistryError::Status { status: 500, .. })
    ));
    assert!(matches!(
        catalog.service_addresses("garbled"),
        Err(RegistryError::Decode { .. })
    ));
}

#[test]
fn unreachable_registry_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let catalog = catalog(&format!("http://{addr}/v1"));
    assert!(matches!(
        catalog.service_addresses("web"),
        Err(RegistryError::Transport { .. })
    ));
}

#[test]
fn overlay_against_live_catalog() {
    let url = spawn_fake_consul();
    let mut inventory = CanonicalInventory::from_value(json!({
        "web": {"hosts": ["a"]},
        "db": {"hosts": ["db1"]},
        "broken": {"hosts": ["b1"]},
        "_meta": {"hostvars": {}}
    }))
    .unwrap();

    let report = overlay_from_url(&mut inventory, &url, Duration::from_secs(5)).unwrap();

    assert_eq!(
        inventory.into_value(),
        json!({
            "web": {"hosts": ["10.0.0.1", "10.0.0.2"]},
            "db": {"hosts": ["db1"]},
            "broken": {"hosts": ["b1"]},
            "_meta": {"hostvars": {}}
        })
    );
    assert_eq!(report.replaced, ["web"]);
    assert_eq!(report.unmatched, ["db"]);
    assert_eq!(report.failed, ["broken"]);
}
