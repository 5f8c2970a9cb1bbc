use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;

use fleet_dashboard::build_router;
use fleet_dashboard::clients::{ChatModel, ModelChunk, ModelRequest};
use fleet_dashboard::config::EnvironmentConfig;
use fleet_dashboard::models::FleetTable;
use fleet_dashboard::repositories::MemoryRepository;
use fleet_dashboard::state::AppState;
use fleet_dashboard::utils::errors::AppResult;

struct TestApp {
    router: Router,
    store: Arc<MemoryRepository>,
}

fn create_test_app() -> TestApp {
    let store = Arc::new(MemoryRepository::new());
    let state = AppState::in_memory(EnvironmentConfig::default()).with_repository(store.clone());
    TestApp {
        router: build_router(state),
        store,
    }
}

async fn send_raw(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, HeaderMap, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, text) = send_raw(app, method, uri, body.map(|b| b.to_string())).await;
    let value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    (status, value)
}

async fn create_vehicle(app: &TestApp, name: &str, plate: &str, capacity: f64) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/vehicles",
        Some(json!({
            "name": name,
            "license_plate": plate,
            "model": "Tata Prima",
            "type": "Truck",
            "max_capacity_kg": capacity,
            "odometer_km": 1000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create vehicle failed: {body}");
    body["data"].clone()
}

async fn create_driver(app: &TestApp, name: &str, license: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/drivers",
        Some(json!({
            "full_name": name,
            "license_number": license,
            "license_expiry": "2035-12-31",
            "license_category": "Truck"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create driver failed: {body}");
    body["data"].clone()
}

async fn create_trip(app: &TestApp, vehicle: &Value, driver: &Value, cargo: f64) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/trips",
        Some(json!({
            "vehicle_id": vehicle["id"],
            "driver_id": driver["id"],
            "origin": "Bangalore",
            "destination": "Mumbai",
            "cargo_weight_kg": cargo,
            "revenue": "50000"
        })),
    )
    .await
}

async fn get(app: &TestApp, uri: &str) -> Value {
    let (status, body) = send(app, "GET", uri, None).await;
    assert_eq!(status, StatusCode::OK, "GET {uri} failed: {body}");
    body
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let body = get(&app, "/health").await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "fleet_dashboard");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["cache"], "memory");
    assert_eq!(body["cache_connected"], true);
}

#[tokio::test]
async fn test_duplicate_license_plate_is_field_level_conflict() {
    let app = create_test_app();
    create_vehicle(&app, "Truck-1", "KA-01-AB-1234", 12000.0).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/vehicles",
        Some(json!({
            "name": "Truck-2",
            "license_plate": "ka-01-ab-1234",
            "model": "Ashok Leyland",
            "type": "Truck",
            "max_capacity_kg": 9000
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["field"], "license_plate");
    assert!(body["message"].as_str().unwrap().contains("already registered"));

    let vehicles = get(&app, "/api/vehicles").await;
    assert_eq!(vehicles.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_vehicle_validation_errors() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/vehicles",
        Some(json!({
            "name": "",
            "license_plate": "KA-01-AB-9999",
            "model": "Tata Ace",
            "type": "Van",
            "max_capacity_kg": 0
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["name"].is_array());
    assert!(body["details"]["max_capacity_kg"].is_array());
}

#[tokio::test]
async fn test_vehicle_update_can_clear_region() {
    let app = create_test_app();
    let vehicle = create_vehicle(&app, "Truck-1", "KA-01-AB-1234", 12000.0).await;
    let uri = format!("/api/vehicles/{}", vehicle["id"].as_str().unwrap());

    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "region": "South" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(get(&app, &uri).await["region"], "South");

    // Sin el campo: se conserva
    send(&app, "PUT", &uri, Some(json!({ "odometer_km": 1200 }))).await;
    assert_eq!(get(&app, &uri).await["region"], "South");

    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "region": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(get(&app, &uri).await["region"].is_null());
}

#[tokio::test]
async fn test_cargo_overage_is_rejected_with_exact_amount() {
    let app = create_test_app();
    let vehicle = create_vehicle(&app, "Van-05", "MH-12-XY-0005", 500.0).await;
    let driver = create_driver(&app, "Alex Dsouza", "DL-05-2030").await;

    let (status, body) = create_trip(&app, &vehicle, &driver, 1000.0).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"]["cargo_weight_kg"][0]["message"],
        "Cargo weight exceeds vehicle capacity by 500 kg"
    );
    assert!(get(&app, "/api/trips").await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_trip_lifecycle_syncs_vehicle_and_driver() {
    let app = create_test_app();
    let vehicle = create_vehicle(&app, "Truck-1", "KA-01-AB-1234", 12000.0).await;
    let driver = create_driver(&app, "Ravi Kumar", "DL-09-2027").await;
    let vehicle_id = vehicle["id"].as_str().unwrap().to_string();
    let driver_id = driver["id"].as_str().unwrap().to_string();

    let (status, body) = create_trip(&app, &vehicle, &driver, 8000.0).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Pending");
    let trip_id = body["data"]["id"].as_str().unwrap().to_string();

    // Lista de vehículos cacheada antes del dispatch
    get(&app, "/api/vehicles").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/trips/{trip_id}/dispatch"),
        Some(json!({ "start_odometer": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "On Way");

    let vehicle = get(&app, &format!("/api/vehicles/{vehicle_id}")).await;
    assert_eq!(vehicle["status"], "On Trip");
    let driver = get(&app, &format!("/api/drivers/{driver_id}")).await;
    assert_eq!(driver["status"], "On Duty");

    // La lista cacheada se invalidó con la transición
    let vehicles = get(&app, "/api/vehicles").await;
    assert_eq!(vehicles[0]["status"], "On Trip");

    // Un vehículo en viaje no se puede retirar
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/vehicles/{vehicle_id}"),
        Some(json!({ "status": "Retired" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Odómetro final menor que el inicial
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/trips/{trip_id}/complete"),
        Some(json!({ "end_odometer": 900 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/trips/{trip_id}/complete"),
        Some(json!({ "end_odometer": 1450 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "Completed");
    assert_eq!(body["data"]["distance_km"], 450.0);

    let vehicle = get(&app, &format!("/api/vehicles/{vehicle_id}")).await;
    assert_eq!(vehicle["status"], "Available");
    assert_eq!(vehicle["odometer_km"], 1450.0);
    let driver = get(&app, &format!("/api/drivers/{driver_id}")).await;
    assert_eq!(driver["status"], "Off Duty");

    // Estado terminal
    let (status, _) = send(&app, "POST", &format!("/api/trips/{trip_id}/cancel"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_failed_companion_write_leaves_no_partial_state() {
    let app = create_test_app();
    let vehicle = create_vehicle(&app, "Truck-1", "KA-01-AB-1234", 12000.0).await;
    let driver = create_driver(&app, "Ravi Kumar", "DL-09-2027").await;
    let (_, body) = create_trip(&app, &vehicle, &driver, 8000.0).await;
    let trip_id = body["data"]["id"].as_str().unwrap().to_string();

    app.store.fail_writes_to(FleetTable::Drivers).await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/trips/{trip_id}/dispatch"),
        Some(json!({ "start_odometer": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    app.store.clear_failures().await;

    let trip = get(&app, &format!("/api/trips/{trip_id}")).await;
    assert_eq!(trip["status"], "Pending");
    let vehicle = get(&app, &format!("/api/vehicles/{}", vehicle["id"].as_str().unwrap())).await;
    assert_eq!(vehicle["status"], "Available");

    // Reintento tras recuperar el backend
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/trips/{trip_id}/dispatch"),
        Some(json!({ "start_odometer": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_ineligible_driver_and_vehicle_are_rejected() {
    let app = create_test_app();
    let vehicle = create_vehicle(&app, "Truck-1", "KA-01-AB-1234", 12000.0).await;
    let other_vehicle = create_vehicle(&app, "Truck-2", "KA-01-AB-5678", 12000.0).await;
    let driver = create_driver(&app, "Ravi Kumar", "DL-09-2027").await;

    let (_, body) = create_trip(&app, &vehicle, &driver, 100.0).await;
    let trip_id = body["data"]["id"].as_str().unwrap().to_string();
    send(
        &app,
        "POST",
        &format!("/api/trips/{trip_id}/dispatch"),
        Some(json!({ "start_odometer": 1000 })),
    )
    .await;

    // Conductor en servicio
    let (status, body) = create_trip(&app, &other_vehicle, &driver, 100.0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["driver_id"].is_array());

    // Vehículo en viaje
    let second_driver = create_driver(&app, "Meera Nair", "DL-10-2031").await;
    let (status, body) = create_trip(&app, &vehicle, &second_driver, 100.0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["vehicle_id"].is_array());

    let eligible = get(&app, "/api/drivers/eligible").await;
    let names: Vec<&str> = eligible
        .as_array()
        .unwrap()
        .iter()
        .map(|driver| driver["full_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Meera Nair"]);

    let eligible = get(&app, "/api/vehicles/eligible/trip").await;
    assert_eq!(eligible.as_array().unwrap().len(), 1);
    assert_eq!(eligible[0]["name"], "Truck-2");

    let stats = get(&app, "/api/drivers/stats").await;
    assert_eq!(stats["on_duty"], 1);
    assert_eq!(stats["off_duty"], 1);
}

#[tokio::test]
async fn test_delete_vehicle_with_trips_is_foreign_key_conflict() {
    let app = create_test_app();
    let vehicle = create_vehicle(&app, "Truck-1", "KA-01-AB-1234", 12000.0).await;
    let spare = create_vehicle(&app, "Truck-2", "KA-01-AB-5678", 12000.0).await;
    let driver = create_driver(&app, "Ravi Kumar", "DL-09-2027").await;
    create_trip(&app, &vehicle, &driver, 100.0).await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/vehicles/{}", vehicle["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "23503");
    assert_eq!(
        body["message"],
        "Vehicle has linked trips or maintenance records. Retire it instead."
    );

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/vehicles/{}", spare["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/vehicles/{}", spare["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_maintenance_puts_vehicle_in_shop_until_closed() {
    let app = create_test_app();
    let vehicle = create_vehicle(&app, "Truck-1", "KA-01-AB-1234", 12000.0).await;
    let vehicle_id = vehicle["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/maintenance",
        Some(json!({
            "vehicle_id": vehicle_id,
            "service_type": "Oil Change",
            "cost": "3500",
            "service_date": "2025-06-01",
            "mechanic": "Suresh"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let log_id = body["data"]["id"].as_str().unwrap().to_string();

    let vehicle = get(&app, &format!("/api/vehicles/{vehicle_id}")).await;
    assert_eq!(vehicle["status"], "In Shop");
    assert!(get(&app, "/api/vehicles/eligible/trip").await.as_array().unwrap().is_empty());
    assert_eq!(
        get(&app, "/api/vehicles/eligible/maintenance").await.as_array().unwrap().len(),
        1
    );

    let (status, body) = send(&app, "POST", &format!("/api/maintenance/{log_id}/complete"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_completed"], true);

    let vehicle = get(&app, &format!("/api/vehicles/{vehicle_id}")).await;
    assert_eq!(vehicle["status"], "Available");

    let (status, _) = send(&app, "POST", &format!("/api/maintenance/{log_id}/complete"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_fuel_logs_feed_efficiency_and_reports() {
    let app = create_test_app();
    let vehicle = create_vehicle(&app, "Truck-1", "KA-01-AB-1234", 12000.0).await;
    let driver = create_driver(&app, "Ravi Kumar", "DL-09-2027").await;
    let (_, body) = create_trip(&app, &vehicle, &driver, 8000.0).await;
    let trip_id = body["data"]["id"].as_str().unwrap().to_string();

    // Cache de analytics caliente antes de los cambios
    get(&app, "/api/analytics/fuel-efficiency").await;

    send(
        &app,
        "POST",
        &format!("/api/trips/{trip_id}/dispatch"),
        Some(json!({ "start_odometer": 1000 })),
    )
    .await;
    send(
        &app,
        "POST",
        &format!("/api/trips/{trip_id}/complete"),
        Some(json!({ "end_odometer": 1100 })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/fuel-logs",
        Some(json!({
            "trip_id": trip_id,
            "liters": 25,
            "total_cost": "2500",
            "fuel_date": "2025-06-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["vehicle_id"], vehicle["id"]);

    let efficiency = get(&app, "/api/analytics/fuel-efficiency").await;
    assert_eq!(efficiency["points"][0]["date"], "2025-06-02");
    assert_eq!(efficiency["points"][0]["Truck-1"], 4.0);
    assert_eq!(efficiency["fleet_average"], 4.0);
    assert_eq!(efficiency["vehicle_names"], json!(["Truck-1"]));

    let roi = get(&app, "/api/analytics/roi").await;
    assert_eq!(roi[0]["name"], "Truck-1");
    assert_eq!(roi[0]["band"], "Excellent");

    let (status, headers, csv) = send_raw(&app, "GET", "/api/analytics/report", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"fleet_analytics_report.csv\""
    );
    assert!(csv.contains("FUEL EFFICIENCY PER TRIP"));
    assert!(csv.contains("\"Truck-1\""));

    let (status, headers, _) = send_raw(&app, "GET", "/api/analytics/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"monthly_financial_summary.csv\""
    );
}

#[tokio::test]
async fn test_dead_stock_and_overview() {
    let app = create_test_app();
    let idle = create_vehicle(&app, "Truck-1", "KA-01-AB-1234", 12000.0).await;
    let busy = create_vehicle(&app, "Truck-2", "KA-01-AB-5678", 12000.0).await;
    let driver = create_driver(&app, "Ravi Kumar", "DL-09-2027").await;
    create_trip(&app, &busy, &driver, 100.0).await;

    let dead = get(&app, "/api/analytics/dead-stock").await;
    let dead = dead.as_array().unwrap();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0]["id"], idle["id"]);

    let overview = get(&app, "/api/analytics/overview").await;
    assert_eq!(overview["dead_stock_count"], 1);

    let kpi = get(&app, "/api/analytics/kpi").await;
    assert_eq!(kpi["total_vehicles"], 2);
    assert_eq!(kpi["pending_trips"], 1);
}

#[tokio::test]
async fn test_dead_stock_uses_thirty_day_window() {
    let app = create_test_app();
    let stale = create_vehicle(&app, "Truck-1", "KA-01-AB-1234", 12000.0).await;
    let recent = create_vehicle(&app, "Truck-2", "KA-01-AB-5678", 12000.0).await;
    let driver = create_driver(&app, "Ravi Kumar", "DL-09-2027").await;

    for (vehicle, days) in [(&stale, 31), (&recent, 29)] {
        let (_, body) = create_trip(&app, vehicle, &driver, 100.0).await;
        let trip_id = Uuid::parse_str(body["data"]["id"].as_str().unwrap()).unwrap();
        app.store
            .backdate_trip(trip_id, Utc::now() - Duration::days(days))
            .await
            .unwrap();
    }

    let dead = get(&app, "/api/analytics/dead-stock").await;
    let ids: Vec<&Value> = dead.as_array().unwrap().iter().map(|v| &v["id"]).collect();
    assert_eq!(ids, vec![&stale["id"]]);
}

#[tokio::test]
async fn test_trip_search() {
    let app = create_test_app();
    let vehicle = create_vehicle(&app, "Truck-1", "KA-01-AB-1234", 12000.0).await;
    let driver = create_driver(&app, "Ravi Kumar", "DL-09-2027").await;
    create_trip(&app, &vehicle, &driver, 100.0).await;

    assert_eq!(get(&app, "/api/trips?search=mumbai").await.as_array().unwrap().len(), 1);
    assert!(get(&app, "/api/trips?search=chennai").await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_without_provider_key() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/ai/chat",
        Some(json!({ "messages": [{ "role": "user", "content": "hi" }] })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("service configuration is missing"));
}

/// Modelo que responde siempre con el mismo texto
struct CannedModel;

#[async_trait]
impl ChatModel for CannedModel {
    async fn stream_turn(
        &self,
        _request: ModelRequest,
    ) -> AppResult<mpsc::Receiver<AppResult<ModelChunk>>> {
        let (tx, rx) = mpsc::channel(4);
        tx.send(Ok(ModelChunk::Text("All 0 vehicles are available.".to_string())))
            .await
            .unwrap();
        Ok(rx)
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

fn create_chat_app() -> TestApp {
    let store = Arc::new(MemoryRepository::new());
    let state = AppState::in_memory(EnvironmentConfig::default())
        .with_repository(store.clone())
        .with_assistant(Arc::new(CannedModel));
    TestApp {
        router: build_router(state),
        store,
    }
}

#[tokio::test]
async fn test_chat_rejects_bad_bodies() {
    let app = create_chat_app();

    let (status, body) = send(&app, "POST", "/api/ai/chat", Some(json!({ "messages": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At least one message is required");

    let (status, _, text) =
        send_raw(&app, "POST", "/api/ai/chat", Some("{\"messages\": [".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text.contains("Malformed JSON body"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/ai/chat",
        Some(json!({ "messages": [{ "role": "tool", "content": "x" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");

    let (status, body) = send(
        &app,
        "POST",
        "/api/ai/chat",
        Some(json!({ "messages": [
            { "role": "assistant", "content": "Hello, how can I help?" },
            { "role": "user", "content": "  " }
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At least one user message with text is required");
}

#[tokio::test]
async fn test_chat_streams_events() {
    let app = create_chat_app();
    let (status, headers, text) = send_raw(
        &app,
        "POST",
        "/api/ai/chat",
        Some(json!({ "messages": [{ "role": "user", "content": "which vehicles are available?" }] }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert!(text.contains("event: text"));
    assert!(text.contains("All 0 vehicles are available."));
    assert!(text.contains("event: done"));
}
