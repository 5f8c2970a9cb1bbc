//! Herramientas del asistente
//!
//! Cada llamada del modelo se convierte en una variante cerrada con el
//! payload tipado de su tabla antes de ejecutar nada. La ejecución pasa por
//! los mismos controladores que la API HTTP: misma validación, mismas
//! reglas de ciclo de vida y misma invalidación de cache.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::assistant_prompt::{CREATE_RECORD, QUERY_FLEET_DATA, UPDATE_RECORD};
use crate::clients::FunctionCall;
use crate::controllers::{
    DriverController, FuelLogController, MaintenanceController, TripController, VehicleController,
};
use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::dto::fuel_log_dto::CreateFuelLogRequest;
use crate::dto::maintenance_dto::{CreateMaintenanceRequest, UpdateMaintenanceRequest};
use crate::dto::trip_dto::{CreateTripRequest, UpdateTripRequest};
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::dto::ApiResponse;
use crate::models::FleetTable;
use crate::repositories::ColumnFilter;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub const DEFAULT_QUERY_LIMIT: i64 = 10;
pub const MAX_QUERY_LIMIT: i64 = 50;

#[derive(Debug, Clone)]
pub enum RecordCreate {
    Vehicle(CreateVehicleRequest),
    Driver(CreateDriverRequest),
    Trip(CreateTripRequest),
    Maintenance(CreateMaintenanceRequest),
    FuelLog(CreateFuelLogRequest),
}

#[derive(Debug, Clone)]
pub enum RecordUpdate {
    Vehicle(UpdateVehicleRequest),
    Driver(UpdateDriverRequest),
    /// Solo cambios de estado del ciclo de vida
    Trip(UpdateTripRequest),
    Maintenance(UpdateMaintenanceRequest),
}

/// Operaciones permitidas al asistente
#[derive(Debug, Clone)]
pub enum FleetTool {
    QueryFleetData {
        table: FleetTable,
        filters: Vec<ColumnFilter>,
        limit: i64,
    },
    CreateRecord(RecordCreate),
    UpdateRecord {
        id: Uuid,
        update: RecordUpdate,
    },
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    table: FleetTable,
    #[serde(default)]
    filters: Option<BTreeMap<String, Value>>,
    limit: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CreateArgs {
    table: FleetTable,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    table: FleetTable,
    id: Uuid,
    data: Value,
}

fn arguments<T: DeserializeOwned>(tool: &str, args: &Value) -> Result<T, String> {
    serde_json::from_value(args.clone()).map_err(|e| format!("Invalid arguments for {}: {}", tool, e))
}

fn payload<T: DeserializeOwned>(table: FleetTable, data: Value) -> Result<T, String> {
    serde_json::from_value(data).map_err(|e| format!("Invalid {} data: {}", table, e))
}

fn filter_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Límite por defecto 10, entre 1 y 50
pub fn clamp_limit(limit: Option<f64>) -> i64 {
    match limit {
        Some(value) if value.is_finite() => (value as i64).clamp(1, MAX_QUERY_LIMIT),
        _ => DEFAULT_QUERY_LIMIT,
    }
}

impl FleetTool {
    pub fn parse(call: &FunctionCall) -> Result<Self, String> {
        match call.name.as_str() {
            QUERY_FLEET_DATA => {
                let args: QueryArgs = arguments(QUERY_FLEET_DATA, &call.args)?;
                let mut filters = Vec::new();
                for (column, value) in args.filters.unwrap_or_default() {
                    let column = args.table.filter_column(&column).ok_or_else(|| {
                        format!("Column '{}' cannot be filtered on {}", column, args.table)
                    })?;
                    let value = filter_value(&value)
                        .ok_or_else(|| format!("Filter value for '{}' must be a scalar", column))?;
                    filters.push(ColumnFilter { column, value });
                }

                Ok(FleetTool::QueryFleetData {
                    table: args.table,
                    filters,
                    limit: clamp_limit(args.limit),
                })
            }
            CREATE_RECORD => {
                let CreateArgs { table, data } = arguments(CREATE_RECORD, &call.args)?;
                let record = match table {
                    FleetTable::Vehicles => RecordCreate::Vehicle(payload(table, data)?),
                    FleetTable::Drivers => RecordCreate::Driver(payload(table, data)?),
                    FleetTable::Trips => RecordCreate::Trip(payload(table, data)?),
                    FleetTable::MaintenanceLogs => RecordCreate::Maintenance(payload(table, data)?),
                    FleetTable::FuelLogs => RecordCreate::FuelLog(payload(table, data)?),
                    other => return Err(format!("Records cannot be created in {}", other)),
                };
                Ok(FleetTool::CreateRecord(record))
            }
            UPDATE_RECORD => {
                let UpdateArgs { table, id, data } = arguments(UPDATE_RECORD, &call.args)?;
                let update = match table {
                    FleetTable::Vehicles => RecordUpdate::Vehicle(payload(table, data)?),
                    FleetTable::Drivers => RecordUpdate::Driver(payload(table, data)?),
                    FleetTable::Trips => RecordUpdate::Trip(payload(table, data)?),
                    FleetTable::MaintenanceLogs => RecordUpdate::Maintenance(payload(table, data)?),
                    other => return Err(format!("Records in {} cannot be updated", other)),
                };
                Ok(FleetTool::UpdateRecord { id, update })
            }
            other => Err(format!("Unknown tool '{}'", other)),
        }
    }
}

fn record<T: serde::Serialize>(response: ApiResponse<T>) -> Value {
    json!({ "success": true, "record": response.data })
}

/// Mensaje legible para el modelo
pub fn tool_error_message(error: &AppError) -> String {
    match error {
        AppError::Validation(errors) => {
            let mut messages: Vec<String> = errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| match &error.message {
                        Some(message) => format!("{}: {}", field, message),
                        None => format!("{}: invalid value ({})", field, error.code),
                    })
                })
                .collect();
            messages.sort();
            messages.join("; ")
        }
        AppError::DuplicateField { message, .. }
        | AppError::ForeignKeyConflict(message)
        | AppError::NotFound(message)
        | AppError::Conflict(message)
        | AppError::BadRequest(message) => message.clone(),
        AppError::Database(_) => "The database request failed. Please try again.".to_string(),
        other => other.to_string(),
    }
}

pub async fn execute(state: &AppState, tool: FleetTool) -> AppResult<Value> {
    match tool {
        FleetTool::QueryFleetData { table, filters, limit } => {
            let rows = state.repository.query_table(table, &filters, limit).await?;
            Ok(json!({ "count": rows.len(), "data": rows }))
        }
        FleetTool::CreateRecord(create) => Ok(match create {
            RecordCreate::Vehicle(request) => record(VehicleController::new(state).create(request).await?),
            RecordCreate::Driver(request) => record(DriverController::new(state).create(request).await?),
            RecordCreate::Trip(request) => record(TripController::new(state).create(request).await?),
            RecordCreate::Maintenance(request) => {
                record(MaintenanceController::new(state).create(request).await?)
            }
            RecordCreate::FuelLog(request) => record(FuelLogController::new(state).create(request).await?),
        }),
        FleetTool::UpdateRecord { id, update } => Ok(match update {
            RecordUpdate::Vehicle(request) => {
                record(VehicleController::new(state).update(id, request).await?)
            }
            RecordUpdate::Driver(request) => {
                record(DriverController::new(state).update(id, request).await?)
            }
            RecordUpdate::Trip(request) => record(TripController::new(state).update(id, request).await?),
            RecordUpdate::Maintenance(request) => {
                record(MaintenanceController::new(state).update(id, request).await?)
            }
        }),
    }
}

/// Ejecutar una llamada del modelo; los fallos vuelven como `{error}`
pub async fn run_tool(state: &AppState, call: &FunctionCall) -> Value {
    let tool = match FleetTool::parse(call) {
        Ok(tool) => tool,
        Err(message) => return json!({ "error": message }),
    };

    match execute(state, tool).await {
        Ok(result) => result,
        Err(e) => json!({ "error": tool_error_message(&e) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Value) -> FunctionCall {
        FunctionCall {
            name: name.to_string(),
            args,
        }
    }

    #[test]
    fn test_query_filters_are_checked_against_columns() {
        let tool = FleetTool::parse(&call(
            QUERY_FLEET_DATA,
            json!({ "table": "vehicles", "filters": { "status": "Available" }, "limit": 500 }),
        ))
        .unwrap();

        match tool {
            FleetTool::QueryFleetData { table, filters, limit } => {
                assert_eq!(table, FleetTable::Vehicles);
                assert_eq!(
                    filters,
                    vec![ColumnFilter {
                        column: "status",
                        value: "Available".to_string()
                    }]
                );
                assert_eq!(limit, MAX_QUERY_LIMIT);
            }
            other => panic!("unexpected tool: {other:?}"),
        }

        let error = FleetTool::parse(&call(
            QUERY_FLEET_DATA,
            json!({ "table": "vehicles", "filters": { "acquisition_cost; drop": "1" } }),
        ))
        .unwrap_err();
        assert!(error.contains("cannot be filtered"));
    }

    #[test]
    fn test_unknown_table_is_rejected() {
        let error = FleetTool::parse(&call(QUERY_FLEET_DATA, json!({ "table": "pg_user" }))).unwrap_err();
        assert!(error.starts_with("Invalid arguments"));
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_QUERY_LIMIT);
        assert_eq!(clamp_limit(Some(0.0)), 1);
        assert_eq!(clamp_limit(Some(25.0)), 25);
    }

    #[test]
    fn test_create_uses_typed_payload() {
        let tool = FleetTool::parse(&call(
            CREATE_RECORD,
            json!({
                "table": "drivers",
                "data": {
                    "full_name": "Ravi Kumar",
                    "license_number": "DL-XX-2027",
                    "license_expiry": "2027-03-31",
                    "license_category": "Truck"
                }
            }),
        ))
        .unwrap();
        assert!(matches!(tool, FleetTool::CreateRecord(RecordCreate::Driver(_))));

        let error = FleetTool::parse(&call(
            CREATE_RECORD,
            json!({ "table": "vehicles", "data": { "name": "Truck-9" } }),
        ))
        .unwrap_err();
        assert!(error.starts_with("Invalid vehicles data"));
    }

    #[test]
    fn test_views_are_read_only() {
        let error = FleetTool::parse(&call(
            CREATE_RECORD,
            json!({ "table": "fleet_kpi_summary", "data": {} }),
        ))
        .unwrap_err();
        assert!(error.contains("cannot be created"));

        let error = FleetTool::parse(&call(
            UPDATE_RECORD,
            json!({ "table": "fuel_logs", "id": Uuid::new_v4(), "data": {} }),
        ))
        .unwrap_err();
        assert!(error.contains("cannot be updated"));
    }

    #[test]
    fn test_trip_update_is_lifecycle_only() {
        let tool = FleetTool::parse(&call(
            UPDATE_RECORD,
            json!({
                "table": "trips",
                "id": Uuid::new_v4(),
                "data": { "status": "Completed", "end_odometer": 1520 }
            }),
        ))
        .unwrap();

        match tool {
            FleetTool::UpdateRecord { update: RecordUpdate::Trip(request), .. } => {
                assert_eq!(request.end_odometer, Some(1520.0));
            }
            other => panic!("unexpected tool: {other:?}"),
        }
    }

    #[test]
    fn test_validation_errors_are_flattened() {
        let error = crate::utils::errors::validation_error(
            "cargo_weight_kg",
            "Cargo weight exceeds vehicle capacity by 500 kg",
        );
        assert_eq!(
            tool_error_message(&error),
            "cargo_weight_kg: Cargo weight exceeds vehicle capacity by 500 kg"
        );
    }
}
