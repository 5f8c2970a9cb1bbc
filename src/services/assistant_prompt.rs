//! Prompt del sistema y declaraciones de herramientas del asistente

use serde_json::{json, Value};

use crate::clients::FunctionDeclaration;
use crate::models::FleetTable;

pub const QUERY_FLEET_DATA: &str = "queryFleetData";
pub const CREATE_RECORD: &str = "createRecord";
pub const UPDATE_RECORD: &str = "updateRecord";

pub const FLEET_SYSTEM_PROMPT: &str = "\
You are FleetFlow AI, the assistant of a fleet and logistics management dashboard.

You can read and change fleet data only through the provided tools:
- vehicles: fleet assets with status (Available, On Trip, In Shop, Retired)
- drivers: driver profiles with license expiry, safety scores, complaints
- trips: delivery records with cargo weight, origin, destination, status
- maintenance_logs: service records linked to vehicles
- fuel_logs: fuel and misc expense records per trip
- analytics views: vehicle_cost_summary (ROI), vehicle_fuel_efficiency, \
monthly_financial_summary, fleet_kpi_summary, driver_performance_summary

What you can do:
1. QUERY fleet data with queryFleetData (equality filters only).
2. CREATE vehicles, drivers, trips, maintenance logs and fuel logs with createRecord.
3. UPDATE vehicles, drivers, maintenance logs, and move trips through their lifecycle \
with updateRecord (status \"On Way\" needs start_odometer, \"Completed\" needs end_odometer).
4. ANALYZE and summarize financial and operational data.

Rules:
- Confirm destructive actions before executing them.
- Format currency in INR (₹) and dates as DD/MM/YYYY.
- Keep answers concise and structured.
- When a tool returns an error, explain it and tell the user what to do manually.
- Never expose SQL or internal IDs unless the user asks for them.";

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn number() -> Value {
    json!({ "type": "NUMBER" })
}

fn integer() -> Value {
    json!({ "type": "INTEGER" })
}

fn described(kind: &str, description: &str) -> Value {
    json!({ "type": kind, "description": description })
}

fn enumeration(values: &[&str]) -> Value {
    json!({ "type": "STRING", "enum": values })
}

/// Unión de los campos de escritura de todas las tablas; la validación
/// real la hace el payload tipado de cada tabla
fn record_fields() -> Value {
    json!({
        "type": "OBJECT",
        "description": "Fields of the record. Only the fields of the chosen table are accepted.",
        "properties": {
            "name": string(),
            "license_plate": string(),
            "model": string(),
            "type": enumeration(&["Truck", "Van", "Bike"]),
            "max_capacity_kg": number(),
            "odometer_km": number(),
            "region": string(),
            "acquisition_cost": number(),
            "full_name": string(),
            "email": string(),
            "phone": string(),
            "license_number": string(),
            "license_expiry": described("STRING", "Date as YYYY-MM-DD"),
            "license_category": enumeration(&["Truck", "Van", "Bike"]),
            "safety_score": integer(),
            "complaints": integer(),
            "notes": string(),
            "vehicle_id": string(),
            "driver_id": string(),
            "trip_id": string(),
            "origin": string(),
            "destination": string(),
            "cargo_weight_kg": number(),
            "cargo_description": string(),
            "estimated_fuel_cost": number(),
            "revenue": number(),
            "start_odometer": number(),
            "end_odometer": number(),
            "service_type": string(),
            "description": string(),
            "cost": number(),
            "service_date": described("STRING", "Date as YYYY-MM-DD"),
            "mechanic": string(),
            "is_completed": json!({ "type": "BOOLEAN" }),
            "liters": number(),
            "total_cost": number(),
            "misc_expense": number(),
            "fuel_date": described("STRING", "Date as YYYY-MM-DD"),
            "status": described(
                "STRING",
                "Vehicle: Available | On Trip | In Shop | Retired. \
                 Driver: On Duty | Off Duty | Suspended. \
                 Trip: On Way | Completed | Cancelled."
            )
        }
    })
}

/// Declaraciones de las tres herramientas en el esquema de Gemini
pub fn tool_declarations() -> Vec<FunctionDeclaration> {
    let tables: Vec<&str> = FleetTable::ALL.iter().map(|table| table.as_str()).collect();

    vec![
        FunctionDeclaration {
            name: QUERY_FLEET_DATA,
            description: "Query fleet data from a table or analytics view",
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "table": enumeration(&tables),
                    "filters": {
                        "type": "OBJECT",
                        "description": "Column → value equality filters",
                        "properties": {
                            "id": string(),
                            "status": string(),
                            "name": string(),
                            "vehicle_id": string(),
                            "driver_id": string(),
                            "trip_id": string(),
                            "type": string(),
                            "region": string(),
                            "license_plate": string(),
                            "license_number": string(),
                            "full_name": string(),
                            "origin": string(),
                            "destination": string(),
                            "service_type": string(),
                            "is_completed": string(),
                            "month_label": string()
                        }
                    },
                    "limit": described("INTEGER", "Maximum rows (default 10, max 50)")
                },
                "required": ["table"]
            }),
        },
        FunctionDeclaration {
            name: CREATE_RECORD,
            description: "Create a new record",
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "table": enumeration(&["vehicles", "drivers", "trips", "maintenance_logs", "fuel_logs"]),
                    "data": record_fields()
                },
                "required": ["table", "data"]
            }),
        },
        FunctionDeclaration {
            name: UPDATE_RECORD,
            description: "Update an existing record; trips only accept lifecycle status changes",
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "table": enumeration(&["vehicles", "drivers", "trips", "maintenance_logs"]),
                    "id": string(),
                    "data": record_fields()
                },
                "required": ["table", "id", "data"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_tool_lists_every_table() {
        let tools = tool_declarations();
        let names: Vec<&str> = tools.iter().map(|tool| tool.name).collect();
        assert_eq!(names, vec![QUERY_FLEET_DATA, CREATE_RECORD, UPDATE_RECORD]);

        let allowed = tools[0].parameters["properties"]["table"]["enum"]
            .as_array()
            .unwrap()
            .len();
        assert_eq!(allowed, FleetTable::ALL.len());
    }
}
