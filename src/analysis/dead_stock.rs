//! Dead stock: vehículos Available sin viajes creados en los últimos 30 días

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{Trip, Vehicle, VehicleStatus};

pub const DEAD_STOCK_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeadStockVehicle {
    pub id: Uuid,
    pub name: String,
    pub license_plate: String,
    pub status: VehicleStatus,
}

pub fn dead_stock_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(DEAD_STOCK_WINDOW_DAYS)
}

pub fn find_dead_stock(vehicles: &[Vehicle], trips: &[Trip], now: DateTime<Utc>) -> Vec<DeadStockVehicle> {
    let cutoff = dead_stock_cutoff(now);
    let active: HashSet<Uuid> = trips
        .iter()
        .filter(|trip| trip.created_at >= cutoff)
        .map(|trip| trip.vehicle_id)
        .collect();

    vehicles
        .iter()
        .filter(|vehicle| vehicle.status == VehicleStatus::Available && !active.contains(&vehicle.id))
        .map(|vehicle| DeadStockVehicle {
            id: vehicle.id,
            name: vehicle.name.clone(),
            license_plate: vehicle.license_plate.clone(),
            status: vehicle.status,
        })
        .collect()
}
