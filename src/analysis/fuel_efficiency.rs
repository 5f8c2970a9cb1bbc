//! Eficiencia de combustible
//!
//! km/L por registro de combustible = distancia del viaje / litros. Los
//! registros sin distancia o sin litros positivos no cuentan.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::FuelLogWithTrip;
use crate::utils::validation::round2;

/// Punto del gráfico: una fecha y el km/L de cada vehículo ese día
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FuelChartPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FuelChart {
    /// Ordenados por fecha ascendente
    pub points: Vec<FuelChartPoint>,
    /// En orden de primera aparición
    pub vehicle_names: Vec<String>,
    /// Media de todos los registros válidos
    pub fleet_average: Option<f64>,
}

/// km/L de un registro, redondeado a 2 decimales
pub fn entry_efficiency(log: &FuelLogWithTrip) -> Option<f64> {
    let distance = log.distance_km?;
    if distance <= 0.0 || log.liters <= 0.0 {
        return None;
    }
    Some(round2(distance / log.liters))
}

pub fn build_fuel_chart(logs: &[FuelLogWithTrip]) -> FuelChart {
    let mut vehicle_names: Vec<String> = Vec::new();
    let mut by_date: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();
    let mut valid: Vec<f64> = Vec::new();

    for log in logs {
        let Some(km_per_liter) = entry_efficiency(log) else {
            continue;
        };
        valid.push(km_per_liter);

        let Some(name) = log.vehicle_name.as_deref().filter(|name| !name.is_empty()) else {
            continue;
        };
        if !vehicle_names.iter().any(|known| known == name) {
            vehicle_names.push(name.to_string());
        }
        // El último registro del día gana
        by_date
            .entry(log.fuel_date)
            .or_default()
            .insert(name.to_string(), km_per_liter);
    }

    let fleet_average = (!valid.is_empty())
        .then(|| round2(valid.iter().sum::<f64>() / valid.len() as f64));

    FuelChart {
        points: by_date
            .into_iter()
            .map(|(date, values)| FuelChartPoint { date, values })
            .collect(),
        vehicle_names,
        fleet_average,
    }
}
