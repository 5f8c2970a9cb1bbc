//! Bandas de ROI
//!
//! El porcentaje lo calcula la vista `vehicle_cost_summary`; aquí solo se
//! clasifica.

use serde::Serialize;

use crate::models::VehicleCostSummary;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RoiBand {
    Excellent,
    Good,
    Average,
    Poor,
    Loss,
}

impl RoiBand {
    pub fn from_percentage(roi: f64) -> Self {
        if roi >= 200.0 {
            RoiBand::Excellent
        } else if roi >= 100.0 {
            RoiBand::Good
        } else if roi >= 50.0 {
            RoiBand::Average
        } else if roi >= 0.0 {
            RoiBand::Poor
        } else {
            RoiBand::Loss
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VehicleRoi {
    #[serde(flatten)]
    pub summary: VehicleCostSummary,
    pub band: RoiBand,
}

/// Sin ROI calculado cuenta como 0%
pub fn classify_roi(rows: Vec<VehicleCostSummary>) -> Vec<VehicleRoi> {
    rows.into_iter()
        .map(|summary| VehicleRoi {
            band: RoiBand::from_percentage(summary.roi_percentage.unwrap_or(0.0)),
            summary,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_thresholds() {
        assert_eq!(RoiBand::from_percentage(245.0), RoiBand::Excellent);
        assert_eq!(RoiBand::from_percentage(200.0), RoiBand::Excellent);
        assert_eq!(RoiBand::from_percentage(199.9), RoiBand::Good);
        assert_eq!(RoiBand::from_percentage(100.0), RoiBand::Good);
        assert_eq!(RoiBand::from_percentage(50.0), RoiBand::Average);
        assert_eq!(RoiBand::from_percentage(0.0), RoiBand::Poor);
        assert_eq!(RoiBand::from_percentage(-0.1), RoiBand::Loss);
    }

    #[test]
    fn test_missing_roi_is_poor() {
        let rows = classify_roi(vec![VehicleCostSummary {
            vehicle_id: uuid::Uuid::new_v4(),
            name: "Bike-3".to_string(),
            license_plate: "KA-05-ZZ-0003".to_string(),
            total_revenue: None,
            total_fuel_cost: None,
            total_maintenance_cost: None,
            roi_percentage: None,
        }]);
        assert_eq!(rows[0].band, RoiBand::Poor);
    }
}
