//! Analytics derivados
//!
//! Funciones puras: filas del backend → agregados listos para gráficos,
//! tablas y exportación CSV. Sin efectos secundarios.

pub mod csv_report;
pub mod dead_stock;
pub mod fuel_efficiency;
pub mod overview;
pub mod roi;

pub use csv_report::{build_analytics_report, build_monthly_export, ReportInput};
pub use dead_stock::{find_dead_stock, DeadStockVehicle, DEAD_STOCK_WINDOW_DAYS};
pub use fuel_efficiency::{build_fuel_chart, entry_efficiency, FuelChart, FuelChartPoint};
pub use overview::{build_overview, FleetOverview};
pub use roi::{classify_roi, RoiBand, VehicleRoi};
