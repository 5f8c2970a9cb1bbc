use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use super::PgRepository;
use crate::models::FleetTable;
use crate::repositories::{ColumnFilter, TableQueryRepository};
use crate::utils::errors::AppResult;

/// Orden por defecto de cada relación
fn default_order(table: FleetTable) -> &'static str {
    match table {
        FleetTable::Vehicles | FleetTable::Trips => " ORDER BY created_at DESC",
        FleetTable::Drivers => " ORDER BY full_name ASC",
        FleetTable::MaintenanceLogs => " ORDER BY service_date DESC",
        FleetTable::FuelLogs => " ORDER BY fuel_date DESC",
        FleetTable::MonthlyFinancialSummary => " ORDER BY month DESC",
        _ => "",
    }
}

/// Construir la consulta; tabla y columnas salen de listas cerradas y los
/// valores van siempre como parámetros
pub(crate) fn build_table_query<'a>(
    table: FleetTable,
    filters: &'a [ColumnFilter],
    limit: i64,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("SELECT row_to_json(r) FROM (SELECT * FROM ");
    builder.push(table.as_str());

    for (index, filter) in filters.iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        builder.push(filter.column);
        builder.push("::text = ");
        builder.push_bind(filter.value.as_str());
    }

    builder.push(default_order(table));
    builder.push(" LIMIT ");
    builder.push_bind(limit);
    builder.push(") r");
    builder
}

#[async_trait]
impl TableQueryRepository for PgRepository {
    async fn query_table(
        &self,
        table: FleetTable,
        filters: &[ColumnFilter],
        limit: i64,
    ) -> AppResult<Vec<serde_json::Value>> {
        let mut builder = build_table_query(table, filters, limit);
        let rows: Vec<(serde_json::Value,)> = builder.build_query_as().fetch_all(self.pool()).await?;

        Ok(rows.into_iter().map(|(row,)| row).collect())
    }
}
