use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{map_write_error, PgRepository, TRIP_COLUMNS};
use crate::models::{NewTrip, Trip, TripStatus, TripTransition};
use crate::repositories::TripRepository;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[async_trait]
impl TripRepository for PgRepository {
    async fn list_trips(&self) -> AppResult<Vec<Trip>> {
        let trips = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(trips)
    }

    async fn find_trip(&self, id: Uuid) -> AppResult<Option<Trip>> {
        let trip = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(trip)
    }

    async fn trips_created_since(&self, since: DateTime<Utc>) -> AppResult<Vec<Trip>> {
        let trips = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE created_at >= $1 ORDER BY created_at DESC"
        ))
        .bind(since)
        .fetch_all(self.pool())
        .await?;

        Ok(trips)
    }

    async fn insert_trip(&self, trip: NewTrip) -> AppResult<Trip> {
        let created = sqlx::query_as::<_, Trip>(&format!(
            r#"
            INSERT INTO trips (vehicle_id, driver_id, origin, destination, cargo_weight_kg,
                               cargo_description, estimated_fuel_cost, revenue, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TRIP_COLUMNS}
            "#
        ))
        .bind(trip.vehicle_id)
        .bind(trip.driver_id)
        .bind(&trip.origin)
        .bind(&trip.destination)
        .bind(trip.cargo_weight_kg)
        .bind(&trip.cargo_description)
        .bind(trip.estimated_fuel_cost)
        .bind(trip.revenue)
        .bind(TripStatus::Pending.as_str())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_error(e, None))?;

        Ok(created)
    }

    async fn apply_transition(&self, transition: &TripTransition) -> AppResult<Trip> {
        let mut tx = self.pool().begin().await?;

        // Solo se actualiza si el viaje sigue en el estado de partida
        let trip = sqlx::query_as::<_, Trip>(&format!(
            r#"
            UPDATE trips
            SET status = $2,
                start_odometer = COALESCE($3, start_odometer),
                end_odometer = COALESCE($4, end_odometer),
                dispatched_at = CASE WHEN $2::text = 'On Way' THEN now() ELSE dispatched_at END,
                completed_at = CASE WHEN $2::text = 'Completed' THEN now() ELSE completed_at END
            WHERE id = $1 AND status = $5
            RETURNING {TRIP_COLUMNS}
            "#
        ))
        .bind(transition.trip_id)
        .bind(transition.to.as_str())
        .bind(transition.start_odometer)
        .bind(transition.end_odometer)
        .bind(transition.from.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "Trip {} is no longer {}",
                transition.trip_id, transition.from
            ))
        })?;

        // Los estados acompañantes se comprueban en la misma sentencia; un
        // error antes del commit descarta la transacción entera
        if let Some(vehicle) = transition.vehicle {
            let result = sqlx::query(
                r#"
                UPDATE vehicles
                SET status = $2, odometer_km = COALESCE($3, odometer_km)
                WHERE id = $1 AND ($4::text IS NULL OR status = $4)
                "#,
            )
            .bind(vehicle.id)
            .bind(vehicle.status.as_str())
            .bind(transition.vehicle_odometer)
            .bind(transition.vehicle_must_be.map(|status| status.as_str()))
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(match transition.vehicle_must_be {
                    Some(expected) => AppError::Conflict(format!(
                        "Vehicle {} is no longer {}",
                        vehicle.id, expected
                    )),
                    None => not_found_error("Vehicle", &vehicle.id.to_string()),
                });
            }
        }

        if let Some(driver) = transition.driver {
            let result = sqlx::query(
                r#"
                UPDATE drivers
                SET status = $2
                WHERE id = $1 AND ($3::text IS NULL OR status <> $3)
                "#,
            )
            .bind(driver.id)
            .bind(driver.status.as_str())
            .bind(transition.driver_must_not_be.map(|status| status.as_str()))
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(match transition.driver_must_not_be {
                    Some(blocked) => AppError::Conflict(format!(
                        "Driver {} is {} and cannot be dispatched",
                        driver.id, blocked
                    )),
                    None => not_found_error("Driver", &driver.id.to_string()),
                });
            }
        }

        tx.commit().await?;
        Ok(trip)
    }
}
