//! Beamline lookup table methods on Repository

use std::collections::HashSet;

use super::Repository;
use crate::{error::AppResult, models::import_report::RemoteBeamline};

impl Repository {
    pub async fn beamlines_existing_pks(&self) -> AppResult<HashSet<i64>> {
        let pks: Vec<i64> = sqlx::query_scalar("SELECT pk FROM beamlines WHERE pk IS NOT NULL")
            .fetch_all(&self.pool)
            .await?;
        Ok(pks.into_iter().collect())
    }

    /// Insert a beamline unless its pk is already known
    pub async fn beamlines_insert(&self, beamline: &RemoteBeamline) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO beamlines (pk, beamline, order_num) VALUES (?, ?, ?)",
        )
        .bind(beamline.pk)
        .bind(&beamline.beamline)
        .bind(beamline.order)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
