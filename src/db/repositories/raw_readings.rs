use anyhow::{Context, Result};
use rusqlite::Row;

use crate::db::{
    helpers::{decodable_rows, decode_error, parse_datetime},
    models::RawReading,
    Database,
};

const SELECT_COLUMNS: &str = "SELECT id, temperature, humidity, created_at FROM dht22_logs";

fn map_reading(row: &Row<'_>) -> rusqlite::Result<RawReading> {
    let created_at: String = row.get(3)?;
    Ok(RawReading {
        id: row.get(0)?,
        temperature: row.get(1)?,
        humidity: row.get(2)?,
        created_at: parse_datetime(&created_at, "created_at").map_err(decode_error)?,
    })
}

impl Database {
    /// Most recent decodable sample by `created_at`, if the ingestion job
    /// wrote any.
    pub async fn latest_reading(&self) -> Result<Option<RawReading>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"
            ))?;
            let latest = decodable_rows(stmt.query_map([], map_reading)?, "reading")
                .next()
                .transpose()
                .context("failed to load latest reading")?;
            Ok(latest)
        })
        .await
    }

    /// The newest `limit` decodable samples, returned oldest first for plotting.
    pub async fn recent_readings(&self, limit: usize) -> Result<Vec<RawReading>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"
            ))?;
            let mut readings = decodable_rows(stmt.query_map([], map_reading)?, "reading")
                .take(limit)
                .collect::<Result<Vec<_>, _>>()
                .context("failed to load recent readings")?;
            readings.reverse();
            Ok(readings)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::{open_temp, seed_reading, ts};

    #[tokio::test]
    async fn latest_reading_is_absent_on_empty_store() {
        let (_dir, db) = open_temp();
        assert!(db.latest_reading().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_reading_orders_by_created_at() {
        let (_dir, db) = open_temp();
        seed_reading(&db, 25.0, 60.0, "2024-05-01T10:00:05+00:00").await;
        seed_reading(&db, 26.0, 61.0, "2024-05-01T10:00:10+00:00").await;
        seed_reading(&db, 24.0, 59.0, "2024-05-01T10:00:00+00:00").await;

        let latest = db.latest_reading().await.unwrap().expect("reading");
        assert_eq!(latest.temperature, 26.0);
        assert_eq!(latest.created_at, ts("2024-05-01T10:00:10+00:00"));
    }

    #[tokio::test]
    async fn recent_readings_keeps_newest_in_ascending_order() {
        let (_dir, db) = open_temp();
        for second in 0..5 {
            let at = format!("2024-05-01T10:00:0{second}+00:00");
            seed_reading(&db, 20.0 + second as f64, 50.0, &at).await;
        }

        let recent = db.recent_readings(3).await.unwrap();
        let temps: Vec<f64> = recent.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![22.0, 23.0, 24.0]);
    }

    #[tokio::test]
    async fn malformed_timestamp_is_skipped() {
        let (_dir, db) = open_temp();
        seed_reading(&db, 25.0, 60.0, "2024-05-01T10:00:00+00:00").await;
        // Sorts after every digit-led timestamp.
        seed_reading(&db, 99.0, 99.0, "not-a-date").await;

        let latest = db.latest_reading().await.unwrap().expect("reading");
        assert_eq!(latest.temperature, 25.0);
    }

    #[tokio::test]
    async fn malformed_rows_do_not_count_toward_the_limit() {
        let (_dir, db) = open_temp();
        for second in 0..3 {
            let at = format!("2024-05-01T10:00:0{second}+00:00");
            seed_reading(&db, 20.0 + second as f64, 50.0, &at).await;
        }
        seed_reading(&db, 99.0, 99.0, "garbage").await;

        let recent = db.recent_readings(2).await.unwrap();
        let temps: Vec<f64> = recent.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![21.0, 22.0]);
    }

    #[tokio::test]
    async fn only_malformed_rows_reads_as_empty() {
        let (_dir, db) = open_temp();
        seed_reading(&db, 25.0, 60.0, "not-a-date").await;
        assert!(db.latest_reading().await.unwrap().is_none());
        assert!(db.recent_readings(10).await.unwrap().is_empty());
    }
}
