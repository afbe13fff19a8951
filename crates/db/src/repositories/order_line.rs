use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use cartlens_core::domain::order::{OrderLine, OrderLineId};
use cartlens_core::domain::service::ServiceId;

use super::{parse_timestamp, RepositoryError};

/// Every cart row, ordered by id.
pub(crate) async fn list_order_lines(
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderLine>, RepositoryError> {
    let rows = sqlx::query(
        "SELECT id, product_id, quantity, CAST(created_timestamp AS TEXT) AS created_timestamp
         FROM cart
         ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(row_to_order_line).collect()
}

fn row_to_order_line(row: &SqliteRow) -> Result<OrderLine, RepositoryError> {
    let raw_timestamp: String = row.try_get("created_timestamp")?;
    Ok(OrderLine {
        id: OrderLineId(row.try_get("id")?),
        product_id: ServiceId(row.try_get("product_id")?),
        quantity: row.try_get("quantity")?,
        created_at: parse_timestamp(&raw_timestamp)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::list_order_lines;
    use crate::repositories::RepositoryError;
    use crate::{connect_with_settings, migrations, DbPool};
    use cartlens_core::domain::order::{OrderLine, OrderLineId};
    use cartlens_core::domain::service::ServiceId;

    async fn migrated_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn rows_come_back_in_id_order() {
        let pool = migrated_pool().await;
        sqlx::raw_sql(
            "INSERT INTO cart (id, product_id, quantity, created_timestamp) VALUES
                (3, 2, 1, '2024-01-10 10:00:00'),
                (1, 1, 2, '2024-01-02 10:00:00'),
                (2, 1, 3, '2024-01-03T10:00:00');",
        )
        .execute(&pool)
        .await
        .expect("seed");

        let mut conn = pool.acquire().await.expect("acquire");
        let lines = list_order_lines(&mut conn).await.expect("list");

        assert_eq!(lines.iter().map(|line| line.id.0).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(
            lines[0],
            OrderLine {
                id: OrderLineId(1),
                product_id: ServiceId(1),
                quantity: 2,
                created_at: NaiveDate::from_ymd_opt(2024, 1, 2)
                    .and_then(|date| date.and_hms_opt(10, 0, 0))
                    .expect("timestamp"),
            }
        );
    }

    #[tokio::test]
    async fn malformed_timestamp_is_a_decode_error() {
        let pool = migrated_pool().await;
        sqlx::query(
            "INSERT INTO cart (id, product_id, quantity, created_timestamp) VALUES (1, 1, 1, 'soon')",
        )
        .execute(&pool)
        .await
        .expect("insert");

        let mut conn = pool.acquire().await.expect("acquire");
        let error = list_order_lines(&mut conn).await.expect_err("decode");
        assert!(matches!(error, RepositoryError::Decode(_)));
    }
}
