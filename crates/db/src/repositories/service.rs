use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use cartlens_core::domain::service::{CategoryId, Service, ServiceId};

use super::{parse_price, RepositoryError, BIND_CHUNK};

const SELECT_SERVICE: &str =
    "SELECT id, service_name, CAST(price AS TEXT) AS price, category_id FROM service";

/// One `IN (...)` query per chunk of ids; unknown ids simply produce no row.
pub(crate) async fn fetch_services_by_ids(
    conn: &mut SqliteConnection,
    ids: &[ServiceId],
) -> Result<Vec<Service>, RepositoryError> {
    let mut services = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(BIND_CHUNK) {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_SERVICE);
        builder.push(" WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(id.0);
        }
        separated.push_unseparated(") ORDER BY id");

        let rows = builder.build().fetch_all(&mut *conn).await?;
        for row in &rows {
            services.push(row_to_service(row)?);
        }
    }

    Ok(services)
}

fn row_to_service(row: &SqliteRow) -> Result<Service, RepositoryError> {
    let raw_price: String = row.try_get("price")?;
    let category_id: Option<i64> = row.try_get("category_id")?;
    Ok(Service {
        id: ServiceId(row.try_get("id")?),
        service_name: row.try_get("service_name")?,
        price: parse_price(&raw_price)?,
        category_id: category_id.map(CategoryId),
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::fetch_services_by_ids;
    use crate::repositories::RepositoryError;
    use crate::{connect_with_settings, migrations, DbPool};
    use cartlens_core::domain::service::{CategoryId, Service, ServiceId};

    async fn migrated_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn unknown_ids_are_omitted_across_chunks() {
        let pool = migrated_pool().await;
        sqlx::raw_sql(
            "INSERT INTO service (id, service_name, price, category_id) VALUES
                (1, 'Service 1', '18.75', 2),
                (700, 'Service 700', '1', NULL),
                (1200, 'Service 1200', '1', NULL);",
        )
        .execute(&pool)
        .await
        .expect("seed");

        let requested: Vec<ServiceId> = (1..=1300).map(ServiceId).collect();
        let mut conn = pool.acquire().await.expect("acquire");
        let found = fetch_services_by_ids(&mut conn, &requested).await.expect("find");

        assert_eq!(
            found.iter().map(|service| service.id.0).collect::<Vec<_>>(),
            vec![1, 700, 1200]
        );
        assert_eq!(
            found[0],
            Service {
                id: ServiceId(1),
                service_name: "Service 1".to_string(),
                price: Decimal::new(1875, 2),
                category_id: Some(CategoryId(2)),
            }
        );
        assert!(fetch_services_by_ids(&mut conn, &[]).await.expect("empty").is_empty());
    }

    #[tokio::test]
    async fn numeric_price_columns_are_read_as_decimals() {
        let pool = migrated_pool().await;
        sqlx::query(
            "INSERT INTO service (id, service_name, price, category_id) VALUES (1, 'Wax', 12.5, NULL)",
        )
        .execute(&pool)
        .await
        .expect("insert");

        let mut conn = pool.acquire().await.expect("acquire");
        let found = fetch_services_by_ids(&mut conn, &[ServiceId(1)]).await.expect("find");
        assert_eq!(
            found.iter().map(|service| service.price).collect::<Vec<_>>(),
            vec![Decimal::new(125, 1)]
        );
    }

    #[tokio::test]
    async fn unparseable_price_is_a_decode_error() {
        let pool = migrated_pool().await;
        sqlx::query("INSERT INTO service (id, service_name, price) VALUES (1, 'Wax', 'n/a')")
            .execute(&pool)
            .await
            .expect("insert");

        let mut conn = pool.acquire().await.expect("acquire");
        let error = fetch_services_by_ids(&mut conn, &[ServiceId(1)]).await.expect_err("decode");
        assert!(matches!(error, RepositoryError::Decode(_)));
    }
}
