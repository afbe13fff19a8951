use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use cartlens_core::domain::service::{Category, CategoryId};

use super::{RepositoryError, BIND_CHUNK};

pub(crate) async fn fetch_categories_by_ids(
    conn: &mut SqliteConnection,
    ids: &[CategoryId],
) -> Result<Vec<Category>, RepositoryError> {
    let mut categories = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(BIND_CHUNK) {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT id, category_name FROM category WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(id.0);
        }
        separated.push_unseparated(") ORDER BY id");

        let rows = builder.build().fetch_all(&mut *conn).await?;
        for row in &rows {
            categories.push(row_to_category(row)?);
        }
    }

    Ok(categories)
}

fn row_to_category(row: &SqliteRow) -> Result<Category, RepositoryError> {
    Ok(Category {
        id: CategoryId(row.try_get("id")?),
        category_name: row.try_get("category_name")?,
    })
}
