// Generic paged SELECT over a soft-deleting table. The same WHERE clause
// feeds both the COUNT and the page query, so the reported total always
// matches the filter.

use crate::persistence::session::DbSession;
use person_registry_domain::paging::{PagedResult, PageRequest};
use person_registry_domain::{DomainError, Result};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};

/// A typed filter that appends `AND <condition>` fragments to a query that
/// already carries a WHERE clause. Values go through bind parameters, never
/// into the SQL text.
pub trait SqlFilter: Send + Sync {
    fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>);
}

/// Runs the count-then-page query pair for one filter.
pub async fn fetch_page<T>(
    session: &DbSession,
    columns: &str,
    table: &str,
    filter: &dyn SqlFilter,
    order_by: &str,
    page: PageRequest,
    map_row: impl Fn(&PgRow) -> Result<T>,
) -> Result<PagedResult<T>> {
    let mut count = QueryBuilder::new(format!(
        "SELECT COUNT(*) FROM {table} WHERE is_deleted = FALSE"
    ));
    filter.apply(&mut count);
    let total: i64 = session
        .fetch_one(count.build())
        .await
        .map_err(|e| DomainError::infrastructure(format!("failed to count {table}: {e}")))?
        .try_get(0)
        .map_err(|e| DomainError::infrastructure(format!("failed to read {table} count: {e}")))?;

    let mut select = QueryBuilder::new(format!(
        "SELECT {columns} FROM {table} WHERE is_deleted = FALSE"
    ));
    filter.apply(&mut select);
    select.push(format!(" ORDER BY {order_by} LIMIT "));
    select.push_bind(page.size);
    select.push(" OFFSET ");
    select.push_bind(page.offset());

    let rows = session
        .fetch_all(select.build())
        .await
        .map_err(|e| DomainError::infrastructure(format!("failed to list {table}: {e}")))?;
    let items = rows.iter().map(map_row).collect::<Result<Vec<_>>>()?;

    Ok(PagedResult::new(items, total, page))
}

/// Escapes LIKE wildcards in user input and wraps it for a substring match.
pub fn contains_pattern(value: &str) -> String {
    let escaped = value
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(" Nino "), "%Nino%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }
}
