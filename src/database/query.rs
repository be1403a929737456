use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;
use uuid::Uuid;

use crate::database::models::ProductFilter;
use crate::database::scope::TenantScope;

/// Bound value of a generated statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Uuid(Uuid),
    Text(String),
    Decimal(Decimal),
}

/// WHERE-clause builder whose first condition is always the tenant
/// constraint. Further conditions can only be ANDed on, never ORed against
/// the tenant predicate, so no filter can widen the scope.
#[derive(Debug, Clone)]
pub struct ScopedQuery {
    conditions: Vec<String>,
    params: Vec<Param>,
}

impl ScopedQuery {
    pub fn new(scope: &TenantScope) -> Self {
        Self {
            conditions: vec!["\"tenant_id\" = $1".to_string()],
            params: vec![Param::Uuid(scope.tenant_id())],
        }
    }

    /// Append `column op $n`.
    pub fn and(mut self, column: &str, op: &str, value: Param) -> Self {
        let index = self.push(value);
        self.conditions.push(format!("\"{}\" {} ${}", column, op, index));
        self
    }

    /// Append a raw predicate that references no parameters.
    pub fn and_raw(mut self, predicate: &str) -> Self {
        self.conditions.push(format!("({})", predicate));
        self
    }

    /// Case-insensitive substring match over several columns, ORed with
    /// each other and ANDed with everything else.
    pub fn and_search(mut self, columns: &[&str], term: &str) -> Self {
        let index = self.push(Param::Text(format!("%{}%", escape_like(term))));
        let alternatives: Vec<String> = columns
            .iter()
            .map(|c| format!("\"{}\" ILIKE ${}", c, index))
            .collect();
        self.conditions.push(format!("({})", alternatives.join(" OR ")));
        self
    }

    fn push(&mut self, value: Param) -> usize {
        self.params.push(value);
        self.params.len()
    }

    pub fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Conditions for a product listing.
    pub fn product_list(scope: &TenantScope, filter: &ProductFilter) -> Self {
        let mut query = Self::new(scope);
        if let Some(category_id) = filter.category_id {
            query = query.and("category_id", "=", Param::Uuid(category_id));
        }
        if let Some(status) = filter.status {
            query = query.and("status", "=", Param::Text(status.as_str().to_string()));
        }
        if let Some(supplier) = &filter.supplier_name {
            query = query.and("supplier_name", "ILIKE", Param::Text(escape_like(supplier)));
        }
        if let Some(unit) = &filter.unit {
            query = query.and("unit", "=", Param::Text(unit.clone()));
        }
        if let Some(min) = filter.min_price {
            query = query.and("selling_price", ">=", Param::Decimal(min));
        }
        if let Some(max) = filter.max_price {
            query = query.and("selling_price", "<=", Param::Decimal(max));
        }
        if filter.low_stock {
            query = query.and_raw("\"quantity\" <= \"reorder_level\"");
        }
        if let Some(term) = &filter.search {
            query = query.and_search(&["name", "sku"], term);
        }
        query
    }

    pub fn bind<'q>(&'q self, mut query: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        for param in &self.params {
            query = match param {
                Param::Uuid(v) => query.bind(*v),
                Param::Text(v) => query.bind(v.as_str()),
                Param::Decimal(v) => query.bind(*v),
            };
        }
        query
    }
}

/// Escape LIKE wildcards so user input only ever matches literally.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
