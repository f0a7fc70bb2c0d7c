//! Document store implementations - PostgreSQL and in-memory.

mod memory;
mod rules;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::InMemoryDocumentStore;
pub use rules::{AccessRules, Owner};

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, connect};
#[cfg(feature = "postgres")]
pub use postgres::PostgresDocumentStore;


use std::cmp::Ordering;

use serde_json::Value;

use coldhours_core::ports::{Document, SortDirection};

/// Order documents by `field`; documents missing it go last, ties by id.
pub(crate) fn order_documents(documents: &mut [Document], field: &str, direction: SortDirection) {
    documents.sort_by(|a, b| {
        let by_field = match (a.fields.get(field), b.fields.get(field)) {
            (Some(x), Some(y)) if !x.is_null() && !y.is_null() => {
                let ordering = compare_values(x, y);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            }
            (Some(x), _) if !x.is_null() => Ordering::Less,
            (_, Some(y)) if !y.is_null() => Ordering::Greater,
            _ => Ordering::Equal,
        };
        by_field.then_with(|| a.id.cmp(&b.id))
    });
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
