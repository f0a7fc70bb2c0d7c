//! PostgreSQL document store - documents as JSONB rows keyed by (collection, id).

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use coldhours_core::domain::IdentityId;
use coldhours_core::ports::{Document, DocumentStore, SortDirection, StoreError, WriteFields};

use super::entity::{self, Entity as DocumentEntity};
use super::order_documents;
use super::rules::AccessRules;

pub struct PostgresDocumentStore {
    db: DbConn,
    rules: AccessRules,
}

impl PostgresDocumentStore {
    /// Store enforcing [`AccessRules::standard`].
    pub fn new(db: DbConn) -> Self {
        Self::with_rules(db, AccessRules::standard())
    }

    pub fn with_rules(db: DbConn, rules: AccessRules) -> Self {
        Self { db, rules }
    }

    async fn find(&self, collection: &str, id: &str) -> Result<Option<entity::Model>, StoreError> {
        DocumentEntity::find_by_id((collection.to_owned(), id.to_owned()))
            .one(&self.db)
            .await
            .map_err(map_db_err)
    }
}

fn map_db_err(e: DbErr) -> StoreError {
    match e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => StoreError::Unavailable(e.to_string()),
        _ => StoreError::Backend(e.to_string()),
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        tracing::debug!(collection = %collection, document_id = %id, "Fetching document");
        self.find(collection, id)
            .await?
            .map(Into::into)
            .ok_or(StoreError::NotFound)
    }

    async fn list(
        &self,
        collection: &str,
        order_field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = DocumentEntity::find()
            .filter(entity::Column::Collection.eq(collection))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut documents: Vec<Document> = rows.into_iter().map(Into::into).collect();
        order_documents(&mut documents, order_field, direction);
        Ok(documents)
    }

    async fn create(
        &self,
        collection: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<String, StoreError> {
        let now = Utc::now();
        let id = Uuid::new_v4().simple().to_string();
        let fields = fields.resolve(now);
        self.rules.check_create(collection, &id, &fields, caller)?;

        let row = entity::ActiveModel {
            collection: Set(collection.to_owned()),
            id: Set(id.clone()),
            fields: Set(serde_json::Value::Object(fields)),
            updated_at: Set(now.fixed_offset()),
        };
        DocumentEntity::insert(row)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("duplicate") || err_str.contains("unique") {
                    StoreError::Conflict
                } else {
                    map_db_err(e)
                }
            })?;

        tracing::debug!(collection = %collection, document_id = %id, "Document created");
        Ok(id)
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let fields = fields.resolve(now);
        match self.find(collection, id).await? {
            Some(existing) => {
                let existing: Document = existing.into();
                self.rules
                    .check_write(collection, id, &existing.fields, Some(&fields), caller)?
            }
            None => self.rules.check_create(collection, id, &fields, caller)?,
        }

        let row = entity::ActiveModel {
            collection: Set(collection.to_owned()),
            id: Set(id.to_owned()),
            fields: Set(serde_json::Value::Object(fields)),
            updated_at: Set(now.fixed_offset()),
        };
        DocumentEntity::insert(row)
            .on_conflict(
                OnConflict::columns([entity::Column::Collection, entity::Column::Id])
                    .update_columns([entity::Column::Fields, entity::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let incoming = fields.resolve(now);
        let existing: Document = self
            .find(collection, id)
            .await?
            .ok_or(StoreError::NotFound)?
            .into();
        self.rules
            .check_write(collection, id, &existing.fields, Some(&incoming), caller)?;

        let mut merged = existing.fields;
        merged.extend(incoming);

        let result = DocumentEntity::update_many()
            .col_expr(
                entity::Column::Fields,
                Expr::value(serde_json::Value::Object(merged)),
            )
            .col_expr(entity::Column::UpdatedAt, Expr::value(now.fixed_offset()))
            .filter(entity::Column::Collection.eq(collection))
            .filter(entity::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        tracing::debug!(collection = %collection, document_id = %id, "Document updated");
        Ok(())
    }

    async fn delete(
        &self,
        collection: &str,
        id: &str,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        let existing: Document = self
            .find(collection, id)
            .await?
            .ok_or(StoreError::NotFound)?
            .into();
        self.rules
            .check_write(collection, id, &existing.fields, None, caller)?;

        let result = DocumentEntity::delete_by_id((collection.to_owned(), id.to_owned()))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        tracing::debug!(collection = %collection, document_id = %id, "Document deleted");
        Ok(())
    }
}
