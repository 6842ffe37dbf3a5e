//! Menu repository: storefront price lists.

use sqlx::PgPool;

use slipbook_core::{MenuItemId, ProfileId};

use super::RepositoryError;
use crate::models::MenuItem;
use crate::models::menu::MenuItemDraft;

/// Repository for menu item database operations.
pub struct MenuRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuRepository<'a> {
    /// Create a new menu repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a profile's items in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, profile_id: ProfileId) -> Result<Vec<MenuItem>, RepositoryError> {
        let items = sqlx::query_as(
            r"
            SELECT id, profile_id, name, price, description, created_at
            FROM app.menu_item
            WHERE profile_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(profile_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Save the price list in one transaction.
    ///
    /// Drafts with an ID update the owner's existing row; drafts without one
    /// are inserted. Rows the owner does not own are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn sync(
        &self,
        profile_id: ProfileId,
        drafts: &[MenuItemDraft],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for draft in drafts {
            match draft.id {
                Some(id) => {
                    sqlx::query(
                        r"
                        UPDATE app.menu_item
                        SET name = $3, price = $4, description = $5
                        WHERE id = $1 AND profile_id = $2
                        ",
                    )
                    .bind(id)
                    .bind(profile_id)
                    .bind(&draft.name)
                    .bind(draft.price)
                    .bind(&draft.description)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    sqlx::query(
                        r"
                        INSERT INTO app.menu_item (profile_id, name, price, description)
                        VALUES ($1, $2, $3, $4)
                        ",
                    )
                    .bind(profile_id)
                    .bind(&draft.name)
                    .bind(draft.price)
                    .bind(&draft.description)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete one of the owner's items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owner has no such item.
    pub async fn delete(&self, profile_id: ProfileId, id: MenuItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM app.menu_item WHERE id = $1 AND profile_id = $2")
            .bind(id)
            .bind(profile_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
