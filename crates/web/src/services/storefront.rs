//! Public storefront lookups.
//!
//! Caches the profile and price list behind each slug using `moka`
//! (one-minute TTL). Owners' edits invalidate their slug explicitly.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::db::{MenuRepository, ProfileRepository, RepositoryError};
use crate::models::{MenuItem, Profile};

/// A business's public page data.
#[derive(Debug, Clone)]
pub struct Storefront {
    pub profile: Profile,
    pub items: Vec<MenuItem>,
}

/// Slug-keyed cache over storefront queries.
#[derive(Clone)]
pub struct StorefrontService {
    cache: Cache<String, Arc<Storefront>>,
}

impl StorefrontService {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(60))
            .build();
        Self { cache }
    }

    /// Load the storefront for `slug`, or `None` if no profile claims it.
    ///
    /// Misses are not cached so a newly claimed slug shows up immediately.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a query fails.
    #[instrument(skip(self, pool))]
    pub async fn load(
        &self,
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Arc<Storefront>>, RepositoryError> {
        if let Some(storefront) = self.cache.get(slug).await {
            debug!("Cache hit for storefront");
            return Ok(Some(storefront));
        }

        let Some(profile) = ProfileRepository::new(pool).get_by_slug(slug).await? else {
            return Ok(None);
        };
        let items = MenuRepository::new(pool).list(profile.id).await?;

        let storefront = Arc::new(Storefront { profile, items });
        self.cache
            .insert(slug.to_owned(), Arc::clone(&storefront))
            .await;
        Ok(Some(storefront))
    }

    /// Drop the cached page for a slug.
    pub async fn invalidate(&self, slug: &str) {
        self.cache.invalidate(slug).await;
    }
}

impl Default for StorefrontService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StorefrontService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontService")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::tests::profile;

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let service = StorefrontService::new();
        let storefront = Arc::new(Storefront {
            profile: profile("Ada Bakes"),
            items: vec![],
        });
        service
            .cache
            .insert("ada-bakes".to_owned(), storefront)
            .await;
        assert!(service.cache.get("ada-bakes").await.is_some());

        service.invalidate("ada-bakes").await;
        assert!(service.cache.get("ada-bakes").await.is_none());
    }
}
