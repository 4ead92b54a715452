//! Seed the catalog with the default categories.
//!
//! Safe to run repeatedly: categories that already exist by name are skipped.

use thiserror::Error;
use tracing::info;

use shopfront_api::db::{CategoryRepository, PgDocumentStore, RepositoryError};
use shopfront_core::CategoryId;
use shopfront_core::models::Category;

use super::ConnectError;

/// Categories a fresh shop starts with.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Milk & Eggs",
    "Vegetables & Fruits",
    "Meat & Fish",
    "Bakery",
    "Pantry",
    "Wine & Drinks",
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Insert any missing default categories.
pub async fn categories() -> Result<(), SeedError> {
    let store = PgDocumentStore::new(super::connect().await?);
    let repo = CategoryRepository::new(&store);

    let mut inserted = 0_usize;
    for name in DEFAULT_CATEGORIES {
        if repo.find_by_name(name).await?.is_some() {
            continue;
        }
        repo.create(&Category {
            id: CategoryId::generate(),
            name: name.to_string(),
        })
        .await?;
        inserted += 1;
    }

    info!(
        inserted,
        skipped = DEFAULT_CATEGORIES.len() - inserted,
        "Seeding complete!"
    );
    Ok(())
}
