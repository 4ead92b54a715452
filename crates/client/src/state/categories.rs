//! Categories store.

use shopfront_core::models::Category;

use crate::store::Reducer;

/// Cached category list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoriesState {
    pub categories: Vec<Category>,
    /// Set once a full listing has been fetched.
    pub loaded: bool,
}

/// Changes to the categories store.
#[derive(Debug, Clone)]
pub enum CategoriesAction {
    /// Replace the list with a full listing.
    FetchCategories(Vec<Category>),
    /// Drop the cache so the next read refetches.
    Invalidate,
}

impl Reducer for CategoriesState {
    type Action = CategoriesAction;

    fn reduce(&mut self, action: CategoriesAction) {
        match action {
            CategoriesAction::FetchCategories(categories) => {
                self.categories = categories;
                self.loaded = true;
            }
            CategoriesAction::Invalidate => *self = Self::default(),
        }
    }
}
