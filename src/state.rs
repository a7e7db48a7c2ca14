use std::sync::Arc;

use crate::config::Config;
use crate::services::category_cache::CategoryCache;
use crate::services::UserRepo;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub categories: Arc<CategoryCache>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self {
            store,
            categories: Arc::new(CategoryCache::new()),
            config: Arc::new(config),
        }
    }

    /// Store access scoped to the authenticated user.
    pub fn repo(&self, user_id: uuid::Uuid) -> UserRepo<'_> {
        UserRepo::new(self.store.as_ref(), user_id)
    }
}
