use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::db::collection::{Collection, CollectionName};
use crate::payment::PaymentGateway;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn collection(&self, name: CollectionName) -> Collection {
        Collection::new(self.db.clone(), name)
    }

    pub fn users(&self) -> Collection {
        self.collection(CollectionName::Users)
    }
}
