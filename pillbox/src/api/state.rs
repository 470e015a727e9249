use std::sync::Arc;

use crate::config::Config;
use crate::db::PillCatalog;
use crate::services::PillService;
use crate::vision::TextDetector;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn PillCatalog>,
    pub vision: Arc<dyn TextDetector>,
    pub pills: PillService,
}

impl AppState {
    pub fn new(config: Config, db: Arc<dyn PillCatalog>, vision: Arc<dyn TextDetector>) -> Self {
        let pills = PillService::new(db.clone(), vision.clone(), &config);

        Self {
            config: Arc::new(config),
            db,
            vision,
            pills,
        }
    }
}
