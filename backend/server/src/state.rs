use std::sync::Arc;

use spots::{ObjectStore, RecordStore, Supabase};

use super::config::Config;

pub struct State {
    pub config: Config,
    pub records: Arc<dyn RecordStore>,
    pub admin_records: Arc<dyn RecordStore>,
    pub objects: Arc<dyn ObjectStore>,
}

impl State {
    pub fn new(config: Config) -> Arc<Self> {
        let public = Supabase::new(&config.supabase_url, &config.anon_key).with_table(&config.table);

        let admin = Arc::new(
            Supabase::new(&config.supabase_url, &config.service_role_key)
                .with_table(&config.table)
                .with_bucket(&config.bucket),
        );

        Arc::new(Self {
            config,
            records: Arc::new(public),
            admin_records: admin.clone(),
            objects: admin,
        })
    }

    pub fn with_stores(
        config: Config,
        records: Arc<dyn RecordStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            admin_records: records.clone(),
            records,
            objects,
        })
    }
}
