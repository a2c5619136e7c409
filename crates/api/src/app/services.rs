use std::sync::Arc;

use cursos_infra::{CourseCatalog, CourseStore, InMemoryCourseStore};

use crate::config::{ApiConfig, EmptyListPolicy, StoreBackend};

/// Store chosen at startup; handlers do not care which.
pub type DynCourseStore = Arc<dyn CourseStore>;

pub struct AppServices {
    pub catalog: CourseCatalog<DynCourseStore>,
    pub empty_list: EmptyListPolicy,
}

impl AppServices {
    pub fn new(store: DynCourseStore, config: &ApiConfig) -> Self {
        Self {
            catalog: CourseCatalog::new(store, config.dispatch),
            empty_list: config.empty_list,
        }
    }
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store: DynCourseStore = match &config.store {
        StoreBackend::Memory => {
            tracing::info!("using in-memory course store");
            Arc::new(InMemoryCourseStore::new())
        }
        StoreBackend::Postgres { database_url } => connect_postgres(database_url).await?,
    };
    Ok(AppServices::new(store, config))
}

#[cfg(feature = "postgres")]
async fn connect_postgres(database_url: &str) -> anyhow::Result<DynCourseStore> {
    use anyhow::Context;
    use cursos_infra::course_store::PostgresCourseStore;

    let store = PostgresCourseStore::connect(database_url)
        .await
        .context("failed to connect to postgres")?;
    store
        .ensure_schema()
        .await
        .context("failed to ensure course schema")?;
    tracing::info!("using postgres course store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn connect_postgres(_database_url: &str) -> anyhow::Result<DynCourseStore> {
    anyhow::bail!("CURSOS_STORE=postgres requires building with the `postgres` feature")
}
