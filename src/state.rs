use std::{sync::Arc, time::Duration};

use crate::analyzer::{gemini::GeminiClient, EmotionAnalyzer};
use crate::auth::{jwt::JwtKeys, repo::UserRepo, services::AuthService};
use crate::config::{AnalyzerConfig, AppConfig};
use crate::db::PgStore;
use crate::diary::{repo::DiaryRepo, services::DiaryService};
use crate::profile::services::ProfileService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub auth: AuthService,
    pub diary: DiaryService,
    pub profile: ProfileService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = Arc::new(PgStore::connect(&config.database_url).await?);
        tracing::info!("connected to database");
        if let Err(e) = store.migrate().await {
            tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
        }

        let analyzer = build_analyzer(&config.analyzer)?;
        Ok(Self::from_parts(config, store.clone(), store, analyzer))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        entries: Arc<dyn DiaryRepo>,
        analyzer: EmotionAnalyzer,
    ) -> Self {
        let jwt = JwtKeys::from_config(&config.jwt);
        Self {
            auth: AuthService::new(users.clone(), jwt.clone()),
            diary: DiaryService::new(entries.clone(), analyzer),
            profile: ProfileService::new(users, entries),
            jwt,
            config,
        }
    }

    /// In-memory state with enrichment disabled.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_url: "memory://".into(),
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                ttl_hours: 24,
            },
            analyzer: AnalyzerConfig::default(),
        });
        let store = Arc::new(crate::memory::MemoryStore::new());
        Self::from_parts(config, store.clone(), store, EmotionAnalyzer::disabled())
    }
}

fn build_analyzer(cfg: &AnalyzerConfig) -> anyhow::Result<EmotionAnalyzer> {
    let Some(key) = cfg.api_key.as_deref() else {
        return Ok(EmotionAnalyzer::disabled());
    };
    let client = GeminiClient::new(key, cfg)?;
    Ok(EmotionAnalyzer::new(
        Arc::new(client),
        Duration::from_secs(cfg.timeout_secs),
    ))
}
