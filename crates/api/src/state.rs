use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{AuthConfig, JwtService};
use crate::config::UploadConfig;
use crate::services::{BlobStore, EmailConfig, EmailService, LocalBlobStore, ResultsCache};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    auth_config: AuthConfig,
    jwt_service: JwtService,
    upload_config: UploadConfig,
    blob_store: Arc<dyn BlobStore>,
    email_service: Option<EmailService>,
    results_cache: ResultsCache,
}

impl AppState {
    pub fn new(
        db: PgPool,
        auth_config: AuthConfig,
        upload_config: UploadConfig,
        email_service: Option<EmailService>,
    ) -> Self {
        let jwt_service = JwtService::new(&auth_config);
        let blob_store: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&upload_config));

        Self {
            db,
            auth_config,
            jwt_service,
            upload_config,
            blob_store,
            email_service,
            results_cache: ResultsCache::default(),
        }
    }

    pub fn from_env(db: PgPool) -> anyhow::Result<Self> {
        let auth_config = AuthConfig::from_env()?;
        let email_service = EmailConfig::from_env().map(EmailService::new);
        if email_service.is_none() {
            tracing::warn!("Email delivery is not configured; reset and confirmation mails are skipped");
        }

        Ok(Self::new(
            db,
            auth_config,
            UploadConfig::from_env(),
            email_service,
        ))
    }

    pub fn auth_config(&self) -> &AuthConfig {
        &self.auth_config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn upload_config(&self) -> &UploadConfig {
        &self.upload_config
    }

    pub fn blob_store(&self) -> &dyn BlobStore {
        self.blob_store.as_ref()
    }

    pub fn email_service(&self) -> Option<&EmailService> {
        self.email_service.as_ref()
    }

    pub fn results_cache(&self) -> &ResultsCache {
        &self.results_cache
    }
}
