pub mod blob_store;
pub mod email_service;
pub mod results_cache;
pub mod token_cleanup;

pub use blob_store::{BlobStore, LocalBlobStore};
pub use email_service::{EmailConfig, EmailService};
pub use results_cache::{CacheKey, ResultsCache};
pub use token_cleanup::{spawn_token_cleanup_service, TokenCleanupService};
