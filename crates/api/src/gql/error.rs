use crate::error::AppError;

/// Error type shared by resolvers and domain services.
///
/// async-graphql converts anything implementing `Display` through `?`, so the
/// message written here is exactly what clients see. Database errors are logged
/// and replaced by a generic message.
#[derive(Debug)]
pub enum GqlError {
    Sqlx(sqlx::Error),
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl GqlError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        GqlError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        GqlError::Conflict(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        GqlError::Invalid(msg.into())
    }
}

impl std::fmt::Display for GqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GqlError::Sqlx(e) => {
                tracing::error!("Database error: {e}");
                write!(f, "Internal database error")
            }
            GqlError::NotFound(msg) | GqlError::Conflict(msg) | GqlError::Invalid(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl std::error::Error for GqlError {}

impl From<sqlx::Error> for GqlError {
    fn from(e: sqlx::Error) -> Self {
        GqlError::Sqlx(e)
    }
}

impl From<GqlError> for AppError {
    fn from(e: GqlError) -> Self {
        match e {
            GqlError::Sqlx(e) => AppError::Db(e),
            GqlError::NotFound(msg) => AppError::NotFound(msg),
            GqlError::Conflict(msg) => AppError::Conflict(msg),
            GqlError::Invalid(msg) => AppError::BadRequest(msg),
        }
    }
}

/// Extension trait that converts any `Result<T, E>` where `E: Display`
/// into `async_graphql::Result<T>` with a contextual message prefix.
///
/// Usage: `Uuid::parse_str(id).gql_err("Invalid competition ID")?`
pub trait ResultExt<T> {
    fn gql_err(self, context: &str) -> std::result::Result<T, async_graphql::Error>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn gql_err(self, context: &str) -> std::result::Result<T, async_graphql::Error> {
        self.map_err(|e| async_graphql::Error::new(format!("{context}: {e}")))
    }
}

pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
