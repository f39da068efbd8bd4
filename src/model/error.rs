use thiserror::Error;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

/// Closed classification of everything the database layer can fail with.
/// sqlx errors are folded into this enum right at the boundary so the web
/// layer switches on kind, never on driver error types.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },
    #[error("not-null constraint violated: {message}")]
    NotNullViolation { message: String },
    #[error("database unavailable: {0}")]
    Unavailable(sqlx::Error),
    #[error("sqlx migrate error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("json error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("access to this resource is forbidden")]
    Forbidden,
    #[error("sqlx error: {0}")]
    SqlxError(sqlx::Error),
}

// postgres SQLSTATE classes we care about
const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
const PG_NOT_NULL_VIOLATION: &str = "23502";

impl From<sqlx::Error> for DatabaseError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            match db.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) => {
                    return Self::UniqueViolation {
                        constraint: db.constraint().unwrap_or("unknown").to_string(),
                    };
                }
                Some(PG_FOREIGN_KEY_VIOLATION) => {
                    return Self::ForeignKeyViolation {
                        constraint: db.constraint().unwrap_or("unknown").to_string(),
                    };
                }
                Some(PG_NOT_NULL_VIOLATION) => {
                    return Self::NotNullViolation {
                        message: db.message().to_string(),
                    };
                }
                _ => {}
            }
        }

        match e {
            e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
                Self::Unavailable(e)
            }
            other => Self::SqlxError(other),
        }
    }
}
