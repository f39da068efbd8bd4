mod context;
pub use context::{AuthenticatedUser, RequestContext, UserRole, UserStatus};

mod error;
pub use error::{WebError, WebResult};

pub mod middlewares;

pub mod validate;
pub use validate::{PaginationQuery, SortOrder, ValidatedJson, ValidatedQuery};

mod state;
pub use state::AppState;

pub mod dto;

pub mod routes;

pub mod doc;
