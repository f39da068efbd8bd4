mod auth;
pub use auth::{BEARER_PREFIX, extract_context_fn};
