pub mod jwt;
pub mod middleware;
pub mod models;

pub use middleware::AuthUser;
pub use models::Role;
