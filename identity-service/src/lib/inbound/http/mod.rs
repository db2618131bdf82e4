pub mod cookies;
pub mod credentials;
pub mod handlers;
pub mod middleware;
pub mod router;
