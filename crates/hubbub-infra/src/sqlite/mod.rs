//! SQLite persistence: connection pool and the session repository.

pub mod pool;
pub mod session;
