//! PostgreSQL-backed stores (behind the `postgres` feature).

pub mod user;

pub use user::PostgresUserRepository;
