//! `SeaORM` entities backing `SqliteStore`.

pub mod account;
pub mod remote_config;
pub mod zone;
