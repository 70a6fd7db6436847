/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Persistence backends for tournament data.
pub mod tournament_store;
