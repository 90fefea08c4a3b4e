pub mod db;
pub mod excursions;
pub mod media;
pub mod migrations;

pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use excursions::{ExcursionStore, SqliteExcursionStore};
pub use media::{FileGateway, IncomingFile, LocalMediaStore, MediaSource};
