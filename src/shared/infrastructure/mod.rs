/// Infrastructure shared by every module: the connection pool and the
/// embedded migrations that go with it.
pub mod database;

pub use database::Database;
