pub mod pool;
pub mod query;
pub mod repositories;
pub mod schema;
pub mod session;
pub mod unit_of_work;

pub use pool::DatabaseConfig;
pub use session::DbSession;
pub use unit_of_work::PgUnitOfWork;
