/// Database layer for Flowgate
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Schema migration runner for the `migrations/` directory
///
/// The Postgres data managers live in `persistence::postgres`.
pub mod migrations;
pub mod pool;
