use duckdb::{AccessMode, Config, Connection};
use log::error;

use crate::error::ArchiveError;

/// Open a DuckDB connection.  No retries, a failure is logged and returned
/// to the caller.  The connection is closed when it goes out of scope.
pub fn open_connection(
    duckdb_path: &str,
    access_mode: AccessMode,
) -> Result<Connection, ArchiveError> {
    let opened = Config::default()
        .access_mode(access_mode)
        .and_then(|config| Connection::open_with_flags(duckdb_path, config));
    match opened {
        Ok(conn) => Ok(conn),
        Err(e) => {
            error!("Failed to connect to DuckDB at {}: {}", duckdb_path, e);
            Err(ArchiveError::Connection {
                path: duckdb_path.to_string(),
                source: e,
            })
        }
    }
}
