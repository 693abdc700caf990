use thiserror::Error;

/// Failures surfaced by the graph store adapter.
///
/// The underlying driver message is kept verbatim so callers see exactly
/// what the database reported. Nothing here is retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not reach or authenticate against the database.
    #[error("graph connection failed: {0}")]
    Connect(String),

    /// The database rejected or failed the query.
    #[error("query failed: {0}")]
    Query(String),

    /// A returned row could not be mapped to JSON.
    #[error("row decoding failed: {0}")]
    RowDecode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_keep_driver_text_verbatim() {
        let err = StoreError::Query("Invalid input 'MATCHX'".to_string());
        assert_eq!(err.to_string(), "query failed: Invalid input 'MATCHX'");

        let err = StoreError::Connect("authentication failure".to_string());
        assert!(err.to_string().contains("authentication failure"));
    }
}
