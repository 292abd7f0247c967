//! Error handling utilities for repositories

use avail_core::DomainError;

use crate::client::StoreError;

/// Convert a store client error to a DomainError
pub fn map_store_error(e: StoreError) -> DomainError {
    match e {
        StoreError::TableNotFound(table) => DomainError::TableNotFound(table),
        StoreError::Transient(reason) => DomainError::StoreUnavailable(reason),
        other @ (StoreError::IndexOutOfRange(_) | StoreError::Request(_)) => {
            DomainError::StoreError(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_maps_to_unavailable() {
        let err = map_store_error(StoreError::Transient("429".to_string()));
        assert!(err.is_transient());
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err = map_store_error(StoreError::TableNotFound("x".to_string()));
        assert!(err.is_not_found());
    }
}
