// 🗂️ Registry - ordered, append-only collection of records
//
// - Insertion order is preserved
// - Duplicate ids may coexist; lookup returns the FIRST match
// - Starts empty, lives only as long as its owner (no persistence)
//
// The registry holds no lock of its own. A shared owner (the HTTP server)
// wraps it in a single Mutex.

use crate::error::RegistryError;
use crate::formatter::to_storage_form;
use crate::record::Record;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Registry {
    records: Vec<Record>,

    /// id → position of its FIRST occurrence
    first_index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to the end. No validation here: callers validate upstream.
    pub fn append(&mut self, record: Record) {
        let position = self.records.len();
        // or_insert keeps the earlier position when the id repeats
        self.first_index.entry(record.id.clone()).or_insert(position);
        tracing::debug!(position, "record appended");
        self.records.push(record);
    }

    /// Exact match on the storage-form id, first in insertion order
    pub fn find_by_identifier(&self, storage_form: &str) -> Result<&Record, RegistryError> {
        self.first_index
            .get(storage_form)
            .and_then(|&position| self.records.get(position))
            .ok_or_else(|| RegistryError::NotFound {
                id: storage_form.to_string(),
            })
    }

    /// Lookup from raw search-box input (formatted or not)
    pub fn lookup(&self, raw: &str) -> Result<&Record, RegistryError> {
        let storage_form = to_storage_form(raw);
        let result = self.find_by_identifier(&storage_form);
        if result.is_err() {
            tracing::info!(id = %storage_form, "lookup found no record");
        }
        result
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read-only view in insertion order
    pub fn all(&self) -> &[Record] {
        &self.records
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, name: &str) -> Record {
        Record {
            id: id.to_string(),
            name: name.to_string(),
            guardian_name: "Maria".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1985, 3, 14).unwrap(),
            address: "Rua B, 20".to_string(),
            email: "x@example.com".to_string(),
            phone: "1133334444".to_string(),
            income: 5000.0,
        }
    }

    #[test]
    fn test_empty_registry_not_found() {
        let registry = Registry::new();

        assert!(registry.is_empty());
        assert_eq!(registry.size(), 0);
        assert_eq!(
            registry.find_by_identifier("12345678901"),
            Err(RegistryError::NotFound {
                id: "12345678901".to_string()
            })
        );
        assert!(registry.find_by_identifier("").is_err());
    }

    #[test]
    fn test_append_preserves_order() {
        let mut registry = Registry::new();
        registry.append(record("11111111111", "A"));
        registry.append(record("22222222222", "B"));
        registry.append(record("33333333333", "C"));

        let names: Vec<&str> = registry.all().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(registry.size(), 3);
    }

    #[test]
    fn test_duplicate_ids_first_match_wins() {
        let mut registry = Registry::new();
        registry.append(record("12345678901", "A"));
        registry.append(record("12345678901", "B"));

        assert_eq!(registry.size(), 2);
        assert_eq!(registry.find_by_identifier("12345678901").unwrap().name, "A");
    }

    #[test]
    fn test_lookup_accepts_formatted_input() {
        let mut registry = Registry::new();
        registry.append(record("12345678901", "A"));

        assert_eq!(registry.lookup("123.456.789-01").unwrap().name, "A");
        assert!(registry.lookup("123.456.789-02").is_err());
    }

    #[test]
    fn test_find_requires_storage_form() {
        let mut registry = Registry::new();
        registry.append(record("12345678901", "A"));

        // find_by_identifier does not normalize
        assert!(registry.find_by_identifier("123.456.789-01").is_err());
    }
}
