//! Per-session memo of resolved doctor specialties.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Doctor ID → specialty name.
///
/// Entries are written once and never replaced. The cache lives as long as
/// the screen that owns it and is never persisted.
#[derive(Debug, Clone, Default)]
pub struct SpecialtyCache {
    entries: HashMap<String, String>,
}

impl SpecialtyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, doctor_id: &str) -> Option<&str> {
        self.entries.get(doctor_id).map(String::as_str)
    }

    pub fn contains(&self, doctor_id: &str) -> bool {
        self.entries.contains_key(doctor_id)
    }

    /// Record a resolution unless one already exists.
    ///
    /// Returns `true` if the entry was inserted.
    pub fn insert_if_absent(&mut self, doctor_id: String, specialty_name: String) -> bool {
        match self.entries.entry(doctor_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(specialty_name);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry (screen refresh starts a new session).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_never_overwrites() {
        let mut cache = SpecialtyCache::new();
        assert!(cache.insert_if_absent("doc-A".into(), "Cardiología".into()));
        assert!(!cache.insert_if_absent("doc-A".into(), "Pediatría".into()));
        assert_eq!(cache.get("doc-A"), Some("Cardiología"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cache = SpecialtyCache::new();
        cache.insert_if_absent("doc-A".into(), "Cardiología".into());
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.contains("doc-A"));
    }
}
