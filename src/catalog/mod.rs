//! Quiz catalog data model
//!
//! The catalog maps category names to their statement sets. Both levels keep
//! the order in which the JSON document lists them, since the category list
//! and the per-category set sequence are shown in that order.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::Serialize;

use crate::{Result, TtalError};

pub mod loader;

pub use loader::{irregular_categories, load_catalog, load_catalog_async, parse_catalog};

/// Number of statements in every set
pub const STATEMENTS_PER_SET: usize = 3;

/// One round of three statements, exactly one of which is false
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct StatementSet {
    pub statements: Vec<String>,
    pub lie_index: usize,
}

impl StatementSet {
    pub fn new<S: Into<String>>(statements: [S; 3], lie_index: usize) -> Self {
        Self {
            statements: statements.into_iter().map(Into::into).collect(),
            lie_index,
        }
    }

    /// The false statement, if `lie_index` is in range
    pub fn lie(&self) -> Option<&str> {
        self.statements.get(self.lie_index).map(String::as_str)
    }

    /// Check the set is safe to shuffle and relocate the lie by value
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.statements.len() != STATEMENTS_PER_SET {
            return Err(format!(
                "expected {} statements, found {}",
                STATEMENTS_PER_SET,
                self.statements.len()
            ));
        }
        if self.lie_index >= STATEMENTS_PER_SET {
            return Err(format!("lie_index {} is out of range", self.lie_index));
        }
        for (i, statement) in self.statements.iter().enumerate() {
            if self.statements[..i].contains(statement) {
                return Err(format!("duplicate statement \"{}\"", statement));
            }
        }
        Ok(())
    }
}

/// A named group of statement sets, in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Category {
    name: String,
    // Kept in document order; lookups by id are linear scans
    sets: Vec<(String, StatementSet)>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets: Vec::new(),
        }
    }

    /// Builder-style set insertion, mostly for tests and fixtures
    pub fn with_set(mut self, id: impl Into<String>, set: StatementSet) -> Self {
        insert_ordered(&mut self.sets, id.into(), set);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set identifiers in document order
    pub fn set_ids(&self) -> Vec<String> {
        self.sets.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn set(&self, id: &str) -> Option<&StatementSet> {
        self.sets.iter().find(|(k, _)| k == id).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// The full, read-only dataset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizCatalog {
    // Document order, same as `Category::sets`
    categories: Vec<Category>,
}

impl QuizCatalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category names in document order
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Reject the whole catalog if any category or set is malformed
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(TtalError::InvalidCatalog(
                "catalog contains no categories".to_string(),
            ));
        }
        for category in &self.categories {
            if category.is_empty() {
                return Err(TtalError::InvalidCatalog(format!(
                    "category \"{}\" contains no sets",
                    category.name
                )));
            }
            for (id, set) in &category.sets {
                set.validate().map_err(|reason| {
                    TtalError::InvalidCatalog(format!(
                        "set \"{}\" in category \"{}\": {}",
                        id, category.name, reason
                    ))
                })?;
            }
        }
        Ok(())
    }
}

/// Load state of the catalog as seen by the presentation layer
#[derive(Debug, Clone)]
pub enum CatalogStatus {
    Loading,
    Ready(Arc<QuizCatalog>),
    Unavailable(String),
}

impl CatalogStatus {
    pub fn catalog(&self) -> Option<&Arc<QuizCatalog>> {
        match self {
            CatalogStatus::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }
}

// A repeated JSON key replaces the earlier value but keeps its position.
fn insert_ordered<V>(entries: &mut Vec<(String, V)>, key: String, value: V) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

struct OrderedEntries<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    insert_ordered(&mut entries, key, value);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl<'de> Deserialize<'de> for QuizCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let OrderedEntries(raw) = OrderedEntries::<OrderedEntries<StatementSet>>::deserialize(deserializer)?;
        let categories = raw
            .into_iter()
            .map(|(name, OrderedEntries(sets))| Category { name, sets })
            .collect();
        Ok(QuizCatalog { categories })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order_is_preserved() {
        let json = r#"{
            "Space": {
                "set10": {"statements": ["a", "b", "c"], "lie_index": 0},
                "set2": {"statements": ["d", "e", "f"], "lie_index": 1}
            },
            "Animals": {
                "z": {"statements": ["g", "h", "i"], "lie_index": 2}
            }
        }"#;
        let catalog: QuizCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.category_names(), vec!["Space", "Animals"]);
        assert_eq!(catalog.category("Space").unwrap().set_ids(), vec!["set10", "set2"]);
        assert_eq!(catalog.category("Animals").unwrap().set("z").unwrap().lie(), Some("i"));
    }

    #[test]
    fn test_repeated_key_keeps_first_position() {
        let json = r#"{"C": {
            "a": {"statements": ["1", "2", "3"], "lie_index": 0},
            "b": {"statements": ["4", "5", "6"], "lie_index": 0},
            "a": {"statements": ["7", "8", "9"], "lie_index": 2}
        }}"#;
        let catalog: QuizCatalog = serde_json::from_str(json).unwrap();
        let category = catalog.category("C").unwrap();
        assert_eq!(category.set_ids(), vec!["a", "b"]);
        assert_eq!(category.set("a").unwrap().lie(), Some("9"));
    }

    #[test]
    fn test_set_validation() {
        assert!(StatementSet::new(["a", "b", "c"], 2).validate().is_ok());
        assert!(StatementSet::new(["a", "b", "c"], 3).validate().is_err());
        assert!(StatementSet::new(["a", "b", "a"], 0).validate().is_err());

        let short = StatementSet {
            statements: vec!["a".into(), "b".into()],
            lie_index: 0,
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_catalog_validation_names_the_bad_set() {
        let catalog = QuizCatalog::new(vec![Category::new("History")
            .with_set("one", StatementSet::new(["a", "b", "c"], 0))
            .with_set("two", StatementSet::new(["x", "x", "y"], 1))]);

        match catalog.validate() {
            Err(TtalError::InvalidCatalog(msg)) => {
                assert!(msg.contains("two"));
                assert!(msg.contains("History"));
            }
            other => panic!("expected InvalidCatalog, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_catalog_and_category_rejected() {
        assert!(QuizCatalog::default().validate().is_err());
        assert!(QuizCatalog::new(vec![Category::new("Empty")]).validate().is_err());
    }
}
