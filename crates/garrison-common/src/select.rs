//! Key-based selection over heterogeneous entities.
//!
//! Containers, templates and images all expose a unique key. Selection
//! helpers only ever look at that key.

/// An entity that can be selected by a unique key.
pub trait Identifiable {
    /// Unique key of the entity (a container name, an image name, ...).
    fn key(&self) -> &str;
}

/// Find the entity whose key matches `key` exactly.
pub fn select_by_key<'a, T: Identifiable>(items: &'a [T], key: &str) -> Option<&'a T> {
    items.iter().find(|item| item.key() == key)
}

/// Keys of all entities, sorted and deduplicated.
#[must_use]
pub fn sorted_keys<T: Identifiable>(items: &[T]) -> Vec<String> {
    let mut keys: Vec<String> = items.iter().map(|item| item.key().to_string()).collect();
    keys.sort();
    keys.dedup();
    keys
}
