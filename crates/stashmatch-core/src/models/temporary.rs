use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;

use crate::models::entity::LocalEntity;

const TEMP_PREFIX: &str = "temp-";

/// Whether `id` was issued by a [`TempIdAllocator`].
pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMP_PREFIX)
}

/// Issues placeholder ids of the form `temp-<millis>-<index>`.
///
/// The index increases on every allocation, so ids from one allocator never
/// repeat even when the clock does. Use one allocator per session. These ids
/// are never written to the catalog.
#[derive(Debug, Default)]
pub struct TempIdAllocator {
    next_index: AtomicUsize,
}

impl TempIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&self) -> String {
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        format!("{TEMP_PREFIX}{}-{index}", Utc::now().timestamp_millis())
    }

    /// Placeholder entity for a name that has no catalog record yet.
    pub fn placeholder<D: Default>(&self, name: impl Into<String>) -> LocalEntity<D> {
        LocalEntity::new(self.allocate(), name)
    }
}

impl<D> LocalEntity<D> {
    /// Replace a placeholder id with the id assigned when the entity was created
    /// in the catalog.
    pub fn promote(mut self, catalog_id: impl Into<String>) -> Self {
        self.id = catalog_id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::models::entity::LocalPerformer;

    #[test]
    fn allocated_ids_are_unique() {
        let alloc = TempIdAllocator::new();
        let ids: HashSet<String> = (0..500).map(|_| alloc.allocate()).collect();
        assert_eq!(ids.len(), 500);
        assert!(ids.iter().all(|id| is_temporary_id(id)));
    }

    #[test]
    fn placeholder_is_temporary_until_promoted() {
        let alloc = TempIdAllocator::new();
        let performer: LocalPerformer = alloc.placeholder("Nonexistent Performer");
        assert!(performer.is_temporary());
        assert_eq!(performer.name, "Nonexistent Performer");

        let promoted = performer.promote("42");
        assert!(!promoted.is_temporary());
        assert_eq!(promoted.id, "42");
    }
}
