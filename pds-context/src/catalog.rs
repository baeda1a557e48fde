use crate::entity::EntityCategory;
use crate::index::ContextIndex;
use log::info;
use std::sync::{Arc, Mutex, MutexGuard};

type Slot = Mutex<Option<Arc<ContextIndex>>>;

/// Per-category set of context indexes, each built at most once.
///
/// Every category has its own lock, so building one index never blocks
/// readers or builders of another. Indexes are never modified after
/// insertion; callers share them through `Arc`.
#[derive(Debug, Default)]
pub struct ContextCatalog {
    slots: [Slot; 4],
}

impl ContextCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with already built indexes, e.g. for offline use
    pub fn from_indexes(indexes: impl IntoIterator<Item = ContextIndex>) -> Self {
        let catalog = Self::default();
        for index in indexes {
            let category = index.category();
            *catalog.slot(category) = Some(Arc::new(index));
        }
        catalog
    }

    pub fn get(&self, category: EntityCategory) -> Option<Arc<ContextIndex>> {
        self.slot(category).clone()
    }

    /// Return the index of `category`, building it with `build` on first use.
    ///
    /// Only the category's own lock is held while building: concurrent
    /// callers never issue a second bulk listing for the same category, and
    /// `build` may itself look up other categories. A failed build leaves the
    /// category empty and the next call retries.
    pub fn get_or_build<E, F>(&self, category: EntityCategory, build: F) -> Result<Arc<ContextIndex>, E>
    where
        F: FnOnce() -> Result<ContextIndex, E>,
    {
        let mut slot = self.slot(category);
        if let Some(index) = slot.as_ref() {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(build()?);
        info!(
            "Built {} context index with {} entities",
            category,
            index.len()
        );
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Categories whose index is already available
    pub fn loaded(&self) -> Vec<EntityCategory> {
        EntityCategory::ALL
            .into_iter()
            .filter(|category| self.get(*category).is_some())
            .collect()
    }

    fn slot(&self, category: EntityCategory) -> MutexGuard<'_, Option<Arc<ContextIndex>>> {
        let position = match category {
            EntityCategory::Target => 0,
            EntityCategory::InstrumentHost => 1,
            EntityCategory::Instrument => 2,
            EntityCategory::Investigation => 3,
        };
        // A slot is only ever filled once, a poisoned guard is still consistent
        self.slots[position].lock().unwrap_or_else(|e| e.into_inner())
    }
}
