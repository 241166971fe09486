/// In-memory item collection, derived views, and optimistic mutations

use crate::item::{NewItem, TextItem};
use crate::storage::{ItemStore, StorageBackend, StorageError};
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

/// Pseudo-category meaning "no category filter".
pub const ALL_CATEGORY: &str = "All";

/// Ordered items with unique ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: Vec<TextItem>,
}

impl Collection {
    pub fn new() -> Self {
        Collection { items: Vec::new() }
    }

    /// Build from stored items, keeping the first of any repeated id.
    pub fn from_items(items: Vec<TextItem>) -> Self {
        let mut seen_ids = HashSet::new();
        let mut kept = Vec::with_capacity(items.len());

        for item in items {
            if seen_ids.insert(item.id.clone()) {
                kept.push(item);
            } else {
                log::warn!("Dropping stored item with duplicate id {}", item.id);
            }
        }

        Collection { items: kept }
    }

    pub fn items(&self) -> &[TextItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TextItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Append an item; refused when its id is already present.
    pub fn insert(&mut self, item: TextItem) -> bool {
        if self.get(&item.id).is_some() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<TextItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Distinct categories, sorted, behind the "All" pseudo-category.
    /// Comparison is exact: "Work" and "work" are different categories.
    pub fn categories(&self) -> Vec<String> {
        let distinct: BTreeSet<&str> = self
            .items
            .iter()
            .map(|item| item.category.as_str())
            .filter(|category| *category != ALL_CATEGORY)
            .collect();

        std::iter::once(ALL_CATEGORY)
            .chain(distinct)
            .map(str::to_string)
            .collect()
    }

    /// Items in `category` (or any, for "All") whose title or content contains
    /// `query`, ignoring case. Lazy; clone the iterator to start over.
    pub fn filter<'a>(&'a self, category: &'a str, query: &str) -> ItemFilter<'a> {
        ItemFilter {
            items: self.items.iter(),
            category,
            needle: query.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemFilter<'a> {
    items: std::slice::Iter<'a, TextItem>,
    category: &'a str,
    needle: String,
}

impl<'a> ItemFilter<'a> {
    fn accepts(&self, item: &TextItem) -> bool {
        (self.category == ALL_CATEGORY || item.category == self.category)
            && item.matches_lowercase(&self.needle)
    }
}

impl<'a> Iterator for ItemFilter<'a> {
    type Item = &'a TextItem;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(item) = self.items.next() {
            if self.accepts(item) {
                return Some(item);
            }
        }
        None
    }
}

/// A write of the full collection, captured when a mutation was applied.
///
/// Await [`PendingSave::commit`] or hand it to [`PendingSave::spawn`];
/// dropping it skips the write.
#[must_use = "the collection is only persisted once the save is committed or spawned"]
pub struct PendingSave<B> {
    store: Rc<ItemStore<B>>,
    snapshot: Vec<TextItem>,
}

impl<B: StorageBackend + 'static> PendingSave<B> {
    pub fn snapshot(&self) -> &[TextItem] {
        &self.snapshot
    }

    pub async fn commit(self) -> Result<(), StorageError> {
        self.store.save(&self.snapshot).await
    }

    /// Run the write in the background. `on_error` runs if it fails; the
    /// in-memory collection is left as it is.
    pub fn spawn<F>(self, on_error: F)
    where
        F: FnOnce(StorageError) + 'static,
    {
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = self.commit().await {
                on_error(e);
            }
        });
    }
}

/// Owns the in-memory collection and routes every mutation to storage.
pub struct ItemManager<B> {
    collection: Collection,
    store: Rc<ItemStore<B>>,
}

impl<B> Clone for ItemManager<B> {
    fn clone(&self) -> Self {
        ItemManager {
            collection: self.collection.clone(),
            store: Rc::clone(&self.store),
        }
    }
}

impl<B: StorageBackend + 'static> ItemManager<B> {
    /// Manager with an empty collection; nothing is read yet.
    pub fn new(store: Rc<ItemStore<B>>) -> Self {
        ItemManager {
            collection: Collection::new(),
            store,
        }
    }

    /// Manager holding whatever the store has (empty on first run or on error).
    pub async fn load(store: Rc<ItemStore<B>>) -> Self {
        let mut manager = Self::new(store);
        manager.initialize().await;
        manager
    }

    pub async fn initialize(&mut self) {
        let items = self.store.load().await;
        self.collection = Collection::from_items(items);
        log::debug!("Loaded {} items", self.collection.len());
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn store(&self) -> &Rc<ItemStore<B>> {
        &self.store
    }

    /// Append a new item and return the write to issue.
    /// `None` (nothing changed) when a field is empty.
    pub fn add(&mut self, title: &str, content: &str, category: &str) -> Option<PendingSave<B>> {
        let item = match NewItem::new(title, content, category).into_item() {
            Ok(item) => item,
            Err(e) => {
                log::debug!("Rejected new item: {}", e);
                return None;
            }
        };

        if !self.collection.insert(item) {
            return None;
        }
        Some(self.pending_save())
    }

    /// Remove the item once `confirm` agrees, and return the write to issue.
    /// `None` when confirmation is denied or the id is unknown.
    pub fn delete<F>(&mut self, id: &str, confirm: F) -> Option<PendingSave<B>>
    where
        F: FnOnce(&TextItem) -> bool,
    {
        let item = self.collection.get(id)?;
        if !confirm(item) {
            return None;
        }

        match self.collection.remove(id) {
            Some(_) => Some(self.pending_save()),
            None => {
                log::debug!("No item with id {}", id);
                None
            }
        }
    }

    pub fn categories(&self) -> Vec<String> {
        self.collection.categories()
    }

    pub fn filter<'a>(&'a self, category: &'a str, query: &str) -> ItemFilter<'a> {
        self.collection.filter(category, query)
    }

    fn pending_save(&self) -> PendingSave<B> {
        PendingSave {
            store: Rc::clone(&self.store),
            snapshot: self.collection.items().to_vec(),
        }
    }
}
