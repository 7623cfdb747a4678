use crate::{Record, RecordId, RecordPatch};

/// Last-fetched collection, patched in place after confirmed writes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordStore {
    collection: Vec<Record>,
    loaded: bool,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the collection wholesale with a fresh fetch.
    pub fn replace(&mut self, collection: Vec<Record>) {
        self.collection = collection;
        self.loaded = true;
    }

    /// Applies a fetch outcome. A failure keeps the previous collection.
    pub fn load<E>(&mut self, fetched: Result<Vec<Record>, E>) -> Result<usize, E> {
        let collection = fetched?;
        let count = collection.len();
        self.replace(collection);
        Ok(count)
    }

    /// Removes the record with `id`. Returns false when it is already gone.
    pub fn apply_deletion(&mut self, id: &RecordId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.collection.remove(index);
                true
            }
            None => false,
        }
    }

    /// Merges `patch` into the record with `id`. Returns false when absent.
    pub fn apply_update(&mut self, id: &RecordId, patch: &RecordPatch) -> bool {
        match self.position(id) {
            Some(index) => {
                self.collection[index].merge(patch);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.collection.iter().find(|record| record.id() == id)
    }

    pub fn records(&self) -> &[Record] {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// True once any fetch has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.collection.iter().position(|record| record.id() == id)
    }
}
