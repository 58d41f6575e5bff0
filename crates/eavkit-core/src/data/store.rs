use super::{Data, DataId};
use std::collections::BTreeMap;

///
/// MemoryStore
///
/// Reference backend: data instances keyed by id. Ids are handed out
/// sequentially on first insert.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: BTreeMap<DataId, Data>,
    next_id: u64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Unsaved data gets the next free id.
    pub fn insert(&mut self, mut data: Data) -> DataId {
        let id = match data.id() {
            Some(id) => {
                self.next_id = self.next_id.max(id.get());
                id
            }
            None => {
                self.next_id += 1;
                let id = DataId::new(self.next_id);
                data.assign_id(id);
                id
            }
        };
        self.rows.insert(id, data);

        id
    }

    #[must_use]
    pub fn get(&self, id: DataId) -> Option<&Data> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: DataId) -> Option<&mut Data> {
        self.rows.get_mut(&id)
    }

    pub fn remove(&mut self, id: DataId) -> Option<Data> {
        self.rows.remove(&id)
    }

    /// All rows in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Data> {
        self.rows.values()
    }

    /// Rows of one family in id order. The iterator borrows only the store.
    pub fn family_rows<'a>(&'a self, family: &str) -> impl Iterator<Item = &'a Data> + use<'a> {
        let family = family.to_string();
        self.rows
            .values()
            .filter(move |data| data.family().code() == family)
    }

    #[must_use]
    pub fn count(&self, family: &str) -> usize {
        self.family_rows(family).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
