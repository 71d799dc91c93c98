use crate::constants::MAX_ID_ATTEMPTS;
use crate::models::{Entity, Record};
use crate::storage::{self, KeyValueStore};
use crate::{StoreError, StoreResult};
use hms_ids::EntityId;

/// One entity collection as held in memory.
///
/// Mutating methods return the next collection instead of changing this one; the store swaps
/// it in only after the durable write succeeded.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection<T> {
    records: Vec<Record<T>>,
}

impl<T: Entity> Collection<T> {
    pub(crate) fn new(records: Vec<Record<T>>) -> Self {
        Self { records }
    }

    /// Loads the collection from its storage key, falling back to `seed`.
    pub(crate) fn load(kv: &dyn KeyValueStore, seed: Vec<Record<T>>) -> StoreResult<Self> {
        let records = storage::load_or_else(kv, T::KIND.storage_key(), || seed)?;
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[Record<T>] {
        &self.records
    }

    pub fn get(&self, id: &EntityId) -> Option<&Record<T>> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn encode(&self) -> StoreResult<String> {
        storage::encode(T::KIND.storage_key(), &self.records)
    }

    /// Generates an identifier not already used in this collection.
    pub(crate) fn allocate_id(&self) -> StoreResult<EntityId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = EntityId::generate(T::KIND.id_prefix())?;
            if !self.contains(&id) {
                return Ok(id);
            }
        }
        Err(StoreError::InvalidInput(format!(
            "could not allocate an unused {} identifier",
            T::KIND
        )))
    }

    /// Queues put new records first; directories append.
    pub(crate) fn with_inserted(&self, record: Record<T>) -> Self {
        let mut records = self.records.clone();
        if T::KIND.newest_first() {
            records.insert(0, record);
        } else {
            records.push(record);
        }
        Self { records }
    }

    /// Replaces the record with the same id, keeping its position.
    pub(crate) fn with_replaced(&self, record: Record<T>) -> Self {
        let records = self
            .records
            .iter()
            .map(|r| {
                if r.id == record.id {
                    record.clone()
                } else {
                    r.clone()
                }
            })
            .collect();
        Self { records }
    }

    pub(crate) fn without(&self, id: &EntityId) -> Self {
        self.without_where(|r| &r.id == id).0
    }

    /// Drops every record matching `pred`, returning the next collection and how many went.
    pub(crate) fn without_where<F>(&self, mut pred: F) -> (Self, usize)
    where
        F: FnMut(&Record<T>) -> bool,
    {
        let mut removed = 0;
        let records = self
            .records
            .iter()
            .filter(|r| {
                let drop = pred(r);
                if drop {
                    removed += 1;
                }
                !drop
            })
            .cloned()
            .collect();
        (Self { records }, removed)
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a Record<T>;
    type IntoIter = std::slice::Iter<'a, Record<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Nurse, WaitlistEntry};
    use crate::MemoryStore;
    use hms_types::NonEmptyText;

    fn nurse(id: &str, name: &str) -> Record<Nurse> {
        Record::new(
            EntityId::parse(id).unwrap(),
            Nurse {
                name: NonEmptyText::new(name).unwrap(),
                department: NonEmptyText::new("Oncology").unwrap(),
                phone: None,
                dob: None,
            },
        )
    }

    fn entry(id: &str) -> Record<WaitlistEntry> {
        Record::new(
            EntityId::parse(id).unwrap(),
            WaitlistEntry {
                patient_id: EntityId::parse("P-001").unwrap(),
                department: NonEmptyText::new("Neurology").unwrap(),
                preferred_date: None,
                notes: None,
            },
        )
    }

    #[test]
    fn test_directory_appends_and_queue_prepends() {
        let nurses = Collection::new(vec![nurse("N-001", "Hanan")]);
        let nurses = nurses.with_inserted(nurse("N-002", "Rania"));
        assert_eq!(nurses.records()[1].id.as_str(), "N-002");

        let waitlist = Collection::new(vec![entry("W-001")]);
        let waitlist = waitlist.with_inserted(entry("W-002"));
        assert_eq!(waitlist.records()[0].id.as_str(), "W-002");
    }

    #[test]
    fn test_with_replaced_keeps_position() {
        let nurses = Collection::new(vec![nurse("N-001", "Hanan"), nurse("N-002", "Rania")]);
        let next = nurses.with_replaced(nurse("N-001", "Hanan Ali"));

        assert_eq!(next.records()[0].fields.name.as_str(), "Hanan Ali");
        assert_eq!(next.len(), 2);
        // the original is untouched
        assert_eq!(nurses.records()[0].fields.name.as_str(), "Hanan");
    }

    #[test]
    fn test_without_where_counts_removed() {
        let waitlist = Collection::new(vec![entry("W-001"), entry("W-002"), entry("W-003")]);
        let (next, removed) = waitlist.without_where(|r| r.id.as_str() != "W-002");

        assert_eq!(removed, 2);
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn test_allocate_id_uses_kind_prefix() {
        let nurses: Collection<Nurse> = Collection::new(Vec::new());
        let id = nurses.allocate_id().unwrap();
        assert!(id.has_prefix("N"));
    }

    #[test]
    fn test_round_trip_through_storage_is_identical() {
        let kv = MemoryStore::new();
        let nurses = Collection::new(vec![nurse("N-001", "Hanan"), nurse("N-002", "Rania")]);
        kv.set("nurses", &nurses.encode().unwrap()).unwrap();

        let reloaded = Collection::<Nurse>::load(&kv, Vec::new()).unwrap();
        assert_eq!(reloaded, nurses);
    }

    #[test]
    fn test_load_malformed_falls_back_to_seed() {
        let kv = MemoryStore::new();
        kv.set("nurses", "[{\"id\": 42}]").unwrap();

        let reloaded = Collection::<Nurse>::load(&kv, vec![nurse("N-009", "Seed")]).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.records()[0].id.as_str(), "N-009");
    }
}
