//! The Entity Store: every collection in memory, mirrored to a [`KeyValueStore`].
//!
//! The store is built once at startup from injected storage and seed data. Each mutation:
//!
//! 1. validates its input (required fields are enforced by the field types; referenced ids
//!    must exist; appointments must pass the double-booking guard),
//! 2. builds the next version of every collection it touches,
//! 3. writes those collections to storage through one [`Batch`],
//! 4. swaps them into memory only once every write succeeded.
//!
//! A failed write restores already-written keys and leaves memory as it was.

mod appointments;
mod collection;
mod community;
mod directory;
mod queues;

pub use collection::Collection;

use crate::constants::DOCTOR_SLOTS_KEY;
use crate::models::{
    Appointment, Doctor, Entity, EntityKind, Notification, Nurse, Patient, Post, Record,
    TransferRequest, WaitlistEntry,
};
use crate::scheduling::SlotTemplates;
use crate::seed::SeedData;
use crate::storage::{self, KeyValueStore};
use crate::{StoreError, StoreResult};
use hms_ids::EntityId;
use std::fmt;
use std::sync::Arc;

pub struct EntityStore {
    kv: Arc<dyn KeyValueStore>,
    patients: Collection<Patient>,
    doctors: Collection<Doctor>,
    nurses: Collection<Nurse>,
    appointments: Collection<Appointment>,
    waitlist: Collection<WaitlistEntry>,
    transfers: Collection<TransferRequest>,
    posts: Collection<Post>,
    notifications: Collection<Notification>,
    slot_templates: SlotTemplates,
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("kv", &self.kv)
            .field("patients", &self.patients.len())
            .field("doctors", &self.doctors.len())
            .field("nurses", &self.nurses.len())
            .field("appointments", &self.appointments.len())
            .field("waitlist", &self.waitlist.len())
            .field("transfers", &self.transfers.len())
            .field("posts", &self.posts.len())
            .field("notifications", &self.notifications.len())
            .field("slot_templates", &self.slot_templates.len())
            .finish()
    }
}

/// Collections staged by one mutation, written together by [`EntityStore::commit`].
#[derive(Default)]
pub(crate) struct Batch {
    patients: Option<Collection<Patient>>,
    doctors: Option<Collection<Doctor>>,
    nurses: Option<Collection<Nurse>>,
    appointments: Option<Collection<Appointment>>,
    waitlist: Option<Collection<WaitlistEntry>>,
    transfers: Option<Collection<TransferRequest>>,
    posts: Option<Collection<Post>>,
    notifications: Option<Collection<Notification>>,
    slot_templates: Option<SlotTemplates>,
}

impl Batch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn stage<T: Stored>(mut self, next: Collection<T>) -> Self {
        *T::staged(&mut self) = Some(next);
        self
    }

    pub(crate) fn stage_slot_templates(mut self, next: SlotTemplates) -> Self {
        self.slot_templates = Some(next);
        self
    }
}

/// Ties an entity type to its collection field on the store and its slot in a [`Batch`].
pub(crate) trait Stored: Entity {
    fn collection(store: &EntityStore) -> &Collection<Self>;
    fn collection_mut(store: &mut EntityStore) -> &mut Collection<Self>;
    fn staged(batch: &mut Batch) -> &mut Option<Collection<Self>>;
}

macro_rules! stored {
    ($($ty:ty => $field:ident),+ $(,)?) => {
        $(
            impl Stored for $ty {
                fn collection(store: &EntityStore) -> &Collection<Self> {
                    &store.$field
                }

                fn collection_mut(store: &mut EntityStore) -> &mut Collection<Self> {
                    &mut store.$field
                }

                fn staged(batch: &mut Batch) -> &mut Option<Collection<Self>> {
                    &mut batch.$field
                }
            }
        )+

        impl Batch {
            fn encode(&self) -> StoreResult<Vec<(&'static str, String)>> {
                let mut writes = Vec::new();
                $(
                    if let Some(next) = &self.$field {
                        writes.push((<$ty as Entity>::KIND.storage_key(), next.encode()?));
                    }
                )+
                if let Some(next) = &self.slot_templates {
                    writes.push((DOCTOR_SLOTS_KEY, storage::encode(DOCTOR_SLOTS_KEY, next)?));
                }
                Ok(writes)
            }

            fn apply(self, store: &mut EntityStore) {
                $(
                    if let Some(next) = self.$field {
                        *<$ty as Stored>::collection_mut(store) = next;
                    }
                )+
                if let Some(next) = self.slot_templates {
                    store.slot_templates = next;
                }
            }
        }
    };
}

stored! {
    Patient => patients,
    Doctor => doctors,
    Nurse => nurses,
    Appointment => appointments,
    WaitlistEntry => waitlist,
    TransferRequest => transfers,
    Post => posts,
    Notification => notifications,
}

impl EntityStore {
    /// Loads every collection from `kv`, using `seed` for keys that are absent or malformed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageRead`] if the storage backend fails to read a key.
    /// Malformed documents are not errors.
    pub fn open(kv: Arc<dyn KeyValueStore>, seed: SeedData) -> StoreResult<Self> {
        let SeedData {
            patients,
            doctors,
            nurses,
            appointments,
            waitlist,
            transfers,
            posts,
            notifications,
            slot_templates,
        } = seed;

        let store = Self {
            patients: Collection::load(kv.as_ref(), patients)?,
            doctors: Collection::load(kv.as_ref(), doctors)?,
            nurses: Collection::load(kv.as_ref(), nurses)?,
            appointments: Collection::load(kv.as_ref(), appointments)?,
            waitlist: Collection::load(kv.as_ref(), waitlist)?,
            transfers: Collection::load(kv.as_ref(), transfers)?,
            posts: Collection::load(kv.as_ref(), posts)?,
            notifications: Collection::load(kv.as_ref(), notifications)?,
            slot_templates: storage::load_or_else(kv.as_ref(), DOCTOR_SLOTS_KEY, || {
                slot_templates
            })?,
            kv,
        };

        tracing::info!(
            patients = store.patients.len(),
            doctors = store.doctors.len(),
            nurses = store.nurses.len(),
            appointments = store.appointments.len(),
            "entity store loaded"
        );
        Ok(store)
    }

    /// Writes every staged collection, then swaps them into memory.
    pub(crate) fn commit(&mut self, batch: Batch) -> StoreResult<()> {
        let writes = batch.encode()?;
        if writes.is_empty() {
            return Ok(());
        }
        storage::write_all(self.kv.as_ref(), &writes)?;
        batch.apply(self);
        Ok(())
    }

    pub(crate) fn contains(&self, kind: EntityKind, id: &EntityId) -> bool {
        match kind {
            EntityKind::Patient => self.patients.contains(id),
            EntityKind::Doctor => self.doctors.contains(id),
            EntityKind::Nurse => self.nurses.contains(id),
            EntityKind::Appointment => self.appointments.contains(id),
            EntityKind::WaitlistEntry => self.waitlist.contains(id),
            EntityKind::TransferRequest => self.transfers.contains(id),
            EntityKind::Post => self.posts.contains(id),
            EntityKind::Notification => self.notifications.contains(id),
        }
    }

    pub(crate) fn ensure_references<T: Entity>(&self, fields: &T) -> StoreResult<()> {
        for (kind, id) in fields.references() {
            if !self.contains(kind, id) {
                return Err(StoreError::UnknownReference {
                    kind,
                    id: id.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn require<T: Stored>(&self, id: &EntityId) -> StoreResult<&Record<T>> {
        T::collection(self)
            .get(id)
            .ok_or_else(|| StoreError::NotFound {
                kind: T::KIND,
                id: id.clone(),
            })
    }

    /// Validates references, allocates an id and stores the new record.
    pub(crate) fn insert<T: Stored>(&mut self, fields: T) -> StoreResult<Record<T>> {
        self.ensure_references(&fields)?;
        let current = T::collection(self);
        let record = Record::new(current.allocate_id()?, fields);
        let next = current.with_inserted(record.clone());

        self.commit(Batch::new().stage(next))?;
        tracing::info!(kind = %T::KIND, id = %record.id, "record added");
        Ok(record)
    }

    /// Validates references and replaces the record with the same id.
    pub(crate) fn replace<T: Stored>(
        &mut self,
        id: &EntityId,
        fields: T,
    ) -> StoreResult<Record<T>> {
        self.require::<T>(id)?;
        self.ensure_references(&fields)?;
        self.store_replacement(Record::new(id.clone(), fields))
    }

    /// Applies `change` to a copy of the record and stores it. References are not re-checked;
    /// use this for status-style updates that cannot introduce new references.
    pub(crate) fn update<T, F>(&mut self, id: &EntityId, change: F) -> StoreResult<Record<T>>
    where
        T: Stored,
        F: FnOnce(&mut T) -> StoreResult<()>,
    {
        let mut record = self.require::<T>(id)?.clone();
        change(&mut record.fields)?;
        self.store_replacement(record)
    }

    fn store_replacement<T: Stored>(&mut self, record: Record<T>) -> StoreResult<Record<T>> {
        let next = T::collection(self).with_replaced(record.clone());
        self.commit(Batch::new().stage(next))?;
        tracing::info!(kind = %T::KIND, id = %record.id, "record updated");
        Ok(record)
    }

    pub(crate) fn remove<T: Stored>(&mut self, id: &EntityId) -> StoreResult<Record<T>> {
        let record = self.require::<T>(id)?.clone();
        let next = T::collection(self).without(id);
        self.commit(Batch::new().stage(next))?;
        tracing::info!(kind = %T::KIND, id = %id, "record deleted");
        Ok(record)
    }
}
