use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use pricelens_core::{DomainError, DomainResult, Entity};

/// In-memory entity table for dev and tests, keyed by entity id.
///
/// Every repository in this crate is a thin typed wrapper around one of these.
#[derive(Debug)]
pub struct InMemoryStore<E: Entity> {
    name: &'static str,
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity + Clone> InMemoryStore<E> {
    /// `name` is used in error messages (`"product"`, `"category"`, ...).
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, HashMap<E::Id, E>>> {
        self.inner
            .read()
            .map_err(|_| DomainError::storage(format!("{} store lock poisoned", self.name)))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, HashMap<E::Id, E>>> {
        self.inner
            .write()
            .map_err(|_| DomainError::storage(format!("{} store lock poisoned", self.name)))
    }

    pub fn get(&self, id: E::Id) -> DomainResult<Option<E>> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// Insert a new entity, rejecting it when `clashes(existing, new)` holds
    /// for any stored entity. The check and insert share one write lock.
    pub fn insert_unique(
        &self,
        entity: E,
        clashes: impl Fn(&E, &E) -> bool,
        conflict: &str,
    ) -> DomainResult<E> {
        let mut map = self.write()?;
        if map.contains_key(&entity.id()) {
            return Err(DomainError::conflict(format!("{} already exists", self.name)));
        }
        if map.values().any(|existing| clashes(existing, &entity)) {
            return Err(DomainError::conflict(conflict.to_string()));
        }
        map.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    pub fn insert(&self, entity: E) -> DomainResult<E> {
        self.insert_unique(entity, |_, _| false, "")
    }

    /// Replace an existing entity.
    pub fn replace(&self, entity: E) -> DomainResult<()> {
        let mut map = self.write()?;
        match map.get_mut(&entity.id()) {
            Some(slot) => {
                *slot = entity;
                Ok(())
            }
            None => Err(DomainError::not_found(self.name)),
        }
    }

    /// Run `f` against a copy of the stored entity and commit the copy only if
    /// `f` succeeds, so a failed mutation leaves no partial change behind.
    pub fn modify(
        &self,
        id: E::Id,
        f: &mut dyn FnMut(&mut E) -> DomainResult<()>,
    ) -> DomainResult<E> {
        let mut map = self.write()?;
        let slot = map.get_mut(&id).ok_or_else(|| DomainError::not_found(self.name))?;
        let mut draft = slot.clone();
        f(&mut draft)?;
        *slot = draft.clone();
        Ok(draft)
    }

    pub fn remove(&self, id: E::Id) -> DomainResult<E> {
        self.write()?
            .remove(&id)
            .ok_or_else(|| DomainError::not_found(self.name))
    }

    pub fn list(&self) -> DomainResult<Vec<E>> {
        Ok(self.read()?.values().cloned().collect())
    }

    pub fn filter(&self, pred: impl Fn(&E) -> bool) -> DomainResult<Vec<E>> {
        Ok(self.read()?.values().filter(|e| pred(e)).cloned().collect())
    }

    pub fn find(&self, pred: impl Fn(&E) -> bool) -> DomainResult<Option<E>> {
        Ok(self.read()?.values().find(|e| pred(e)).cloned())
    }

    pub fn any(&self, pred: impl Fn(&E) -> bool) -> DomainResult<bool> {
        Ok(self.read()?.values().any(pred))
    }

    pub fn count(&self, pred: impl Fn(&E) -> bool) -> DomainResult<u64> {
        Ok(self.read()?.values().filter(|e| pred(e)).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricelens_core::LinkId;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: LinkId,
        label: String,
        hits: u32,
    }

    impl Entity for Row {
        type Id = LinkId;

        fn id(&self) -> LinkId {
            self.id
        }
    }

    fn row(label: &str) -> Row {
        Row {
            id: LinkId::new(),
            label: label.to_string(),
            hits: 0,
        }
    }

    #[test]
    fn insert_unique_checks_clashes() {
        let store = InMemoryStore::new("row");
        store.insert_unique(row("a"), |x, y| x.label == y.label, "label taken").unwrap();

        let err = store
            .insert_unique(row("a"), |x, y| x.label == y.label, "label taken")
            .unwrap_err();
        assert_eq!(err, DomainError::conflict("label taken"));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn failed_modify_leaves_record_untouched() {
        let store = InMemoryStore::new("row");
        let r = store.insert(row("a")).unwrap();

        let err = store
            .modify(r.id, &mut |row: &mut Row| {
                row.hits = 99;
                Err(DomainError::conflict("nope"))
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.get(r.id).unwrap().unwrap().hits, 0);

        let updated = store
            .modify(r.id, &mut |row: &mut Row| {
                row.hits += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(updated.hits, 1);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let store: InMemoryStore<Row> = InMemoryStore::new("row");
        assert!(store.remove(LinkId::new()).unwrap_err().is_not_found());
        assert!(store.replace(row("x")).unwrap_err().is_not_found());
        assert!(store
            .modify(LinkId::new(), &mut |_: &mut Row| Ok(()))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn concurrent_modifications_are_not_lost() {
        let store = std::sync::Arc::new(InMemoryStore::new("row"));
        let id = store.insert(row("counter")).unwrap().id;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store
                            .modify(id, &mut |row: &mut Row| {
                                row.hits += 1;
                                Ok(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.get(id).unwrap().unwrap().hits, 800);
    }
}
