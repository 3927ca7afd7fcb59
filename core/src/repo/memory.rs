use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use super::{check_ref_name, Error, RefStore, Repo, Result, BRANCH_PREFIX};
use crate::object::{Id, Object};

/// A repository held entirely in memory.
#[derive(Debug)]
pub struct MemoryRepo {
    objects: Mutex<HashMap<Id, Object>>,
    refs: Mutex<BTreeMap<String, Id>>,
    head: Mutex<String>,
}

impl Default for MemoryRepo {
    fn default() -> MemoryRepo {
        MemoryRepo {
            objects: Mutex::new(HashMap::new()),
            refs: Mutex::new(BTreeMap::new()),
            head: Mutex::new(format!("{}master", BRANCH_PREFIX)),
        }
    }
}

impl MemoryRepo {
    /// Creates an empty repository whose `HEAD` points at `refs/heads/master`.
    pub fn new() -> MemoryRepo {
        MemoryRepo::default()
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        lock(&self.objects).len()
    }
}

// Poisoning is ignored: every critical section is a single map operation.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl Repo for MemoryRepo {
    fn put_object(&self, object: &Object) -> Result<()> {
        lock(&self.objects)
            .entry(object.id())
            .or_insert_with(|| object.clone());
        Ok(())
    }

    fn get_object(&self, id: &Id) -> Result<Object> {
        lock(&self.objects)
            .get(id)
            .cloned()
            .ok_or(Error::ObjectNotFound(*id))
    }

    fn has_object(&self, id: &Id) -> Result<bool> {
        Ok(lock(&self.objects).contains_key(id))
    }
}

impl RefStore for MemoryRepo {
    fn current_ref(&self) -> Result<String> {
        Ok(lock(&self.head).clone())
    }

    fn read_ref(&self, name: &str) -> Result<Option<Id>> {
        check_ref_name(name)?;
        Ok(lock(&self.refs).get(name).copied())
    }

    fn update_ref(&self, name: &str, id: &Id) -> Result<()> {
        check_ref_name(name)?;
        lock(&self.refs).insert(name.to_string(), *id);
        Ok(())
    }

    fn update_current_ref(&self, name: &str) -> Result<()> {
        check_ref_name(name)?;
        *lock(&self.head) = name.to_string();
        Ok(())
    }

    fn delete_ref(&self, name: &str) -> Result<()> {
        check_ref_name(name)?;
        lock(&self.refs)
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::RefNotFound(name.to_string()))
    }

    fn branch_refs(&self, include_remote: bool) -> Result<BTreeMap<String, Id>> {
        Ok(lock(&self.refs)
            .iter()
            .filter(|(name, _)| {
                name.starts_with(BRANCH_PREFIX)
                    || (include_remote && name.starts_with("refs/remotes/"))
            })
            .map(|(name, id)| (name.clone(), *id))
            .collect())
    }
}
