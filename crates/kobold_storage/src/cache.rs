// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Context, Error, Persisted, Setter};

/// Cells keyed by their storage key, for hosts that re-run their render code
/// and need the same cell back every time.
///
/// The first request for a key creates the cell, which reads or seeds the store.
/// Every later request for that key returns the same cell, so its value and setter
/// keep their identity across renders. The cache never looks at the store again
/// on its own: changes made to the store behind its back are not picked up.
///
/// ```
/// # use kobold_storage::{Cache, Context, MemoryStore};
/// let cache = Cache::new(Context::new(MemoryStore::new()));
///
/// let render = || cache.use_persisted("name", String::from("Bob")).unwrap();
///
/// let (name, set_name) = render();
/// let (again, set_again) = render();
///
/// assert!(std::rc::Rc::ptr_eq(&name, &again));
/// assert_eq!(set_name, set_again);
/// ```
pub struct Cache {
    ctx: Context,
    cells: RefCell<HashMap<Box<str>, Rc<dyn Any>>>,
}

impl Cache {
    /// Empty cache creating its cells with `ctx`.
    pub fn new(ctx: Context) -> Self {
        Cache {
            ctx,
            cells: RefCell::new(HashMap::new()),
        }
    }

    /// Context the cells are created with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Get the cell for `key`, creating it with `initial` on first use.
    ///
    /// If the key was previously used with a different value type, the old
    /// cell is replaced.
    pub fn persisted<T>(&self, key: &str, initial: T) -> Result<Persisted<T>, Error>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        if let Some(cell) = self.lookup::<T>(key) {
            return Ok(cell);
        }

        let cell = Persisted::with_context(key, initial, &self.ctx)?;

        self.cells
            .borrow_mut()
            .insert(key.into(), Rc::new(cell.clone()));

        Ok(cell)
    }

    /// Same as [`persisted`](Cache::persisted), returning the current value and the setter.
    pub fn use_persisted<T>(&self, key: &str, initial: T) -> Result<(Rc<T>, Setter<T>), Error>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.persisted(key, initial).map(|cell| cell.pair())
    }

    /// Drop the cell for `key`. The next request reads the store again.
    pub fn forget(&self, key: &str) -> bool {
        self.cells.borrow_mut().remove(key).is_some()
    }

    /// Number of cached cells.
    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.borrow().is_empty()
    }

    fn lookup<T: 'static>(&self, key: &str) -> Option<Persisted<T>> {
        self.cells
            .borrow()
            .get(key)?
            .downcast_ref::<Persisted<T>>()
            .cloned()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Cache::new(Context::local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, Recorder};

    fn cache() -> (MemoryStore, Cache) {
        let store = MemoryStore::new();
        let cache = Cache::new(Context::new(store.clone()).with_diagnostics(Recorder::new()));

        (store, cache)
    }

    #[test]
    fn memoizes_value_between_renders() {
        let (_, cache) = cache();

        let (r1, _) = cache.use_persisted("test", String::from("ok")).unwrap();
        let (r2, _) = cache.use_persisted("test", String::from("ok")).unwrap();
        let (r3, _) = cache.use_persisted("test", String::from("ok")).unwrap();

        assert!(Rc::ptr_eq(&r1, &r2));
        assert!(Rc::ptr_eq(&r2, &r3));
    }

    #[test]
    fn memoizes_value_when_store_is_already_set() {
        let (store, cache) = cache();

        store.insert("test", "\"bar\"");

        let (r1, _) = cache.use_persisted("test", String::from("bar")).unwrap();
        let (r2, _) = cache.use_persisted("test", String::from("bar")).unwrap();

        assert!(Rc::ptr_eq(&r1, &r2));
    }

    #[test]
    fn memoizes_setter() {
        let (store, cache) = cache();

        store.insert("test", "\"bar\"");

        let (_, s1) = cache.use_persisted("test", String::from("baz")).unwrap();
        let (_, s2) = cache.use_persisted("test", String::from("baz")).unwrap();

        assert_eq!(s1, s2);
    }

    #[test]
    fn new_value_is_visible_on_next_render() {
        let (store, cache) = cache();

        let (_, set) = cache.use_persisted("test", String::from("bar")).unwrap();

        set.set("baz".into());

        let (value, _) = cache.use_persisted("test", String::from("bar")).unwrap();

        assert_eq!(*value, "baz");
        assert_eq!(store.get("test").as_deref(), Some("\"baz\""));
    }

    #[test]
    fn different_keys_get_different_cells() {
        let (store, cache) = cache();

        let (_, a) = cache.use_persisted("a", 1_u32).unwrap();
        let (_, b) = cache.use_persisted("b", 1_u32).unwrap();

        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn different_type_replaces_cell() {
        let (_, cache) = cache();

        let (_, first) = cache.use_persisted("test", 1_u32).unwrap();
        let (value, _) = cache.use_persisted("test", 2_u64).unwrap();

        // the store already holds `1`, which decodes fine as `u64`
        assert_eq!(*value, 1);
        assert_eq!(cache.len(), 1);

        let (_, again) = cache.use_persisted("test", 1_u32).unwrap();

        assert_ne!(first, again);
    }

    #[test]
    fn forget_reads_store_again() {
        let (store, cache) = cache();

        cache.use_persisted("test", String::from("bar")).unwrap();

        store.insert("test", "\"changed elsewhere\"");

        let (cached, _) = cache.use_persisted("test", String::from("bar")).unwrap();

        assert_eq!(*cached, "bar");
        assert!(cache.forget("test"));
        assert!(!cache.forget("test"));
        assert!(cache.is_empty());

        let (fresh, _) = cache.use_persisted("test", String::from("bar")).unwrap();

        assert_eq!(*fresh, "changed elsewhere");
    }

    #[test]
    fn empty_key_is_not_cached() {
        let (_, cache) = cache();

        assert!(matches!(cache.persisted("", 0_u8), Err(Error::MissingKey)));
        assert!(cache.is_empty());
    }
}
