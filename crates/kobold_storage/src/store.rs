// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronous key-value text stores that [`Persisted`](crate::Persisted) cells write to.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::Error;

/// A synchronous store of text values keyed by strings, modelled after the
/// [Web Storage API](https://developer.mozilla.org/en-US/docs/Web/API/Storage).
pub trait Store {
    /// Read the raw text stored at `key`, `Ok(None)` if there is nothing there.
    fn get_item(&self, key: &str) -> Result<Option<String>, Error>;

    /// Write raw text at `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), Error>;
}

impl<S: Store + ?Sized> Store for Rc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        (**self).set_item(key, value)
    }
}

/// The browser's `window.localStorage`.
pub struct LocalStorage {
    raw: web_sys::Storage,
}

impl LocalStorage {
    /// Get a handle to local storage if the current execution context has one.
    ///
    /// Returns `None` when there is no `window` (workers, non-browser hosts), when
    /// accessing `localStorage` throws (e.g. storage disabled by privacy settings),
    /// and always on targets other than `wasm32`.
    pub fn probe() -> Option<Self> {
        #[cfg(target_arch = "wasm32")]
        {
            let raw = web_sys::window()?.local_storage().ok()??;

            Some(LocalStorage { raw })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            None
        }
    }

    /// Access the underlying `web_sys::Storage`.
    pub fn raw(&self) -> &web_sys::Storage {
        &self.raw
    }
}

impl Store for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        self.raw.get_item(key).map_err(Error::read)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        self.raw.set_item(key, value).map_err(Error::write)
    }
}

/// Store that keeps everything in memory. Clones share the same items, so a test
/// can hold on to one clone and inspect what a cell wrote through another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Raw text stored at `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    /// Store raw text at `key`, as if another page had written it.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.items.borrow_mut().insert(key.into(), value.into());
    }

    pub fn remove_item(&self, key: &str) -> Option<String> {
        self.items.borrow_mut().remove(key)
    }

    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Store for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.get(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        self.insert(key, value);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_clones_share_items() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set_item("foo", "\"bar\"").unwrap();

        assert_eq!(other.get_item("foo").unwrap().as_deref(), Some("\"bar\""));
        assert_eq!(other.len(), 1);

        other.clear();

        assert!(store.is_empty());
        assert_eq!(store.get_item("foo").unwrap(), None);
    }

    #[test]
    fn memory_store_remove_item() {
        let store = MemoryStore::new();

        store.insert("a", "1");
        store.insert("b", "2");

        assert_eq!(store.remove_item("a").as_deref(), Some("1"));
        assert_eq!(store.remove_item("a"), None);
        assert_eq!(store.get("b").as_deref(), Some("2"));
    }

    #[test]
    #[cfg(not(target_arch = "wasm32"))]
    fn local_storage_is_not_available_outside_the_browser() {
        assert!(LocalStorage::probe().is_none());
    }
}
