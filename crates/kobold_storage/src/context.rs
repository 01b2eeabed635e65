// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::rc::Rc;

use crate::{Diagnostics, LocalStorage, Log, Store};

/// Where cells persist their values and where they report problems.
///
/// Cloning a `Context` is cheap, all clones share the same store and sink.
#[derive(Clone)]
pub struct Context {
    pub(crate) store: Option<Rc<dyn Store>>,
    pub(crate) diagnostics: Rc<dyn Diagnostics>,
}

impl Context {
    /// Use the browser's local storage if it's there, otherwise keep state in memory only.
    pub fn local() -> Self {
        match LocalStorage::probe() {
            Some(storage) => Context::new(storage),
            None => Context::unavailable(),
        }
    }

    /// Persist to an arbitrary [`Store`].
    pub fn new<S>(store: S) -> Self
    where
        S: Store + 'static,
    {
        Context {
            store: Some(Rc::new(store)),
            diagnostics: Rc::new(Log),
        }
    }

    /// No store at all, cells behave like plain in-memory state.
    pub fn unavailable() -> Self {
        Context {
            store: None,
            diagnostics: Rc::new(Log),
        }
    }

    /// Replace the default [`Log`] sink.
    pub fn with_diagnostics<D>(mut self, diagnostics: D) -> Self
    where
        D: Diagnostics + 'static,
    {
        self.diagnostics = Rc::new(diagnostics);
        self
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::local()
    }
}
