// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Kobold Storage
//!
//! _State that survives a page reload._
//!
//! **Kobold Storage** keeps a single piece of state in sync with the browser's
//! [`localStorage`](https://developer.mozilla.org/en-US/docs/Web/API/Window/localStorage).
//! A [`Persisted`] cell reads the stored value once when it is created, or seeds the
//! storage with a default if nothing is there yet. Every successful write both persists
//! the new value and updates the cell.
//!
//! Storage failures never panic. They degrade the cell to in-memory state and are
//! reported as [`Warning`]s to a pluggable [`Diagnostics`] sink, which by default
//! forwards them to the [`log`](https://docs.rs/log) facade.
//!
//! ```
//! use kobold_storage::{Context, MemoryStore, Persisted};
//!
//! let store = MemoryStore::new();
//! let ctx = Context::new(store.clone());
//!
//! let greeting = Persisted::with_context("greeting", String::from("hello"), &ctx).unwrap();
//!
//! assert_eq!(*greeting.get(), "hello");
//! assert_eq!(store.get("greeting").as_deref(), Some("\"hello\""));
//!
//! greeting.set("world".into());
//!
//! assert_eq!(*greeting.get(), "world");
//! assert_eq!(store.get("greeting").as_deref(), Some("\"world\""));
//! ```
//!
//! ### Re-rendering
//!
//! Cells can be owned by any host. Inside a kobold [`stateful`](https://docs.rs/kobold)
//! view the hook already takes care of re-rendering after an event handler runs.
//! Elsewhere, [`subscribe`](Persisted::subscribe) once to be told about changes, and
//! use a [`Cache`] to get the same cell back on every render.

mod cache;
mod cell;
mod context;
mod diagnostics;
mod error;
mod persisted;
mod store;

pub use cache::Cache;
pub use context::Context;
pub use diagnostics::{Diagnostics, Log, Recorder, Warning};
pub use error::Error;
pub use persisted::{Persisted, Setter, Subscription};
pub use store::{LocalStorage, MemoryStore, Store};

/// The prelude module with most commonly used types.
pub mod prelude {
    pub use crate::{Cache, Context, Persisted, Setter};
}
