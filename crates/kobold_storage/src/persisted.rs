// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cell::WithCell;
use crate::{Context, Diagnostics, Error, Store, Warning};

struct Inner<T> {
    key: Box<str>,
    store: Option<Rc<dyn Store>>,
    diagnostics: Rc<dyn Diagnostics>,
    value: RefCell<Rc<T>>,
    setter: Setter<T>,
    subscribers: WithCell<Vec<Subscriber<T>>>,
    /// Subscribed while `subscribers` was busy dispatching.
    pending: RefCell<Vec<Subscriber<T>>>,
}

struct Subscriber<T> {
    active: Rc<Cell<bool>>,
    callback: Box<dyn FnMut(&T)>,
}

/// Handle returned by [`Persisted::subscribe`].
///
/// Dropping the handle does not unsubscribe, call [`unsubscribe`](Subscription::unsubscribe).
#[derive(Clone, Debug)]
pub struct Subscription {
    active: Rc<Cell<bool>>,
}

impl Subscription {
    /// Stop calling the subscriber. Takes effect immediately, even in the middle
    /// of a notification.
    pub fn unsubscribe(&self) {
        self.active.set(false);
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// A piece of state persisted in a [`Store`] under a fixed key.
///
/// The value is read from the store once, when the cell is created. If the store
/// doesn't have anything for the key yet, it's seeded with the initial value.
/// After that every [`set`](Persisted::set) writes through to the store first and
/// only changes the cell if the write succeeded.
///
/// `Persisted` is a cheap handle, clones refer to the same cell.
pub struct Persisted<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Persisted<T> {
    fn clone(&self) -> Self {
        Persisted {
            inner: self.inner.clone(),
        }
    }
}

/// Handle that sets the value of a [`Persisted`] cell.
///
/// Every setter of a cell is the same setter: they compare equal, and keep
/// comparing equal for as long as the cell is around. A setter doesn't keep the
/// cell alive, once the cell is dropped setting values does nothing.
pub struct Setter<T> {
    weak: Weak<Inner<T>>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Setter {
            weak: self.weak.clone(),
        }
    }
}

impl<T> PartialEq for Setter<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for Setter<T> {}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Setter").field(&self.weak.as_ptr()).finish()
    }
}

impl<T> Setter<T> {
    /// Returns `true` if both setters belong to the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.weak, &other.weak)
    }
}

impl<T> Setter<T>
where
    T: Serialize + 'static,
{
    /// Persist `value` and update the cell, see [`Persisted::set`].
    pub fn set(&self, value: T) {
        if let Some(inner) = self.weak.upgrade() {
            inner.set(value);
        }
    }

    /// Compute the next value from the current one and [`set`](Setter::set) it.
    ///
    /// ```
    /// # use kobold_storage::{Context, MemoryStore, Persisted};
    /// let count = Persisted::with_context("count", 0_u32, &Context::new(MemoryStore::new())).unwrap();
    ///
    /// count.setter().update(|n| n + 1);
    ///
    /// assert_eq!(*count.get(), 1);
    /// ```
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        if let Some(inner) = self.weak.upgrade() {
            let next = f(&*inner.current());

            inner.set(next);
        }
    }
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Create a cell backed by the browser's local storage, see [`Context::local`].
    pub fn new(key: &str, initial: T) -> Result<Self, Error> {
        Persisted::with_context(key, initial, &Context::local())
    }

    /// Create a cell backed by the store configured in `ctx`.
    ///
    /// Fails only if `key` is empty. Storage problems are reported to the
    /// diagnostics sink and the cell starts with `initial`.
    pub fn with_context(key: &str, initial: T, ctx: &Context) -> Result<Self, Error> {
        if key.is_empty() {
            return Err(Error::MissingKey);
        }

        let value = match &ctx.store {
            Some(store) => match read_or_seed(&**store, key, &initial) {
                Ok(Some(stored)) => stored,
                Ok(None) => initial,
                Err(error) => {
                    ctx.diagnostics.warn(Warning::Read {
                        key: key.into(),
                        error,
                    });
                    initial
                }
            },
            None => initial,
        };

        let inner = Rc::new_cyclic(|weak| Inner {
            key: key.into(),
            store: ctx.store.clone(),
            diagnostics: ctx.diagnostics.clone(),
            value: RefCell::new(Rc::new(value)),
            setter: Setter { weak: weak.clone() },
            subscribers: WithCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
        });

        Ok(Persisted { inner })
    }
}

impl<T> Persisted<T>
where
    T: Serialize + 'static,
{
    /// Persist `value` and, if that succeeded, make it the current value and notify
    /// subscribers.
    ///
    /// Without a store the value is only kept in memory and a
    /// [`Warning::Unavailable`] is reported. If encoding or writing fails a
    /// [`Warning::Write`] is reported and the cell keeps its current value.
    pub fn set(&self, value: T) {
        self.inner.set(value);
    }
}

impl<T> Persisted<T> {
    /// Key the value is stored under.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Current value. The same `Rc` is handed out until the value changes.
    pub fn get(&self) -> Rc<T> {
        self.inner.current()
    }

    /// Run `f` with a reference to the current value. `f` may set the cell.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&*self.get())
    }

    /// Setter for this cell, every call returns an equal [`Setter`].
    pub fn setter(&self) -> Setter<T> {
        self.inner.setter.clone()
    }

    /// The current value together with the setter.
    pub fn pair(&self) -> (Rc<T>, Setter<T>) {
        (self.get(), self.setter())
    }

    /// Call `subscriber` with the new value after every successful [`set`](Persisted::set).
    ///
    /// Subscriptions stay until [`unsubscribe`](Subscription::unsubscribe)d, so
    /// subscribe once per dependent rather than on every render. A subscriber added
    /// while subscribers are being notified is first called on the next change.
    pub fn subscribe<F>(&self, subscriber: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        let active = Rc::new(Cell::new(true));

        self.inner.pending.borrow_mut().push(Subscriber {
            active: active.clone(),
            callback: Box::new(subscriber),
        });
        self.inner.subscribers.with(|subscribers| self.inner.adopt_pending(subscribers));

        Subscription { active }
    }
}

impl<T> Inner<T> {
    fn current(&self) -> Rc<T> {
        self.value.borrow().clone()
    }

    fn adopt_pending(&self, subscribers: &mut Vec<Subscriber<T>>) {
        subscribers.append(&mut self.pending.borrow_mut());
        subscribers.retain(|subscriber| subscriber.active.get());
    }

    /// Call subscribers until the value stops changing. A subscriber that sets
    /// the cell while being notified only updates the value: the nested
    /// dispatch is skipped and the loop here hands every subscriber the newer
    /// value instead. A subscriber that sets a new value on every call never settles.
    fn notify(&self) {
        self.subscribers.with(|subscribers| {
            let mut value = self.current();

            loop {
                for subscriber in subscribers.iter_mut() {
                    if subscriber.active.get() {
                        (subscriber.callback)(&*value);
                    }
                }

                let current = self.current();

                if Rc::ptr_eq(&current, &value) {
                    break;
                }

                self.adopt_pending(subscribers);
                value = current;
            }

            self.adopt_pending(subscribers);
        });
    }
}

impl<T> Inner<T>
where
    T: Serialize,
{
    fn set(&self, value: T) {
        let Some(store) = &self.store else {
            self.diagnostics.warn(Warning::Unavailable {
                key: self.key.clone(),
            });
            return self.replace(value);
        };

        match write(&**store, &self.key, &value) {
            Ok(()) => self.replace(value),
            Err(error) => self.diagnostics.warn(Warning::Write {
                key: self.key.clone(),
                error,
            }),
        }
    }

    fn replace(&self, value: T) {
        *self.value.borrow_mut() = Rc::new(value);

        self.notify();
    }
}

/// `Ok(Some(_))` with the stored value, or `Ok(None)` once the store has been
/// seeded with `initial`. An empty string counts as nothing stored.
fn read_or_seed<T>(store: &dyn Store, key: &str, initial: &T) -> Result<Option<T>, Error>
where
    T: Serialize + DeserializeOwned,
{
    match store.get_item(key)? {
        Some(raw) if !raw.is_empty() => serde_json::from_str(&raw).map(Some).map_err(Error::Decode),
        _ => write(store, key, initial).map(|()| None),
    }
}

fn write<T>(store: &dyn Store, key: &str, value: &T) -> Result<(), Error>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(Error::Encode)?;

    store.set_item(key, &raw)
}
