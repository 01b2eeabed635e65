// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-fatal problems encountered while reading or writing storage.

use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;

use crate::Error;

/// A storage problem the cell recovered from.
#[derive(Debug)]
pub enum Warning {
    /// Reading, decoding or seeding the stored value failed, the initial value was used instead.
    Read { key: Box<str>, error: Error },
    /// Encoding or writing a new value failed, the cell kept its previous value.
    Write { key: Box<str>, error: Error },
    /// A value was set while no store was available, it only lives in memory.
    Unavailable { key: Box<str> },
}

impl Warning {
    pub fn key(&self) -> &str {
        match self {
            Warning::Read { key, .. } | Warning::Write { key, .. } | Warning::Unavailable { key } => {
                &**key
            }
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Warning::Read { error, .. } | Warning::Write { error, .. } => Some(error),
            Warning::Unavailable { .. } => None,
        }
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::Read { key, error } => write!(f, "Error reading storage from \"{key}\": {error}"),
            Warning::Write { key, error } => write!(f, "Error writing storage to \"{key}\": {error}"),
            Warning::Unavailable { key } => write!(f, "Tried setting storage value for key \"{key}\""),
        }
    }
}

/// Sink for [`Warning`]s.
///
/// Implemented for closures, so a one-off sink is just `|warning| ...`.
pub trait Diagnostics {
    fn warn(&self, warning: Warning);
}

impl<F> Diagnostics for F
where
    F: Fn(Warning),
{
    fn warn(&self, warning: Warning) {
        (self)(warning)
    }
}

/// Forwards warnings to the [`log`] facade. This is the default sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

impl Diagnostics for Log {
    fn warn(&self, warning: Warning) {
        log::warn!(target: "kobold_storage", "{warning}");
    }
}

/// Keeps warnings in memory. Clones share the same list.
#[derive(Clone, Default)]
pub struct Recorder {
    warnings: Rc<RefCell<Vec<Warning>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Recorder::default()
    }

    pub fn len(&self) -> usize {
        self.warnings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }

    /// Rendered messages of all recorded warnings, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.warnings.borrow().iter().map(ToString::to_string).collect()
    }

    /// Remove and return all recorded warnings.
    pub fn take(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.warnings.borrow_mut())
    }
}

impl Diagnostics for Recorder {
    fn warn(&self, warning: Warning) {
        self.warnings.borrow_mut().push(warning);
    }
}
