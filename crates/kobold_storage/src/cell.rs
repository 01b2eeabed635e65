// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cell::RefCell;

/// A `RefCell` that refuses cyclic borrows instead of panicking.
///
/// Subscribers run while their list is borrowed, and a subscriber is allowed to
/// call back into the cell that notified it. The nested call simply skips the
/// closure instead of tearing down the app.
pub struct WithCell<T> {
    data: RefCell<T>,
}

impl<T> WithCell<T> {
    pub const fn new(data: T) -> Self {
        WithCell {
            data: RefCell::new(data),
        }
    }

    /// Run `mutator` on the data, returns `false` if the data was already borrowed.
    pub fn with<F>(&self, mutator: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        match self.data.try_borrow_mut() {
            Ok(mut data) => {
                mutator(&mut data);
                true
            }
            Err(_) => false,
        }
    }
}
