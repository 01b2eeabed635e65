// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::rc::Rc;

use kobold_storage::{Context, Error, Persisted};

const KEY: &str = "foo";
const DEFAULT: &str = "bar";
const OTHER: &str = "poo";

/// State of the toggle screen: one persisted string flipping between two values.
pub struct Toggle {
    cell: Persisted<String>,
    current: Rc<String>,
}

impl Toggle {
    pub fn new(ctx: &Context) -> Result<Self, Error> {
        let cell = Persisted::with_context(KEY, DEFAULT.to_owned(), ctx)?;
        let current = cell.get();

        Ok(Toggle { cell, current })
    }

    pub fn value(&self) -> &str {
        &self.current
    }

    pub fn toggle(&mut self) {
        let next = if *self.current == DEFAULT { OTHER } else { DEFAULT };

        self.cell.set(next.to_owned());
        self.current = self.cell.get();

        log::debug!("local value is now {}", self.current);
    }
}
