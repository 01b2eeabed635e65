// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Errors produced while creating or persisting a [`Persisted`](crate::Persisted) cell.
///
/// Only [`MissingKey`](Error::MissingKey) is ever returned to the caller. Everything
/// else is reported through [`Diagnostics`](crate::Diagnostics) inside a
/// [`Warning`](crate::Warning).
#[derive(Debug, Error)]
pub enum Error {
    #[error("A valid key should be provided to persisted storage")]
    MissingKey,
    #[error("could not read item: {0}")]
    Read(String),
    #[error("could not write item: {0}")]
    Write(String),
    #[error("could not decode stored value: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("could not encode value: {0}")]
    Encode(#[source] serde_json::Error),
}

impl Error {
    pub(crate) fn read(err: JsValue) -> Self {
        Error::Read(describe(err))
    }

    pub(crate) fn write(err: JsValue) -> Self {
        Error::Write(describe(err))
    }
}

/// Turn a thrown JavaScript value into something printable. `Storage` throws
/// `DOMException`s (`SecurityError`, `QuotaExceededError`), which are `Error`s.
fn describe(err: JsValue) -> String {
    if let Some(err) = err.dyn_ref::<js_sys::Error>() {
        return err.message().into();
    }

    match err.as_string() {
        Some(message) => message,
        None => format!("{err:?}"),
    }
}
