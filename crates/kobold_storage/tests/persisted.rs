// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kobold_storage::{Cache, Context, MemoryStore, Persisted, Recorder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Settings {
    theme: String,
    font_size: u8,
}

#[test]
fn set_persists_and_updates() {
    let store = MemoryStore::new();
    let recorder = Recorder::new();
    let ctx = Context::new(store.clone()).with_diagnostics(recorder.clone());

    let cell = Persisted::with_context("test", String::from("bar"), &ctx).unwrap();

    assert_eq!(*cell.get(), "bar");
    assert_eq!(store.get("test").as_deref(), Some("\"bar\""));

    cell.set("baz".into());

    assert_eq!(*cell.get(), "baz");
    assert_eq!(store.get("test").as_deref(), Some("\"baz\""));
    assert!(recorder.is_empty());
}

#[test]
fn structured_values_survive_a_reload() {
    let store = MemoryStore::new();
    let ctx = Context::new(store.clone());

    let defaults = Settings {
        theme: "light".into(),
        font_size: 12,
    };

    {
        let cache = Cache::new(ctx.clone());
        let (_, set) = cache.use_persisted("settings", defaults.clone()).unwrap();

        set.update(|settings| Settings {
            theme: "dark".into(),
            ..settings.clone()
        });
    }

    // a fresh cache is a fresh page load
    let cache = Cache::new(ctx);
    let (settings, _) = cache.use_persisted("settings", defaults).unwrap();

    assert_eq!(
        *settings,
        Settings {
            theme: "dark".into(),
            font_size: 12,
        }
    );
    assert_eq!(
        store.get("settings").as_deref(),
        Some(r#"{"theme":"dark","font_size":12}"#)
    );
}

#[test]
fn unavailable_storage_keeps_the_app_working() {
    let recorder = Recorder::new();
    let ctx = Context::unavailable().with_diagnostics(recorder.clone());

    let cell = Persisted::with_context("test", 1_u32, &ctx).unwrap();

    assert_eq!(*cell.get(), 1);
    assert!(recorder.is_empty());

    cell.setter().update(|n| n + 1);

    assert_eq!(*cell.get(), 2);
    assert_eq!(recorder.len(), 1);
}
