// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kobold::prelude::*;
use kobold_storage::Context;
use wasm_bindgen::UnwrapThrowExt;

mod toggle;

use toggle::Toggle;

fn app(state: &Hook<Toggle>) -> impl View + '_ {
    view! {
        <div>
            <p>"local value is: "{ state.value() }</p>
            <button onclick={do state.toggle()}>"toggle"</button>
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());

    kobold::start(stateful(
        || Toggle::new(&Context::local()).unwrap_throw(),
        app,
    ));
}
