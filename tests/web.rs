//! Browser-only smoke tests; run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use flappy_canvas::browser;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn the_page_exposes_a_window_and_document() {
    assert!(browser::window().is_ok());
    assert!(browser::document().is_ok());
}

#[wasm_bindgen_test]
fn the_performance_clock_is_monotonic() {
    let first = browser::now().unwrap();
    let second = browser::now().unwrap();
    assert!(second >= first);
    assert!(js_sys::Date::now() > 0.0);
}

#[wasm_bindgen_test]
fn image_elements_can_be_created() {
    assert!(browser::new_image().is_ok());
}
