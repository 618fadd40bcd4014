// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
pub mod browser;
pub mod engine;
pub mod game;
pub mod world;

use engine::GameLoop;
use game::FlappyGame;

// ==================== Main Functions ====================
/// Main entry for the WebAssembly module
/// - installs the panic hook so failures reach the console
/// - hands the canvas game to the engine loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    browser::spawn_local(async move {
        GameLoop::start(FlappyGame::new())
            .await
            .expect("Could not start game loop");
    });

    Ok(())
}
