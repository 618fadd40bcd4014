use anyhow::{anyhow, Result};
use futures::channel::oneshot::channel;
use serde::de::DeserializeOwned;
use std::future::Future;
use wasm_bindgen::closure::{Closure, WasmClosure, WasmClosureFnOnce};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[rustfmt::skip]
use web_sys::{
    CanvasRenderingContext2d,
    Document,
    HtmlCanvasElement,
    HtmlImageElement,
    Response,
    Window,
};

// ==================== Constants ====================
// Constants related to HTML elements
mod html {
    pub const CANVAS_ID: &str = "game";
    pub const CONTEXT_2D: &str = "2d";
}

// Display-size clamp applied when letterboxing the canvas into the viewport
const DISPLAY_MIN_WIDTH: f64 = 320.0;
const DISPLAY_MAX_WIDTH: f64 = 1280.0;

macro_rules! log {
    ($($t:tt)*) => {
        web_sys::console::log_1(&format!($($t)*).into());
    }
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document found"))
}

pub fn canvas() -> Result<HtmlCanvasElement> {
    document()?
        .get_element_by_id(html::CANVAS_ID)
        .ok_or_else(|| anyhow!("No Canvas element found with ID : '{:#?}'", html::CANVAS_ID))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))
}

pub fn context() -> Result<CanvasRenderingContext2d> {
    canvas()?
        .get_context(html::CONTEXT_2D)
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

pub fn new_image() -> Result<HtmlImageElement> {
    HtmlImageElement::new().map_err(|err| anyhow!("Could not create image element : {:#?}", err))
}

pub fn now() -> Result<f64> {
    Ok(window()?
        .performance()
        .ok_or_else(|| anyhow!("Performance object not found"))?
        .now())
}

/// Whether the device exposes a touch digitizer; decides between the
/// `touchend` and `click` flavors of the activate input.
pub fn is_touch_device() -> Result<bool> {
    Ok(window()?.navigator().max_touch_points() > 0)
}

/// Size the canvas' CSS box to the viewport, preserving the drawing-buffer
/// aspect ratio and clamping the display width to [320, 1280] px. The drawing
/// buffer itself is untouched, so game coordinates stay logical.
pub fn fit_canvas(canvas: &HtmlCanvasElement) -> Result<()> {
    let window = window()?;
    let viewport_width = window
        .inner_width()
        .map_err(|err| anyhow!("Error reading innerWidth : {:#?}", err))?
        .as_f64()
        .ok_or_else(|| anyhow!("innerWidth was not a number"))?;
    let viewport_height = window
        .inner_height()
        .map_err(|err| anyhow!("Error reading innerHeight : {:#?}", err))?
        .as_f64()
        .ok_or_else(|| anyhow!("innerHeight was not a number"))?;

    let aspect = f64::from(canvas.width()) / f64::from(canvas.height().max(1));
    let display_width = viewport_width
        .min(viewport_height * aspect)
        .clamp(DISPLAY_MIN_WIDTH, DISPLAY_MAX_WIDTH);
    let display_height = display_width / aspect;

    let style = canvas.style();
    style
        .set_property("width", &format!("{}px", display_width.round()))
        .map_err(|err| anyhow!("Error setting canvas width : {:#?}", err))?;
    style
        .set_property("height", &format!("{}px", display_height.round()))
        .map_err(|err| anyhow!("Error setting canvas height : {:#?}", err))?;
    Ok(())
}

pub type LoopClosure = Closure<dyn FnMut(f64)>;

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame : {:#?}", err))
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    closure_wrap(Box::new(f))
}

pub fn closure_wrap<T: WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}

pub fn closure_once<F, A, R>(f: F) -> Closure<F::FnMut>
where
    F: 'static + WasmClosureFnOnce<A, R>,
{
    Closure::once(f)
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Resolve after roughly `ms` milliseconds via a one-shot `setTimeout`.
pub async fn wait_ms(ms: i32) -> Result<()> {
    let (tx, rx) = channel::<()>();
    let callback = closure_once(move || {
        let _ = tx.send(());
    });

    window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            ms,
        )
        .map_err(|err| anyhow!("Could not register timeout : {:#?}", err))?;
    callback.forget();

    rx.await
        .map_err(|_| anyhow!("Timer callback was dropped before firing"))
}

pub async fn fetch_json<T>(json_path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let resp_value = fetch_with_str(json_path).await?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|element| anyhow!("Error converting [{:#?}] to Response", element))?;
    let json = resp
        .json()
        .map_err(|err| anyhow!("Could not get JSON from response [{:#?}]", err))?;

    let json_value = JsFuture::from(json)
        .await
        .map_err(|err| anyhow!("Error fetching [{:#?}]", err))?;

    serde_wasm_bindgen::from_value(json_value)
        .map_err(|err| anyhow!("Error converting response : {:#?}", err))
}

async fn fetch_with_str(resource: &str) -> Result<JsValue> {
    let resp = window()?.fetch_with_str(resource);

    JsFuture::from(resp)
        .await
        .map_err(|err| anyhow!("Error fetching : {:#?}", err))
}
