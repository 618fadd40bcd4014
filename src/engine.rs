use crate::browser;
use anyhow::{anyhow, Result};
// Wasm is a single threaded environment, so Rc + RefCell instead of Mutex
use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use futures::channel::oneshot::channel;
use futures::future::{select, try_join_all, Either};
use futures::pin_mut;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, input: &mut Input);
    fn draw(&self, renderer: &Renderer);
}

/// Length of one logical frame in milliseconds. Physics constants are tuned
/// for this step, so the loop runs whole steps and banks the remainder.
pub const FRAME_SIZE: f64 = 1.0 / 60.0 * 1000.0;

/// How long the asset barrier waits before giving up on a stalled load.
const ASSET_LOAD_TIMEOUT_MS: i32 = 10_000;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f64,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut input_events = prepare_input()?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let mut input = Input::default();
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            // Drain listener events once per displayed frame; the command
            // stays pending until an update step consumes it.
            if process_input(&mut input_events) {
                input.record_activate();
            }
            game_loop.accumulated_delta += perf - game_loop.last_frame;
            while game_loop.accumulated_delta > FRAME_SIZE {
                game.update(&mut input);
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game.draw(&renderer);
            let _ = browser::request_animation_frame(f.borrow().as_ref().unwrap());
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

// ==================== Input ====================

/// The single logical command the game understands. Edge-triggered: recording
/// sets the flag, the first consumer of the frame takes it.
#[derive(Debug, Default)]
pub struct Input {
    activate: bool,
}

impl Input {
    pub fn record_activate(&mut self) {
        self.activate = true;
    }

    pub fn take_activate(&mut self) -> bool {
        std::mem::take(&mut self.activate)
    }
}

/// Attach the activate listener (touchend on touch devices, click elsewhere)
/// and hand back the receiving end of its event channel.
fn prepare_input() -> Result<UnboundedReceiver<()>> {
    let (tx, rx) = unbounded();
    let event_name = if browser::is_touch_device()? {
        "touchend"
    } else {
        "click"
    };

    let on_activate = browser::closure_wrap(Box::new(move |_event: web_sys::Event| {
        let _ = tx.unbounded_send(());
    }) as Box<dyn FnMut(web_sys::Event)>);

    browser::window()?
        .add_event_listener_with_callback(event_name, on_activate.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not attach {} listener : {:#?}", event_name, err))?;
    on_activate.forget();

    Ok(rx)
}

fn process_input(events: &mut UnboundedReceiver<()>) -> bool {
    let mut activated = false;
    while let Ok(Some(())) = events.try_next() {
        activated = true;
    }
    activated
}

// ==================== Geometry ====================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

// ==================== Renderer ====================

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn fill_rect(&self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context
            .fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    /// Blit a whole image at its natural size.
    pub fn draw_image(&self, image: &HtmlImageElement, position: &Point) {
        self.context
            .draw_image_with_html_image_element(image, position.x, position.y)
            .expect("Drawing is throwing exceptions! Unrecoverable error");
    }

    /// Blit a source-rect slice of `image` into `destination`, rotated by
    /// `angle_degrees` about the destination's center.
    pub fn draw_frame_rotated(
        &self,
        image: &HtmlImageElement,
        frame: &Rect,
        destination: &Rect,
        angle_degrees: f64,
    ) {
        self.with_rotation(destination, angle_degrees, |context| {
            context
                .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    image,
                    frame.x,
                    frame.y,
                    frame.width,
                    frame.height,
                    -destination.width / 2.0,
                    -destination.height / 2.0,
                    destination.width,
                    destination.height,
                )
                .expect("Drawing is throwing exceptions! Unrecoverable error");
        });
    }

    /// Blit a whole image into `destination`, rotated about its center.
    pub fn draw_image_rotated(
        &self,
        image: &HtmlImageElement,
        destination: &Rect,
        angle_degrees: f64,
    ) {
        self.with_rotation(destination, angle_degrees, |context| {
            context
                .draw_image_with_html_image_element_and_dw_and_dh(
                    image,
                    -destination.width / 2.0,
                    -destination.height / 2.0,
                    destination.width,
                    destination.height,
                )
                .expect("Drawing is throwing exceptions! Unrecoverable error");
        });
    }

    pub fn text(&self, text: &str, position: &Point, font: &str, color: &str, align: &str) {
        self.context.set_font(font);
        self.context.set_fill_style_str(color);
        self.context.set_text_align(align);
        self.context
            .fill_text(text, position.x, position.y)
            .expect("Drawing is throwing exceptions! Unrecoverable error");
    }

    fn with_rotation(
        &self,
        destination: &Rect,
        angle_degrees: f64,
        draw: impl FnOnce(&CanvasRenderingContext2d),
    ) {
        self.context.save();
        self.context
            .translate(
                destination.x + destination.width / 2.0,
                destination.y + destination.height / 2.0,
            )
            .expect("Transform is throwing exceptions! Unrecoverable error");
        self.context
            .rotate(angle_degrees.to_radians())
            .expect("Transform is throwing exceptions! Unrecoverable error");
        draw(&self.context);
        self.context.restore();
    }
}

// ==================== Assets ====================

/// Loaded sprite images, keyed by the names the manifest declared.
pub struct Assets {
    images: HashMap<String, HtmlImageElement>,
}

impl Assets {
    /// Issue every image load at once and suspend until all of them land, or
    /// fail loudly when any load errors or the whole batch exceeds the
    /// timeout. A stalled download therefore cannot hang bootstrap forever.
    pub async fn load(sources: &HashMap<String, String>) -> Result<Self> {
        let pending = sources.iter().map(|(name, path)| {
            let name = name.clone();
            async move { Ok::<_, anyhow::Error>((name, load_image(path).await?)) }
        });
        let all_loaded = try_join_all(pending);
        let deadline = browser::wait_ms(ASSET_LOAD_TIMEOUT_MS);
        pin_mut!(all_loaded, deadline);

        match select(all_loaded, deadline).await {
            Either::Left((loaded, _)) => {
                let images: HashMap<String, HtmlImageElement> = loaded?.into_iter().collect();
                log!("preloaded {} sprites", images.len());
                Ok(Assets { images })
            }
            Either::Right((timer, _)) => {
                timer?;
                Err(anyhow!(
                    "asset preload timed out after {}ms",
                    ASSET_LOAD_TIMEOUT_MS
                ))
            }
        }
    }

    /// Hand ownership of a named image to the caller.
    pub fn take(&mut self, name: &str) -> Result<HtmlImageElement> {
        self.images
            .remove(name)
            .ok_or_else(|| anyhow!("manifest is missing sprite {:?}", name))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail or when the element's callbacks report an error
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<()>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!("Error loading image : {:#?}", err)));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callbacks alive until the image loads or errors
    success_callback.forget();
    error_callback.forget();

    rx.await??;

    Ok(image)
}
