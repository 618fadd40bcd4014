use crate::browser;
use crate::engine::{self, Assets, Game, Input, Point, Rect, Renderer, Size};
use crate::world::actor;
use crate::world::obstacles::OBSTACLE_WIDTH;
use crate::world::Session;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wasm_bindgen::JsCast;
use web_sys::HtmlImageElement;

// Logical drawing-buffer resolution; the CSS box letterboxes around it
const SCREEN: Size = Size {
    width: 640.0,
    height: 360.0,
};

const MANIFEST_PATH: &str = "assets.json";

const SKY_COLOR: &str = "#ADE9F4";
const OVERLAY_COLOR: &str = "rgba(0, 0, 0, 0.45)";
const HUD_COLOR: &str = "#FFFFFF";
const SCORE_FONT: &str = "bold 40px sans-serif";
const PROMPT_FONT: &str = "24px sans-serif";

// Sprite names the manifest must provide
mod sprite_names {
    pub const BIRD: &str = "bird";
    pub const CLOUDS: &str = "clouds";
    pub const LAND: &str = "land";
    pub const PIPE: &str = "pipe";
}

/// Maps sprite names to image paths; fetched from `assets.json` at bootstrap.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssetManifest {
    sprites: HashMap<String, String>,
}

/// ┌────────────── Session Flow ───────────────┐
/// │  From      →  Event             →  To     │
/// ├───────────────────────────────────────────┤
/// │  Loading   →  assets ready      →  Loaded │
/// │  Idle      →  activate          →  Running│
/// │  Running   →  activate          →  Running│ (jump)
/// │  Running   →  bounds/collision  →  Idle   │
/// └───────────────────────────────────────────┘
pub enum FlappyGame {
    /// Initial state while the manifest and sprites are being loaded
    Loading,

    /// Active game with loaded sprites and a live session
    Loaded(Playfield),
}

impl FlappyGame {
    pub fn new() -> Self {
        FlappyGame::Loading
    }
}

impl Default for FlappyGame {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Game for FlappyGame {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            FlappyGame::Loading => {
                let canvas = browser::canvas()?;
                canvas.set_width(SCREEN.width as u32);
                canvas.set_height(SCREEN.height as u32);
                browser::fit_canvas(&canvas)?;

                // keep the display box in step with the viewport
                let resize_target = canvas.clone();
                let on_resize = browser::closure_wrap(Box::new(move || {
                    if let Err(err) = browser::fit_canvas(&resize_target) {
                        log!("could not refit canvas : {:#?}", err);
                    }
                }) as Box<dyn FnMut()>);
                browser::window()?.set_onresize(Some(on_resize.as_ref().unchecked_ref()));
                on_resize.forget();

                let manifest = browser::fetch_json::<AssetManifest>(MANIFEST_PATH)
                    .await
                    .with_context(|| {
                        format!("Failed to load sprite manifest from : {}", MANIFEST_PATH)
                    })?;
                let mut assets = Assets::load(&manifest.sprites).await?;
                let sprites = SpriteBank::from_assets(&mut assets)?;

                // tile widths come off the loaded art, so any resolution of
                // the backdrop strips tiles seamlessly
                let session = Session::new(
                    SCREEN,
                    f64::from(sprites.clouds.width()),
                    f64::from(sprites.land.width()),
                );
                let prompt = if browser::is_touch_device()? {
                    "Tap to start"
                } else {
                    "Click to start"
                };

                Ok(Box::new(FlappyGame::Loaded(Playfield {
                    session,
                    sprites,
                    prompt,
                })))
            }
            FlappyGame::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, input: &mut Input) {
        match self {
            // commands queued while loading are stale; drop them
            FlappyGame::Loading => {
                input.take_activate();
            }
            FlappyGame::Loaded(playfield) => {
                if input.take_activate() {
                    playfield.session.activate();
                }

                let was_running = playfield.session.is_running();
                playfield.session.tick(engine::FRAME_SIZE);
                if was_running && !playfield.session.is_running() {
                    log!("run ended with score {}", playfield.session.score());
                }
            }
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let FlappyGame::Loaded(playfield) = self {
            playfield.draw(renderer);
        }
    }
}

/// The loaded game: the pure session plus the sprite handles it is drawn
/// with.
pub struct Playfield {
    session: Session,
    sprites: SpriteBank,
    prompt: &'static str,
}

impl Playfield {
    // Draw order matters : sky -> backdrop -> obstacles -> actor -> HUD
    fn draw(&self, renderer: &Renderer) {
        renderer.fill_rect(
            &Rect::new(0.0, 0.0, SCREEN.width, SCREEN.height),
            SKY_COLOR,
        );
        self.draw_backdrop(renderer);
        self.draw_obstacles(renderer);
        self.draw_actor(renderer);
        self.draw_hud(renderer);
        if !self.session.is_running() {
            self.draw_overlay(renderer);
        }
    }

    fn draw_backdrop(&self, renderer: &Renderer) {
        for tile in self.session.backdrop().clouds().tiles() {
            renderer.draw_image(&self.sprites.clouds, &Point { x: tile.x, y: 0.0 });
        }

        let ground_y = SCREEN.height - f64::from(self.sprites.land.height());
        for tile in self.session.backdrop().ground().tiles() {
            renderer.draw_image(&self.sprites.land, &Point { x: tile.x, y: ground_y });
        }
    }

    fn draw_obstacles(&self, renderer: &Renderer) {
        let pipe_height = f64::from(self.sprites.pipe.height());
        for obstacle in self.session.obstacles().iter() {
            // upper piece hangs down to the gap's top edge
            renderer.draw_image(
                &self.sprites.pipe,
                &Point {
                    x: obstacle.x,
                    y: obstacle.gap_top - pipe_height,
                },
            );
            // lower piece is the same texture turned upside down
            renderer.draw_image_rotated(
                &self.sprites.pipe,
                &Rect::new(
                    obstacle.x,
                    obstacle.gap_bottom(),
                    OBSTACLE_WIDTH,
                    pipe_height,
                ),
                180.0,
            );
        }
    }

    fn draw_actor(&self, renderer: &Renderer) {
        let actor = self.session.actor();
        let frame = Rect::new(
            f64::from(actor.frame()) * actor::WIDTH,
            0.0,
            actor::WIDTH,
            actor::HEIGHT,
        );
        let destination = Rect::new(actor.x, actor.y, actor::WIDTH, actor::HEIGHT);
        renderer.draw_frame_rotated(&self.sprites.bird, &frame, &destination, actor.angle);
    }

    fn draw_hud(&self, renderer: &Renderer) {
        renderer.text(
            &self.session.score().to_string(),
            &Point {
                x: SCREEN.width / 2.0,
                y: 56.0,
            },
            SCORE_FONT,
            HUD_COLOR,
            "center",
        );
    }

    fn draw_overlay(&self, renderer: &Renderer) {
        renderer.fill_rect(
            &Rect::new(0.0, 0.0, SCREEN.width, SCREEN.height),
            OVERLAY_COLOR,
        );
        renderer.text(
            self.prompt,
            &Point {
                x: SCREEN.width / 2.0,
                y: SCREEN.height / 2.0 + 8.0,
            },
            PROMPT_FONT,
            HUD_COLOR,
            "center",
        );
    }
}

/// The four sprite handles the playfield draws with, pulled by name out of
/// the loaded assets.
struct SpriteBank {
    bird: HtmlImageElement,
    clouds: HtmlImageElement,
    land: HtmlImageElement,
    pipe: HtmlImageElement,
}

impl SpriteBank {
    fn from_assets(assets: &mut Assets) -> Result<Self> {
        Ok(SpriteBank {
            bird: assets.take(sprite_names::BIRD)?,
            clouds: assets.take(sprite_names::CLOUDS)?,
            land: assets.take(sprite_names::LAND)?,
            pipe: assets.take(sprite_names::PIPE)?,
        })
    }
}
