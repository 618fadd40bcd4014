//! Parallax backdrop: two tiled strips scrolling at their own rates. Purely
//! cosmetic; nothing here feeds back into gameplay.

use std::collections::VecDeque;

const CLOUD_DRIFT: f64 = -0.25;
const GROUND_DRIFT: f64 = -0.5;

#[derive(Debug, Clone, Copy)]
pub struct Tile {
    pub x: f64,
    pub dx: f64,
}

/// A horizontally wrapping strip of identical tiles. Holds
/// `ceil(visible / tile_width) + 1` tiles so the strip covers the visible
/// width at every scroll offset.
#[derive(Debug)]
pub struct ScrollLayer {
    tiles: VecDeque<Tile>,
    tile_width: f64,
}

impl ScrollLayer {
    pub fn new(tile_width: f64, drift: f64, visible_width: f64) -> Self {
        let tile_width = tile_width.max(1.0);
        let count = (visible_width / tile_width).ceil() as usize + 1;
        let tiles = (0..count)
            .map(|i| Tile {
                x: i as f64 * tile_width,
                dx: drift,
            })
            .collect();
        ScrollLayer { tiles, tile_width }
    }

    /// Shift every tile by its own delta; once the last tile crosses the left
    /// edge, recycle: append a tile right after it and drop the leftmost.
    pub fn tick(&mut self) {
        for tile in self.tiles.iter_mut() {
            tile.x += tile.dx;
        }

        if let Some(last) = self.tiles.back().copied() {
            if last.x < 0.0 {
                self.tiles.push_back(Tile {
                    x: last.x + self.tile_width,
                    dx: last.dx,
                });
                self.tiles.pop_front();
            }
        }
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// The two scroll layers plus the shared moving flag the session toggles.
#[derive(Debug)]
pub struct Backdrop {
    clouds: ScrollLayer,
    ground: ScrollLayer,
    moving: bool,
}

impl Backdrop {
    pub fn new(visible_width: f64, cloud_tile_width: f64, ground_tile_width: f64) -> Self {
        Backdrop {
            clouds: ScrollLayer::new(cloud_tile_width, CLOUD_DRIFT, visible_width),
            ground: ScrollLayer::new(ground_tile_width, GROUND_DRIFT, visible_width),
            moving: false,
        }
    }

    pub fn start(&mut self) {
        self.moving = true;
    }

    pub fn stop(&mut self) {
        self.moving = false;
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn tick(&mut self) {
        if self.moving {
            self.clouds.tick();
            self.ground.tick();
        }
    }

    pub fn clouds(&self) -> &ScrollLayer {
        &self.clouds
    }

    pub fn ground(&self) -> &ScrollLayer {
        &self.ground
    }
}
