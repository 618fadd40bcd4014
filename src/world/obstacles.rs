//! Obstacle pairs and their spawn/scroll/retire lifecycle.

use crate::engine::Size;
use crate::world::actor;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

pub const OBSTACLE_WIDTH: f64 = 80.0;
/// Height of the obstacle texture; the spawn draw keeps the gap inside it.
pub const OBSTACLE_HEIGHT: f64 = 304.0;

const SCROLL_SPEED: f64 = 1.0;
const SPAWN_DISTANCE_MIN: f64 = 270.0;
const SPAWN_DISTANCE_MAX: f64 = 350.0;
const GAP_TOP_MARGIN: f64 = 50.0;
const GAP_MIN_FACTOR: f64 = 3.0;
const GAP_MAX_FACTOR: f64 = 4.0;

/// One top/bottom barrier pair sharing a vertical gap.
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    /// Leading (left) edge; decreases every tick.
    pub x: f64,
    /// Top edge of the passable gap.
    pub gap_top: f64,
    /// Vertical size of the passable gap.
    pub gap: f64,
    passed: bool,
}

impl Obstacle {
    pub fn new(x: f64, gap_top: f64, gap: f64) -> Self {
        Obstacle {
            x,
            gap_top,
            gap,
            passed: false,
        }
    }

    pub fn trailing_edge(&self) -> f64 {
        self.x + OBSTACLE_WIDTH
    }

    pub fn gap_bottom(&self) -> f64 {
        self.gap_top + self.gap
    }

    pub fn is_passed(&self) -> bool {
        self.passed
    }
}

/// The ordered stream of obstacles, oldest (leftmost) first.
#[derive(Debug)]
pub struct ObstacleField {
    obstacles: VecDeque<Obstacle>,
    rng: SmallRng,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    fn with_rng(rng: SmallRng) -> Self {
        ObstacleField {
            obstacles: VecDeque::new(),
            rng,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_obstacles(obstacles: Vec<Obstacle>) -> Self {
        let mut field = Self::with_rng(SmallRng::seed_from_u64(0));
        field.obstacles.extend(obstacles);
        field
    }

    /// Append a fresh obstacle just past the right edge of the screen, with
    /// the gap sized against the actor and kept inside the texture bounds.
    pub fn spawn(&mut self, screen: Size) {
        let x = self.random_between(screen.width, screen.width + OBSTACLE_WIDTH);
        let gap = self.random_between(
            GAP_MIN_FACTOR * actor::HEIGHT,
            GAP_MAX_FACTOR * actor::HEIGHT,
        );
        let gap_top = self.random_between(GAP_TOP_MARGIN, OBSTACLE_HEIGHT - gap);
        self.obstacles.push_back(Obstacle::new(x, gap_top, gap));
    }

    /// Scroll everything left, spawn when the rightmost obstacle has cleared
    /// a freshly drawn distance, and retire the front obstacle once it is
    /// fully off-screen.
    pub fn tick(&mut self, screen: Size) {
        let mut farthest: f64 = 0.0;
        for obstacle in self.obstacles.iter_mut() {
            obstacle.x -= SCROLL_SPEED;
            farthest = farthest.max(obstacle.x);
        }

        let clearance = self.random_between(SPAWN_DISTANCE_MIN, SPAWN_DISTANCE_MAX);
        if screen.width - farthest + OBSTACLE_WIDTH > clearance {
            self.spawn(screen);
        }

        if let Some(front) = self.obstacles.front() {
            if front.trailing_edge() < 0.0 {
                self.obstacles.pop_front();
            }
        }
    }

    /// Flag every unpassed obstacle whose trailing edge is left of
    /// `leading_edge`; returns how many were newly flagged. Flagging is
    /// one-way, so an obstacle can score at most once.
    pub fn collect_passed(&mut self, leading_edge: f64) -> u32 {
        let mut newly_passed = 0;
        for obstacle in self.obstacles.iter_mut() {
            if !obstacle.passed && obstacle.trailing_edge() < leading_edge {
                obstacle.passed = true;
                newly_passed += 1;
            }
        }
        newly_passed
    }

    pub fn is_passed(&self, index: usize) -> bool {
        self.obstacles
            .get(index)
            .map(|obstacle| obstacle.passed)
            .unwrap_or(false)
    }

    pub fn mark_passed(&mut self, index: usize) {
        if let Some(obstacle) = self.obstacles.get_mut(index) {
            obstacle.passed = true;
        }
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Uniform draw over `[min, max]`, floored to a whole number. A
    /// degenerate range clamps to `min` instead of panicking.
    fn random_between(&mut self, min: f64, max: f64) -> f64 {
        if max < min {
            return min.floor();
        }
        self.rng.gen_range(min..max + 1.0).floor()
    }
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self::new()
    }
}
