//! The controlled character: gravity, jump impulses, tilt, the wing-flap
//! cycle, and the collision/bounds tests against the obstacle stream.

use crate::engine::Size;
use crate::world::obstacles::{Obstacle, OBSTACLE_WIDTH};

pub const WIDTH: f64 = 44.0;
pub const HEIGHT: f64 = 37.0;
pub const FRAME_COUNT: u8 = 4;

const GRAVITY: f64 = 0.15;
const JUMP_IMPULSE: f64 = 3.0;
const ANGLE_DEFAULT: f64 = -25.0;
const ANGLE_MIN: f64 = -45.0;
const ANGLE_MAX: f64 = 30.0;
const ANGLE_JUMP_KICK: f64 = 20.0;
const ANGLE_FALL_DRIFT: f64 = 0.5;
/// Forgiveness subtracted from the actor's height on the lower collision
/// bound only. Intentionally one-sided; the upper bound stays strict.
const COLLISION_SLACK: f64 = 10.0;
const FLAP_FRAME_MS: f64 = 1000.0 / 24.0;

#[derive(Debug)]
pub struct Actor {
    pub x: f64,
    pub y: f64,
    /// Vertical velocity; positive is downward.
    pub velocity: f64,
    /// Visual tilt in degrees, always clamped to [ANGLE_MIN, ANGLE_MAX].
    pub angle: f64,
    flap: FlapCycle,
}

impl Actor {
    pub fn new(screen: Size) -> Self {
        let mut actor = Actor {
            x: 0.0,
            y: 0.0,
            velocity: 0.0,
            angle: ANGLE_DEFAULT,
            flap: FlapCycle::default(),
        };
        actor.reset(screen);
        actor
    }

    /// Back to the canonical spawn pose. Driven by the session on restart;
    /// the actor never resets itself.
    pub fn reset(&mut self, screen: Size) {
        self.x = (screen.width / 5.0).floor();
        self.y = (screen.height / 2.0 - HEIGHT).floor();
        self.velocity = 0.0;
        self.angle = ANGLE_DEFAULT;
        self.flap = FlapCycle::default();
    }

    /// One physics step: gravity into velocity, velocity into position, the
    /// passive nose-down drift into the tilt, and the flap clock.
    pub fn advance(&mut self, dt_ms: f64) {
        self.velocity += GRAVITY;
        self.y += self.velocity;
        self.angle += ANGLE_FALL_DRIFT;
        self.clamp_angle();
        self.flap.advance(dt_ms);
    }

    /// Upward impulse. A falling actor is reset to one impulse; a rising one
    /// stacks another impulse on top, so a double-tap climbs harder.
    pub fn jump(&mut self) {
        if self.velocity > 0.0 {
            self.velocity = -JUMP_IMPULSE;
        } else {
            self.velocity -= JUMP_IMPULSE;
        }
        self.angle -= ANGLE_JUMP_KICK;
        self.clamp_angle();
        self.flap.trigger();
    }

    /// Bounding-box-vs-gap test against one obstacle, using the projected
    /// vertical position (`y + velocity`) and the one-sided lower slack.
    pub fn overlaps(&self, obstacle: &Obstacle) -> bool {
        let projected = self.y + self.velocity;

        obstacle.x < self.x + WIDTH
            && obstacle.x + OBSTACLE_WIDTH > self.x
            && (obstacle.gap_top > projected
                || obstacle.gap_bottom() < projected + (HEIGHT - COLLISION_SLACK))
    }

    /// Fails at or beyond the floor, or once the actor is fully above the
    /// visible area.
    pub fn out_of_bounds(&self, screen_height: f64) -> bool {
        self.y >= screen_height || self.y + HEIGHT < 0.0
    }

    /// Current wing-flap frame, always in `[0, FRAME_COUNT)`.
    pub fn frame(&self) -> u8 {
        self.flap.frame
    }

    fn clamp_angle(&mut self) {
        self.angle = self.angle.clamp(ANGLE_MIN, ANGLE_MAX);
    }
}

/// One-shot wing-flap animation. A trigger arms the cycle only from the rest
/// frame; each elapsed interval advances one frame and a completed cycle
/// disarms back to rest, so re-triggers mid-cycle are no-ops. Driven from the
/// frame tick instead of a wall-clock timer.
#[derive(Debug, Default)]
struct FlapCycle {
    frame: u8,
    elapsed_ms: f64,
    armed: bool,
}

impl FlapCycle {
    fn trigger(&mut self) {
        if self.armed || self.frame != 0 {
            return;
        }
        self.armed = true;
        self.elapsed_ms = 0.0;
    }

    fn advance(&mut self, dt_ms: f64) {
        if !self.armed {
            return;
        }
        self.elapsed_ms += dt_ms;
        while self.elapsed_ms >= FLAP_FRAME_MS {
            self.elapsed_ms -= FLAP_FRAME_MS;
            self.frame += 1;
            if self.frame >= FRAME_COUNT {
                self.frame = 0;
                self.armed = false;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SCREEN: Size = Size {
        width: 640.0,
        height: 360.0,
    };

    fn actor() -> Actor {
        Actor::new(SCREEN)
    }

    #[test]
    fn spawns_at_the_canonical_pose() {
        let actor = actor();
        assert_eq!(actor.x, 128.0);
        assert_eq!(actor.y, 143.0);
        assert_eq!(actor.velocity, 0.0);
        assert_eq!(actor.angle, ANGLE_DEFAULT);
        assert_eq!(actor.frame(), 0);
    }

    #[test]
    fn gravity_accumulates_every_step() {
        let mut actor = actor();
        let mut previous = actor.velocity;
        for _ in 0..10 {
            actor.advance(FLAP_FRAME_MS);
            assert_relative_eq!(actor.velocity, previous + GRAVITY);
            previous = actor.velocity;
        }
        assert_relative_eq!(actor.velocity, 10.0 * GRAVITY, epsilon = 1e-12);
    }

    #[test]
    fn jump_while_falling_resets_to_one_impulse() {
        let mut actor = actor();
        actor.velocity = 2.0;
        actor.jump();
        assert_eq!(actor.velocity, -JUMP_IMPULSE);
    }

    #[test]
    fn jump_while_rising_stacks_impulses() {
        let mut actor = actor();
        actor.velocity = -1.0;
        actor.jump();
        assert_eq!(actor.velocity, -4.0);

        // either branch ends at least one impulse upward
        assert!(actor.velocity <= -JUMP_IMPULSE);
    }

    #[test]
    fn tilt_never_leaves_its_bounds() {
        let mut actor = actor();
        for _ in 0..50 {
            actor.jump();
            assert!((ANGLE_MIN..=ANGLE_MAX).contains(&actor.angle));
        }
        assert_eq!(actor.angle, ANGLE_MIN);

        for _ in 0..500 {
            actor.advance(FLAP_FRAME_MS);
            assert!((ANGLE_MIN..=ANGLE_MAX).contains(&actor.angle));
        }
        assert_eq!(actor.angle, ANGLE_MAX);
    }

    #[test]
    fn flap_cycle_runs_once_and_rests() {
        let mut actor = actor();
        actor.jump();
        assert_eq!(actor.frame(), 0);

        actor.advance(FLAP_FRAME_MS);
        assert_eq!(actor.frame(), 1);

        // re-triggering mid-cycle changes nothing
        actor.jump();
        actor.advance(FLAP_FRAME_MS);
        assert_eq!(actor.frame(), 2);
        actor.advance(FLAP_FRAME_MS);
        assert_eq!(actor.frame(), 3);

        actor.advance(FLAP_FRAME_MS);
        assert_eq!(actor.frame(), 0);

        // the cycle is re-armable once it has completed
        actor.jump();
        actor.advance(FLAP_FRAME_MS);
        assert_eq!(actor.frame(), 1);
    }

    #[test]
    fn a_large_step_cannot_wrap_the_cycle_twice() {
        let mut actor = actor();
        actor.jump();
        actor.advance(FLAP_FRAME_MS * 40.0);
        assert_eq!(actor.frame(), 0);
    }

    #[test]
    fn no_collision_without_horizontal_overlap() {
        let actor = actor();
        let obstacle = Obstacle::new(0.0, 100.0, 148.0);
        assert!(!actor.overlaps(&obstacle));
    }

    #[test]
    fn gap_above_the_actor_collides() {
        let actor = actor();
        let obstacle = Obstacle::new(100.0, 200.0, 111.0);
        assert!(actor.overlaps(&obstacle));
    }

    #[test]
    fn gap_below_the_actor_collides() {
        let actor = actor();
        let obstacle = Obstacle::new(100.0, 50.0, 60.0);
        assert!(actor.overlaps(&obstacle));
    }

    #[test]
    fn lower_bound_slack_forgives_a_shallow_poke() {
        let actor = actor();
        // gap spans 140..170; the actor's true bottom is 180, ten units past
        // the gap, which is exactly what the slack allows
        let obstacle = Obstacle::new(100.0, 140.0, 30.0);
        assert!(!actor.overlaps(&obstacle));
    }

    #[test]
    fn collision_uses_the_projected_position() {
        let mut actor = actor();
        actor.velocity = 5.0;
        // static y would clear the 140..170 gap, but the projection does not
        let obstacle = Obstacle::new(100.0, 140.0, 30.0);
        assert!(actor.overlaps(&obstacle));
    }

    #[test]
    fn falling_past_the_floor_is_out_of_bounds() {
        let mut actor = actor();
        actor.y = 358.0;
        actor.velocity = 2.0;
        assert!(!actor.out_of_bounds(SCREEN.height));

        actor.advance(FLAP_FRAME_MS);
        assert!(actor.out_of_bounds(SCREEN.height));
    }

    #[test]
    fn fully_above_the_screen_is_out_of_bounds() {
        let mut actor = actor();
        actor.y = -HEIGHT - 0.5;
        assert!(actor.out_of_bounds(SCREEN.height));

        actor.y = -HEIGHT + 1.0;
        assert!(!actor.out_of_bounds(SCREEN.height));
    }

    #[test]
    fn reset_restores_the_spawn_pose() {
        let mut actor = actor();
        actor.jump();
        for _ in 0..30 {
            actor.advance(FLAP_FRAME_MS);
        }

        actor.reset(SCREEN);
        assert_eq!(actor.x, 128.0);
        assert_eq!(actor.y, 143.0);
        assert_eq!(actor.velocity, 0.0);
        assert_eq!(actor.angle, ANGLE_DEFAULT);
        assert_eq!(actor.frame(), 0);
    }
}
