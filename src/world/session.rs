//! One play session: owns the actor, the obstacle stream and the backdrop,
//! interprets the single activate command, and runs the per-frame order
//! (backdrop, actor, collision, scoring, obstacles) while running.

use crate::engine::Size;
use crate::world::actor::Actor;
use crate::world::background::Backdrop;
use crate::world::obstacles::ObstacleField;

/// A failed run simply drops back to `Idle`; the idle overlay doubles as the
/// game-over screen, with the last score still on the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
}

#[derive(Debug)]
pub struct Session {
    screen: Size,
    actor: Actor,
    obstacles: ObstacleField,
    backdrop: Backdrop,
    score: u32,
    phase: Phase,
}

impl Session {
    pub fn new(screen: Size, cloud_tile_width: f64, ground_tile_width: f64) -> Self {
        let mut session = Session {
            screen,
            actor: Actor::new(screen),
            obstacles: ObstacleField::new(),
            backdrop: Backdrop::new(screen.width, cloud_tile_width, ground_tile_width),
            score: 0,
            phase: Phase::Idle,
        };
        // seed one obstacle so the idle frame already shows the playfield
        session.obstacles.spawn(screen);
        session
    }

    /// The single logical input: starts a run while idle, flaps while
    /// running.
    pub fn activate(&mut self) {
        match self.phase {
            Phase::Idle => self.restart(),
            Phase::Running => self.actor.jump(),
        }
    }

    /// One fixed update step. Idle sessions do not advance at all.
    pub fn tick(&mut self, dt_ms: f64) {
        if self.phase != Phase::Running {
            return;
        }

        self.backdrop.tick();
        self.actor.advance(dt_ms);

        let actor = &self.actor;
        let crashed = actor.out_of_bounds(self.screen.height)
            || self.obstacles.iter().any(|obstacle| actor.overlaps(obstacle));
        if crashed {
            self.fail();
            return;
        }

        self.score += self.obstacles.collect_passed(self.actor.x);
        self.obstacles.tick(self.screen);
    }

    fn restart(&mut self) {
        self.score = 0;
        self.actor.reset(self.screen);
        self.obstacles.clear();
        self.obstacles.spawn(self.screen);
        self.backdrop.start();
        self.phase = Phase::Running;
    }

    fn fail(&mut self) {
        self.backdrop.stop();
        self.phase = Phase::Idle;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FRAME_SIZE;
    use crate::world::obstacles::Obstacle;

    const SCREEN: Size = Size {
        width: 640.0,
        height: 360.0,
    };

    fn session() -> Session {
        Session::new(SCREEN, 640.0, 640.0)
    }

    /// An obstacle whose gap swallows the whole screen, so it can never be
    /// collided with.
    fn harmless(x: f64) -> Obstacle {
        Obstacle::new(x, 0.0, 360.0)
    }

    #[test]
    fn a_fresh_session_idles_with_one_seeded_obstacle() {
        let session = session();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.score(), 0);
        assert_eq!(session.obstacles().len(), 1);
        assert!(!session.backdrop().is_moving());
    }

    #[test]
    fn idle_ticks_advance_nothing() {
        let mut session = session();
        let y = session.actor().y;
        for _ in 0..100 {
            session.tick(FRAME_SIZE);
        }
        assert_eq!(session.actor().y, y);
        assert_eq!(session.score(), 0);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn activating_while_idle_starts_a_run() {
        let mut session = session();
        session.activate();
        assert_eq!(session.phase(), Phase::Running);
        assert!(session.backdrop().is_moving());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn activating_while_running_is_a_jump_not_a_restart() {
        let mut session = session();
        session.activate();
        session.score = 5;

        session.activate();
        assert_eq!(session.phase(), Phase::Running);
        assert_eq!(session.score(), 5);
        assert_eq!(session.actor().velocity, -3.0);
    }

    #[test]
    fn each_obstacle_scores_exactly_once() {
        let mut session = session();
        session.activate();
        // trailing edge 120 is already left of the actor's leading edge 128
        session.obstacles = ObstacleField::with_obstacles(vec![harmless(40.0)]);

        session.tick(FRAME_SIZE);
        assert_eq!(session.score(), 1);

        session.tick(FRAME_SIZE);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn a_run_ends_at_the_floor_and_freezes_the_backdrop() {
        let mut session = session();
        session.activate();
        session.obstacles = ObstacleField::with_obstacles(vec![harmless(300.0)]);
        session.actor.y = 358.0;
        session.actor.velocity = 2.0;

        session.tick(FRAME_SIZE);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.backdrop().is_moving());

        // frozen: further ticks no longer move anything
        let ground: Vec<f64> = session.backdrop().ground().tiles().map(|t| t.x).collect();
        session.tick(FRAME_SIZE);
        let still: Vec<f64> = session.backdrop().ground().tiles().map(|t| t.x).collect();
        assert_eq!(ground, still);
    }

    #[test]
    fn a_collision_ends_the_run() {
        let mut session = session();
        session.activate();
        // overlapping the actor column with the gap far below it
        session.obstacles = ObstacleField::with_obstacles(vec![Obstacle::new(120.0, 300.0, 50.0)]);

        session.tick(FRAME_SIZE);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn gravity_pulls_an_unattended_run_to_the_ground() {
        let mut session = session();
        session.activate();
        session.obstacles = ObstacleField::with_obstacles(vec![harmless(600.0)]);

        let mut ticks = 0;
        while session.is_running() {
            session.tick(FRAME_SIZE);
            ticks += 1;
            assert!(ticks < 10_000, "run never ended");
        }
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn restarting_resets_score_actor_and_obstacles() {
        let mut session = session();
        session.activate();
        session.obstacles = ObstacleField::with_obstacles(vec![harmless(40.0), harmless(500.0)]);
        session.tick(FRAME_SIZE);
        assert_eq!(session.score(), 1);

        // crash out, then start a new run
        session.actor.y = 360.0;
        session.tick(FRAME_SIZE);
        assert_eq!(session.phase(), Phase::Idle);

        session.activate();
        assert_eq!(session.score(), 0);
        assert_eq!(session.actor().y, 143.0);
        assert_eq!(session.actor().velocity, 0.0);
        assert_eq!(session.obstacles().len(), 1);
        assert!(session.obstacles().iter().all(|o| !o.is_passed()));
        assert_eq!(session.phase(), Phase::Running);
    }
}
