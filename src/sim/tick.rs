//! Per-frame simulation tick
//!
//! Advances a session by one step. Color cycling reads the host's
//! wall-clock timestamp, everything else moves a fixed amount per tick.

use rand::Rng;

use super::collision::resolve_collisions;
use super::state::{GameSession, Thrust};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Thrust applied this tick (tap, or held drag)
    pub thrust: Option<Thrust>,
    /// Manual color cycle direction (+1 / -1)
    pub cycle_color: Option<i8>,
}

/// Advance the session by one tick at wall-clock `now_secs`
pub fn tick(session: &mut GameSession, input: &TickInput, now_secs: f64) {
    if !session.is_playing() {
        return;
    }
    session.time_ticks += 1;
    session.clock_secs = now_secs;

    // Input
    if let Some(thrust) = input.thrust {
        session.ball.apply_thrust(thrust);
    }
    if let Some(direction) = input.cycle_color {
        session.cycle_color(direction);
    }

    session.ball.advance();

    let report = session.field.maintain(session.ball.pos.z, &mut session.rng);
    session.report_maintenance(report);

    for obstacle in session.field.obstacles_mut() {
        obstacle.animate(now_secs, &session.tuning);
    }

    resolve_collisions(session);

    if session.ball.alive {
        update_chaser(session, now_secs);
    }

    debug_assert!(
        session.check_invariants().is_ok(),
        "invariant violated: {:?}",
        session.check_invariants()
    );
}

/// Spawn gate and pursuit
fn update_chaser(session: &mut GameSession, now_secs: f64) {
    let tuning = &session.tuning;
    let available = session.palette.available();
    if tuning.chasers_enabled
        && session
            .field
            .chaser_ready(now_secs, available.len(), tuning.chaser_cooldown_ms)
    {
        let color = available[session.rng.random_range(0..available.len())];
        let offset = tuning.chaser_spawn_offset;
        let id = session
            .field
            .spawn_chaser(session.ball.pos, offset, color, now_secs);
        session.announce_spawn(id);
    }

    let advance = session.tuning.chaser_advance;
    if let Some(chaser) = session.field.chaser_mut() {
        chaser.pos.z -= advance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::obstacle::{Obstacle, ObstacleKind};
    use crate::sim::palette::Color;
    use crate::sim::state::{GameEvent, GamePhase, Outcome};
    use crate::tuning::{ColorAdvance, Tuning};
    use glam::Vec3;

    /// Started session with nothing near the origin
    fn quiet_session() -> GameSession {
        let tuning = Tuning {
            chasers_enabled: false,
            ..Default::default()
        };
        let mut session = GameSession::with_tuning(12345, tuning);
        session.start(0.0);
        session.drain_events();
        session
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_wall_pass_scores() {
        let mut session = quiet_session();
        let id = session.field.insert_with(|id| Obstacle::wall(id, 0.0));
        tick(&mut session, &idle(), 0.0);

        assert!(session.ball.alive);
        assert_eq!(session.score, SCORE_WALL);
        assert_eq!(session.obstacles_passed, 1);
        assert!(session.field.get(id).is_none());
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::ObstacleResolved {
            id,
            kind: ObstacleKind::Wall,
            position: Vec3::ZERO,
            outcome: Outcome::Passed,
        }));
        assert!(events.contains(&GameEvent::ScoreChanged { score: SCORE_WALL }));
    }

    #[test]
    fn test_plate_color_mismatch_destroys_ball() {
        let mut session = quiet_session();
        session.field.insert_with(|id| Obstacle::ground_plate(id, 0.0));
        // Plate shows its second color at t = 2.5s; the ball is still red
        tick(&mut session, &idle(), 2.5);

        assert!(!session.ball.alive);
        assert_eq!(session.phase, GamePhase::GameOver);
        assert_eq!(session.score, 0);
        let events = session.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::BallDestroyed { color: Color::RED, .. })));
        assert_eq!(events.last(), Some(&GameEvent::GameOver { final_score: 0 }));
    }

    #[test]
    fn test_chaser_strips_owned_color() {
        let mut session = quiet_session();
        session.palette.unlock_next(2);
        session
            .field
            .insert_with(|id| Obstacle::chaser(id, Vec3::new(0.0, 0.0, 2.0), Color::GREEN));
        tick(&mut session, &idle(), 0.0);

        assert!(session.ball.alive);
        assert_eq!(session.palette.available(), &[Color::RED]);
        assert_eq!(session.score, SCORE_CHASER);
        // Chaser kills do not count toward unlocks
        assert_eq!(session.obstacles_passed, 0);
        assert!(session.field.chaser().is_none());
        assert!(session.check_invariants().is_ok());
    }

    #[test]
    fn test_chaser_with_missing_color_destroys_ball() {
        let mut session = quiet_session();
        session.palette.unlock_next(2);
        session
            .field
            .insert_with(|id| Obstacle::chaser(id, Vec3::new(0.0, 0.0, 2.0), Color::BLUE));
        tick(&mut session, &idle(), 0.0);

        assert!(!session.ball.alive);
        assert!(session.is_over());
    }

    #[test]
    fn test_second_pass_unlocks_once() {
        let mut session = quiet_session();
        session.field.insert_with(|id| Obstacle::wall(id, 0.0));
        tick(&mut session, &idle(), 0.0);
        assert_eq!(session.palette.available(), &[Color::RED]);

        session.field.insert_with(|id| Obstacle::wall(id, 0.0));
        tick(&mut session, &idle(), 0.0);
        assert_eq!(session.obstacles_passed, 2);
        assert_eq!(session.palette.available(), &[Color::RED, Color::GREEN]);
        // Pass advances the selection onto the new color
        assert_eq!(session.ball.color, Color::GREEN);

        // A redundant unlock at the same count changes nothing
        assert_eq!(session.palette.unlock_next(session.obstacles_passed), None);
        assert_eq!(session.palette.available().len(), 2);
    }

    #[test]
    fn test_manual_advance_keeps_color() {
        let tuning = Tuning {
            chasers_enabled: false,
            color_advance: ColorAdvance::Manual,
            ..Default::default()
        };
        let mut session = GameSession::with_tuning(12345, tuning);
        session.start(0.0);

        for _ in 0..2 {
            session.field.insert_with(|id| Obstacle::wall(id, 0.0));
            tick(&mut session, &idle(), 0.0);
        }
        assert_eq!(session.obstacles_passed, 2);
        assert_eq!(session.palette.available(), &[Color::RED, Color::GREEN]);
        assert_eq!(session.ball.color, Color::RED);
        assert_eq!(session.palette.selected_index(), 0);
    }

    #[test]
    fn test_obstacle_resolves_only_once() {
        let mut session = quiet_session();
        session.field.insert_with(|id| Obstacle::ground_plate(id, 0.0));
        // Ball sits inside the plate footprint for several ticks
        for _ in 0..5 {
            tick(&mut session, &idle(), 0.0);
        }
        assert_eq!(session.score, SCORE_PLATE);
        assert_eq!(session.obstacles_passed, 1);
    }

    #[test]
    fn test_ring_pass_ramps_speed_and_replaces_ring() {
        let mut session = quiet_session();
        let rings_before = session
            .field
            .obstacles()
            .iter()
            .filter(|o| o.kind() == ObstacleKind::Ring)
            .count();
        // Centre (2, 3): the ball at the origin sits at about -124°, which is
        // quadrant 2 at zero rotation; spin the ring so quadrant 0 covers it
        let ring_id = session.field.insert_with(|id| {
            let mut ring = Obstacle::ring(id, 0.0, 0.0);
            ring.shape = crate::sim::ObstacleShape::Ring {
                rotation: std::f32::consts::PI,
                spin: 0.0,
            };
            ring
        });
        tick(&mut session, &idle(), 0.0);
        // Resolved and gone on first contact
        assert!(session.field.get(ring_id).is_none());

        assert!(session.ball.alive);
        assert_eq!(session.score, SCORE_RING);
        assert!((session.ball.max_speed - (BALL_START_MAX_SPEED + BALL_SPEED_RAMP)).abs() < 1e-6);
        let rings_after = session
            .field
            .obstacles()
            .iter()
            .filter(|o| o.kind() == ObstacleKind::Ring)
            .count();
        assert_eq!(rings_after, rings_before + 1);
    }

    #[test]
    fn test_game_over_stops_ticking() {
        let mut session = quiet_session();
        session.field.insert_with(|id| Obstacle::ground_plate(id, 0.0));
        tick(&mut session, &idle(), 2.5);
        assert!(session.is_over());

        let ticks = session.time_ticks;
        let z = session.ball.pos.z;
        let thrust = TickInput {
            thrust: Some(Thrust::Tap),
            ..Default::default()
        };
        tick(&mut session, &thrust, 3.0);
        assert_eq!(session.time_ticks, ticks);
        assert_eq!(session.ball.pos.z, z);
    }

    #[test]
    fn test_ready_session_ignores_ticks() {
        let mut session = GameSession::new(1);
        tick(&mut session, &idle(), 0.0);
        assert_eq!(session.time_ticks, 0);
        assert!(session.field.is_empty());
    }

    #[test]
    fn test_chaser_spawns_behind_after_cooldown() {
        let mut session = GameSession::new(7);
        session.start(0.0);
        session.palette.unlock_next(2);

        // Single color or inside the cooldown: no chaser
        tick(&mut session, &idle(), 9.9);
        assert!(session.field.chaser().is_none());

        tick(&mut session, &idle(), 10.0);
        let chaser = session.field.chaser().expect("chaser spawned");
        let expected_z = CHASER_SPAWN_OFFSET - CHASER_ADVANCE;
        assert!((chaser.pos.z - expected_z).abs() < 1e-5);
        assert!(session.palette.available().contains(&match chaser.shape {
            crate::sim::ObstacleShape::Chaser { color } => color,
            _ => unreachable!(),
        }));

        // Only one at a time
        tick(&mut session, &idle(), 30.0);
        let chasers = session.field.obstacles().iter().filter(|o| o.is_chaser()).count();
        assert_eq!(chasers, 1);
    }

    #[test]
    fn test_outrun_chaser_is_retired() {
        let mut session = GameSession::new(7);
        session.start(0.0);
        session.palette.unlock_next(2);
        tick(&mut session, &idle(), 10.0);
        let chaser_id = session.field.chaser().expect("chaser spawned").id;
        session.drain_events();

        // Ball jumps ahead so the chaser ends up more than 30 units behind
        session.ball.pos.z = -15.0;
        tick(&mut session, &idle(), 11.0);

        assert!(session.field.chaser().is_none());
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::ObstacleRetired { id: chaser_id }));
        assert!(!events.iter().any(|e| matches!(
            e,
            GameEvent::ObstacleResolved { id, .. } if *id == chaser_id
        )));

        // Cooldown restarted at the retirement tick
        assert!(!session.field.chaser_ready(20.9, 2, CHASER_COOLDOWN_MS));
        assert!(session.field.chaser_ready(21.0, 2, CHASER_COOLDOWN_MS));
        tick(&mut session, &idle(), 20.9);
        assert!(session.field.chaser().is_none());
        tick(&mut session, &idle(), 21.0);
        assert!(session.field.chaser().is_some());
    }

    #[test]
    fn test_idle_ball_is_caught_by_chaser() {
        let mut session = GameSession::new(7);
        session.start(0.0);
        session.palette.unlock_next(2);

        let mut now = 10.0;
        tick(&mut session, &idle(), now);
        assert!(session.field.chaser().is_some());
        // Closing 17.5 units at 0.1 per tick
        for _ in 0..200 {
            now += SIM_DT;
            tick(&mut session, &idle(), now);
        }
        assert!(session.ball.alive);
        assert!(session.field.chaser().is_none());
        assert_eq!(session.palette.available().len(), 1);
        assert_eq!(session.score, SCORE_CHASER);
    }

    #[test]
    fn test_manual_cycle_input() {
        let mut session = quiet_session();
        session.palette.unlock_next(2);
        let input = TickInput {
            cycle_color: Some(1),
            ..Default::default()
        };
        tick(&mut session, &input, 0.0);
        assert_eq!(session.ball.color, Color::GREEN);
    }

    #[test]
    fn test_thrust_moves_ball_forward() {
        let mut session = quiet_session();
        let input = TickInput {
            thrust: Some(Thrust::Tap),
            ..Default::default()
        };
        tick(&mut session, &input, 0.0);
        assert!((session.ball.pos.z + THRUST_TAP).abs() < 1e-6);
        assert!(session.ball.speed > 0.0);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameSession::new(99999);
        let mut b = GameSession::new(99999);
        a.start(0.0);
        b.start(0.0);

        let inputs = [
            TickInput {
                thrust: Some(Thrust::Hold),
                ..Default::default()
            },
            TickInput {
                thrust: Some(Thrust::Tap),
                cycle_color: Some(1),
            },
            TickInput::default(),
        ];
        for step in 0..600 {
            let input = &inputs[step % inputs.len()];
            let now = step as f64 * SIM_DT;
            tick(&mut a, input, now);
            tick(&mut b, input, now);
        }

        assert_eq!(a.summary(), b.summary());
        assert_eq!(a.drain_events(), b.drain_events());
        assert_eq!(a.field.obstacles(), b.field.obstacles());
    }
}
