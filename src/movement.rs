//! Grid-constrained movement: velocity integration, pending-turn arbitration
//! at tile centers, wall clamping, and teleport relocation.
//!
//! [`Mover`] is the common "grid-constrained moving body" shared by the
//! player and the pursuers; the two specializations layer their decision
//! logic on top of it rather than inheriting from it.

use bevy_ecs::component::Component;
use bevy_ecs::query::With;
use bevy_ecs::system::{Query, Res};
use glam::Vec2;
use tracing::trace;

use crate::constants::{MOVER_BODY, TILE_SIZE, TURN_TOLERANCE};
use crate::direction::Direction;
use crate::grid::{cell_center, cell_of, TileSense};
use crate::level::Level;
use crate::session::{DeltaTime, RunState};

/// Continuous world position (center of the collision body), in pixels.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

/// Velocity in pixels per second. Wall contact zeroes the blocked axis.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity(pub Vec2);

/// The shared moving-body state: current travel axis, a buffered turn held
/// until the tile center, the speed pair, and respawn bookkeeping.
#[derive(Component, Debug, Clone)]
pub struct Mover {
    pub current: Option<Direction>,
    pub pending: Option<Direction>,
    turn_point: Vec2,
    base_speed: f32,
    speed: f32,
    pub alive: bool,
    pub respawn_point: Vec2,
}

impl Mover {
    pub fn new(respawn_point: Vec2, base_speed: f32) -> Self {
        Self {
            current: None,
            pending: None,
            turn_point: Vec2::ZERO,
            base_speed,
            speed: base_speed,
            alive: true,
            respawn_point,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    /// Temporarily rescales speed. Takes effect on the next `begin_move`, not
    /// retroactively on an already-set velocity.
    pub fn set_speed(&mut self, value: f32) {
        self.speed = value;
    }

    pub fn restore_speed(&mut self) {
        self.speed = self.base_speed;
    }

    /// Starts moving along `direction`. Does not self-validate against walls;
    /// wall contact is resolved by the integration clamp.
    pub fn begin_move(&mut self, velocity: &mut Velocity, direction: Direction) {
        let signed = match direction {
            Direction::Left | Direction::Up => -self.speed,
            Direction::Right | Direction::Down => self.speed,
        };
        velocity.0 = if direction.is_horizontal() {
            Vec2::new(signed, 0.0)
        } else {
            Vec2::new(0.0, signed)
        };
        self.current = Some(direction);
    }

    /// Buffers a turn toward `direction`. No-op when already buffered or when
    /// the neighbor cell that way is blocked. An exact reversal commits
    /// immediately: the entity already occupies that lane.
    pub fn request_turn(&mut self, velocity: &mut Velocity, sense: &TileSense, direction: Direction) {
        if self.pending == Some(direction) || !sense.is_open(direction) {
            return;
        }

        if self.current == Some(direction.opposite()) {
            self.begin_move(velocity, direction);
        } else {
            self.pending = Some(direction);
            self.turn_point = cell_center(sense.marker);
        }
    }

    /// Commits the buffered turn if the body is within the tolerance band of
    /// the turn point, snapping exactly onto the tile center. Returns whether
    /// a commit occurred.
    pub fn try_commit_turn(&mut self, position: &mut Position, velocity: &mut Velocity) -> bool {
        let Some(direction) = self.pending else {
            return false;
        };

        if (position.0.x - self.turn_point.x).abs() > TURN_TOLERANCE
            || (position.0.y - self.turn_point.y).abs() > TURN_TOLERANCE
        {
            return false;
        }

        position.0 = self.turn_point;
        self.begin_move(velocity, direction);
        self.pending = None;
        true
    }

    pub fn stop(&mut self, velocity: &mut Velocity) {
        velocity.0 = Vec2::ZERO;
        self.current = None;
        self.pending = None;
    }

    /// Marks the body dead. Position is untouched; respawn sequencing is
    /// layered by the player/pursuer specializations.
    pub fn die(&mut self) {
        self.alive = false;
    }

    pub fn respawn(&mut self, position: &mut Position, velocity: &mut Velocity) {
        self.stop(velocity);
        position.0 = self.respawn_point;
        self.alive = true;
    }

    /// Relocates through a portal pair: half a tile outward from the exit
    /// endpoint on each differing axis, plus a push of the endpoint's full
    /// extent along the travel direction to clear its collision footprint,
    /// then motion resumes immediately.
    pub fn teleport(&mut self, position: &mut Position, velocity: &mut Velocity, from: Vec2, to: Vec2, size: Vec2) {
        let mut destination = to;

        if from.x > to.x {
            destination.x += TILE_SIZE / 2.0;
        } else if from.x < to.x {
            destination.x -= TILE_SIZE / 2.0;
        }
        if from.y > to.y {
            destination.y += TILE_SIZE / 2.0;
        } else if from.y < to.y {
            destination.y -= TILE_SIZE / 2.0;
        }

        match self.current {
            Some(Direction::Left) => destination.x -= size.x,
            Some(Direction::Right) => destination.x += size.x,
            Some(Direction::Up) => destination.y -= size.y,
            Some(Direction::Down) => destination.y += size.y,
            None => {}
        }

        trace!(from = ?from, to = ?destination, "Teleport");
        position.0 = destination;
        if let Some(direction) = self.current {
            self.begin_move(velocity, direction);
        }
    }
}

/// Axis-aligned overlap test between two centered boxes.
pub fn aabb_overlap(a: Vec2, a_size: Vec2, b: Vec2, b_size: Vec2) -> bool {
    (a.x - b.x).abs() * 2.0 < a_size.x + b_size.x && (a.y - b.y).abs() * 2.0 < a_size.y + b_size.y
}

/// Recomputes every mover's grid marker and neighbor openness from the level.
pub fn sense_system(run_state: Res<RunState>, level: Res<Level>, mut movers: Query<(&Position, &mut TileSense)>) {
    if !run_state.active {
        return;
    }
    for (position, mut sense) in movers.iter_mut() {
        sense.refresh(position.0, &level);
    }
}

/// Integrates velocity and resolves wall contact: a body moving toward a
/// blocked neighbor cell is clamped at its tile center and the velocity on
/// that axis is zeroed.
pub fn integration_system(
    run_state: Res<RunState>,
    delta_time: Res<DeltaTime>,
    level: Res<Level>,
    mut movers: Query<(&mut Position, &mut Velocity), With<Mover>>,
) {
    if !run_state.active {
        return;
    }

    for (mut position, mut velocity) in movers.iter_mut() {
        if velocity.0 == Vec2::ZERO {
            continue;
        }

        let cell = cell_of(position.0);
        let center = cell_center(cell);
        let mut next = position.0 + velocity.0 * delta_time.0;

        if velocity.0.x < 0.0 && level.is_blocked(cell + Direction::Left.offset()) && next.x < center.x {
            next.x = center.x;
            velocity.0.x = 0.0;
        }
        if velocity.0.x > 0.0 && level.is_blocked(cell + Direction::Right.offset()) && next.x > center.x {
            next.x = center.x;
            velocity.0.x = 0.0;
        }
        if velocity.0.y < 0.0 && level.is_blocked(cell + Direction::Up.offset()) && next.y < center.y {
            next.y = center.y;
            velocity.0.y = 0.0;
        }
        if velocity.0.y > 0.0 && level.is_blocked(cell + Direction::Down.offset()) && next.y > center.y {
            next.y = center.y;
            velocity.0.y = 0.0;
        }

        position.0 = next;
    }
}

/// Relocates any mover overlapping a teleport endpoint.
pub fn portal_system(
    run_state: Res<RunState>,
    level: Res<Level>,
    mut movers: Query<(&mut Position, &mut Velocity, &mut Mover)>,
) {
    if !run_state.active {
        return;
    }

    for (mut position, mut velocity, mut mover) in movers.iter_mut() {
        for portal in &level.portals {
            if aabb_overlap(position.0, Vec2::splat(MOVER_BODY), portal.center, portal.size) {
                mover.teleport(&mut position, &mut velocity, portal.center, portal.exit_center, portal.size);
                break;
            }
        }
    }
}
