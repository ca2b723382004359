//! Collectible pickups, bonus fruit, and what happens when the player and a
//! pursuer occupy the same spot.

use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;
use bevy_ecs::event::{EventReader, EventWriter};
use bevy_ecs::query::Without;
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Commands, Query, Res, ResMut};
use glam::Vec2;
use rand::seq::IndexedRandom;
use smallvec::SmallVec;
use strum_macros::{Display, EnumIter};
use tracing::{debug, info};

use crate::constants::{
    BONUS_WINDOW_MS, COLLECTIBLE_BODY, GHOST_SCORE, MOVER_BODY, PELLET_SCORE, PILL_SCORE,
    PLAYER_DEATH_MS,
};
use crate::events::{AudioEvent, UiEvent};
use crate::ghost::{GhostBrain, GhostMode};
use crate::grid::TileSense;
use crate::movement::{aabb_overlap, Mover, Position, Velocity};
use crate::player::Player;
use crate::scheduler::{TickScheduler, TimerAction, TimerFired, TimerHandle};
use crate::session::{Difficulty, RunOutcome, RunState, FINAL_LEVEL};

/// Anything the player can pick up by walking over it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collectible {
    Pellet,
    Pill,
    Bonus(BonusKind),
}

/// Bonus fruit, in spawn order. Each appears once per level after enough
/// pellets are eaten and multiplies all scoring for a short window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum BonusKind {
    Cherry,
    Strawberry,
    Apple,
}

impl BonusKind {
    pub fn multiplier(self) -> u32 {
        match self {
            BonusKind::Cherry => 2,
            BonusKind::Strawberry => 3,
            BonusKind::Apple => 4,
        }
    }

    /// Pellets eaten before this fruit appears.
    pub fn threshold(self) -> u32 {
        match self {
            BonusKind::Cherry => 60,
            BonusKind::Strawberry => 120,
            BonusKind::Apple => 150,
        }
    }

    fn by_rank(rank: usize) -> Option<BonusKind> {
        match rank {
            0 => Some(BonusKind::Cherry),
            1 => Some(BonusKind::Strawberry),
            2 => Some(BonusKind::Apple),
            _ => None,
        }
    }
}

/// Board-clearing progress. `remaining` counts pellets and pills only; bonus
/// fruit never blocks level completion.
#[derive(Resource, Debug, Default)]
pub struct CollectibleLedger {
    pub remaining: u32,
    pub eaten_pellets: u32,
    next_bonus: usize,
    bonus_timer: Option<TimerHandle>,
}

impl CollectibleLedger {
    pub fn new(remaining: u32) -> Self {
        Self {
            remaining,
            ..Default::default()
        }
    }
}

/// Pickup detection and scoring. Pills also flip every in-play pursuer to
/// frightened and start (or extend) the player's power window.
pub fn collect_system(
    mut commands: Commands,
    mut run_state: ResMut<RunState>,
    difficulty: Res<Difficulty>,
    mut ledger: ResMut<CollectibleLedger>,
    mut scheduler: ResMut<TickScheduler>,
    mut audio: EventWriter<AudioEvent>,
    mut ui: EventWriter<UiEvent>,
    mut players: Query<(&mut Player, &Position, &Mover), Without<GhostBrain>>,
    collectibles: Query<(Entity, &Position, &Collectible)>,
    mut ghosts: Query<(&mut GhostBrain, &mut Mover, &mut Velocity, &TileSense), Without<Player>>,
) {
    if !run_state.active {
        return;
    }
    let Ok((mut player, player_position, player_mover)) = players.single_mut() else {
        return;
    };
    if !player_mover.alive {
        return;
    }
    let player_point = player_position.0;

    let mut eaten: SmallVec<[Entity; 4]> = SmallVec::new();
    for (entity, position, kind) in collectibles.iter() {
        if !aabb_overlap(
            player_point,
            Vec2::splat(MOVER_BODY),
            position.0,
            Vec2::splat(COLLECTIBLE_BODY),
        ) {
            continue;
        }
        eaten.push(entity);
        commands.entity(entity).despawn();

        match *kind {
            Collectible::Pellet => {
                run_state.score += PELLET_SCORE * run_state.multiplier;
                ledger.remaining -= 1;
                ledger.eaten_pellets += 1;
                audio.write(AudioEvent::Munch);

                if let Some(bonus) = BonusKind::by_rank(ledger.next_bonus) {
                    if ledger.eaten_pellets >= bonus.threshold() {
                        ledger.next_bonus += 1;
                        spawn_bonus(&mut commands, bonus, &collectibles, &eaten, &mut ui);
                    }
                }
            }
            Collectible::Pill => {
                run_state.score += PILL_SCORE * run_state.multiplier;
                ledger.remaining -= 1;
                audio.write(AudioEvent::Munch);
                player.enable_power(&mut scheduler, difficulty.power_mode_ms);
                for (mut brain, mut mover, mut velocity, sense) in ghosts.iter_mut() {
                    brain.enable_frightened(&mut mover, &mut velocity, sense);
                }
            }
            Collectible::Bonus(bonus) => {
                run_state.multiplier = difficulty.multiplier * bonus.multiplier();
                if let Some(handle) = ledger.bonus_timer.take() {
                    scheduler.cancel(handle);
                }
                ledger.bonus_timer =
                    Some(scheduler.schedule(BONUS_WINDOW_MS as f64, TimerAction::BonusExpiry));
                audio.write(AudioEvent::Fruit);
                info!(%bonus, multiplier = run_state.multiplier, "Bonus fruit eaten");
            }
        }
        ui.write(UiEvent::ScoreChanged(run_state.score));
    }

    if !eaten.is_empty() && ledger.remaining == 0 {
        finish_level(&mut run_state, &mut audio, &mut ui);
    }
}

/// Places a freshly unlocked bonus fruit on a random surviving pellet so it
/// always sits somewhere reachable.
fn spawn_bonus(
    commands: &mut Commands,
    bonus: BonusKind,
    collectibles: &Query<(Entity, &Position, &Collectible)>,
    eaten: &[Entity],
    ui: &mut EventWriter<UiEvent>,
) {
    let spots: Vec<Vec2> = collectibles
        .iter()
        .filter(|(entity, _, kind)| **kind == Collectible::Pellet && !eaten.contains(entity))
        .map(|(_, position, _)| position.0)
        .collect();
    let Some(spot) = spots.choose(&mut rand::rng()).copied() else {
        return;
    };
    commands.spawn((Position(spot), Collectible::Bonus(bonus)));
    ui.write(UiEvent::Notification(format!("{bonus} appeared!")));
    debug!(%bonus, ?spot, "Bonus fruit spawned");
}

fn finish_level(run_state: &mut RunState, audio: &mut EventWriter<AudioEvent>, ui: &mut EventWriter<UiEvent>) {
    run_state.active = false;
    if run_state.level >= FINAL_LEVEL {
        run_state.outcome = Some(RunOutcome::GameComplete);
        audio.write(AudioEvent::Win);
        ui.write(UiEvent::Notification("You win!".into()));
    } else {
        run_state.outcome = Some(RunOutcome::LevelComplete);
        audio.write(AudioEvent::Intermission);
        ui.write(UiEvent::Notification("Level complete!".into()));
    }
    info!(level = run_state.level, outcome = ?run_state.outcome, "Board cleared");
}

/// Body-overlap checks between the player and each pursuer. A frightened
/// pursuer dies and pays out; any other live pursuer costs the player a life.
pub fn ghost_meeting_system(
    mut run_state: ResMut<RunState>,
    mut scheduler: ResMut<TickScheduler>,
    mut audio: EventWriter<AudioEvent>,
    mut ui: EventWriter<UiEvent>,
    mut players: Query<(&mut Player, &Position, &mut Mover, &mut Velocity), Without<GhostBrain>>,
    mut ghosts: Query<
        (&mut GhostBrain, &mut Position, &mut Mover, &mut Velocity, &TileSense),
        Without<Player>,
    >,
) {
    if !run_state.active {
        return;
    }
    let Ok((mut player, player_position, mut player_mover, mut player_velocity)) =
        players.single_mut()
    else {
        return;
    };
    if !player_mover.alive {
        return;
    }
    let player_point = player_position.0;

    let mut caught = false;
    for (mut brain, position, mut mover, mut velocity, sense) in ghosts.iter_mut() {
        if !brain.in_play {
            continue;
        }
        if !aabb_overlap(
            player_point,
            Vec2::splat(MOVER_BODY),
            position.0,
            Vec2::splat(MOVER_BODY),
        ) {
            continue;
        }

        if brain.mode == GhostMode::Frightened {
            if brain.on_eaten(&mut mover, &mut velocity, sense) {
                run_state.score += GHOST_SCORE * run_state.multiplier;
                audio.write(AudioEvent::GhostEaten);
                ui.write(UiEvent::ScoreChanged(run_state.score));
            }
            continue;
        }

        caught = true;
        break;
    }

    if !caught {
        return;
    }

    // Caught: lives tick down. At zero the run ends where it stands; any
    // other catch sends every pursuer straight home while the death sequence
    // plays out.
    run_state.lives = run_state.lives.saturating_sub(1);
    ui.write(UiEvent::LivesChanged(run_state.lives));
    if run_state.lives == 0 {
        for (mut brain, _, mut mover, mut velocity, sense) in ghosts.iter_mut() {
            brain.halt(&mut mover, &mut velocity, sense);
        }
        run_state.active = false;
        run_state.outcome = Some(RunOutcome::GameOver);
        player_mover.die();
        player_mover.stop(&mut player_velocity);
        audio.write(AudioEvent::GameOver);
        ui.write(UiEvent::Notification("Game over".into()));
        info!(score = run_state.score, "Game over");
    } else {
        for (mut brain, mut position, mut mover, mut velocity, _) in ghosts.iter_mut() {
            brain.reset_for_respawn(&mut scheduler, &mut mover, &mut position, &mut velocity);
        }
        player.begin_death(
            &mut scheduler,
            &mut player_mover,
            &mut player_velocity,
            PLAYER_DEATH_MS,
        );
        audio.write(AudioEvent::PlayerDeath);
        debug!(lives = run_state.lives, "Player caught");
    }
}

/// Closes the bonus multiplier window when its timer fires.
pub fn bonus_expiry_system(
    mut fired: EventReader<TimerFired>,
    difficulty: Res<Difficulty>,
    mut run_state: ResMut<RunState>,
    mut ledger: ResMut<CollectibleLedger>,
    mut ui: EventWriter<UiEvent>,
) {
    for event in fired.read() {
        if event.0 != TimerAction::BonusExpiry {
            continue;
        }
        ledger.bonus_timer = None;
        run_state.multiplier = difficulty.multiplier;
        ui.write(UiEvent::ScoreChanged(run_state.score));
        debug!(multiplier = run_state.multiplier, "Bonus window closed");
    }
}
