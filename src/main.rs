use muncher::direction::{Direction, DIRECTIONS};
use muncher::events::{GameCommand, UiEvent};
use muncher::game::Game;
use muncher::session::RestartParams;
use tracing::{event, Level};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Headless demo run: drives the simulation at a fixed 60Hz with a scripted
/// input pattern and logs what a real host would render.
pub fn main() -> anyhow::Result<()> {
    // Setup tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish()
        .with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber).expect("Could not set global default");

    let mut game = Game::new(RestartParams::default())?;

    const TICK: f32 = 1.0 / 60.0;
    const MAX_SIMULATED_SECONDS: f32 = 180.0;

    let mut elapsed = 0.0f32;
    let mut script_slot = usize::MAX;

    event!(Level::INFO, "Starting demo loop ({:.3}ms per tick)", TICK * 1000.0);

    while elapsed < MAX_SIMULATED_SECONDS {
        // Rotate through the four directions once a second; crude, but it
        // exercises turns, walls, pickups, and pursuer encounters.
        let slot = elapsed as usize % DIRECTIONS.len();
        if slot != script_slot {
            script_slot = slot;
            let direction: Direction = DIRECTIONS[slot];
            game.send_command(GameCommand::MovePlayer(direction));
        }

        game.tick(TICK);
        elapsed += TICK;

        for ui in game.drain_ui_events() {
            match ui {
                UiEvent::ScoreChanged(score) => event!(Level::DEBUG, score, "Score"),
                UiEvent::LivesChanged(lives) => event!(Level::INFO, lives, "Lives"),
                UiEvent::Notification(text) => event!(Level::INFO, "{}", text),
            }
        }
        for audio in game.drain_audio_events() {
            event!(Level::TRACE, ?audio, "Audio cue");
        }

        if !game.is_active() {
            event!(
                Level::INFO,
                outcome = ?game.outcome(),
                score = game.score(),
                "Run ended"
            );
            match game.next_params() {
                Some(params) if params.level > game.level() => {
                    event!(Level::INFO, level = params.level, "Advancing");
                    game.restart(params)?;
                }
                _ => break,
            }
        }
    }

    event!(Level::INFO, score = game.score(), "Demo finished");
    Ok(())
}
