//! Brick Breaker headless runner
//!
//! Plays generated levels with an autopilot paddle and logs the outcome.
//! Usage: `brick-breaker [settings.json] [seed]`

use brick_breaker::Settings;
use brick_breaker::consts::FRAME_DT;
use brick_breaker::sim::{Counter, Level, LevelLayout, LevelStatus, TickInput};

/// Give up on a level after ten minutes of game time
const MAX_TICKS_PER_LEVEL: u64 = 60 * 60 * 10;
const LEVEL_COUNT: u32 = 4;

/// Steer the paddle under the lowest ball
fn autopilot(level: &Level) -> TickInput {
    let (Some(paddle), Some(target)) = (
        level.paddle(),
        level
            .balls()
            .iter()
            .map(|b| b.center())
            .max_by(|a, b| a.y.total_cmp(&b.y)),
    ) else {
        return TickInput::default();
    };

    let center = paddle.rect().center().x;
    // Dead band so the paddle doesn't jitter around the target
    let dead_band = paddle.rect().width() / 10.0;
    TickInput {
        left: target.x < center - dead_band,
        right: target.x > center + dead_band,
    }
}

/// Play one level to completion; false when the game is over
fn play_level(level: &mut Level) -> Result<bool, Box<dyn std::error::Error>> {
    level.start_turn()?;
    while level.time_ticks() < MAX_TICKS_PER_LEVEL {
        let input = autopilot(level);
        match level.tick(&input, FRAME_DT) {
            LevelStatus::Running => {}
            LevelStatus::Cleared => return Ok(true),
            LevelStatus::TurnLost => {
                log::info!("{} lives left", level.lives());
                level.start_turn()?;
            }
            LevelStatus::OutOfLives => return Ok(false),
        }
    }
    log::warn!(
        "'{}' timed out with {} blocks left",
        level.name(),
        level.remaining_blocks()
    );
    Ok(true)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("Brick Breaker (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = Settings::load_or_default(args.next().unwrap_or_else(|| "settings.json".into()));
    let seed = match args.next() {
        Some(seed) => seed.parse()?,
        None => 12345,
    };

    let score = Counter::new(0);
    let lives = Counter::new(settings.initial_lives);

    for index in 0..LEVEL_COUNT {
        let layout = LevelLayout::generate(index, seed);
        let mut level = Level::new(&settings, &layout, score.clone(), lives.clone())?;
        let alive = play_level(&mut level)?;
        log::info!(
            "{} finished after {} ticks: score {}, lives {}",
            level.name(),
            level.time_ticks(),
            score.value(),
            lives.value()
        );
        if !alive {
            break;
        }
    }

    if lives.value() == 0 {
        log::info!("Game over, final score {}", score.value());
    } else {
        log::info!("You win! Final score {}", score.value());
    }
    Ok(())
}
