/// Entry point and game loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use log::{error, info, warn};

use config::GameConfig;
use domain::maze::Maze;
use sim::event::GameEvent;
use sim::session::{Session, Stage};
use ui::gamepad::GamepadState;
use ui::input::{InputState, Intent};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let (config, config_err) = match GameConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            eprintln!("Warning: {e}");
            eprintln!("Using default settings.");
            (GameConfig::default(), Some(e))
        }
    };

    if let Err(e) = logging::init(&config.log) {
        eprintln!("Warning: logging disabled: {e}");
    }
    if let Some(e) = config_err {
        warn!("config.toml ignored: {e}");
    }

    let maze = match Maze::mansion() {
        Ok(m) => m,
        Err(e) => {
            error!("maze layout rejected: {e}");
            eprintln!("Maze layout error: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new(&config.ticket_url);

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&maze, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("뱀파이어의 저택을 방문해 주셔서 감사합니다.");
    println!("예매: {}", config.ticket_url);
}

fn game_loop(
    maze: &Maze,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad detected");
    }

    let mut session = new_session(maze, config);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        let now = Instant::now();
        // Timers first, so input lands on a state that is current at `now`.
        let mut events: Vec<GameEvent> = session.tick(now);

        // Keyboard and gamepad feed the same intents.
        for intent in kb.intents().into_iter().chain(gp.intents()) {
            match intent {
                Intent::Quit => {
                    info!("quit during {:?}", session.stage());
                    return Ok(());
                }
                Intent::Confirm => match session.stage() {
                    Stage::Intro => events.extend(session.proceed(now)),
                    Stage::Maze => {}
                    Stage::Result => {
                        session = new_session(maze, config);
                        renderer.invalidate();
                    }
                },
                Intent::Move(dir) => events.extend(session.move_player(dir, now)),
            }
        }

        process_sound_events(sound, &events);

        renderer.render(&session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn new_session(maze: &Maze, config: &GameConfig) -> Session {
    info!("new session");
    Session::new(maze.clone(), config.timing.clone(), Instant::now())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::LetterRevealed => sfx.play_type(),
            GameEvent::MazeEntered => sfx.play_proceed(),
            GameEvent::Blocked => sfx.play_bump(),
            GameEvent::TrapSprung { .. } => sfx.play_trap(),
            GameEvent::ReturnedToStart => sfx.play_return(),
            GameEvent::GoalReached { .. } => sfx.play_goal(),
            _ => {}
        }
    }
}
