//=========================================================================
// Scene Demo
//=========================================================================
//
// Runs the framework headless at a fixed rate. Once "Menu" is active the
// host schedules a delayed switch to "Game". Scenes load on a background
// thread.
//
// Run with logging:
//   RUST_LOG=debug cargo run --bin scene_demo
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, LevelFilter};

//=== Internal Dependencies ===============================================

use aetheric_framework::prelude::*;

//=== Options =============================================================

const OPTIONS: &str = r#"
initial_scene = "Menu"
unhandled_commands = "warn"
"#;

const TICK_RATE: f64 = 60.0;
const RUN_FOR_SECONDS: f64 = 3.0;
const LOAD_LATENCY: Duration = Duration::from_millis(250);

//=== ThreadedEnvironment =================================================

/// Pretends to stream scenes in on a loader thread.
#[derive(Default)]
struct ThreadedEnvironment {
    requested: Option<String>,
}

impl SceneEnvironment for ThreadedEnvironment {
    fn supports_async_loading(&self) -> bool {
        true
    }

    fn load_scene(&mut self, scene: &str) {
        self.requested = Some(scene.to_string());
        thread::sleep(LOAD_LATENCY);
    }

    fn load_scene_async(&mut self, scene: &str, completion: LoadCompletion) {
        self.requested = Some(scene.to_string());
        thread::spawn(move || {
            thread::sleep(LOAD_LATENCY);
            info!("Loader thread finished {:?}", completion.scene());
            completion.complete();
        });
    }

    fn reclaim_memory(&mut self) {
        info!("Reclaiming memory before loading {:?}", self.requested);
    }
}

//=== Services ============================================================

/// Global score, survives scene changes.
#[derive(Default)]
struct ScoreBoard {
    score: u64,
}

impl Initializable for ScoreBoard {
    fn initialize(&mut self) {
        info!("ScoreBoard ready");
    }
}

impl Destroyable for ScoreBoard {
    fn destroy(&mut self) {
        info!("Final score: {}", self.score);
    }
}

aetheric_framework::service!(ScoreBoard: Initializable, Destroyable);

/// Per-scene enemy, awards points while alive.
struct Enemy {
    name: &'static str,
    score: Shared<ScoreBoard>,
    alive_for: f32,
}

impl Initializable for Enemy {
    fn initialize(&mut self) {
        info!("{} spawned", self.name);
    }
}

impl Updatable for Enemy {
    fn update(&mut self, delta_time: f32) {
        self.alive_for += delta_time;
        self.score.borrow_mut().score += 1;
    }
}

impl Destroyable for Enemy {
    fn destroy(&mut self) {
        info!("{} despawned after {:.2}s", self.name, self.alive_for);
    }
}

aetheric_framework::service!(Enemy: Initializable, Updatable, Destroyable);

//=== Views ===============================================================

struct MenuSceneView;

impl SceneView for MenuSceneView {
    fn initialize(&mut self, _scope: &mut ObjectRegistry) {
        info!("Menu shown");
    }
}

struct GameSceneView {
    score: Shared<ScoreBoard>,
}

impl SceneView for GameSceneView {
    fn initialize(&mut self, scope: &mut ObjectRegistry) {
        for name in ["grunt", "brute"] {
            let enemy = Enemy {
                name,
                score: Rc::clone(&self.score),
                alive_for: 0.0,
            };
            if let Err(err) = scope.register_transient(name, enemy) {
                log::error!("{}", err);
            }
        }
    }
}

//=== Entry Point =========================================================

fn main() -> Result<(), FrameworkError> {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let options = FrameworkOptions::from_toml_str(OPTIONS)?;
    info!("Starting scene demo with {:?}", options);

    let score = Rc::new(RefCell::new(ScoreBoard::default()));

    let game_score = Rc::clone(&score);
    let mut framework = FrameworkBuilder::new()
        .with_options(options)
        .with_view("MenuSceneView", || MenuSceneView)
        .with_view("GameSceneView", move || GameSceneView {
            score: Rc::clone(&game_score),
        })
        .build(ThreadedEnvironment::default())
        .init(|framework| {
            framework.globals_mut().register_shared_singleton(score);
        });

    let mut game_scheduled = false;
    let frame_duration = Duration::from_secs_f64(1.0 / TICK_RATE);
    let started = Instant::now();
    let mut last = started;

    while started.elapsed().as_secs_f64() < RUN_FOR_SECONDS {
        let frame_start = Instant::now();
        let delta = frame_start.duration_since(last).as_secs_f32();
        last = frame_start;

        framework.tick(delta)?;

        let in_menu = matches!(
            framework.scene_state(),
            SceneState::Active { scene } if scene == "Menu"
        );
        if in_menu && !game_scheduled {
            info!("Starting game in 1s");
            framework
                .commands()
                .push_after_seconds(ChangeScene::new("Game"), 1.0);
            game_scheduled = true;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }

    info!(
        "Ran {} frames, scene state {:?}",
        framework.clock().map_or(0, |clock| clock.frame()),
        framework.scene_state()
    );
    framework.shutdown();
    Ok(())
}
