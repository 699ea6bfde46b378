//! Terminal front end for Gridkeep.
//!
//! Frames are written to stdout as plain text rows; input is read from stdin
//! one command per line (`up`, `return`, `escape`, `move 3 4`, `text 120`,
//! `quit`, ...). Logs go to stderr and are filtered by `RUST_LOG`.
//!
//! Paths:
//!   GRIDKEEP_CONFIG -- config file (default `config.json`)
//!   GRIDKEEP_SAVE   -- save file (default `saved.sav`)

use std::io;
use std::panic::{self, AssertUnwindSafe};

use anyhow::Context as _;
use gridkeep_engine::app::App;
use gridkeep_engine::config::Config;
use gridkeep_engine::console::TextDisplay;
use gridkeep_engine::event::LineEvents;
use gridkeep_engine::saving::{default_save_path, load_from_file, save_to_file};

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = Config::default_path();
    let config = Config::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let save_path = default_save_path();
    let world = match load_from_file(&save_path) {
        Ok(world) => world,
        Err(err) => {
            tracing::warn!(%err, "could not load saved world, starting without one");
            None
        }
    };

    let mut app = App::new(config, world);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let stdout = io::stdout();
        let stdin = io::stdin();
        let mut display = TextDisplay::new(stdout.lock());
        let mut events = LineEvents::new(stdin.lock());
        app.run(&mut display, &mut events)
    }));

    let (world, config) = app.into_parts();
    if let Some(mut world) = world {
        if let Err(err) = save_to_file(&mut world, &save_path) {
            tracing::error!(%err, "failed to save world");
        }
    }

    match outcome {
        Ok(result) => {
            config
                .save(&config_path)
                .with_context(|| format!("saving config to {}", config_path.display()))?;
            result.context("presenting frame")
        }
        Err(payload) => {
            tracing::error!("main loop panicked, world saved best-effort");
            panic::resume_unwind(payload)
        }
    }
}
