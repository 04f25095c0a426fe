use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use crossbeam_channel::Receiver;
use ratatui::DefaultTerminal;

use crate::{
    app::App,
    audio_thread::AudioThread,
    bootstrap::{Bootstrapper, BuildOutcome, CargoBuild, SkipReason},
    config::{Config, DEFAULT_VOLUME},
    event::Event,
    io::{AudioCache, YtDlp},
    utils::spawn_event_emitter,
};

mod app;
mod audio_thread;
mod bootstrap;
mod components;
mod config;
mod dashboard;
mod download_worker;
mod error;
mod event;
mod io;
mod logging;
mod models;
mod queue;
mod source;
mod utils;
mod youtube;

/// Timer dashboard with a YouTube audio queue, in the terminal.
#[derive(Parser, Debug)]
#[command(name = "timer-dashboard", version, about)]
struct Cli {
    /// Launch without rebuilding dist/TimerDashboard first
    #[arg(long)]
    skip_build: bool,

    /// Directory holding layout.json, cache/ and dist/ [default: current directory]
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Override the layout file location
    #[arg(long, value_name = "FILE")]
    layout: Option<PathBuf>,

    /// Override the audio cache directory
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// yt-dlp executable to download with [default: yt-dlp on PATH]
    #[arg(long = "yt-dlp", value_name = "PATH")]
    yt_dlp: Option<PathBuf>,

    /// Initial playback volume, 0-100
    #[arg(long, default_value_t = DEFAULT_VOLUME, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: u8,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let base_dir = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().wrap_err("resolving current directory")?,
        };

        let mut config = Config::new(base_dir).with_volume(self.volume);
        if let Some(layout) = &self.layout {
            config = config.with_layout_path(layout);
        }
        if let Some(cache_dir) = &self.cache_dir {
            config = config.with_cache_dir(cache_dir);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config = cli.config()?;

    let log_path = logging::init()?;
    tracing::info!("Starting, base dir {:?}, log {:?}", config.base_dir, log_path);

    let outcome = Bootstrapper::new(
        CargoBuild::new(&config.base_dir, &config.dist_dir),
        cli.skip_build,
    )
    .run()
    .wrap_err("executable build failed")?;

    match outcome {
        BuildOutcome::Built(path) => println!("Built executable: {}", path.display()),
        BuildOutcome::Skipped(SkipReason::ToolMissing) => {
            eprintln!("cargo not found, launching without rebuilding the executable")
        }
        BuildOutcome::Skipped(_) => {}
    }

    let downloader = match &cli.yt_dlp {
        Some(program) => YtDlp::with_program(program),
        None => YtDlp::new(),
    };
    let cache = AudioCache::new(&config.cache_dir, Box::new(downloader))
        .wrap_err("preparing audio cache")?;
    tracing::info!("Audio cache at {:?}", cache.dir());

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let (command_tx, command_rx) = crossbeam_channel::unbounded();

    AudioThread::new(
        command_rx,
        event_tx.clone(),
        f32::from(config.volume) / 100.0,
    )
    .run()?;

    let mut app = App::new(config, Arc::new(cache), command_tx, event_tx.clone());
    spawn_event_emitter(event_tx, app.config.tick_rate)?;

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut app, &event_rx);
    ratatui::restore();

    app.shutdown();
    tracing::info!("Exiting");
    result
}

fn run(terminal: &mut DefaultTerminal, app: &mut App, event_rx: &Receiver<Event>) -> Result<()> {
    terminal.draw(|f| app.render(f.area(), f.buffer_mut()))?;
    loop {
        match event_rx.recv()? {
            Event::Input(key) => {
                if !app.event(key)?.is_consumed() && key == app.config.key_config.quit {
                    break;
                }
            }
            Event::Tick => app.tick()?,
            Event::Audio(audio) => app.audio(audio)?,
            Event::Download(download) => app.download(download)?,
        }

        terminal.draw(|f| app.render(f.area(), f.buffer_mut()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["timer-dashboard"]).unwrap();
        assert!(!cli.skip_build);
        assert_eq!(cli.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn cli_overrides_paths() {
        let cli = Cli::try_parse_from([
            "timer-dashboard",
            "--skip-build",
            "--base-dir",
            "/tmp/td",
            "--layout",
            "/tmp/other.json",
            "--volume",
            "30",
        ])
        .unwrap();
        let config = cli.config().unwrap();
        assert!(cli.skip_build);
        assert_eq!(config.layout_path, PathBuf::from("/tmp/other.json"));
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/td/cache"));
        assert_eq!(config.volume, 30);
    }

    #[test]
    fn cli_rejects_loud_volume() {
        assert!(Cli::try_parse_from(["timer-dashboard", "--volume", "150"]).is_err());
    }
}
