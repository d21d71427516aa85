use anyhow::Context;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use winfake::session::UserRoster;
use winfake::sound::SoundPlayer;
use winfake::{Config, NotepadOptions};

mod shell;

#[derive(Parser, Debug)]
#[command(name = "winfake")]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("WINFAKE_GIT_HASH"), ")"),
    about = "Scripted fake-desktop notepad that rewrites its own session log"
)]
struct Cli {
    /// User to log in as (defaults to the first configured user)
    #[arg(long, short = 'u', value_name = "NAME")]
    user: Option<String>,

    /// Password for the chosen user
    #[arg(long, short = 'p', value_name = "PASSWORD", default_value = "")]
    password: String,

    /// Read configuration from this file instead of ~/.config/winfake/config.toml
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the session log here instead of the sandbox
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Do not play sound cues
    #[arg(long, action = ArgAction::SetTrue)]
    no_sound: bool,

    /// Write a documented default config file and exit
    #[arg(long, action = ArgAction::SetTrue)]
    init_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::get_config_path()?,
    };

    if cli.init_config {
        Config::create_default_file(&config_path)?;
        println!("Wrote default config to {}", config_path.display());
        return Ok(());
    }

    let config = Config::load_from(&config_path)?;

    let roster = UserRoster::new(config.users.clone());
    let session = roster
        .authenticate(cli.user.as_deref(), &cli.password)
        .context("Login failed")?;

    let mut options = NotepadOptions::from_config(&config);
    if let Some(path) = cli.log_file.as_deref() {
        options = options.with_log_file(path);
    }

    let sound = if cli.no_sound {
        SoundPlayer::disabled()
    } else {
        SoundPlayer::from_config(&config)
    };

    log::info!("Starting notepad for '{}'", session.display_name());
    shell::run(session, options, sound)?;
    log::info!("Notepad closed.");

    Ok(())
}
