use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use connect_four::ai::{Agent, MinimaxAgent, RandomAgent};
use connect_four::config::AppConfig;
use connect_four::game::Player;
use connect_four::relay::{RelayClient, RelayServer, SessionId};
use connect_four::session::GameSession;
use connect_four::ui::App;

/// Play Connect Four locally, against the computer, or over a relay.
#[derive(Parser)]
#[command(name = "connect-four", about = "Connect Four with a minimax opponent and online play")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "connect-four.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the game board
    Play {
        #[arg(long, value_enum, default_value = "ai")]
        mode: Mode,

        /// Search difficulty, 1-10 (depth is capped by search.max_depth)
        #[arg(long)]
        difficulty: Option<u32>,

        /// Side the computer plays
        #[arg(long, value_enum)]
        computer_side: Option<Side>,

        /// Computer opponent
        #[arg(long, value_enum, default_value = "minimax")]
        opponent: Opponent,

        /// Join an existing online game instead of hosting one
        #[arg(long)]
        join: Option<String>,

        /// Relay server address (overrides relay.connect)
        #[arg(long)]
        relay: Option<String>,
    },
    /// Run the move relay server
    Relay {
        /// Listen address (overrides relay.bind)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the default configuration as TOML
    DefaultConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Human,
    Ai,
    Online,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Red,
    Yellow,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::Red => Player::Red,
            Side::Yellow => Player::Yellow,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Opponent {
    Minimax,
    Random,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log lines would tear the alternate screen, so the board only logs warnings.
    let default_level = match cli.command {
        Command::Play { .. } => "warn",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    match cli.command {
        Command::DefaultConfig => {
            print!("{}", AppConfig::default_toml());
            Ok(())
        }
        Command::Relay { bind } => {
            if let Some(bind) = bind {
                config.relay.bind = bind;
            }
            let server = RelayServer::bind(config.relay.bind.as_str())
                .with_context(|| format!("binding relay to {}", config.relay.bind))?;
            server.run().context("relay server stopped")
        }
        Command::Play {
            mode,
            difficulty,
            computer_side,
            opponent,
            join,
            relay,
        } => {
            if let Some(difficulty) = difficulty {
                config.search.difficulty = difficulty;
            }
            if let Some(side) = computer_side {
                config.game.computer_side = side.into();
            }
            if let Some(relay) = relay {
                config.relay.connect = relay;
            }
            config.validate()?;

            let (session, label) = build_session(&config, mode, opponent, join)?;
            run_tui(App::new(session, label))
        }
    }
}

fn build_session(
    config: &AppConfig,
    mode: Mode,
    opponent: Opponent,
    join: Option<String>,
) -> Result<(GameSession, String)> {
    match mode {
        Mode::Human => Ok((
            GameSession::local().starting_with(config.game.first_player),
            "Human vs Human".to_string(),
        )),
        Mode::Ai => {
            let agent: Box<dyn Agent> = match opponent {
                Opponent::Minimax => Box::new(MinimaxAgent::from_config(&config.search)),
                Opponent::Random => Box::new(RandomAgent::new()),
            };
            let label = format!("{} plays {}", agent.name(), config.game.computer_side);
            let session = GameSession::vs_computer(agent, config.game.computer_side)
                .starting_with(config.game.first_player);
            Ok((session, label))
        }
        Mode::Online => {
            let (session_id, local_side) = match join {
                Some(raw) => (SessionId::parse(&raw)?, Player::Yellow),
                None => (SessionId::generate(), Player::Red),
            };
            let client = RelayClient::connect(config.relay.connect.as_str(), session_id)
                .with_context(|| format!("connecting to relay at {}", config.relay.connect))?;
            let label = format!("Online, you play {local_side}");
            Ok((GameSession::remote(Box::new(client), local_side), label))
        }
    }
}

fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res.context("running the game board")
}
