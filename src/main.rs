use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotmig::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Shuffle liked songs into the "Liked Songs Playlist"
    Shuffle,

    /// Resolve Tidal, Deezer and YouTube links for an exported library
    Links(LinksOptions),

    /// Find Deezer links for an exported library by catalog search
    Deezer(DeezerOptions),

    /// Show the state of a links checkpoint
    Status(StatusOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LinksOptions {
    /// Exported library table (Exportify CSV)
    #[clap(long)]
    pub input: PathBuf,

    /// Checkpoint file [default: <input>_progress.csv]
    #[clap(long)]
    pub progress: Option<PathBuf>,

    /// Write resolved links to this file after the run
    #[clap(long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeezerOptions {
    /// Table with "Track Name" and "Artist Name(s)" columns
    #[clap(long)]
    pub input: PathBuf,

    /// Copy of the input with a "Deezer Link" column
    #[clap(long)]
    pub output: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusOptions {
    /// Checkpoint file written by `links`
    #[clap(long)]
    pub progress: PathBuf,

    /// List tracks that are still pending
    #[clap(long)]
    pub pending: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Shuffle => cli::shuffle().await,
        Command::Links(opt) => cli::links(&opt.input, opt.progress, opt.output).await,
        Command::Deezer(opt) => cli::deezer(&opt.input, &opt.output).await,
        Command::Status(opt) => cli::status(&opt.progress, opt.pending).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
