use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sporlsync::{
    cli::{self, Job},
    config, error,
    sync::SyncContext,
    utils,
};

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
    /// Serve every sync job over HTTP
    Serve(ServeOptions),

    /// Run a single sync job and exit
    Run(RunOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Address to bind, overrides SERVER_ADDRESS
    #[clap(long)]
    pub addr: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RunOptions {
    #[command(subcommand)]
    pub job: JobCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum JobCommand {
    /// Upsert one page of currently popular releases
    PopularAlbums,

    /// Upsert every release of one artist, including tracks
    Discography(DiscographyOpts),

    /// Fill stored albums that have no track list yet
    AlbumTracks,

    /// Refresh the profile of every stored artist
    ArtistProfiles,
}

#[derive(Parser, Debug, Clone)]
pub struct DiscographyOpts {
    /// Catalog id of the artist
    #[clap(long)]
    pub artist_id: String,

    /// Release type(s) to include; can be repeated
    #[clap(
        long = "type",
        default_value = "album,single,compilation",
        value_parser = utils::parse_release_kinds,
        action = ArgAction::Append,
        num_args = 1
    )]
    pub release_types: Vec<utils::ReleaseKinds>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn merge_kinds(all: Vec<utils::ReleaseKinds>) -> utils::ReleaseKinds {
    utils::ReleaseKinds(all.into_iter().flat_map(|k| k.0).collect())
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("{}", e),
    };
    let ctx = SyncContext::from_settings(&settings);

    match cli.command {
        Command::Serve(opt) => {
            let addr = opt.addr.unwrap_or_else(|| settings.server_addr.clone());
            cli::serve(ctx, &addr).await
        }
        Command::Run(opt) => {
            let job = match opt.job {
                JobCommand::PopularAlbums => Job::PopularAlbums,
                JobCommand::Discography(d) => Job::Discography {
                    artist_id: d.artist_id,
                    kinds: merge_kinds(d.release_types),
                },
                JobCommand::AlbumTracks => Job::AlbumTracks,
                JobCommand::ArtistProfiles => Job::ArtistProfiles,
            };
            cli::run(ctx, job).await
        }
        Command::Completions(_) => {}
    }
}
