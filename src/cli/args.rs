use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::media::ReelFormat;
use crate::pexels::MediaKind;

#[derive(Parser, Debug)]
#[command(name = "reelgen")]
#[command(about = "Turn an audio track and a Pexels stock clip into a short reel", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Build a reel (default when no subcommand is given)
    Make(MakeCliArgs),
    /// Search Pexels and list the matching assets
    Search(SearchCliArgs),
    /// Inspect or clear the search result cache
    Cache(CacheCliArgs),
    /// Show or initialise the configuration file
    Config(ConfigCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug, Default, Clone)]
pub struct MakeCliArgs {
    /// Audio track to put under the video
    #[arg(short, long)]
    pub audio: Option<PathBuf>,
    /// Output length in seconds (landscape: 5-60, reel: any positive value)
    #[arg(short, long)]
    pub duration: Option<f64>,
    /// Output layout
    #[arg(short, long, value_enum)]
    pub format: Option<ReelFormat>,
    /// Search for videos or still images
    #[arg(short, long, value_parser = parse_media_kind)]
    pub media: Option<MediaKind>,
    /// Theme name (landscape) or theme number/name (reel)
    #[arg(short, long, conflicts_with = "query")]
    pub theme: Option<String>,
    /// Free-form search query, bypassing the theme menu
    #[arg(short, long)]
    pub query: Option<String>,
    /// 1-based index of the search result to use
    #[arg(short, long)]
    pub pick: Option<usize>,
    /// Only use cached search results, never call the API
    #[arg(long)]
    pub cache_only: bool,
    /// Where to write the rendered video
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Disable download and encode progress output
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(ClapArgs, Debug)]
pub struct SearchCliArgs {
    /// Search query
    pub query: String,
    /// Search for videos or still images
    #[arg(short, long, value_parser = parse_media_kind, default_value = "video")]
    pub media: MediaKind,
    /// Page size to use (landscape: 4 results, reel: 5 by default)
    #[arg(short, long, value_enum, default_value = "reel")]
    pub format: ReelFormat,
    /// Only use cached search results, never call the API
    #[arg(long)]
    pub cache_only: bool,
}

#[derive(ClapArgs, Debug)]
pub struct CacheCliArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// List cached search queries
    Show,
    /// Delete the search cache
    Clear {
        /// Also delete downloaded assets kept in the asset cache
        #[arg(long)]
        assets: bool,
    },
    /// Print the cache file location
    Path,
}

#[derive(ClapArgs, Debug)]
pub struct ConfigCliArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn parse_media_kind(value: &str) -> Result<MediaKind, String> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_make_flags() {
        let cli = Cli::parse_from([
            "reelgen", "make", "--audio", "song.mp3", "--duration", "12.5", "--format", "reel",
            "--media", "Video", "--theme", "3", "--pick", "2", "--cache-only",
        ]);
        match cli.command {
            Some(CliCommand::Make(args)) => {
                assert_eq!(args.audio, Some(PathBuf::from("song.mp3")));
                assert_eq!(args.duration, Some(12.5));
                assert_eq!(args.format, Some(ReelFormat::Reel));
                assert_eq!(args.media, Some(MediaKind::Video));
                assert_eq!(args.theme.as_deref(), Some("3"));
                assert_eq!(args.pick, Some(2));
                assert!(args.cache_only);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_theme_and_query_conflict() {
        let result = Cli::try_parse_from([
            "reelgen", "make", "--theme", "City", "--query", "street food",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["reelgen", "-v"]);
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_search_defaults() {
        let cli = Cli::parse_from(["reelgen", "search", "ocean"]);
        match cli.command {
            Some(CliCommand::Search(args)) => {
                assert_eq!(args.query, "ocean");
                assert_eq!(args.media, MediaKind::Video);
                assert_eq!(args.format, ReelFormat::Reel);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
