//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reel_media::CanPlayType;
use reel_source::Availability;

/// Page the player pretends to be embedded in when none is given
pub const DEFAULT_PAGE_URL: &str = "http://localhost/";

#[derive(Debug, Parser)]
#[command(
    name = "reel-player",
    about = "Codec detection, source lists and fallback simulation for Reel",
    version,
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Playback configuration file (JSON)
    #[arg(long = "config", env = "REEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// URL of the page the player is embedded in
    #[arg(long = "page-url", default_value = DEFAULT_PAGE_URL)]
    pub page_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Print the negotiated codec list
    Codecs {
        /// canPlayType answer for one MIME type, as MIME=probably|maybe|no
        #[arg(long = "support", value_parser = parse_support)]
        answers: Vec<(String, CanPlayType)>,
    },

    /// Print the source list for a video
    Sources {
        id: String,

        /// Container extension including the dot, e.g. `.mkv`
        extension: String,

        /// A 720p rendition exists
        #[arg(long = "720p")]
        has_720p: bool,

        /// A 1080p rendition exists
        #[arg(long = "1080p")]
        has_1080p: bool,
    },

    /// Ask the backend whether it can transcode
    Capability,

    /// Print the public watch URL prefix
    WatchUrl,

    /// Play a video in memory and fail its source repeatedly
    Simulate {
        id: String,

        extension: String,

        /// How many playback errors to raise
        #[arg(long = "failures", default_value_t = 1)]
        failures: usize,
    },
}

impl Command {
    /// Catalog flags for the `sources` command
    pub fn availability(&self) -> Availability {
        match self {
            Self::Sources { has_720p, has_1080p, .. } => Availability {
                has_720p: *has_720p,
                has_1080p: *has_1080p,
            },
            _ => Availability::default(),
        }
    }
}

/// The MIME string may itself contain `=` (`codecs="..."`), so split on the last one
fn parse_support(raw: &str) -> Result<(String, CanPlayType), String> {
    let (mime, answer) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected MIME=ANSWER, got {raw}"))?;
    let answer = match answer.to_ascii_lowercase().as_str() {
        "probably" => CanPlayType::Probably,
        "maybe" => CanPlayType::Maybe,
        "no" | "" => CanPlayType::Empty,
        other => return Err(format!("unknown answer {other}, expected probably, maybe or no")),
    };
    Ok((mime.to_string(), answer))
}
