use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tubecache")]
#[command(version = tubecache::VERSION, about = "Look up YouTube video and playlist metadata")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search videos and playlists
    Search {
        /// Search terms, joined with spaces
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Show video details
    Video {
        /// Video ID
        id: String,
    },

    /// Show playlist details and its videos
    Playlist {
        /// Playlist ID
        id: String,
    },

    /// Print the audio stream URL of a video
    Audio {
        /// Video ID
        id: String,
    },

    /// Display version information
    Version,
}
