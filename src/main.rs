mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use cli::{Cli, Commands};

use tubecache::{Catalog, Config, Entry, Playlist, Video};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Commands::Version = cli.command {
        println!("tubecache {}", tubecache::VERSION);
        return ExitCode::SUCCESS;
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tubecache::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Starting tubecache {}", tubecache::VERSION);
    config.log_summary();

    let catalog = match Catalog::from_config(&config) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, "data source unavailable");
            return ExitCode::FAILURE;
        }
    };

    let status = match cli.command {
        Commands::Search { query } => search(&catalog, &query.join(" ")),
        Commands::Video { id } => {
            print_video(&catalog.video(&id));
            ExitCode::SUCCESS
        }
        Commands::Playlist { id } => {
            print_playlist(&catalog.playlist(&id));
            ExitCode::SUCCESS
        }
        Commands::Audio { id } => match catalog.video(&id).audio_url().get() {
            Some(url) => {
                println!("{}", url);
                ExitCode::SUCCESS
            }
            None => ExitCode::FAILURE,
        },
        Commands::Version => ExitCode::SUCCESS,
    };

    // Let background lookups finish before the process exits
    catalog.pool().wait_idle();
    info!(stats = ?catalog.pool().stats(), "done");
    status
}

fn search(catalog: &Catalog, query: &str) -> ExitCode {
    let Some(entries) = catalog.search(query) else {
        return ExitCode::FAILURE;
    };

    for entry in &entries {
        match entry {
            Entry::Video(video) => println!(
                "video     {}  {}  [{}]",
                video.id(),
                text(video.title().get()),
                duration(video.length().get())
            ),
            Entry::Playlist(playlist) => println!(
                "playlist  {}  {}  ({} videos)",
                playlist.id(),
                text(playlist.title().get()),
                playlist
                    .video_count()
                    .get()
                    .map_or_else(|| "?".to_string(), |n| n.to_string())
            ),
        }
    }
    ExitCode::SUCCESS
}

fn print_video(video: &Arc<Video>) {
    // Request everything first so the lookups overlap
    let (title, channel, length) = (video.title(), video.channel(), video.length());
    println!("id:        {}", video.id());
    println!("title:     {}", text(title.get()));
    println!("channel:   {}", text(channel.get()));
    println!("length:    {}", duration(length.get()));
    for url in video.thumbnails().get().unwrap_or_default() {
        println!("thumbnail: {}", url);
    }
}

fn print_playlist(playlist: &Arc<Playlist>) {
    let videos = playlist.videos();
    let (title, channel, count) = (playlist.title(), playlist.channel(), playlist.video_count());
    println!("id:        {}", playlist.id());
    println!("title:     {}", text(title.get()));
    println!("channel:   {}", text(channel.get()));
    match count.get() {
        Some(n) => println!("videos:    {}", n),
        None => println!("videos:    ?"),
    }

    for (i, video) in videos.get().unwrap_or_default().iter().enumerate() {
        let (title, length) = (video.title(), video.length());
        println!(
            "{:>4}. {}  {}  [{}]",
            i + 1,
            video.id(),
            text(title.get()),
            duration(length.get())
        );
    }
}

fn text(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

fn duration(seconds: Option<u64>) -> String {
    match seconds {
        Some(s) if s >= 3600 => format!("{}:{:02}:{:02}", s / 3600, s % 3600 / 60, s % 60),
        Some(s) => format!("{}:{:02}", s / 60, s % 60),
        None => "-".to_string(),
    }
}
