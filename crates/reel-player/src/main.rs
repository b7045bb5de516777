//! Reel Player - Main Entry Point

mod cli;

use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use reel_engine::{FailedCodecRecord, MemoryStore, PlayerSession, SessionOptions};
use reel_media::{
    detect_supported_codecs, MediaPlayer, PlaybackErrorCode, PlayerEvent, VideoElement,
};
use reel_net::{capability_url, CapabilityClient, HttpCapabilityClient, ResourceLoader};
use reel_source::{
    public_watch_url, resolve_environment, Location, PlaybackConfig, ResolvedEnvironment,
    SourceBuilder,
};
use tracing_subscriber::EnvFilter;

use cli::{CliArgs, Command};

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let location = Location::parse(&args.page_url)
        .with_context(|| format!("Bad page URL {}", args.page_url))?;
    let env = resolve_environment(&location, &config);
    tracing::info!(
        "Reel Player v{} ({:?}, {:?}, {})",
        reel_engine::VERSION,
        env.environment,
        env.served_by,
        env.base_url
    );

    match args.command {
        Command::Codecs { answers } => {
            let element = answers
                .into_iter()
                .fold(VideoElement::new(), |el, (mime, answer)| el.with_support(&mime, answer));
            println!("{}", detect_supported_codecs(Some(&element)));
        }
        Command::Sources { ref id, ref extension, .. } => {
            let availability = args.command.availability();
            let builder = SourceBuilder::new(env, detect_supported_codecs(Some(&VideoElement::new())));
            for source in builder.list(id, availability, extension)? {
                let marker = if source.selected { "*" } else { " " };
                println!("{marker} {:<8} {}", source.label, source.src);
            }
        }
        Command::Capability => {
            let client = http_client()?;
            println!("{}", capability_url(&env.base_url));
            let result = smol::block_on(client.transcoding_enabled(&env.base_url));
            match &result {
                Ok(enabled) => println!("transcoding enabled: {enabled}"),
                Err(e) => println!("capability check failed: {e}"),
            }
            println!(
                "fallback: {:?}",
                reel_engine::CapabilityFlag::from_check(&result)
            );
        }
        Command::WatchUrl => println!("{}", public_watch_url(&env, &config)),
        Command::Simulate { id, extension, failures } => simulate(env, &id, &extension, failures)?,
    }

    Ok(())
}

/// File settings (if any) with `REEL_*` overrides on top
fn load_config(path: Option<&std::path::Path>) -> Result<PlaybackConfig> {
    let config = match path {
        Some(path) => PlaybackConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => PlaybackConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn http_client() -> Result<HttpCapabilityClient> {
    let loader = ResourceLoader::new().context("Failed to create HTTP client")?;
    Ok(HttpCapabilityClient::new(loader))
}

/// Load a video into an in-memory element and fail its source `failures`
/// times against the real capability endpoint
fn simulate(env: ResolvedEnvironment, id: &str, extension: &str, failures: usize) -> Result<()> {
    let base_url = env.base_url.clone();
    let builder = SourceBuilder::new(env, detect_supported_codecs(Some(&VideoElement::new())));
    let sources = builder.list(id, Default::default(), extension)?;

    let store = Rc::new(MemoryStore::new());
    let client = Rc::new(http_client()?);
    let session = PlayerSession::new(
        VideoElement::new(),
        client,
        store.clone(),
        &base_url,
        SessionOptions::new().autoplay(true),
    );
    session.load_sources(&sources);
    println!("load    {}", session.with_player(|p| p.current_src().to_string()));

    smol::block_on(async {
        for _ in 0..failures {
            session.with_player_mut(|p| {
                p.inner_mut().fail(PlaybackErrorCode::SrcNotSupported, "simulated decode failure")
            });
            session.handle_event(PlayerEvent::Error).await;

            let src = session.with_player(|p| p.current_src().to_string());
            println!("error   {:?} -> {}", session.fallback_state(), src);

            session.with_player_mut(|p| p.inner_mut().load_metadata(f64::NAN));
            session.handle_event(PlayerEvent::LoadedMetadata).await;
        }
    });

    let failed = FailedCodecRecord::new(store).load(id);
    println!("capability {:?}, failed codecs {:?}", session.capability(), failed);
    session.dispose();
    Ok(())
}
