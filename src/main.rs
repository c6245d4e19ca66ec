use std::{io, path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use human_panic::setup_panic;
use image::DynamicImage;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{info, warn};

use platter::app::{App, ArtFetch};
use platter::artwork::ArtFetcher;
use platter::config::AppConfig;
use platter::display::{self, TargetKind};
use platter::playback::{NowPlaying, SpotifyClient};
use platter::ui;
use platter::vinyl::VinylSpin;

enum AppEvent {
    Input(Event),
    Playback(Option<NowPlaying>),
    Artwork {
        track_id: String,
        image: Option<DynamicImage>,
    },
    ScrollTick,
    VinylTick,
}

/// Platter - fullscreen now-playing display with album art and a spinning vinyl.
#[derive(Parser, Debug)]
#[command(name = "platter", version, about)]
struct Args {
    /// Config file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Playback poll interval in milliseconds
    #[arg(long)]
    refresh_ms: Option<u64>,

    /// Start without the vinyl panel
    #[arg(long)]
    no_vinyl: bool,

    /// Prefer a secondary display target
    #[arg(long)]
    secondary: bool,
}

/// The terminal belongs to the UI, so logs go to a file in the data dir.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let dir = dirs::data_dir()?.join("platter");
    std::fs::create_dir_all(&dir).ok()?;
    let file = tracing_appender::rolling::never(dir, "platter.log");
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic!();
    let args = Args::parse();
    let _log_guard = init_tracing();

    let mut config = AppConfig::load(args.config.as_deref());
    if let Some(ms) = args.refresh_ms {
        config.refresh_ms = ms;
    }
    if args.no_vinyl {
        config.vinyl_enabled = false;
    }
    if args.secondary {
        config.display_target = TargetKind::Secondary;
    }
    anyhow::ensure!(
        !config.client_id.is_empty() && !config.client_secret.is_empty(),
        "missing Spotify credentials: set SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET \
         or fill them in {}",
        AppConfig::default_path().display()
    );

    // Display target is chosen once at startup, not per tick.
    let geometry = display::select_geometry(&display::probe(), config.display_target);
    info!(?geometry, "selected display target");

    let vinyl = match &config.vinyl_texture {
        Some(path) => VinylSpin::from_texture(path, config.art_size, config.vinyl_step_degrees)
            .unwrap_or_else(|e| {
                warn!("falling back to the drawn disc: {e:#}");
                VinylSpin::new(config.art_size, config.vinyl_step_degrees)
            }),
        None => VinylSpin::new(config.art_size, config.vinyl_step_degrees),
    };

    let scroll_width = geometry.width.saturating_sub(4).max(1) as usize;
    let mut app = App::new(scroll_width, vinyl, config.vinyl_enabled);

    // One HTTP client, cloned into every task.
    let client = reqwest::Client::builder()
        .user_agent(concat!("platter/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default();
    let mut spotify = SpotifyClient::new(
        client.clone(),
        &config.client_id,
        &config.client_secret,
        &config.token_cache,
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::channel(100);

    // 1. Input events
    let tx_input = tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            if tx_input.send(AppEvent::Input(event)).await.is_err() {
                break;
            }
        }
    });

    // 2. Playback poll. Errors are logged and swallowed here; the fixed
    // interval itself is the retry.
    let tx_poll = tx.clone();
    let refresh = Duration::from_millis(config.refresh_ms.max(100));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match spotify.current_playback().await {
                Ok(playing) => {
                    if tx_poll.send(AppEvent::Playback(playing)).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("playback poll failed: {e:#}"),
            }
        }
    });

    // 3. Marquee ticks, independent of the data tick.
    let tx_scroll = tx.clone();
    let scroll_interval = Duration::from_millis(config.scroll_ms.max(50));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(scroll_interval);
        loop {
            interval.tick().await;
            if tx_scroll.send(AppEvent::ScrollTick).await.is_err() {
                break;
            }
        }
    });

    // 4. Vinyl ticks
    let tx_vinyl = tx.clone();
    let vinyl_interval = Duration::from_millis(config.vinyl_ms.max(16));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(vinyl_interval);
        loop {
            interval.tick().await;
            if tx_vinyl.send(AppEvent::VinylTick).await.is_err() {
                break;
            }
        }
    });

    let art_size = config.art_size;

    loop {
        terminal.draw(|f| ui::ui(f, &mut app))?;

        if let Some(event) = rx.recv().await {
            match event {
                AppEvent::Input(Event::Key(key)) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit()
                    }
                    KeyCode::Char('v') => app.toggle_vinyl(),
                    _ => {}
                },
                AppEvent::Input(_) => {}
                AppEvent::Playback(playing) => {
                    if let Some(ArtFetch { track_id, url }) = app.apply_playback(playing) {
                        let tx_art = tx.clone();
                        let client = client.clone();
                        tokio::spawn(async move {
                            let fetcher = ArtFetcher::new(client);
                            let image = match fetcher.fetch(&url, art_size).await {
                                Ok(img) => Some(img),
                                Err(e) => {
                                    warn!(%url, "artwork fetch failed: {e}");
                                    None
                                }
                            };
                            let _ = tx_art.send(AppEvent::Artwork { track_id, image }).await;
                        });
                    }
                }
                AppEvent::Artwork { track_id, image } => app.apply_artwork(&track_id, image),
                AppEvent::ScrollTick => app.on_scroll_tick(),
                AppEvent::VinylTick => app.on_vinyl_tick(),
            }
        }

        if !app.is_running {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
