use image::DynamicImage;
use platter::app::{App, ArtFetch};
use platter::playback::NowPlaying;
use platter::vinyl::{VinylSpin, DEFAULT_STEP_DEGREES};

fn create_test_app(scroll_width: usize) -> App {
    App::new(
        scroll_width,
        VinylSpin::new(32, DEFAULT_STEP_DEGREES),
        true, // show_vinyl
    )
}

fn playing(id: &str, title: &str, artist: &str, art: &str) -> Option<NowPlaying> {
    Some(NowPlaying {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        art_url: Some(art.to_string()),
    })
}

#[test]
fn test_app_initialization() {
    let app = create_test_app(80);
    assert!(app.is_running);
    assert!(app.current_track_id.is_empty());
    assert!(app.track.is_none());
    assert!(app.artwork.image().is_none());
    assert_eq!(app.display_text(), "");
}

#[test]
fn test_first_track_scenario() {
    // Tick 1: playback returns track A, fetch succeeds.
    let mut app = create_test_app(80);
    let fetch = app.apply_playback(playing("A", "Song1", "Artist1", "url1"));
    assert_eq!(
        fetch,
        Some(ArtFetch {
            track_id: "A".to_string(),
            url: "url1".to_string(),
        })
    );

    app.apply_artwork("A", Some(DynamicImage::new_rgb8(16, 16)));
    assert_eq!(app.display_text(), "Song1 - Artist1");
    assert!(app.artwork.image().is_some());
}

#[test]
fn test_same_track_tick_keeps_everything() {
    let mut app = create_test_app(16);
    app.apply_playback(playing("A", "A Song With A Long Name", "Artist1", "url1"));
    app.apply_artwork("A", Some(DynamicImage::new_rgb8(16, 16)));
    app.on_scroll_tick();
    let offset_before = app.scroller.offset();
    assert_eq!(offset_before, 1);

    // Tick 2: same id. No new fetch, text and image unchanged, scroll
    // continues from its prior offset.
    let fetch = app.apply_playback(playing("A", "A Song With A Long Name", "Artist1", "url1"));
    assert!(fetch.is_none());
    assert_eq!(app.scroller.offset(), offset_before);

    app.on_scroll_tick();
    assert_eq!(app.scroller.offset(), offset_before + 1);
}

#[test]
fn test_track_change_scenario() {
    let mut app = create_test_app(16);
    app.apply_playback(playing("A", "A Song With A Long Name", "Artist1", "url1"));
    app.apply_artwork("A", Some(DynamicImage::new_rgb8(16, 16)));
    app.on_scroll_tick();
    app.on_scroll_tick();

    // Tick 3: track B arrives. Scroll resets, id updates, and the old
    // image stays up until the new art decodes.
    let fetch = app.apply_playback(playing("B", "Another Quite Long Song", "Artist2", "url2"));
    assert_eq!(fetch.unwrap().url, "url2");
    assert_eq!(app.current_track_id, "B");
    assert_eq!(app.scroller.offset(), 0);
    assert_eq!(app.artwork.image().unwrap().width(), 16);

    app.apply_artwork("B", Some(DynamicImage::new_rgb8(32, 32)));
    assert_eq!(app.artwork.image().unwrap().width(), 32);
}

#[test]
fn test_failed_fetch_retains_previous_image() {
    let mut app = create_test_app(80);
    app.apply_playback(playing("A", "Song1", "Artist1", "url1"));
    app.apply_artwork("A", Some(DynamicImage::new_rgb8(16, 16)));

    app.apply_playback(playing("B", "Song2", "Artist2", "url2"));
    app.apply_artwork("B", None);

    // Text follows the new track, the previous frame stays on screen.
    assert_eq!(app.display_text(), "Song2 - Artist2");
    assert_eq!(app.artwork.image().unwrap().width(), 16);
}

#[test]
fn test_paused_playback_persists_last_frame() {
    let mut app = create_test_app(80);
    app.apply_playback(playing("A", "Song1", "Artist1", "url1"));
    app.apply_artwork("A", Some(DynamicImage::new_rgb8(16, 16)));

    // Playback pauses: ticks return None indefinitely, nothing moves.
    for _ in 0..5 {
        assert!(app.apply_playback(None).is_none());
    }
    assert_eq!(app.current_track_id, "A");
    assert_eq!(app.display_text(), "Song1 - Artist1");
    assert!(app.artwork.image().is_some());

    // Playback resumes on the same track without refetching.
    assert!(app
        .apply_playback(playing("A", "Song1", "Artist1", "url1"))
        .is_none());
}

#[test]
fn test_render_idempotence() {
    // Rendering the same (image, text) pair twice yields identical lines
    // and requires no further fetch decisions.
    let mut app = create_test_app(80);
    app.apply_playback(playing("A", "Song1", "Artist1", "url1"));
    app.apply_artwork("A", Some(DynamicImage::new_rgb8(16, 16)));

    let first = platter::artwork::render_half_blocks(app.artwork.image().unwrap(), 10, 5);
    let second = platter::artwork::render_half_blocks(app.artwork.image().unwrap(), 10, 5);
    assert_eq!(first, second);
    assert_eq!(app.display_text(), app.display_text());
    assert!(app
        .apply_playback(playing("A", "Song1", "Artist1", "url1"))
        .is_none());
}

#[test]
fn test_vinyl_keeps_spinning_while_paused() {
    let mut app = create_test_app(80);
    app.apply_playback(playing("A", "Song1", "Artist1", "url1"));

    app.apply_playback(None);
    app.on_vinyl_tick();
    app.on_vinyl_tick();
    assert_eq!(app.vinyl.angle(), (2.0 * DEFAULT_STEP_DEGREES).rem_euclid(360.0));
    assert_eq!(app.vinyl.label(), "Song1\nArtist1");
}

#[test]
fn test_quit_stops_the_loop() {
    let mut app = create_test_app(80);
    assert!(app.is_running);
    app.quit();
    assert!(!app.is_running);
}
