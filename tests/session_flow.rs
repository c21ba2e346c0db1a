//! Drives whole sessions tick by tick, without a window or GPU.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use pixel_zoom::{
    AppConfig, AssetSource, CompletionHook, Easing, ExitState, FrameSequence, Session,
    SurfaceInfo, TextureId, TextureRef, Vec2, ZoomComplete, default_completion_hook, load_source,
};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn counting_hook(calls: &Rc<Cell<u32>>) -> CompletionHook {
    let calls = Rc::clone(calls);
    Box::new(move |done: &mut ZoomComplete<'_>| {
        calls.set(calls.get() + 1);
        done.remove_label();
    })
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "pixel-zoom-it-{}-{}",
        name,
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn still_image_fades_in_then_zooms_out_on_click() {
    let calls = Rc::new(Cell::new(0));
    let mut session = Session::mount(
        AppConfig::still("full.png"),
        vec![TextureRef::new(TextureId::new(0), 64, 64)],
        SurfaceInfo::new(1920.0, 1080.0),
        counting_hook(&calls),
    )
    .unwrap();

    // 1920 / 64 = 30, times the 8x zoom
    let cover = 30.0;
    assert_eq!(session.scene().primary().unwrap().scale, Vec2::splat(cover * 8.0));

    // Fade-in trends from 0 to 1 over 0.6 s
    session.tick(0.3);
    let half = session.scene().primary().unwrap().alpha;
    assert!(approx(half, 0.5), "alpha at 0.3s was {half}");
    session.tick(0.3);
    assert_eq!(session.scene().primary().unwrap().alpha, 1.0);
    let fade_in = session.fade_in().unwrap();
    assert!(session.tweens().is_complete(fade_in));

    // The label is partway through its first pulse
    let label_alpha = session.scene().label().unwrap().alpha;
    assert!(approx(label_alpha, 0.6), "label alpha was {label_alpha}");

    assert!(session.pointer_down());
    assert!(!session.pointer_down());
    assert!(matches!(session.interaction().state(), ExitState::Zooming { .. }));
    assert!(session.pulse().is_none());

    // Ease-in-out is exactly halfway at the midpoint
    session.tick(0.5);
    let mid = session.scene().primary().unwrap().scale;
    assert!(approx(mid.x, cover * 8.0 + (cover - cover * 8.0) * Easing::EaseInOut.apply(0.5)));
    assert!(approx(mid.x, 135.0));
    assert_eq!(session.scene().label().unwrap().alpha, 0.0);
    assert_eq!(calls.get(), 0);

    session.tick(0.5);
    assert!(session.is_complete());
    assert_eq!(session.scene().primary().unwrap().scale, Vec2::splat(cover));
    assert_eq!(calls.get(), 1);
    assert!(session.scene().label().is_none());

    // Nothing happens twice
    session.tick(1.0);
    assert!(!session.pointer_down());
    assert_eq!(calls.get(), 1);
    assert_eq!(session.completions(), 1);
    assert_eq!(session.interaction().ignored_presses(), 2);
}

#[test]
fn idle_pulse_keeps_running_until_the_click() {
    let mut session = Session::mount(
        AppConfig::still("full.png"),
        vec![TextureRef::new(TextureId::new(0), 16, 16)],
        SurfaceInfo::new(640.0, 480.0),
        default_completion_hook(),
    )
    .unwrap();
    let pulse = session.pulse().unwrap();

    for _ in 0..40 {
        session.tick(0.25);
    }
    assert_eq!(session.tweens().cycles(pulse), Some(10));
    assert!(session.tweens().is_active(pulse));
    // Ten one-way cycles: back at the starting alpha
    assert!(approx(session.scene().label().unwrap().alpha, 0.0));

    session.tick(0.5);
    assert!(approx(session.scene().label().unwrap().alpha, 0.5));

    session.pointer_down();
    assert!(!session.tweens().is_active(pulse));
    session.tick(2.0);
    assert!(session.scene().label().is_none());
}

#[test]
fn zoom_divides_by_eight_for_any_window() {
    for (w, h) in [(800.0, 600.0), (1080.0, 1920.0), (333.0, 777.0), (2560.0, 1080.0)] {
        let mut session = Session::mount(
            AppConfig::still("full.png").no_label(),
            vec![TextureRef::new(TextureId::new(0), 48, 27)],
            SurfaceInfo::new(w, h),
            default_completion_hook(),
        )
        .unwrap();

        let before = session.scene().primary().unwrap().scale;
        session.pointer_down();
        session.tick(1.0);
        let after = session.scene().primary().unwrap().scale;

        assert!(session.is_complete());
        assert!(approx(after.x, before.x / 8.0), "{w}x{h}: {after}");
        assert!(approx(after.y, before.y / 8.0), "{w}x{h}: {after}");
    }
}

#[test]
fn flip_book_loops_then_zooms_out_without_label() {
    let dir = scratch_dir("flip-book");
    let seq = FrameSequence::new(&dir);
    for i in 0..FrameSequence::DEFAULT_COUNT {
        // Height encodes the index so the order can be checked after decoding
        image::RgbaImage::from_pixel(32, i as u32 + 1, image::Rgba([0, 0, 0, 255]))
            .save(seq.frame_path(i))
            .unwrap();
    }

    let images = load_source(&AssetSource::FrameSequence(seq)).unwrap();
    assert_eq!(images.len(), 59);
    assert!(images.iter().enumerate().all(|(i, img)| img.height == i as u32 + 1));

    let frames: Vec<TextureRef> = images
        .iter()
        .enumerate()
        .map(|(i, img)| TextureRef::new(TextureId::new(i), img.width, img.height))
        .collect();

    let calls = Rc::new(Cell::new(0));
    let mut session = Session::mount(
        AppConfig::flip_book(&dir),
        frames,
        SurfaceInfo::new(800.0, 600.0),
        counting_hook(&calls),
    )
    .unwrap();

    assert!(session.scene().label().is_none());
    let primary = session.scene().primary().unwrap();
    let book = primary.flip_book().unwrap();
    let ids: Vec<usize> = book.frames().iter().map(|t| t.id.index()).collect();
    assert_eq!(ids, (0..59).collect::<Vec<_>>());
    // Centered at native size times the zoom
    assert_eq!(primary.scale, Vec2::splat(8.0));
    assert_eq!(primary.position, Vec2::new(400.0, 300.0));

    // Half a frame per 60 Hz tick: 15 frames in 0.5 s
    session.tick(0.5);
    assert_eq!(session.scene().primary().unwrap().flip_book().unwrap().current_index(), 15);

    // 45 more frames wrap past the end
    session.tick(1.5);
    let book = session.scene().primary().unwrap().flip_book().unwrap();
    assert_eq!(book.current_index(), 1);
    assert_eq!(book.loops(), 1);
    assert!(book.is_playing());
    assert_eq!(session.scene().primary().unwrap().alpha, 1.0);

    assert!(session.pointer_down());
    session.tick(1.0);
    assert!(session.is_complete());
    assert_eq!(session.scene().primary().unwrap().scale, Vec2::splat(1.0));
    assert_eq!(calls.get(), 1);

    // Playback continues after the zoom
    session.tick(0.1);
    assert!(session.scene().primary().unwrap().flip_book().unwrap().is_playing());
    assert_eq!(calls.get(), 1);
}

#[test]
fn missing_frame_aborts_the_load() {
    let dir = scratch_dir("gap");
    let seq = FrameSequence::new(&dir).count(4);
    for i in [0, 1, 3] {
        image::RgbaImage::new(2, 2).save(seq.frame_path(i)).unwrap();
    }

    let err = load_source(&AssetSource::FrameSequence(seq)).unwrap_err();
    assert!(err.to_string().contains("frame_02_delay-0.04s.png"), "{err}");
}
