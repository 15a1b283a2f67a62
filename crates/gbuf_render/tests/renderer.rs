//! Renderer behavior observed through the recording surface

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gbuf_image::ImagePayload;
use gbuf_paint::{Circle, Color, PaintCommand, PaintContext, Point, Rect, TextAlign};
use gbuf_render::{
    Arg, Frame, RawCommand, RenderStats, Renderer, RendererConfig, Subscription,
};
use serde_json::json;

fn renderer(width: u32, height: u32) -> Renderer<PaintContext> {
    Renderer::new(
        PaintContext::new(width, height),
        RendererConfig::with_size(width, height),
    )
}

fn cmd(name: &str, args: &[f64]) -> RawCommand {
    RawCommand::new(name, args.iter().map(|v| Arg::Number(*v)))
}

fn last(renderer: &Renderer<PaintContext>) -> &PaintCommand {
    renderer
        .surface()
        .commands()
        .last()
        .expect("at least one paint command")
}

fn count<F: Fn(&PaintCommand) -> bool>(renderer: &Renderer<PaintContext>, f: F) -> usize {
    renderer.surface().commands().iter().filter(|c| f(c)).count()
}

const SCENARIO_A: &str = r#"{"commands":[
    {"cmd":"setwindow","args":[0,0,100,100]},
    {"cmd":"setcolor","args":[4]},
    {"cmd":"fcircle","args":[50,50,10]}
]}"#;

#[test]
fn test_new_clears_to_background() {
    let r = renderer(64, 32);
    assert_eq!(
        r.surface().commands(),
        &[PaintCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 64.0, 32.0),
            color: Color::WHITE,
        }]
    );
    assert_eq!(r.scale(), 1.0);
    assert!(r.source_dimensions().is_none());
}

#[test]
fn test_scenario_filled_circle_in_window() {
    let mut r = renderer(200, 200);
    r.render_json(SCENARIO_A);

    assert_eq!(r.scale(), 2.0);
    assert_eq!(
        last(&r),
        &PaintCommand::FillCircle {
            circle: Circle::new(Point::new(100.0, 100.0), 20.0),
            color: Color::rgb(0xFF, 0x00, 0x00),
        }
    );

    let dims = r.source_dimensions().unwrap();
    assert_eq!((dims.width, dims.height), (100.0, 100.0));
    assert_eq!(r.window_bounds().unwrap().urx, 100.0);
}

#[test]
fn test_scenario_text_at_pen() {
    let mut r = renderer(640, 480);
    r.render_commands(Frame::new(vec![
        cmd("moveto", &[0.0, 0.0]),
        cmd("lineto", &[10.0, 0.0]),
        RawCommand::new("drawtext", [Arg::from("hi")]),
    ]));

    let texts: Vec<_> = r.surface().texts().collect();
    assert_eq!(texts.len(), 1);
    let (text, position, style) = texts[0];
    assert_eq!(text, "hi");
    assert_eq!(position, Point::new(10.0, 480.0));
    assert_eq!(style.align, TextAlign::Start);
    assert_eq!(style.family, "Helvetica");
    assert_eq!(r.stats().text_command_count, 1);
}

#[test]
fn test_scenario_background_independent_of_color() {
    let mut r = renderer(100, 50);
    r.render_commands(Frame::new(vec![
        cmd("setbackground", &[7.0]),
        cmd("setcolor", &[4.0]),
    ]));

    assert_eq!(r.state().background, Color::WHITE);
    assert_eq!(r.state().color, Color::rgb(0xFF, 0x00, 0x00));
    assert_eq!(
        count(&r, |c| matches!(
            c,
            PaintCommand::FillRect { rect, color }
                if *rect == Rect::new(0.0, 0.0, 100.0, 50.0) && *color == Color::WHITE
        )),
        3
    );
}

#[test]
fn test_setbackground_fills_immediately() {
    let mut r = renderer(10, 10);
    r.render_commands(Frame::new(vec![cmd("setbackground", &[1.0])]));
    assert_eq!(
        last(&r),
        &PaintCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            color: Color::rgb(0x00, 0x00, 0xFF),
        }
    );

    // the next frame starts from the configured background again
    r.render_commands(Frame::default());
    assert_eq!(r.state().background, Color::WHITE);
}

#[test]
fn test_unknown_command_does_not_stop_frame() {
    let mut r = renderer(100, 100);
    r.render_commands(Frame::new(vec![
        cmd("teleport", &[1.0, 2.0]),
        cmd("circle", &[50.0, 50.0, 5.0]),
    ]));

    assert!(matches!(last(&r), PaintCommand::StrokeCircle { .. }));
    assert_eq!(r.stats().command_count, 2);
    assert_eq!(r.stats().error_count, 0);
}

#[test]
fn test_bad_arguments_are_isolated() {
    let mut r = renderer(100, 100);
    r.render_commands(Frame::new(vec![
        cmd("circle", &[1.0]),
        RawCommand::new("line", [Arg::from("a"), Arg::from(1), Arg::from(2), Arg::from(3)]),
        cmd("poly", &[0.0, 0.0, 1.0, 1.0]),
        cmd("fcircle", &[50.0, 50.0, 5.0]),
    ]));

    assert_eq!(r.stats().error_count, 3);
    assert_eq!(r.stats().command_count, 4);
    assert!(matches!(last(&r), PaintCommand::FillCircle { .. }));
}

#[test]
fn test_gsave_grestore_within_frame() {
    let mut r = renderer(100, 100);
    r.render_commands(Frame::new(vec![
        cmd("setcolor", &[4.0]),
        cmd("setlwidth", &[300.0]),
        cmd("gsave", &[]),
        cmd("setcolor", &[1.0]),
        cmd("setlwidth", &[900.0]),
        cmd("setjust", &[1.0]),
        cmd("grestore", &[]),
        cmd("grestore", &[]),
    ]));

    let state = r.state();
    assert_eq!(state.color, Color::rgb(0xFF, 0x00, 0x00));
    assert_eq!(state.line_width, 3.0);
    assert_eq!(state.justification.align(), TextAlign::Start);
    assert_eq!(r.stats().error_count, 0);
}

#[test]
fn test_frame_resets_state_but_keeps_window() {
    let mut r = renderer(200, 200);
    r.render_json(SCENARIO_A);
    r.render_commands(Frame::new(vec![cmd("fcircle", &[50.0, 50.0, 10.0])]));

    assert_eq!(r.scale(), 2.0);
    assert_eq!(
        last(&r),
        &PaintCommand::FillCircle {
            circle: Circle::new(Point::new(100.0, 100.0), 20.0),
            color: Color::BLACK,
        }
    );
}

#[test]
fn test_setwindow_is_not_retroactive() {
    let mut r = renderer(200, 200);
    r.render_commands(Frame::new(vec![
        cmd("fcircle", &[10.0, 10.0, 1.0]),
        cmd("setwindow", &[0.0, 0.0, 100.0, 100.0]),
        cmd("fcircle", &[10.0, 10.0, 1.0]),
    ]));

    let circles: Vec<Circle> = r
        .surface()
        .commands()
        .iter()
        .filter_map(|c| match c {
            PaintCommand::FillCircle { circle, .. } => Some(*circle),
            _ => None,
        })
        .collect();
    assert_eq!(circles[0], Circle::new(Point::new(10.0, 190.0), 1.0));
    assert_eq!(circles[1], Circle::new(Point::new(20.0, 180.0), 2.0));
}

#[test]
fn test_rotated_text_pivots_about_anchor() {
    let mut r = renderer(100, 100);
    r.render_commands(Frame::new(vec![
        cmd("moveto", &[20.0, 30.0]),
        cmd("setorientation", &[1.0]),
        RawCommand::new("drawtext", [Arg::from("up")]),
    ]));

    let commands = r.surface().commands();
    let n = commands.len();
    assert!(matches!(commands[n - 5], PaintCommand::Save));
    assert!(matches!(commands[n - 1], PaintCommand::Restore));
    match &commands[n - 2] {
        PaintCommand::DrawText {
            text,
            position,
            transform,
            ..
        } => {
            assert_eq!(text, "up");
            assert_eq!(*position, Point::ZERO);
            let anchor = transform.apply(Point::ZERO);
            assert!((anchor.x - 20.0).abs() < 1e-4);
            assert!((anchor.y - 70.0).abs() < 1e-4);
        }
        other => panic!("expected text, got {other:?}"),
    }
    assert_eq!(r.surface().save_depth(), 0);
}

#[test]
fn test_empty_text_draws_nothing() {
    let mut r = renderer(100, 100);
    r.render_commands(Frame::new(vec![RawCommand::new("drawtext", [Arg::from(0)])]));
    assert_eq!(r.surface().texts().count(), 0);
    assert_eq!(r.stats().text_command_count, 1);
}

#[test]
fn test_setclipregion_is_accepted() {
    let mut r = renderer(100, 100);
    r.render_commands(Frame::new(vec![cmd("setclipregion", &[0.0, 0.0, 5.0, 5.0])]));
    assert_eq!(r.stats().error_count, 0);
}

#[test]
fn test_stats_sink_receives_every_frame() {
    let seen: Rc<RefCell<Vec<RenderStats>>> = Rc::default();
    let mut r = renderer(100, 100);
    let sink = Rc::clone(&seen);
    r.on_stats(move |stats| sink.borrow_mut().push(stats.clone()));

    r.render_json(SCENARIO_A);
    r.render_commands(Frame::new(vec![RawCommand::new("drawtext", [Arg::from("x")])]));

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].command_count, 3);
    assert_eq!(seen[1].text_command_count, 1);
    assert!(seen[1].timestamp.is_some());
}

#[test]
fn test_invalid_json_leaves_surface_untouched() {
    let mut r = renderer(10, 10);
    let before = r.surface().commands().len();
    r.render_json("{not json");
    r.render_json(r#"{"frames":[]}"#);
    assert_eq!(r.surface().commands().len(), before);
    assert!(r.last_frame().is_none());
}

#[test]
fn test_handle_datapoint_envelope() {
    let mut r = renderer(200, 200);
    r.handle_datapoint(&json!({
        "name": "graphics/main",
        "value": SCENARIO_A,
    }));
    assert_eq!(r.stats().command_count, 3);
    assert_eq!(r.scale(), 2.0);
}

#[test]
fn test_resize_replays_last_frame() {
    let mut r = renderer(200, 200);
    r.render_json(SCENARIO_A);
    r.resize(400, 400);

    assert_eq!(r.scale(), 4.0);
    assert_eq!(r.config().width, 400);
    assert_eq!(
        last(&r),
        &PaintCommand::FillCircle {
            circle: Circle::new(Point::new(200.0, 200.0), 40.0),
            color: Color::rgb(0xFF, 0x00, 0x00),
        }
    );
    assert_eq!(
        count(&r, |c| matches!(c, PaintCommand::Resize { width: 400, height: 400 })),
        1
    );
}

#[test]
fn test_resize_without_frame_clears() {
    let mut r = renderer(20, 20);
    r.resize(30, 10);
    assert_eq!(
        last(&r),
        &PaintCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 30.0, 10.0),
            color: Color::WHITE,
        }
    );
}

fn image_frame(first_with_payload: bool) -> Frame {
    let payload = ImagePayload::from_raw(2, 1, 3, &[255, 0, 0, 0, 0, 255]);
    let mut first = RawCommand::new(
        "drawimage",
        [0.0, 0.0, 10.0, 10.0]
            .into_iter()
            .map(Arg::Number)
            .chain([Arg::from("img")]),
    );
    if first_with_payload {
        first = first.with_image(payload);
    }
    let second = RawCommand::new(
        "drawimage",
        [20.0, 20.0, 30.0, 30.0]
            .into_iter()
            .map(Arg::Number)
            .chain([Arg::from("img")]),
    );
    Frame::new(vec![first, second])
}

fn bitmap_draws(r: &Renderer<PaintContext>) -> usize {
    count(r, |c| matches!(c, PaintCommand::DrawBitmap { .. }))
}

#[test]
fn test_image_decoded_once_and_reused_in_frame() {
    let mut r = renderer(100, 100);
    r.render_commands(image_frame(true));

    assert_eq!(bitmap_draws(&r), 2);
    assert_eq!(r.cached_images(), 1);
    match last(&r) {
        PaintCommand::DrawBitmap { bitmap, dest } => {
            assert_eq!(bitmap.pixel(0, 0), Some([255, 0, 0, 255]));
            assert_eq!(bitmap.pixel(1, 0), Some([0, 0, 255, 255]));
            assert_eq!(*dest, Rect::new(20.0, 70.0, 10.0, 10.0));
        }
        other => panic!("expected bitmap, got {other:?}"),
    }
}

#[test]
fn test_image_cache_does_not_outlive_frame() {
    let mut r = renderer(100, 100);
    r.render_commands(image_frame(true));
    let before = bitmap_draws(&r);

    r.render_commands(image_frame(false));
    assert_eq!(bitmap_draws(&r), before);
    assert_eq!(r.cached_images(), 0);
    assert_eq!(r.stats().error_count, 0);
}

fn deferred_renderer() -> Renderer<PaintContext> {
    let config = RendererConfig {
        deferred_decode: true,
        ..RendererConfig::with_size(100, 100)
    };
    Renderer::new(PaintContext::new(100, 100), config)
}

#[test]
fn test_deferred_decode_draws_on_completion() {
    let mut r = deferred_renderer();
    r.render_commands(image_frame(true));

    assert_eq!(bitmap_draws(&r), 0);
    assert_eq!(r.pending_decodes().len(), 1);

    assert_eq!(r.flush_decodes(), 1);
    assert_eq!(bitmap_draws(&r), 2);
    assert!(r.pending_decodes().is_empty());
}

#[test]
fn test_stale_decode_is_discarded() {
    let mut r = deferred_renderer();
    r.render_commands(image_frame(true));
    let jobs = r.take_pending_decodes();
    assert_eq!(jobs.len(), 1);

    // a newer frame supersedes the one that queued the decode
    r.render_commands(Frame::default());

    for job in jobs {
        let decoded = job.decode().unwrap();
        assert!(!r.complete_decode(decoded));
    }
    assert_eq!(bitmap_draws(&r), 0);
}

#[test]
fn test_dispose_cancels_subscriptions_once() {
    let cancelled = Rc::new(Cell::new(0));
    let mut r = renderer(100, 100);
    let flag = Rc::clone(&cancelled);
    r.attach_subscription(Subscription::new(move || flag.set(flag.get() + 1)));
    r.render_commands(image_frame(true));

    r.dispose();
    r.dispose();

    assert_eq!(cancelled.get(), 1);
    assert_eq!(r.cached_images(), 0);
    assert!(r.last_frame().is_none());
}
