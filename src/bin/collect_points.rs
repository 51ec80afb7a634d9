use ipm_picker::annotate::{annotate_points, mark_click, write_artifacts};
use ipm_picker::camera::CameraParams;
use ipm_picker::capture::{CalibrationFrame, ImageFileSource};
use ipm_picker::config::{self, CollectConfig};
use ipm_picker::session::{step, Effect, Phase, SessionContext, PHASE_TWO_CLICKS};
use ipm_picker::types::POINT_COUNT;
use image::RgbImage;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = config::load_config(Path::new(&config_path))?;

    let params = CameraParams::load(&config.params).map_err(|e| e.to_string())?;
    let mut source = ImageFileSource::open(&config.input);
    let frame = CalibrationFrame::acquire(&mut source, &params, config.display_width)
        .map_err(|e| e.to_string())?;
    println!(
        "Captured {}x{} frame, display scale {:.4}",
        frame.full.width(),
        frame.full.height(),
        frame.scale.factor()
    );

    let mut preview = frame.display.clone();
    let mut ctx = SessionContext::new(frame.scale);
    for event in &config.events {
        let (next, effects) = step(ctx, &event.to_event());
        ctx = next;
        for effect in &effects {
            apply_effect(effect, &mut preview);
        }
        if ctx.is_terminal() {
            break;
        }
    }

    match ctx.phase() {
        Phase::Complete => finish(&config, &frame, &preview, &ctx),
        Phase::Cancelled => {
            println!("Session cancelled; no artifacts written");
            Ok(())
        }
        phase => Err(format!(
            "event script ended before the session completed (phase {phase:?})"
        )),
    }
}

fn apply_effect(effect: &Effect, preview: &mut RgbImage) {
    match effect {
        Effect::ClickMarked { display, ordinal } => {
            mark_click(preview, *display, *ordinal);
            println!("Click {ordinal} at display ({:.1}, {:.1})", display.x, display.y);
        }
        Effect::VirtualPointInferred { point } => {
            println!(
                ">>> Virtual point at source coordinates ({:.4}, {:.4})",
                point.x, point.y
            );
        }
        Effect::AwaitingCornerIndex => {
            println!("Enter the corner index (1-4) the virtual point occupies");
        }
        Effect::CornerIndexDefaulted { raw } => {
            println!("Invalid corner index {raw:?}, defaulting to corner 1");
        }
        Effect::DegenerateSegments => {
            println!("Segments are parallel or coincident; re-click both segments");
        }
        Effect::RemainingPhaseStarted { occupied_slot } => {
            println!(
                "Virtual point occupies corner {}; click the remaining {} points",
                occupied_slot + 1,
                PHASE_TWO_CLICKS
            );
        }
        Effect::Completed => println!("All four points collected"),
        Effect::Cancelled => println!("Abort received"),
    }
}

fn finish(
    config: &CollectConfig,
    frame: &CalibrationFrame,
    preview: &RgbImage,
    ctx: &SessionContext,
) -> Result<(), String> {
    let points = ctx
        .completed_points()
        .ok_or("session reported complete without a full point set")?;

    println!("{}", "=".repeat(40));
    println!("Final source-resolution coordinates:");
    for slot in 0..POINT_COUNT {
        if let Some(p) = points.get(slot) {
            println!("Point {}: [{:.4}, {:.4}]", slot + 1, p.x, p.y);
        }
    }
    println!("{}", "=".repeat(40));

    let annotated = annotate_points(&frame.full, points, &frame.scale);
    write_artifacts(
        &annotated,
        points,
        &config.output.annotated_image,
        &config.output.points_txt,
    )
    .map_err(|e| e.to_string())?;
    println!("Saved image to {}", config.output.annotated_image.display());
    println!("Saved coordinates to {}", config.output.points_txt.display());

    if let Some(path) = &config.output.preview_image {
        preview
            .save(path)
            .map_err(|e| format!("failed to save preview {}: {e}", path.display()))?;
        println!("Saved preview to {}", path.display());
    }
    Ok(())
}

fn usage() -> String {
    "Usage: collect_points <config.json>".to_string()
}
