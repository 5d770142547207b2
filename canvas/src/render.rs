//! Rendering: draws the scene to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives read-only views of the scene, the transform and the current
//! selection and produces pixels. It does not mutate any engine state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::{FOOTPRINT_ALPHA, REFERENCE_DOT_RADIUS_PX, TICK_LENGTH_PX};
use crate::geometry::Point;
use crate::scene::{Category, Scene, SceneObject};
use crate::transform::{Axis, CanvasTransform};

const AXIS_COLOR: &str = "#333333";
const TARGET_COLOR: &str = "red";
const REFERENCE_COLOR: &str = "blue";
const OUTLINE_COLOR: &str = "black";
const LABEL_FONT: &str = "10px sans-serif";

/// Draw axes, footprints, facing markers and selection highlights.
///
/// `dpr` is the device pixel ratio; everything else is in CSS pixels.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: Option<&Scene>,
    transform: &CanvasTransform,
    tick_count: usize,
    target: Option<&str>,
    reference: Option<&str>,
    dpr: f64,
) -> Result<(), JsValue> {
    let (viewport_w, viewport_h) = transform.viewport();

    // Layer 1: clear.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);

    // Layer 2: axes in the padding band.
    draw_axes(ctx, transform, tick_count)?;

    let Some(scene) = scene else {
        return Ok(());
    };

    // Layer 3: footprints in scene order.
    for obj in scene.objects() {
        let outline = outline_for(&obj.id, target, reference);
        draw_footprint(ctx, obj, transform, outline)?;
    }

    // Layer 4: facing markers on top of every footprint.
    for obj in scene.objects() {
        let dot = transform.to_canvas(obj.footprint().reference);
        ctx.begin_path();
        ctx.arc(dot.x, dot.y, REFERENCE_DOT_RADIUS_PX, 0.0, 2.0 * PI)?;
        ctx.set_fill_style_str(OUTLINE_COLOR);
        ctx.fill();
    }

    Ok(())
}

// =============================================================
// Axes
// =============================================================

fn draw_axes(ctx: &CanvasRenderingContext2d, transform: &CanvasTransform, tick_count: usize) -> Result<(), JsValue> {
    let world = transform.world();
    let origin = transform.origin_px();
    let plot_w = transform.world_len_to_px(world.y_range());
    let plot_h = transform.world_len_to_px(world.x_range());
    let bottom = origin.y + plot_h;

    ctx.set_stroke_style_str(AXIS_COLOR);
    ctx.set_fill_style_str(AXIS_COLOR);
    ctx.set_line_width(1.0);
    ctx.set_font(LABEL_FONT);

    // World x runs down the left edge, world y along the bottom.
    ctx.begin_path();
    ctx.move_to(origin.x, origin.y);
    ctx.line_to(origin.x, bottom);
    ctx.line_to(origin.x + plot_w, bottom);
    ctx.stroke();

    ctx.set_text_align("right");
    ctx.set_text_baseline("middle");
    for tick in transform.ticks(Axis::X, tick_count) {
        ctx.begin_path();
        ctx.move_to(origin.x - TICK_LENGTH_PX, tick.pixel);
        ctx.line_to(origin.x, tick.pixel);
        ctx.stroke();
        ctx.fill_text(&format!("{:.2}", tick.value), origin.x - TICK_LENGTH_PX - 2.0, tick.pixel)?;
    }

    ctx.set_text_align("center");
    ctx.set_text_baseline("top");
    for tick in transform.ticks(Axis::Y, tick_count) {
        ctx.begin_path();
        ctx.move_to(tick.pixel, bottom);
        ctx.line_to(tick.pixel, bottom + TICK_LENGTH_PX);
        ctx.stroke();
        ctx.fill_text(&format!("{:.2}", tick.value), tick.pixel, bottom + TICK_LENGTH_PX + 2.0)?;
    }

    Ok(())
}

// =============================================================
// Objects
// =============================================================

/// Stroke colour and width for an object given the current selection.
fn outline_for(id: &str, target: Option<&str>, reference: Option<&str>) -> (&'static str, f64) {
    if target == Some(id) {
        (TARGET_COLOR, 3.0)
    } else if reference == Some(id) {
        (REFERENCE_COLOR, 2.0)
    } else {
        (OUTLINE_COLOR, 0.5)
    }
}

fn category_color(category: Category) -> &'static str {
    match category {
        Category::Container => "#27AE60",
        Category::Support => "#9B59B6",
        Category::Lid => "#3498DB",
        Category::Basket => "#E67E22",
        Category::Item => "#7F8C8D",
        Category::Base => "#ECF0F1",
        Category::Unclassified => "#BDC3C7",
    }
}

fn draw_footprint(
    ctx: &CanvasRenderingContext2d,
    obj: &SceneObject,
    transform: &CanvasTransform,
    (stroke, stroke_width): (&str, f64),
) -> Result<(), JsValue> {
    let rect = obj.footprint();
    let corners: Vec<Point> = rect.corners.iter().map(|c| transform.to_canvas(*c)).collect();

    ctx.save();
    ctx.begin_path();
    if let Some((first, rest)) = corners.split_first() {
        ctx.move_to(first.x, first.y);
        for c in rest {
            ctx.line_to(c.x, c.y);
        }
    }
    ctx.close_path();

    ctx.set_global_alpha(FOOTPRINT_ALPHA);
    ctx.set_fill_style_str(category_color(obj.category));
    ctx.fill();

    ctx.set_global_alpha(1.0);
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(stroke_width);
    ctx.stroke();

    let label = transform.to_canvas(rect.centroid());
    ctx.set_fill_style_str(OUTLINE_COLOR);
    ctx.set_font(LABEL_FONT);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(&obj.name, label.x, label.y)?;
    ctx.restore();
    Ok(())
}
