use blockpack_core::{Arrangement, Rect};
use image::{Rgba, RgbaImage};

const BACKGROUND: Rgba<u8> = Rgba([250, 250, 250, 255]);
const LEAF_FILL: Rgba<u8> = Rgba([176, 208, 240, 255]);
const LEAF_EDGE: Rgba<u8> = Rgba([40, 70, 120, 255]);
const GROUP_EDGE: Rgba<u8> = Rgba([220, 40, 40, 255]);

/// Largest preview side in pixels.
const MAX_SIDE: f64 = 16_384.0;

/// Draws every block of `arrangement` (groups as red outlines, leaves as filled boxes).
pub fn render(arrangement: &Arrangement, scale: f64) -> anyhow::Result<RgbaImage> {
    if !(scale.is_finite() && scale > 0.0) {
        anyhow::bail!("preview scale must be positive, got {}", scale);
    }
    let w = (arrangement.root.w * scale).ceil();
    let h = (arrangement.root.h * scale).ceil();
    if w > MAX_SIDE || h > MAX_SIDE {
        anyhow::bail!("preview too large: {}x{} px", w, h);
    }
    let mut canvas = RgbaImage::from_pixel(w.max(1.0) as u32, h.max(1.0) as u32, BACKGROUND);

    // Leaves first so group outlines stay visible on top.
    let flat = arrangement.flatten();
    for fb in flat.iter().filter(|f| !f.group) {
        let r = to_pixels(&fb.frame, scale);
        fill(&mut canvas, r, LEAF_FILL);
        outline(&mut canvas, r, LEAF_EDGE);
    }
    for fb in flat.iter().filter(|f| f.group) {
        outline(&mut canvas, to_pixels(&fb.frame, scale), GROUP_EDGE);
    }
    Ok(canvas)
}

/// (x, y, w, h) in whole pixels.
fn to_pixels(r: &Rect, scale: f64) -> (u32, u32, u32, u32) {
    let x = (r.x * scale).round() as u32;
    let y = (r.y * scale).round() as u32;
    let right = (r.right() * scale).round() as u32;
    let bottom = (r.bottom() * scale).round() as u32;
    (x, y, right.saturating_sub(x), bottom.saturating_sub(y))
}

fn fill(canvas: &mut RgbaImage, (x, y, w, h): (u32, u32, u32, u32), color: Rgba<u8>) {
    let (cw, ch) = canvas.dimensions();
    for yy in y..(y + h).min(ch) {
        for xx in x..(x + w).min(cw) {
            canvas.put_pixel(xx, yy, color);
        }
    }
}

fn outline(canvas: &mut RgbaImage, (x, y, w, h): (u32, u32, u32, u32), color: Rgba<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    let (cw, ch) = canvas.dimensions();
    let rx = x + w - 1;
    let by = y + h - 1;
    for xx in x..=rx {
        if xx < cw && y < ch {
            canvas.put_pixel(xx, y, color);
        }
        if xx < cw && by < ch {
            canvas.put_pixel(xx, by, color);
        }
    }
    for yy in y..=by {
        if x < cw && yy < ch {
            canvas.put_pixel(x, yy, color);
        }
        if rx < cw && yy < ch {
            canvas.put_pixel(rx, yy, color);
        }
    }
}
