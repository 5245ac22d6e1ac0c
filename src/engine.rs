// ============================================================================
// RENDERING ENGINE — the boundary the editor drives, backed by `image`
// ============================================================================
//
// The editor never touches pixels itself. Everything above this module
// speaks four verbs: load_image, set_operations, apply_and_render,
// export_image (plus set_transform for the compositing-level settings).
//
// `apply_and_render` always starts from the retained source buffer and
// replays the full operation list, so re-rendering with unchanged inputs
// is idempotent and repeated edits never compound on an already-filtered
// buffer.
// ============================================================================

use std::collections::HashMap;
use std::fmt;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgba, RgbaImage, imageops};
use uuid::Uuid;

use crate::ops::transform::{BlendMode, TransformState};

/// Seed for the deterministic noise hash. Fixed so that re-rendering the
/// same state produces bit-identical output.
const NOISE_SEED: u32 = 0x5EED_F00D;

/// Canvas background the image is composited over when opacity or a
/// non-normal blend mode is in effect (white, as on a fresh canvas).
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

// ============================================================================
// Primitive operations
// ============================================================================

/// A single primitive image operation, already scaled to engine units.
/// The pipeline resolves UI state into an ordered list of these.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageOp {
    /// Additive brightness, -1.0..1.0 of full scale.
    Brightness(f32),
    /// Contrast, -1.0..1.0 of full scale.
    Contrast(f32),
    /// Saturation multiplier; 1.0 is neutral.
    Saturation(f32),
    /// Hue rotation in degrees.
    HueRotate(f32),
    Grayscale,
    Sepia,
    Invert,
    /// Gaussian blur sigma.
    Blur(f32),
    /// Fixed 3×3 sharpen convolution.
    Sharpen,
    /// Fixed 3×3 edge-detect convolution.
    EdgeDetect,
    /// Per-pixel noise amplitude (0..500 of 8-bit scale).
    Noise(f32),
    /// Mosaic block size in pixels.
    Pixelate(u32),
}

/// Opaque id for an image owned by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageHandle(Uuid);

impl ImageHandle {
    pub(crate) fn fresh() -> Self {
        ImageHandle(Uuid::new_v4())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg { quality: u8 },
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg { .. } => "jpg",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EngineError {
    Decode(String),
    Encode(String),
    UnknownHandle,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Decode(e) => write!(f, "image decode failed: {}", e),
            EngineError::Encode(e) => write!(f, "image encode failed: {}", e),
            EngineError::UnknownHandle => write!(f, "unknown image handle"),
        }
    }
}

impl std::error::Error for EngineError {}

/// The four verbs the pipeline depends on, plus the compositing-level
/// transform used by the session. Implemented by [`RasterEngine`] in
/// production and by a recording fake in the pipeline tests.
pub trait RenderEngine {
    /// Decode `bytes` and retain the result as an immutable source buffer.
    fn load_image(&mut self, bytes: &[u8]) -> Result<ImageHandle, EngineError>;

    /// Replace the ordered operation list for `handle`. Unknown handles are
    /// ignored (and logged) — a stale handle must never crash the UI.
    fn set_operations(&mut self, handle: ImageHandle, ops: &[ImageOp]);

    /// Replace the object-level transform for `handle`.
    fn set_transform(&mut self, handle: ImageHandle, transform: &TransformState);

    /// Re-render from the source buffer: operation list first, then the
    /// transform. Idempotent for unchanged inputs.
    fn apply_and_render(&mut self, handle: ImageHandle) -> Result<(), EngineError>;

    /// Encode the last rendered output.
    fn export_image(
        &self,
        handle: ImageHandle,
        format: ExportFormat,
    ) -> Result<Vec<u8>, EngineError>;
}

// ============================================================================
// RasterEngine — production implementation
// ============================================================================

struct Slot {
    source: RgbaImage,
    ops: Vec<ImageOp>,
    transform: TransformState,
    rendered: RgbaImage,
}

/// CPU engine backed by the `image` crate.
#[derive(Default)]
pub struct RasterEngine {
    slots: HashMap<ImageHandle, Slot>,
}

impl RasterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last rendered output, for display.
    pub fn rendered(&self, handle: ImageHandle) -> Option<&RgbaImage> {
        self.slots.get(&handle).map(|s| &s.rendered)
    }

    /// Dimensions of the source buffer.
    pub fn source_dimensions(&self, handle: ImageHandle) -> Option<(u32, u32)> {
        self.slots.get(&handle).map(|s| s.source.dimensions())
    }

    /// Drop an image and everything derived from it.
    pub fn unload(&mut self, handle: ImageHandle) {
        self.slots.remove(&handle);
    }
}

impl RenderEngine for RasterEngine {
    fn load_image(&mut self, bytes: &[u8]) -> Result<ImageHandle, EngineError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| EngineError::Decode(e.to_string()))?
            .into_rgba8();
        let handle = ImageHandle::fresh();
        self.slots.insert(
            handle,
            Slot {
                rendered: decoded.clone(),
                source: decoded,
                ops: Vec::new(),
                transform: TransformState::default(),
            },
        );
        Ok(handle)
    }

    fn set_operations(&mut self, handle: ImageHandle, ops: &[ImageOp]) {
        match self.slots.get_mut(&handle) {
            Some(slot) => slot.ops = ops.to_vec(),
            None => crate::log_warn!("set_operations on unknown handle {:?}", handle),
        }
    }

    fn set_transform(&mut self, handle: ImageHandle, transform: &TransformState) {
        match self.slots.get_mut(&handle) {
            Some(slot) => slot.transform = *transform,
            None => crate::log_warn!("set_transform on unknown handle {:?}", handle),
        }
    }

    fn apply_and_render(&mut self, handle: ImageHandle) -> Result<(), EngineError> {
        let slot = self.slots.get_mut(&handle).ok_or(EngineError::UnknownHandle)?;

        // Pixel-filter stage: replay the op list against the pristine source.
        let mut out = slot.source.clone();
        for op in &slot.ops {
            out = apply_op(out, *op);
        }

        // Compositing stage: overlay tint, flips, rotation, then opacity /
        // blend against the canvas background.
        let t = &slot.transform;
        if t.overlay.is_active() {
            out = tint(out, t.overlay.color, t.overlay.opacity);
        }
        if t.flip_horizontal {
            out = imageops::flip_horizontal(&out);
        }
        if t.flip_vertical {
            out = imageops::flip_vertical(&out);
        }
        out = match t.angle {
            a if a == 0.0 => out,
            a if a == 90.0 => imageops::rotate90(&out),
            a if a == 180.0 => imageops::rotate180(&out),
            a if a == 270.0 => imageops::rotate270(&out),
            a => rotate_bilinear(&out, a),
        };
        if t.opacity < 1.0 || t.blend_mode != BlendMode::Normal {
            out = composite_over_background(&out, t.blend_mode, t.opacity);
        }

        slot.rendered = out;
        Ok(())
    }

    fn export_image(
        &self,
        handle: ImageHandle,
        format: ExportFormat,
    ) -> Result<Vec<u8>, EngineError> {
        let slot = self.slots.get(&handle).ok_or(EngineError::UnknownHandle)?;
        let img = &slot.rendered;
        let mut bytes: Vec<u8> = Vec::new();
        match format {
            ExportFormat::Png => {
                PngEncoder::new(&mut bytes)
                    .write_image(
                        img.as_raw(),
                        img.width(),
                        img.height(),
                        image::ColorType::Rgba8,
                    )
                    .map_err(|e| EngineError::Encode(e.to_string()))?;
            }
            ExportFormat::Jpeg { quality } => {
                // JPEG has no alpha — flatten to RGB first.
                let rgb = image::DynamicImage::ImageRgba8(img.clone()).into_rgb8();
                JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
                    .write_image(
                        rgb.as_raw(),
                        rgb.width(),
                        rgb.height(),
                        image::ColorType::Rgb8,
                    )
                    .map_err(|e| EngineError::Encode(e.to_string()))?;
            }
        }
        Ok(bytes)
    }
}

// ============================================================================
// Primitive op application
// ============================================================================

fn apply_op(img: RgbaImage, op: ImageOp) -> RgbaImage {
    match op {
        ImageOp::Brightness(b) => {
            let offset = b * 255.0;
            per_pixel(img, |r, g, bl, a| (r + offset, g + offset, bl + offset, a))
        }
        ImageOp::Contrast(c) => {
            // Standard contrast curve with c mapped onto the -255..255 scale.
            let c = c * 255.0;
            let factor = (259.0 * (c + 255.0)) / (255.0 * (259.0 - c));
            per_pixel(img, move |r, g, b, a| {
                (
                    factor * (r - 128.0) + 128.0,
                    factor * (g - 128.0) + 128.0,
                    factor * (b - 128.0) + 128.0,
                    a,
                )
            })
        }
        ImageOp::Saturation(mult) => per_pixel(img, move |r, g, b, a| {
            let (h, s, l) = rgb_to_hsl(r / 255.0, g / 255.0, b / 255.0);
            let (nr, ng, nb) = hsl_to_rgb(h, (s * mult).clamp(0.0, 1.0), l);
            (nr * 255.0, ng * 255.0, nb * 255.0, a)
        }),
        ImageOp::HueRotate(degrees) => per_pixel(img, move |r, g, b, a| {
            let (h, s, l) = rgb_to_hsl(r / 255.0, g / 255.0, b / 255.0);
            let nh = (h + degrees / 360.0).rem_euclid(1.0);
            let (nr, ng, nb) = hsl_to_rgb(nh, s, l);
            (nr * 255.0, ng * 255.0, nb * 255.0, a)
        }),
        ImageOp::Grayscale => per_pixel(img, |r, g, b, a| {
            // BT.709 luminance weights.
            let lum = 0.2126 * r + 0.7152 * g + 0.0722 * b;
            (lum, lum, lum, a)
        }),
        ImageOp::Sepia => per_pixel(img, |r, g, b, a| {
            (
                0.393 * r + 0.769 * g + 0.189 * b,
                0.349 * r + 0.686 * g + 0.168 * b,
                0.272 * r + 0.534 * g + 0.131 * b,
                a,
            )
        }),
        ImageOp::Invert => per_pixel(img, |r, g, b, a| (255.0 - r, 255.0 - g, 255.0 - b, a)),
        ImageOp::Blur(sigma) => {
            if sigma <= 0.0 {
                img
            } else {
                imageops::blur(&img, sigma)
            }
        }
        ImageOp::Sharpen => imageops::filter3x3(&img, &[0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0]),
        ImageOp::EdgeDetect => {
            imageops::filter3x3(&img, &[-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0])
        }
        ImageOp::Noise(amount) => {
            let (w, _h) = img.dimensions();
            let mut out = img;
            for (i, px) in out.pixels_mut().enumerate() {
                let x = i as u32 % w;
                let y = i as u32 / w;
                // Centered noise in [-amount/2, amount/2], deterministic per pixel.
                let n = (hash_f32(x, y, NOISE_SEED) - 0.5) * amount;
                for c in 0..3 {
                    px[c] = (px[c] as f32 + n).round().clamp(0.0, 255.0) as u8;
                }
            }
            out
        }
        ImageOp::Pixelate(block) => {
            let block = block.max(1);
            let (w, h) = img.dimensions();
            if block == 1 || w < block || h < block {
                return img;
            }
            // Mosaic: nearest-neighbour downscale then upscale.
            let small = imageops::resize(
                &img,
                (w / block).max(1),
                (h / block).max(1),
                imageops::FilterType::Nearest,
            );
            imageops::resize(&small, w, h, imageops::FilterType::Nearest)
        }
    }
}

/// Apply a per-pixel transform over RGBA as f32, clamping back to u8.
/// Alpha passes through unless the transform changes it.
fn per_pixel<F>(mut img: RgbaImage, transform: F) -> RgbaImage
where
    F: Fn(f32, f32, f32, f32) -> (f32, f32, f32, f32),
{
    for px in img.pixels_mut() {
        let (r, g, b, a) = transform(px[0] as f32, px[1] as f32, px[2] as f32, px[3] as f32);
        px[0] = r.round().clamp(0.0, 255.0) as u8;
        px[1] = g.round().clamp(0.0, 255.0) as u8;
        px[2] = b.round().clamp(0.0, 255.0) as u8;
        px[3] = a.round().clamp(0.0, 255.0) as u8;
    }
    img
}

// ============================================================================
// Compositing helpers
// ============================================================================

/// Lerp RGB toward a flat color, leaving alpha untouched.
fn tint(img: RgbaImage, color: [u8; 3], alpha: f32) -> RgbaImage {
    let alpha = alpha.clamp(0.0, 1.0);
    per_pixel(img, move |r, g, b, a| {
        (
            r + (color[0] as f32 - r) * alpha,
            g + (color[1] as f32 - g) * alpha,
            b + (color[2] as f32 - b) * alpha,
            a,
        )
    })
}

/// Composite the image over the opaque canvas background with the given
/// blend mode and object opacity. Output is fully opaque.
fn composite_over_background(img: &RgbaImage, mode: BlendMode, opacity: f32) -> RgbaImage {
    let opacity = opacity.clamp(0.0, 1.0);
    let mut out = img.clone();
    for px in out.pixels_mut() {
        *px = blend_pixel(BACKGROUND, *px, mode, opacity);
    }
    out
}

/// Blend `top` over `base` with the given mode, scaling top alpha by
/// `opacity`. `base` is assumed opaque.
fn blend_pixel(base: Rgba<u8>, top: Rgba<u8>, mode: BlendMode, opacity: f32) -> Rgba<u8> {
    let top_a = (top[3] as f32 / 255.0) * opacity;
    if top_a <= 0.0 {
        return base;
    }

    let b = [
        base[0] as f32 / 255.0,
        base[1] as f32 / 255.0,
        base[2] as f32 / 255.0,
    ];
    let t = [
        top[0] as f32 / 255.0,
        top[1] as f32 / 255.0,
        top[2] as f32 / 255.0,
    ];

    let mut out = [0u8; 4];
    for c in 0..3 {
        let blended = match mode {
            BlendMode::Normal => t[c],
            BlendMode::Multiply => b[c] * t[c],
            BlendMode::Screen => 1.0 - (1.0 - b[c]) * (1.0 - t[c]),
            BlendMode::Overlay => {
                if b[c] < 0.5 {
                    2.0 * b[c] * t[c]
                } else {
                    1.0 - 2.0 * (1.0 - b[c]) * (1.0 - t[c])
                }
            }
            BlendMode::Darken => b[c].min(t[c]),
            BlendMode::Lighten => b[c].max(t[c]),
            BlendMode::Difference => (b[c] - t[c]).abs(),
        };
        let v = b[c] + (blended - b[c]) * top_a;
        out[c] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = 255;
    Rgba(out)
}

// ============================================================================
// Rotation (arbitrary angle, inverse mapping + bilinear sampling)
// ============================================================================

/// Rotate about the image center by `degrees` clockwise, expanding the
/// output to fit and filling uncovered corners with transparency.
fn rotate_bilinear(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let (w, h) = (src.width() as f32, src.height() as f32);
    let (sin, cos) = degrees.to_radians().sin_cos();

    // Output bounds of the rotated rectangle.
    let out_w = (w * cos.abs() + h * sin.abs()).ceil() as u32;
    let out_h = (w * sin.abs() + h * cos.abs()).ceil() as u32;
    let (ocx, ocy) = (out_w as f32 / 2.0, out_h as f32 / 2.0);
    let (scx, scy) = (w / 2.0, h / 2.0);

    let mut out = RgbaImage::new(out_w, out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            let dx = x as f32 + 0.5 - ocx;
            let dy = y as f32 + 0.5 - ocy;
            // Inverse rotation back into source space.
            let sx = dx * cos + dy * sin + scx - 0.5;
            let sy = -dx * sin + dy * cos + scy - 0.5;
            if sx >= -0.5 && sy >= -0.5 && sx < w && sy < h {
                out.put_pixel(x, y, bilinear_sample(src, sx, sy));
            }
        }
    }
    out
}

/// Bilinear sample with edge clamping.
fn bilinear_sample(img: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let clamp = |xi: i64, yi: i64| -> &Rgba<u8> {
        img.get_pixel(
            xi.clamp(0, w - 1) as u32,
            yi.clamp(0, h - 1) as u32,
        )
    };
    let p00 = clamp(x0, y0);
    let p10 = clamp(x0 + 1, y0);
    let p01 = clamp(x0, y0 + 1);
    let p11 = clamp(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let v = p00[c] as f32 * (1.0 - fx) * (1.0 - fy)
            + p10[c] as f32 * fx * (1.0 - fy)
            + p01[c] as f32 * (1.0 - fx) * fy
            + p11[c] as f32 * fx * fy;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

// ============================================================================
// Color space + hashing helpers
// ============================================================================

fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    } / 6.0;
    (h, s, l)
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[inline]
fn hash_u32(mut x: u32) -> u32 {
    x = x.wrapping_mul(0x9E37_79B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2_AE35);
    x ^= x >> 16;
    x
}

/// Hash of pixel coordinates to f32 in [0, 1).
#[inline]
fn hash_f32(x: u32, y: u32, seed: u32) -> f32 {
    let h = hash_u32(
        x.wrapping_mul(374_761_393)
            .wrapping_add(y.wrapping_mul(668_265_263))
            .wrapping_add(seed),
    );
    (h & 0x00FF_FFFF) as f32 / 16_777_216.0
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([200, 60, 20, 255])
            } else {
                Rgba([20, 120, 220, 255])
            }
        })
    }

    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(img.as_raw(), img.width(), img.height(), image::ColorType::Rgba8)
            .unwrap();
        bytes
    }

    fn load(engine: &mut RasterEngine) -> ImageHandle {
        engine.load_image(&encode_png(&checker(8, 8))).unwrap()
    }

    #[test]
    fn load_rejects_garbage() {
        let mut engine = RasterEngine::new();
        assert!(matches!(
            engine.load_image(b"not an image"),
            Err(EngineError::Decode(_))
        ));
    }

    #[test]
    fn render_with_no_ops_is_the_source() {
        let mut engine = RasterEngine::new();
        let h = load(&mut engine);
        engine.apply_and_render(h).unwrap();
        assert_eq!(engine.rendered(h).unwrap(), &checker(8, 8));
    }

    #[test]
    fn double_invert_restores_source() {
        let mut engine = RasterEngine::new();
        let h = load(&mut engine);
        engine.set_operations(h, &[ImageOp::Invert, ImageOp::Invert]);
        engine.apply_and_render(h).unwrap();
        assert_eq!(engine.rendered(h).unwrap(), &checker(8, 8));
    }

    #[test]
    fn grayscale_equalizes_channels() {
        let mut engine = RasterEngine::new();
        let h = load(&mut engine);
        engine.set_operations(h, &[ImageOp::Grayscale]);
        engine.apply_and_render(h).unwrap();
        for px in engine.rendered(h).unwrap().pixels() {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn rerender_is_idempotent_even_with_noise() {
        let mut engine = RasterEngine::new();
        let h = load(&mut engine);
        engine.set_operations(h, &[ImageOp::Noise(120.0), ImageOp::Blur(1.0)]);
        engine.apply_and_render(h).unwrap();
        let first = engine.rendered(h).unwrap().clone();
        engine.apply_and_render(h).unwrap();
        assert_eq!(engine.rendered(h).unwrap(), &first);
    }

    #[test]
    fn flip_horizontal_twice_is_identity() {
        let mut engine = RasterEngine::new();
        let h = load(&mut engine);
        let mut t = TransformState::default();
        t.toggle_flip_horizontal();
        engine.set_transform(h, &t);
        engine.apply_and_render(h).unwrap();
        let flipped = engine.rendered(h).unwrap().clone();
        assert_eq!(flipped, imageops::flip_horizontal(&checker(8, 8)));

        t.toggle_flip_horizontal();
        engine.set_transform(h, &t);
        engine.apply_and_render(h).unwrap();
        assert_eq!(engine.rendered(h).unwrap(), &checker(8, 8));
    }

    #[test]
    fn right_angle_rotation_swaps_dimensions() {
        let mut engine = RasterEngine::new();
        let h = engine.load_image(&encode_png(&checker(8, 4))).unwrap();
        let mut t = TransformState::default();
        t.rotate_by(90.0);
        engine.set_transform(h, &t);
        engine.apply_and_render(h).unwrap();
        assert_eq!(engine.rendered(h).unwrap().dimensions(), (4, 8));
    }

    #[test]
    fn arbitrary_rotation_expands_bounds() {
        let mut engine = RasterEngine::new();
        let h = load(&mut engine);
        let mut t = TransformState::default();
        t.rotate_by(45.0);
        engine.set_transform(h, &t);
        engine.apply_and_render(h).unwrap();
        let (w, hgt) = engine.rendered(h).unwrap().dimensions();
        assert!(w > 8 && hgt > 8);
    }

    #[test]
    fn unknown_handle_is_an_error() {
        let mut engine = RasterEngine::new();
        let h = load(&mut engine);
        engine.unload(h);
        assert_eq!(engine.apply_and_render(h), Err(EngineError::UnknownHandle));
        assert_eq!(
            engine.export_image(h, ExportFormat::Png),
            Err(EngineError::UnknownHandle)
        );
    }

    #[test]
    fn export_roundtrips_through_png() {
        let mut engine = RasterEngine::new();
        let h = load(&mut engine);
        engine.apply_and_render(h).unwrap();
        let bytes = engine.export_image(h, ExportFormat::Png).unwrap();
        let back = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!(back, checker(8, 8));
    }

    #[test]
    fn multiply_blend_over_white_is_identity() {
        // White background multiplied with any color gives that color back,
        // so Multiply at full opacity must not change the render.
        let mut engine = RasterEngine::new();
        let h = load(&mut engine);
        let t = TransformState {
            blend_mode: BlendMode::Multiply,
            ..TransformState::default()
        };
        engine.set_transform(h, &t);
        engine.apply_and_render(h).unwrap();
        assert_eq!(engine.rendered(h).unwrap(), &checker(8, 8));
    }
}
