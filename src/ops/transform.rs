// ============================================================================
// TRANSFORM STATE — object-level flips, rotation, opacity, blend, overlay
// ============================================================================
//
// These settings live at the compositing level, not in the pixel-filter
// pipeline: the rendering engine applies them after the resolved operation
// list, and resetting them never touches adjustments or filters.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Rotation step used by the rotate-left / rotate-right toolbar buttons.
pub const ROTATE_STEP_DEGREES: f32 = 15.0;

/// How the rendered image is composited over the canvas background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    Difference,
}

impl BlendMode {
    pub fn label(&self) -> &'static str {
        match self {
            BlendMode::Normal => "Normal",
            BlendMode::Multiply => "Multiply",
            BlendMode::Screen => "Screen",
            BlendMode::Overlay => "Overlay",
            BlendMode::Darken => "Darken",
            BlendMode::Lighten => "Lighten",
            BlendMode::Difference => "Difference",
        }
    }

    pub fn all() -> &'static [BlendMode] {
        &[
            BlendMode::Normal,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::Overlay,
            BlendMode::Darken,
            BlendMode::Lighten,
            BlendMode::Difference,
        ]
    }
}

/// A flat color tinted over the image at the given opacity.
/// Zero opacity means no overlay at all.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorOverlay {
    pub color: [u8; 3],
    /// 0.0–1.0; 0.0 disables the overlay.
    pub opacity: f32,
}

impl Default for ColorOverlay {
    fn default() -> Self {
        Self {
            color: [0, 0, 0],
            opacity: 0.0,
        }
    }
}

impl ColorOverlay {
    pub fn is_active(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Object-level transform of the displayed image. Independent of the
/// adjustment/filter pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Rotation in degrees, always normalized to [0, 360).
    pub angle: f32,
    /// 0.0–1.0.
    pub opacity: f32,
    pub blend_mode: BlendMode,
    pub overlay: ColorOverlay,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            flip_horizontal: false,
            flip_vertical: false,
            angle: 0.0,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            overlay: ColorOverlay::default(),
        }
    }
}

impl TransformState {
    /// True when the transform changes nothing about the rendered output.
    pub fn is_identity(&self) -> bool {
        !self.flip_horizontal
            && !self.flip_vertical
            && self.angle == 0.0
            && self.opacity >= 1.0
            && self.blend_mode == BlendMode::Normal
            && !self.overlay.is_active()
    }

    pub fn toggle_flip_horizontal(&mut self) {
        self.flip_horizontal = !self.flip_horizontal;
    }

    pub fn toggle_flip_vertical(&mut self) {
        self.flip_vertical = !self.flip_vertical;
    }

    /// Rotate by `delta` degrees, wrapping at 360. Negative deltas rotate
    /// counter-clockwise and normalize back into [0, 360).
    pub fn rotate_by(&mut self, delta: f32) {
        self.angle = (self.angle + delta).rem_euclid(360.0);
    }

    /// Clamped setter — out-of-range slider input never escapes [0, 1].
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_overlay(&mut self, color: [u8; 3], opacity: f32) {
        self.overlay = ColorOverlay {
            color,
            opacity: opacity.clamp(0.0, 1.0),
        };
    }

    /// Back to identity: no flips, no rotation, fully opaque, normal blend,
    /// overlay off.
    pub fn reset(&mut self) {
        *self = TransformState::default();
    }
}

// ============================================================================
// Tests
// ============================================================================
