// ============================================================================
// CANVAS STATE — document dimensions plus the vector objects drawn on top
// ============================================================================
//
// The loaded photo itself lives in the rendering engine; this module only
// keeps the bookkeeping for what the drawing tools put on the canvas
// (strokes, text, shapes) and the pending crop rectangle. Painting is
// delegated to egui's painter in the canvas view.
// ============================================================================

use egui::{Color32, Pos2, Rect};

pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// A freehand brush stroke, stored as the dragged point sequence.
#[derive(Clone, Debug)]
pub struct BrushStroke {
    pub points: Vec<Pos2>,
    pub color: Color32,
    pub width: f32,
}

impl BrushStroke {
    /// Hit test against any segment of the stroke, padded by half the
    /// stroke width plus the eraser radius.
    pub fn contains_point(&self, p: Pos2, slop: f32) -> bool {
        let reach = self.width / 2.0 + slop;
        if self.points.len() == 1 {
            return self.points[0].distance(p) <= reach;
        }
        self.points
            .windows(2)
            .any(|seg| distance_to_segment(p, seg[0], seg[1]) <= reach)
    }
}

#[derive(Clone, Debug)]
pub struct TextObject {
    pub pos: Pos2,
    pub content: String,
    pub size: f32,
    pub color: Color32,
}

#[derive(Clone, Debug)]
pub struct ShapeObject {
    pub rect: Rect,
    pub fill: Color32,
    pub stroke: Color32,
    pub stroke_width: f32,
}

/// One object placed on the canvas by a drawing tool.
#[derive(Clone, Debug)]
pub enum CanvasObject {
    Stroke(BrushStroke),
    Text(TextObject),
    Shape(ShapeObject),
}

impl CanvasObject {
    /// Whether the eraser at `p` (radius `slop`) touches this object.
    pub fn contains_point(&self, p: Pos2, slop: f32) -> bool {
        match self {
            CanvasObject::Stroke(s) => s.contains_point(p, slop),
            CanvasObject::Text(t) => {
                // Approximate text extent from content length and font size.
                let w = t.content.len() as f32 * t.size * 0.5;
                Rect::from_min_size(t.pos, egui::vec2(w.max(t.size), t.size))
                    .expand(slop)
                    .contains(p)
            }
            CanvasObject::Shape(s) => s.rect.expand(slop).contains(p),
        }
    }
}

/// The editable document: canvas dimensions, background, drawn objects and
/// the in-progress crop rectangle.
pub struct CanvasState {
    pub width: u32,
    pub height: u32,
    pub background: Color32,
    pub objects: Vec<CanvasObject>,
    /// Crop region being dragged out, in canvas coordinates.
    pub crop_rect: Option<Rect>,
}

impl CanvasState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            background: Color32::WHITE,
            objects: Vec::new(),
            crop_rect: None,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Drop all drawn objects and any pending crop.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.crop_rect = None;
    }

    pub fn add_object(&mut self, object: CanvasObject) {
        self.objects.push(object);
    }

    /// Remove every object under the eraser. Returns how many went away.
    pub fn erase_at(&mut self, p: Pos2, radius: f32) -> usize {
        let before = self.objects.len();
        self.objects.retain(|obj| !obj.contains_point(p, radius));
        before - self.objects.len()
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return a.distance(p);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t).distance(p)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(points: &[(f32, f32)]) -> CanvasObject {
        CanvasObject::Stroke(BrushStroke {
            points: points.iter().map(|&(x, y)| Pos2::new(x, y)).collect(),
            color: Color32::BLACK,
            width: 4.0,
        })
    }

    #[test]
    fn eraser_removes_objects_under_cursor() {
        let mut state = CanvasState::default();
        state.add_object(stroke(&[(0.0, 0.0), (10.0, 0.0)]));
        state.add_object(stroke(&[(100.0, 100.0), (110.0, 100.0)]));

        let removed = state.erase_at(Pos2::new(5.0, 1.0), 2.0);
        assert_eq!(removed, 1);
        assert_eq!(state.objects.len(), 1);
    }

    #[test]
    fn eraser_misses_distant_objects() {
        let mut state = CanvasState::default();
        state.add_object(stroke(&[(0.0, 0.0), (10.0, 0.0)]));
        assert_eq!(state.erase_at(Pos2::new(50.0, 50.0), 10.0), 0);
        assert_eq!(state.objects.len(), 1);
    }

    #[test]
    fn shape_hit_test_uses_rect_bounds() {
        let shape = CanvasObject::Shape(ShapeObject {
            rect: Rect::from_min_size(Pos2::new(10.0, 10.0), egui::vec2(100.0, 100.0)),
            fill: Color32::BLUE,
            stroke: Color32::DARK_BLUE,
            stroke_width: 2.0,
        });
        assert!(shape.contains_point(Pos2::new(50.0, 50.0), 0.0));
        assert!(!shape.contains_point(Pos2::new(200.0, 50.0), 0.0));
    }

    #[test]
    fn clear_drops_objects_and_crop() {
        let mut state = CanvasState::default();
        state.add_object(stroke(&[(0.0, 0.0)]));
        state.crop_rect = Some(Rect::from_min_size(Pos2::ZERO, egui::vec2(10.0, 10.0)));
        state.clear();
        assert!(state.objects.is_empty());
        assert!(state.crop_rect.is_none());
    }

    #[test]
    fn dimensions_never_collapse_to_zero() {
        let state = CanvasState::new(0, 0);
        assert_eq!((state.width, state.height), (1, 1));
    }
}
