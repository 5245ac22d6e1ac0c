// ============================================================================
// TOOLS — tool selection, per-tool properties, pointer handling
// ============================================================================

use eframe::egui;
use egui::{Color32, CursorIcon, Pos2, Rect};

use crate::canvas::{BrushStroke, CanvasObject, CanvasState, ShapeObject, TextObject};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Crop,
    Brush,
    Eraser,
    Text,
    Shape,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Crop => "Crop",
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Text => "Text",
            Tool::Shape => "Shape",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[
            Tool::Select,
            Tool::Crop,
            Tool::Brush,
            Tool::Eraser,
            Tool::Text,
            Tool::Shape,
        ]
    }

    /// Cursor shown while the pointer hovers the canvas.
    pub fn cursor(&self) -> CursorIcon {
        match self {
            Tool::Select => CursorIcon::Default,
            Tool::Crop => CursorIcon::Crosshair,
            Tool::Brush => CursorIcon::PointingHand,
            Tool::Eraser => CursorIcon::NotAllowed,
            Tool::Text => CursorIcon::Text,
            Tool::Shape => CursorIcon::Crosshair,
        }
    }
}

/// Per-tool settings edited in the tools panel.
#[derive(Clone, Debug)]
pub struct ToolProperties {
    pub brush_size: f32,
    pub brush_color: Color32,
    pub eraser_size: f32,
    pub text_size: f32,
    pub shape_fill: Color32,
    pub shape_stroke: Color32,
}

impl Default for ToolProperties {
    fn default() -> Self {
        Self {
            brush_size: 5.0,
            brush_color: Color32::BLACK,
            eraser_size: 20.0,
            text_size: 20.0,
            // Default shape colors carried over from the classic UI theme.
            shape_fill: Color32::from_rgb(0x34, 0x98, 0xdb),
            shape_stroke: Color32::from_rgb(0x29, 0x80, 0xb9),
        }
    }
}

/// Transient pointer state while a drag is in progress.
#[derive(Default)]
pub struct DrawState {
    pub is_drawing: bool,
    pub last_pos: Pos2,
    /// Stroke being laid down; committed as one object on release.
    pub pending_stroke: Option<BrushStroke>,
    /// Anchor corner of a crop drag.
    pub crop_start: Option<Pos2>,
}

// ============================================================================
// Pointer handling — one function per phase, called from the canvas view
// ============================================================================

/// Pointer pressed on the canvas at `pos` (canvas coordinates).
pub fn pointer_pressed(
    canvas: &mut CanvasState,
    draw: &mut DrawState,
    tool: Tool,
    props: &ToolProperties,
    pos: Pos2,
) {
    draw.is_drawing = true;
    draw.last_pos = pos;

    match tool {
        Tool::Brush => {
            draw.pending_stroke = Some(BrushStroke {
                points: vec![pos],
                color: props.brush_color,
                width: props.brush_size,
            });
        }
        Tool::Eraser => {
            canvas.erase_at(pos, props.eraser_size / 2.0);
        }
        Tool::Text => {
            canvas.add_object(CanvasObject::Text(TextObject {
                pos,
                content: "Double click to edit".to_string(),
                size: props.text_size,
                color: props.brush_color,
            }));
        }
        Tool::Shape => {
            canvas.add_object(CanvasObject::Shape(ShapeObject {
                rect: Rect::from_min_size(pos, egui::vec2(100.0, 100.0)),
                fill: props.shape_fill,
                stroke: props.shape_stroke,
                stroke_width: 2.0,
            }));
        }
        Tool::Crop => {
            draw.crop_start = Some(pos);
            canvas.crop_rect = Some(Rect::from_min_size(pos, egui::vec2(1.0, 1.0)));
        }
        Tool::Select => {}
    }
}

/// Pointer dragged to `pos` with the button held.
pub fn pointer_dragged(
    canvas: &mut CanvasState,
    draw: &mut DrawState,
    tool: Tool,
    props: &ToolProperties,
    pos: Pos2,
) {
    if !draw.is_drawing {
        return;
    }
    match tool {
        Tool::Brush => {
            if let Some(stroke) = draw.pending_stroke.as_mut() {
                stroke.points.push(pos);
            }
        }
        Tool::Eraser => {
            canvas.erase_at(pos, props.eraser_size / 2.0);
        }
        Tool::Crop => {
            if let Some(start) = draw.crop_start {
                canvas.crop_rect = Some(Rect::from_two_pos(start, pos));
            }
        }
        _ => {}
    }
    draw.last_pos = pos;
}

/// Pointer released: commit whatever the drag built.
pub fn pointer_released(canvas: &mut CanvasState, draw: &mut DrawState, tool: Tool) {
    draw.is_drawing = false;
    if tool == Tool::Brush
        && let Some(stroke) = draw.pending_stroke.take()
    {
        // The whole drag becomes one object, so the eraser removes it as a unit.
        canvas.add_object(CanvasObject::Stroke(stroke));
    }
    if tool == Tool::Crop {
        draw.crop_start = None;
    }
}

// ============================================================================
// Tools panel UI
// ============================================================================

#[derive(Default)]
pub struct ToolsPanel;

impl ToolsPanel {
    pub fn ui(&mut self, ui: &mut egui::Ui, active: &mut Tool, props: &mut ToolProperties) {
        ui.heading("Tools");
        ui.horizontal_wrapped(|ui| {
            for tool in Tool::all() {
                if ui
                    .selectable_label(*active == *tool, tool.label())
                    .clicked()
                {
                    *active = *tool;
                }
            }
        });
        ui.separator();

        match active {
            Tool::Brush => {
                ui.label("Brush size");
                ui.add(egui::Slider::new(&mut props.brush_size, 1.0..=64.0));
                ui.label("Color");
                let mut rgba = props.brush_color.to_array();
                if ui.color_edit_button_srgba_unmultiplied(&mut rgba).changed() {
                    props.brush_color =
                        Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3]);
                }
            }
            Tool::Eraser => {
                ui.label("Eraser size");
                ui.add(egui::Slider::new(&mut props.eraser_size, 4.0..=128.0));
            }
            Tool::Text => {
                ui.label("Font size");
                ui.add(egui::Slider::new(&mut props.text_size, 8.0..=96.0));
            }
            Tool::Shape => {
                ui.label("Fill");
                let mut fill = props.shape_fill.to_array();
                if ui.color_edit_button_srgba_unmultiplied(&mut fill).changed() {
                    props.shape_fill =
                        Color32::from_rgba_unmultiplied(fill[0], fill[1], fill[2], fill[3]);
                }
                ui.label("Stroke");
                let mut stroke = props.shape_stroke.to_array();
                if ui
                    .color_edit_button_srgba_unmultiplied(&mut stroke)
                    .changed()
                {
                    props.shape_stroke =
                        Color32::from_rgba_unmultiplied(stroke[0], stroke[1], stroke[2], stroke[3]);
                }
            }
            Tool::Select | Tool::Crop => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_drag_commits_one_object_on_release() {
        let mut canvas = CanvasState::default();
        let mut draw = DrawState::default();
        let props = ToolProperties::default();

        pointer_pressed(&mut canvas, &mut draw, Tool::Brush, &props, Pos2::new(0.0, 0.0));
        pointer_dragged(&mut canvas, &mut draw, Tool::Brush, &props, Pos2::new(5.0, 5.0));
        pointer_dragged(&mut canvas, &mut draw, Tool::Brush, &props, Pos2::new(10.0, 5.0));
        assert!(canvas.objects.is_empty());

        pointer_released(&mut canvas, &mut draw, Tool::Brush);
        assert_eq!(canvas.objects.len(), 1);
        match &canvas.objects[0] {
            CanvasObject::Stroke(s) => assert_eq!(s.points.len(), 3),
            other => panic!("expected stroke, got {:?}", other),
        }
    }

    #[test]
    fn text_tool_places_editable_placeholder() {
        let mut canvas = CanvasState::default();
        let mut draw = DrawState::default();
        let props = ToolProperties::default();

        pointer_pressed(&mut canvas, &mut draw, Tool::Text, &props, Pos2::new(30.0, 40.0));
        match &canvas.objects[0] {
            CanvasObject::Text(t) => {
                assert_eq!(t.content, "Double click to edit");
                assert_eq!(t.pos, Pos2::new(30.0, 40.0));
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn crop_drag_tracks_rect_from_anchor() {
        let mut canvas = CanvasState::default();
        let mut draw = DrawState::default();
        let props = ToolProperties::default();

        pointer_pressed(&mut canvas, &mut draw, Tool::Crop, &props, Pos2::new(10.0, 10.0));
        pointer_dragged(&mut canvas, &mut draw, Tool::Crop, &props, Pos2::new(60.0, 90.0));
        let rect = canvas.crop_rect.expect("crop rect");
        assert_eq!(rect.min, Pos2::new(10.0, 10.0));
        assert_eq!(rect.max, Pos2::new(60.0, 90.0));

        pointer_released(&mut canvas, &mut draw, Tool::Crop);
        assert!(draw.crop_start.is_none());
    }

    #[test]
    fn drag_without_press_is_ignored() {
        let mut canvas = CanvasState::default();
        let mut draw = DrawState::default();
        let props = ToolProperties::default();

        pointer_dragged(&mut canvas, &mut draw, Tool::Brush, &props, Pos2::new(5.0, 5.0));
        pointer_released(&mut canvas, &mut draw, Tool::Brush);
        assert!(canvas.objects.is_empty());
    }
}
