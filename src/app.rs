// ============================================================================
// APPLICATION — egui panels wired to the editor session
// ============================================================================
//
// Every widget here routes into the project's pipeline, transform or canvas
// state; nothing in this module touches pixels. The rendered texture is
// refreshed whenever a control marked it stale.
// ============================================================================

use eframe::egui;
use egui::{Color32, ColorImage, FontId, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions};

use crate::canvas::{CanvasObject, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::components::layers::LayersPanel;
use crate::components::tools::{self, DrawState, Tool, ToolProperties, ToolsPanel};
use crate::engine::RasterEngine;
use crate::io;
use crate::ops::transform::{BlendMode, ROTATE_STEP_DEGREES};
use crate::pipeline::Adjustment;
use crate::presets;
use crate::project::Project;

#[derive(Clone, Copy, PartialEq, Eq)]
enum SideTab {
    Adjustments,
    Filters,
    Transform,
    Presets,
}

pub struct PhotoFEApp {
    engine: RasterEngine,
    project: Project,
    untitled_counter: usize,

    // Tool state
    active_tool: Tool,
    tool_props: ToolProperties,
    tools_panel: ToolsPanel,
    layers_panel: LayersPanel,
    draw: DrawState,

    // View state
    side_tab: SideTab,
    texture: Option<TextureHandle>,
    texture_stale: bool,
    zoom: f32,
    cursor_pos: Option<Pos2>,
    status: Option<String>,

    // New-project dialog
    new_project_open: bool,
    new_width: String,
    new_height: String,
}

impl PhotoFEApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            engine: RasterEngine::new(),
            project: Project::new_untitled(1, DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
            untitled_counter: 1,
            active_tool: Tool::default(),
            tool_props: ToolProperties::default(),
            tools_panel: ToolsPanel,
            layers_panel: LayersPanel,
            draw: DrawState::default(),
            side_tab: SideTab::Adjustments,
            texture: None,
            texture_stale: false,
            zoom: 1.0,
            cursor_pos: None,
            status: None,
            new_project_open: false,
            new_width: DEFAULT_CANVAS_WIDTH.to_string(),
            new_height: DEFAULT_CANVAS_HEIGHT.to_string(),
        }
    }

    // ---- actions -------------------------------------------------------------

    fn open_file(&mut self) {
        let Some(path) = io::pick_image_to_open() else {
            return;
        };
        let bytes = match io::read_file(&path) {
            Ok(b) => b,
            Err(e) => {
                self.report(e);
                return;
            }
        };
        match self.project.load_source(&mut self.engine, &bytes, Some(path)) {
            Ok(()) => {
                self.texture_stale = true;
                self.status = None;
            }
            Err(e) => self.report(e),
        }
    }

    fn export_file(&mut self) {
        if !self.project.has_source() {
            self.report("Nothing to export — open an image first.".to_string());
            return;
        }
        let Some(path) = io::pick_export_path() else {
            return;
        };
        let format = io::format_for_path(&path, io::EXPORT_JPEG_QUALITY);
        match self.project.export(&self.engine, format) {
            Some(bytes) => match io::write_file(&path, &bytes) {
                Ok(()) => self.status = Some(format!("Exported {}", path.display())),
                Err(e) => self.report(e),
            },
            None => self.report("Export failed — see the session log.".to_string()),
        }
    }

    fn new_project(&mut self, width: u32, height: u32) {
        if let Some(src) = &self.project.source {
            self.engine.unload(src.handle);
        }
        self.untitled_counter += 1;
        self.project = Project::new_untitled(self.untitled_counter, width, height);
        self.texture = None;
        self.texture_stale = false;
        self.status = None;
    }

    fn report(&mut self, message: String) {
        crate::log_err!("{}", message);
        self.status = Some(message);
    }

    /// Re-upload the rendered image after any pipeline/transform change.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        self.texture_stale = false;
        let Some(src) = &self.project.source else {
            self.texture = None;
            return;
        };
        let Some(rendered) = self.engine.rendered(src.handle) else {
            self.texture = None;
            return;
        };
        let size = [rendered.width() as usize, rendered.height() as usize];
        let color_image = ColorImage::from_rgba_unmultiplied(size, rendered.as_raw());
        self.texture = Some(ctx.load_texture("rendered-image", color_image, TextureOptions::LINEAR));
    }

    // ---- side panel tabs -----------------------------------------------------

    fn adjustments_ui(&mut self, ui: &mut egui::Ui) {
        for adj in Adjustment::all() {
            let (min, max) = adj.range();
            let mut value = self.project.pipeline.adjustments().get(*adj);
            if ui
                .add(egui::Slider::new(&mut value, min..=max).text(adj.label()))
                .changed()
            {
                self.project
                    .pipeline
                    .set_adjustment(&mut self.engine, *adj, value);
                self.project.mark_dirty();
                self.texture_stale = true;
            }
        }
    }

    fn filters_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            for filter in crate::pipeline::Filter::all() {
                let active = self.project.pipeline.filters().contains(*filter);
                if ui.selectable_label(active, filter.label()).clicked() {
                    self.project.pipeline.toggle_filter(&mut self.engine, *filter);
                    self.project.mark_dirty();
                    self.texture_stale = true;
                }
            }
        });

        // The shared intensity slider only appears once a filter is active,
        // since it has nothing to act on otherwise.
        if !self.project.pipeline.filters().is_empty() {
            ui.separator();
            let mut intensity = self.project.pipeline.intensity();
            if ui
                .add(egui::Slider::new(&mut intensity, 0.0..=100.0).text("Intensity"))
                .changed()
            {
                self.project
                    .pipeline
                    .set_filter_intensity(&mut self.engine, intensity);
                self.project.mark_dirty();
                self.texture_stale = true;
            }
        }
    }

    fn transform_ui(&mut self, ui: &mut egui::Ui) {
        let t = &mut self.project.transform;
        let mut changed = false;

        ui.horizontal(|ui| {
            if ui.button("Flip H").clicked() {
                t.toggle_flip_horizontal();
                changed = true;
            }
            if ui.button("Flip V").clicked() {
                t.toggle_flip_vertical();
                changed = true;
            }
        });
        ui.horizontal(|ui| {
            if ui.button("⟲ Rotate left").clicked() {
                t.rotate_by(-ROTATE_STEP_DEGREES);
                changed = true;
            }
            if ui.button("⟳ Rotate right").clicked() {
                t.rotate_by(ROTATE_STEP_DEGREES);
                changed = true;
            }
        });
        ui.label(format!("Angle: {:.0}°", t.angle));
        ui.separator();

        let mut opacity = t.opacity * 100.0;
        if ui
            .add(egui::Slider::new(&mut opacity, 0.0..=100.0).text("Opacity"))
            .changed()
        {
            t.set_opacity(opacity / 100.0);
            changed = true;
        }

        let before = t.blend_mode;
        egui::ComboBox::from_label("Blend mode")
            .selected_text(t.blend_mode.label())
            .show_ui(ui, |ui| {
                for mode in BlendMode::all() {
                    ui.selectable_value(&mut t.blend_mode, *mode, mode.label());
                }
            });
        changed |= t.blend_mode != before;

        ui.separator();
        ui.label("Color overlay");
        let mut color = t.overlay.color;
        if ui.color_edit_button_srgb(&mut color).changed() {
            t.set_overlay(color, t.overlay.opacity);
            changed = true;
        }
        let mut overlay_opacity = t.overlay.opacity * 100.0;
        if ui
            .add(egui::Slider::new(&mut overlay_opacity, 0.0..=100.0).text("Overlay opacity"))
            .changed()
        {
            t.set_overlay(t.overlay.color, overlay_opacity / 100.0);
            changed = true;
        }

        ui.separator();
        if ui.button("Reset image").clicked() {
            self.project.reset_image(&mut self.engine);
            self.texture_stale = true;
        }

        if changed {
            self.project.reapply(&mut self.engine);
            self.texture_stale = true;
        }
    }

    fn presets_ui(&mut self, ui: &mut egui::Ui) {
        for preset in presets::PRESETS {
            if ui.button(preset.label).clicked() {
                self.project
                    .pipeline
                    .apply_preset(&mut self.engine, preset.id);
                self.project.mark_dirty();
                self.texture_stale = true;
            }
        }
    }

    // ---- canvas view -----------------------------------------------------------

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_rect_before_wrap();
        let canvas_size = egui::vec2(
            self.project.canvas.width as f32 * self.zoom,
            self.project.canvas.height as f32 * self.zoom,
        );
        let canvas_rect = Rect::from_center_size(available.center(), canvas_size);
        let painter = ui.painter_at(available);

        // Canvas background, then the rendered photo centred on it.
        painter.rect_filled(canvas_rect, 0.0, self.project.canvas.background);
        if let Some(texture) = &self.texture {
            let tex_size = texture.size_vec2() * self.zoom;
            let image_rect = Rect::from_center_size(canvas_rect.center(), tex_size);
            painter.image(
                texture.id(),
                image_rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        // Drawn objects live in canvas coordinates; scale to screen.
        let zoom = self.zoom;
        let to_screen = move |p: Pos2| canvas_rect.min + p.to_vec2() * zoom;
        for object in &self.project.canvas.objects {
            match object {
                CanvasObject::Stroke(s) => {
                    let points: Vec<Pos2> = s.points.iter().map(|p| to_screen(*p)).collect();
                    if points.len() == 1 {
                        painter.circle_filled(points[0], s.width * zoom / 2.0, s.color);
                    } else {
                        painter.add(egui::Shape::line(
                            points,
                            Stroke::new(s.width * zoom, s.color),
                        ));
                    }
                }
                CanvasObject::Text(t) => {
                    painter.text(
                        to_screen(t.pos),
                        egui::Align2::LEFT_TOP,
                        &t.content,
                        FontId::proportional(t.size * self.zoom),
                        t.color,
                    );
                }
                CanvasObject::Shape(s) => {
                    let rect = Rect::from_min_max(to_screen(s.rect.min), to_screen(s.rect.max));
                    painter.rect(rect, 0.0, s.fill, Stroke::new(s.stroke_width, s.stroke));
                }
            }
        }
        if let Some(crop) = self.project.canvas.crop_rect {
            let rect = Rect::from_min_max(to_screen(crop.min), to_screen(crop.max));
            painter.rect(
                rect,
                0.0,
                Color32::from_black_alpha(77),
                Stroke::new(1.0, Color32::BLACK),
            );
        }

        // Pointer routing.
        let response = ui.interact(canvas_rect, ui.id().with("canvas"), Sense::click_and_drag());
        let to_canvas = move |p: Pos2| ((p - canvas_rect.min) / zoom).to_pos2();
        if response.hovered() {
            ui.ctx().set_cursor_icon(self.active_tool.cursor());
        }
        self.cursor_pos = response.hover_pos().map(to_canvas);

        let mut edited = false;
        if let Some(pos) = response.interact_pointer_pos().map(to_canvas) {
            if response.drag_started() {
                tools::pointer_pressed(
                    &mut self.project.canvas,
                    &mut self.draw,
                    self.active_tool,
                    &self.tool_props,
                    pos,
                );
                edited = true;
            } else if response.dragged() {
                tools::pointer_dragged(
                    &mut self.project.canvas,
                    &mut self.draw,
                    self.active_tool,
                    &self.tool_props,
                    pos,
                );
                edited = true;
            }
        }
        if response.drag_released() {
            tools::pointer_released(&mut self.project.canvas, &mut self.draw, self.active_tool);
            edited = true;
        }
        if edited && self.active_tool != Tool::Select {
            self.project.mark_dirty();
        }
    }

    fn new_project_dialog(&mut self, ctx: &egui::Context) {
        if !self.new_project_open {
            return;
        }
        let mut open = self.new_project_open;
        let mut create: Option<(u32, u32)> = None;
        egui::Window::new("New project")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Width (px)");
                    ui.text_edit_singleline(&mut self.new_width);
                });
                ui.horizontal(|ui| {
                    ui.label("Height (px)");
                    ui.text_edit_singleline(&mut self.new_height);
                });
                if ui.button("Create").clicked() {
                    let w = self.new_width.trim().parse::<u32>().unwrap_or(0);
                    let h = self.new_height.trim().parse::<u32>().unwrap_or(0);
                    if w > 0 && h > 0 {
                        create = Some((w, h));
                    }
                }
            });
        self.new_project_open = open;
        if let Some((w, h)) = create {
            self.new_project(w, h);
            self.new_project_open = false;
        }
    }
}

impl eframe::App for PhotoFEApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.texture_stale {
            self.refresh_texture(ctx);
        }

        egui::TopBottomPanel::top("menu-bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New project…").clicked() {
                        self.new_project_open = true;
                        ui.close_menu();
                    }
                    if ui.button("Open…").clicked() {
                        self.open_file();
                        ui.close_menu();
                    }
                    if ui.button("Export…").clicked() {
                        self.export_file();
                        ui.close_menu();
                    }
                });
                ui.menu_button("Image", |ui| {
                    if ui.button("Reset image").clicked() {
                        self.project.reset_image(&mut self.engine);
                        self.texture_stale = true;
                        ui.close_menu();
                    }
                });
                ui.separator();
                ui.label(self.project.display_title());
            });
        });

        egui::SidePanel::left("tools-panel")
            .resizable(false)
            .default_width(160.0)
            .show(ctx, |ui| {
                self.tools_panel
                    .ui(ui, &mut self.active_tool, &mut self.tool_props);
            });

        egui::SidePanel::right("controls-panel")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for (tab, label) in [
                        (SideTab::Adjustments, "Adjust"),
                        (SideTab::Filters, "Filters"),
                        (SideTab::Transform, "Transform"),
                        (SideTab::Presets, "Presets"),
                    ] {
                        if ui.selectable_label(self.side_tab == tab, label).clicked() {
                            self.side_tab = tab;
                        }
                    }
                });
                ui.separator();
                match self.side_tab {
                    SideTab::Adjustments => self.adjustments_ui(ui),
                    SideTab::Filters => self.filters_ui(ui),
                    SideTab::Transform => self.transform_ui(ui),
                    SideTab::Presets => self.presets_ui(ui),
                }
                ui.separator();
                self.layers_panel.ui(ui, &mut self.project.layers);
            });

        egui::TopBottomPanel::bottom("status-bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match self.cursor_pos {
                    Some(p) => ui.label(format!("X: {:.0}, Y: {:.0}", p.x, p.y)),
                    None => ui.label("X: –, Y: –"),
                };
                ui.separator();
                ui.label(format!(
                    "{} x {} px",
                    self.project.canvas.width, self.project.canvas.height
                ));
                ui.separator();
                let mut zoom_pct = self.zoom * 100.0;
                ui.add(
                    egui::Slider::new(&mut zoom_pct, 10.0..=400.0)
                        .suffix("%")
                        .text("Zoom"),
                );
                self.zoom = zoom_pct / 100.0;
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.canvas_ui(ui);
        });

        self.new_project_dialog(ctx);
    }
}
