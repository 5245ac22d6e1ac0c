// ============================================================================
// LAYERS — layer records and the layers side panel
// ============================================================================

use eframe::egui;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct Layer {
    pub id: Uuid,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            locked: false,
        }
    }
}

/// Ordered layer list; index 0 is the background.
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self {
            layers: vec![Layer::new("Background")],
        }
    }
}

impl LayerStack {
    /// Append a new layer named by position ("Layer 2", "Layer 3", ...).
    pub fn add(&mut self) -> &Layer {
        let name = format!("Layer {}", self.layers.len() + 1);
        self.layers.push(Layer::new(name));
        self.layers.last().expect("just pushed")
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Back to a single background layer (new project / new file load).
    pub fn reset(&mut self) {
        *self = LayerStack::default();
    }
}

#[derive(Default)]
pub struct LayersPanel;

impl LayersPanel {
    pub fn ui(&mut self, ui: &mut egui::Ui, stack: &mut LayerStack) {
        ui.horizontal(|ui| {
            ui.heading("Layers");
            if ui.small_button("＋").on_hover_text("Add layer").clicked() {
                stack.add();
            }
        });
        ui.separator();

        // Topmost layer first, like every other editor.
        for layer in stack.layers_mut().iter_mut().rev() {
            ui.horizontal(|ui| {
                let eye = if layer.visible { "👁" } else { "—" };
                if ui.small_button(eye).on_hover_text("Toggle visibility").clicked() {
                    layer.visible = !layer.visible;
                }
                let lock = if layer.locked { "🔒" } else { "🔓" };
                if ui.small_button(lock).on_hover_text("Toggle lock").clicked() {
                    layer.locked = !layer.locked;
                }
                ui.label(&layer.name);
            });
        }
    }
}
