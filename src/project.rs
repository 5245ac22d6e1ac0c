use std::path::PathBuf;

use uuid::Uuid;

use crate::canvas::CanvasState;
use crate::components::layers::LayerStack;
use crate::engine::{ExportFormat, ImageHandle, RasterEngine, RenderEngine};
use crate::ops::transform::TransformState;
use crate::pipeline::PipelineManager;

/// The immutable original the pipeline re-renders from. Replaced wholesale
/// on every file load; never edited in place.
pub struct SourceImage {
    pub handle: ImageHandle,
    pub width: u32,
    pub height: u32,
    pub path: Option<PathBuf>,
}

/// Single open document: the loaded source, the pipeline state around it,
/// the object-level transform and whatever the drawing tools put on the
/// canvas.
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub source: Option<SourceImage>,
    pub pipeline: PipelineManager,
    pub transform: TransformState,
    pub canvas: CanvasState,
    pub layers: LayerStack,
    pub is_dirty: bool,
}

impl Project {
    pub fn new_untitled(untitled_counter: usize, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: format!("Untitled-{}", untitled_counter),
            source: None,
            pipeline: PipelineManager::new(),
            transform: TransformState::default(),
            canvas: CanvasState::new(width, height),
            layers: LayerStack::default(),
            is_dirty: false,
        }
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Decode `bytes` into a fresh source image, replacing any previous one
    /// and resetting every control, exactly as if the document were opened
    /// anew. The canvas resizes to the image.
    pub fn load_source(
        &mut self,
        engine: &mut RasterEngine,
        bytes: &[u8],
        path: Option<PathBuf>,
    ) -> Result<(), String> {
        let handle = engine.load_image(bytes).map_err(|e| e.to_string())?;
        let (width, height) = engine
            .source_dimensions(handle)
            .ok_or_else(|| "engine lost the image it just loaded".to_string())?;

        // The old source is gone for good; free it in the engine too.
        if let Some(old) = self.source.take() {
            engine.unload(old.handle);
        }

        if let Some(ref p) = path {
            self.name = p
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
        }
        self.source = Some(SourceImage {
            handle,
            width,
            height,
            path,
        });
        self.canvas.clear();
        self.canvas.resize(width, height);
        self.layers.reset();

        self.pipeline.set_source(handle);
        self.transform.reset();
        engine.set_transform(handle, &self.transform);
        self.pipeline.reset(engine);
        self.is_dirty = false;

        crate::log_info!("loaded source image {}x{} into '{}'", width, height, self.name);
        Ok(())
    }

    /// Push the current transform and re-run the pipeline. Call after any
    /// transform change; pipeline mutators re-apply on their own.
    pub fn reapply(&mut self, engine: &mut RasterEngine) {
        let Some(src) = &self.source else { return };
        engine.set_transform(src.handle, &self.transform);
        self.pipeline.apply(engine);
        self.is_dirty = true;
    }

    /// Reset image controls (pipeline + transform) without touching drawn
    /// objects, restoring the rendered output to the untouched source.
    pub fn reset_image(&mut self, engine: &mut RasterEngine) {
        if !self.has_source() {
            return;
        }
        self.transform.reset();
        if let Some(src) = &self.source {
            engine.set_transform(src.handle, &self.transform);
        }
        self.pipeline.reset(engine);
        self.is_dirty = true;
    }

    /// Encode the current render. `None` (logged) when no source is loaded
    /// or the engine fails — export is best-effort, never fatal.
    pub fn export(&self, engine: &RasterEngine, format: ExportFormat) -> Option<Vec<u8>> {
        let Some(src) = &self.source else {
            crate::log_warn!("export requested with no source image loaded");
            return None;
        };
        match engine.export_image(src.handle, format) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                crate::log_err!("export failed: {}", e);
                None
            }
        }
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    /// Window/tab title: name with a dirty marker.
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::{ImageEncoder, Rgba, RgbaImage};

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([120, 90, 30, 255]));
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(img.as_raw(), w, h, image::ColorType::Rgba8)
            .unwrap();
        bytes
    }

    #[test]
    fn load_source_resizes_canvas_and_resets_controls() {
        let mut engine = RasterEngine::new();
        let mut project = Project::new_untitled(1, 800, 600);

        project
            .load_source(&mut engine, &png_bytes(32, 16), Some(PathBuf::from("photo.png")))
            .unwrap();

        assert_eq!(project.name, "photo.png");
        assert_eq!((project.canvas.width, project.canvas.height), (32, 16));
        assert!(project.pipeline.has_source());
        assert!(project.transform.is_identity());
        assert!(!project.is_dirty);
    }

    #[test]
    fn loading_again_replaces_the_source_wholesale() {
        let mut engine = RasterEngine::new();
        let mut project = Project::new_untitled(1, 800, 600);

        project.load_source(&mut engine, &png_bytes(8, 8), None).unwrap();
        let first = project.source.as_ref().unwrap().handle;
        project.load_source(&mut engine, &png_bytes(4, 4), None).unwrap();
        let second = project.source.as_ref().unwrap().handle;

        assert_ne!(first, second);
        // The first handle was unloaded from the engine.
        assert!(engine.rendered(first).is_none());
        assert!(engine.rendered(second).is_some());
    }

    #[test]
    fn reset_after_edits_restores_the_source_bits() {
        use crate::pipeline::{Adjustment, Filter};

        let mut engine = RasterEngine::new();
        let mut project = Project::new_untitled(1, 800, 600);
        project.load_source(&mut engine, &png_bytes(8, 8), None).unwrap();
        let handle = project.source.as_ref().unwrap().handle;
        let original = engine.rendered(handle).unwrap().clone();

        project
            .pipeline
            .set_adjustment(&mut engine, Adjustment::Brightness, 40.0);
        project.pipeline.toggle_filter(&mut engine, Filter::Sepia);
        project.transform.toggle_flip_horizontal();
        project.reapply(&mut engine);
        assert_ne!(engine.rendered(handle).unwrap(), &original);

        project.reset_image(&mut engine);
        assert_eq!(engine.rendered(handle).unwrap(), &original);
        assert!(project.pipeline.resolve().is_empty());
    }

    #[test]
    fn export_without_source_is_none() {
        let engine = RasterEngine::new();
        let project = Project::new_untitled(1, 800, 600);
        assert!(project.export(&engine, ExportFormat::Png).is_none());
    }

    #[test]
    fn export_produces_decodable_png() {
        let mut engine = RasterEngine::new();
        let mut project = Project::new_untitled(1, 800, 600);
        project.load_source(&mut engine, &png_bytes(6, 6), None).unwrap();

        let bytes = project.export(&engine, ExportFormat::Png).unwrap();
        let back = image::load_from_memory(&bytes).unwrap();
        assert_eq!((back.width(), back.height()), (6, 6));
    }
}
