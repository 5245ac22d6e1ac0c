// ============================================================================
// OPERATION PIPELINE — adjustments + filters resolved into engine ops
// ============================================================================
//
// The manager owns the slider state (AdjustmentSet), the active filter set
// and the shared filter intensity. On every change it re-resolves the full
// ordered operation list and hands it to the engine, which replays it
// against the pristine source image. Nothing is ever applied incrementally
// on top of an already-filtered buffer, so repeated edits cannot drift.
//
// Resolution order is fixed and part of the output contract: adjustments
// first (brightness, contrast, saturation, hue, exposure), then filters in
// the order the user switched them on. Operations do not commute — blur
// before edge-detect looks nothing like edge-detect before blur.
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::engine::{ImageHandle, ImageOp, RenderEngine};
use crate::presets;

/// Intensity a newly toggled filter starts at, and the value `reset()`
/// restores (0–100 scale).
pub const DEFAULT_FILTER_INTENSITY: f32 = 50.0;

// ============================================================================
// Adjustments
// ============================================================================

/// The five tone controls, in their fixed resolution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Adjustment {
    Brightness,
    Contrast,
    Saturation,
    Hue,
    Exposure,
}

impl Adjustment {
    pub fn label(&self) -> &'static str {
        match self {
            Adjustment::Brightness => "Brightness",
            Adjustment::Contrast => "Contrast",
            Adjustment::Saturation => "Saturation",
            Adjustment::Hue => "Hue",
            Adjustment::Exposure => "Exposure",
        }
    }

    /// Slider range. All adjustments are neutral at 0.
    pub fn range(&self) -> (f32, f32) {
        match self {
            Adjustment::Hue => (-180.0, 180.0),
            _ => (-100.0, 100.0),
        }
    }

    pub fn all() -> &'static [Adjustment] {
        &[
            Adjustment::Brightness,
            Adjustment::Contrast,
            Adjustment::Saturation,
            Adjustment::Hue,
            Adjustment::Exposure,
        ]
    }
}

/// Fixed record of tone-control values; always present, all fields neutral
/// (0) by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentSet {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub hue: f32,
    pub exposure: f32,
}

impl AdjustmentSet {
    pub fn get(&self, adj: Adjustment) -> f32 {
        match adj {
            Adjustment::Brightness => self.brightness,
            Adjustment::Contrast => self.contrast,
            Adjustment::Saturation => self.saturation,
            Adjustment::Hue => self.hue,
            Adjustment::Exposure => self.exposure,
        }
    }

    /// Set one field, clamping to the adjustment's declared range.
    /// Out-of-range input degrades to the nearest bound, never an error.
    pub fn set(&mut self, adj: Adjustment, value: f32) {
        let (min, max) = adj.range();
        let value = if value.is_finite() {
            value.clamp(min, max)
        } else {
            0.0
        };
        match adj {
            Adjustment::Brightness => self.brightness = value,
            Adjustment::Contrast => self.contrast = value,
            Adjustment::Saturation => self.saturation = value,
            Adjustment::Hue => self.hue = value,
            Adjustment::Exposure => self.exposure = value,
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == AdjustmentSet::default()
    }
}

// ============================================================================
// Filters
// ============================================================================

/// The fixed set of stylistic filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    Blur,
    Sharpen,
    Grayscale,
    Sepia,
    Invert,
    Noise,
    Pixelate,
    Edge,
}

impl Filter {
    pub fn label(&self) -> &'static str {
        match self {
            Filter::Blur => "Blur",
            Filter::Sharpen => "Sharpen",
            Filter::Grayscale => "Grayscale",
            Filter::Sepia => "Sepia",
            Filter::Invert => "Invert",
            Filter::Noise => "Noise",
            Filter::Pixelate => "Pixelate",
            Filter::Edge => "Edge",
        }
    }

    /// Lookup by the name used in the CLI and presets. Unknown names are
    /// the caller's problem to ignore.
    pub fn from_name(name: &str) -> Option<Filter> {
        match name.to_ascii_lowercase().as_str() {
            "blur" => Some(Filter::Blur),
            "sharpen" => Some(Filter::Sharpen),
            "grayscale" | "greyscale" => Some(Filter::Grayscale),
            "sepia" => Some(Filter::Sepia),
            "invert" => Some(Filter::Invert),
            "noise" => Some(Filter::Noise),
            "pixelate" => Some(Filter::Pixelate),
            "edge" => Some(Filter::Edge),
            _ => None,
        }
    }

    pub fn all() -> &'static [Filter] {
        &[
            Filter::Blur,
            Filter::Sharpen,
            Filter::Grayscale,
            Filter::Sepia,
            Filter::Invert,
            Filter::Noise,
            Filter::Pixelate,
            Filter::Edge,
        ]
    }

    /// Fixed filter→primitive table. `k` is the shared intensity mapped to
    /// 0.0–1.0; the per-filter constants match the editor's historical
    /// scaling so existing images re-render identically.
    pub fn primitive(&self, k: f32) -> ImageOp {
        match self {
            Filter::Blur => ImageOp::Blur(2.0 * k),
            Filter::Sharpen => ImageOp::Sharpen,
            Filter::Grayscale => ImageOp::Grayscale,
            Filter::Sepia => ImageOp::Sepia,
            Filter::Invert => ImageOp::Invert,
            Filter::Noise => ImageOp::Noise(500.0 * k),
            Filter::Pixelate => ImageOp::Pixelate(4 + (16.0 * k) as u32),
            Filter::Edge => ImageOp::EdgeDetect,
        }
    }
}

/// Active filters in the order they were switched on. Presence-check plus
/// stable insertion-order enumeration; the order feeds straight into the
/// resolved operation list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    active: Vec<Filter>,
}

impl FilterSet {
    pub fn contains(&self, filter: Filter) -> bool {
        self.active.contains(&filter)
    }

    /// Switch a filter on (appending) or off. Returns `true` when the
    /// filter is active afterwards.
    pub fn toggle(&mut self, filter: Filter) -> bool {
        if let Some(pos) = self.active.iter().position(|f| *f == filter) {
            self.active.remove(pos);
            false
        } else {
            self.active.push(filter);
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Filter> + '_ {
        self.active.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

// ============================================================================
// Pipeline manager
// ============================================================================

/// Owns the UI-driven pipeline state and re-applies it to the source image
/// through the engine on every change. All mutators are silent no-ops until
/// a source image is attached.
#[derive(Clone, Debug)]
pub struct PipelineManager {
    adjustments: AdjustmentSet,
    filters: FilterSet,
    /// Shared 0–100 intensity applied uniformly to every active filter.
    intensity: f32,
    source: Option<ImageHandle>,
}

impl Default for PipelineManager {
    fn default() -> Self {
        Self {
            adjustments: AdjustmentSet::default(),
            filters: FilterSet::default(),
            intensity: DEFAULT_FILTER_INTENSITY,
            source: None,
        }
    }
}

impl PipelineManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- source -----------------------------------------------------------

    /// Attach a freshly loaded source image. Pipeline state carries over;
    /// callers wanting a clean slate call `reset()` as well.
    pub fn set_source(&mut self, handle: ImageHandle) {
        self.source = Some(handle);
    }

    pub fn clear_source(&mut self) {
        self.source = None;
    }

    pub fn source(&self) -> Option<ImageHandle> {
        self.source
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    // ---- state accessors ----------------------------------------------------

    pub fn adjustments(&self) -> &AdjustmentSet {
        &self.adjustments
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    // ---- mutators (each re-resolves and re-applies) -------------------------

    /// Update one adjustment (clamped to its range) and re-apply.
    pub fn set_adjustment(
        &mut self,
        engine: &mut dyn RenderEngine,
        adj: Adjustment,
        value: f32,
    ) {
        self.adjustments.set(adj, value);
        self.apply(engine);
    }

    /// Switch a filter on or off and re-apply. Returns `true` when the
    /// filter is active afterwards.
    pub fn toggle_filter(&mut self, engine: &mut dyn RenderEngine, filter: Filter) -> bool {
        let now_active = self.filters.toggle(filter);
        self.apply(engine);
        now_active
    }

    /// Update the shared intensity (clamped to 0–100) and re-apply. One
    /// scalar scales every active filter uniformly — there is no per-filter
    /// intensity.
    pub fn set_filter_intensity(&mut self, engine: &mut dyn RenderEngine, value: f32) {
        self.intensity = if value.is_finite() {
            value.clamp(0.0, 100.0)
        } else {
            DEFAULT_FILTER_INTENSITY
        };
        self.apply(engine);
    }

    /// Clear adjustments, filters and intensity back to defaults and
    /// re-apply, yielding the unmodified source image.
    pub fn reset(&mut self, engine: &mut dyn RenderEngine) {
        self.adjustments = AdjustmentSet::default();
        self.filters.clear();
        self.intensity = DEFAULT_FILTER_INTENSITY;
        self.apply(engine);
    }

    /// Install a named preset: reset, then the preset's adjustment and
    /// filter values, then one re-apply. Unknown ids leave all state
    /// untouched (logged, not fatal). Returns whether the preset existed.
    pub fn apply_preset(&mut self, engine: &mut dyn RenderEngine, preset_id: &str) -> bool {
        let Some(preset) = presets::find(preset_id) else {
            crate::log_warn!("ignoring unknown preset '{}'", preset_id);
            return false;
        };

        self.adjustments = AdjustmentSet::default();
        self.filters.clear();
        self.intensity = DEFAULT_FILTER_INTENSITY;
        for (adj, value) in preset.adjustments {
            self.adjustments.set(*adj, *value);
        }
        for filter in preset.filters {
            self.filters.toggle(*filter);
        }
        self.apply(engine);
        true
    }

    // ---- resolution ----------------------------------------------------------

    /// Resolve the current state into the ordered primitive operation list.
    /// Pure: same state, same list. Adjustments come first in fixed order,
    /// each only when it differs from neutral (exposure expands into a
    /// brightness + contrast pair); filters follow in insertion order.
    pub fn resolve(&self) -> Vec<ImageOp> {
        let mut ops = Vec::new();
        let a = &self.adjustments;

        if a.brightness != 0.0 {
            ops.push(ImageOp::Brightness(a.brightness / 100.0));
        }
        if a.contrast != 0.0 {
            ops.push(ImageOp::Contrast(a.contrast / 100.0));
        }
        if a.saturation != 0.0 {
            ops.push(ImageOp::Saturation(1.0 + a.saturation / 100.0));
        }
        if a.hue != 0.0 {
            ops.push(ImageOp::HueRotate(a.hue));
        }
        if a.exposure != 0.0 {
            ops.push(ImageOp::Brightness(a.exposure / 100.0));
            ops.push(ImageOp::Contrast(a.exposure / 100.0));
        }

        let k = self.intensity / 100.0;
        for filter in self.filters.iter() {
            ops.push(filter.primitive(k));
        }
        ops
    }

    /// Send the resolved list to the engine and re-render from source.
    /// Silent no-op with no source loaded; engine failures are logged and
    /// leave the previous render on screen.
    pub fn apply(&self, engine: &mut dyn RenderEngine) {
        let Some(handle) = self.source else {
            return;
        };
        engine.set_operations(handle, &self.resolve());
        if let Err(e) = engine.apply_and_render(handle) {
            crate::log_err!("pipeline apply failed: {}", e);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, ExportFormat};
    use crate::ops::transform::TransformState;

    /// Fake engine that records every call, for asserting on the exact
    /// operation lists the manager sends.
    #[derive(Default)]
    struct RecordingEngine {
        handle: Option<ImageHandle>,
        last_ops: Vec<ImageOp>,
        op_history: Vec<Vec<ImageOp>>,
        renders: usize,
    }

    impl RecordingEngine {
        fn with_source() -> (Self, ImageHandle) {
            let handle = ImageHandle::fresh();
            (
                Self {
                    handle: Some(handle),
                    ..Self::default()
                },
                handle,
            )
        }
    }

    impl RenderEngine for RecordingEngine {
        fn load_image(&mut self, _bytes: &[u8]) -> Result<ImageHandle, EngineError> {
            let handle = ImageHandle::fresh();
            self.handle = Some(handle);
            Ok(handle)
        }

        fn set_operations(&mut self, _handle: ImageHandle, ops: &[ImageOp]) {
            self.last_ops = ops.to_vec();
            self.op_history.push(ops.to_vec());
        }

        fn set_transform(&mut self, _handle: ImageHandle, _transform: &TransformState) {}

        fn apply_and_render(&mut self, _handle: ImageHandle) -> Result<(), EngineError> {
            self.renders += 1;
            Ok(())
        }

        fn export_image(
            &self,
            _handle: ImageHandle,
            _format: ExportFormat,
        ) -> Result<Vec<u8>, EngineError> {
            Ok(Vec::new())
        }
    }

    fn manager_with_source() -> (PipelineManager, RecordingEngine) {
        let (engine, handle) = RecordingEngine::with_source();
        let mut manager = PipelineManager::new();
        manager.set_source(handle);
        (manager, engine)
    }

    #[test]
    fn neutral_state_resolves_to_empty_list() {
        let manager = PipelineManager::new();
        assert!(manager.resolve().is_empty());
    }

    #[test]
    fn resolve_is_pure() {
        let (mut manager, mut engine) = manager_with_source();
        manager.set_adjustment(&mut engine, Adjustment::Contrast, 25.0);
        manager.toggle_filter(&mut engine, Filter::Sepia);
        assert_eq!(manager.resolve(), manager.resolve());
    }

    #[test]
    fn adjustments_resolve_in_fixed_order() {
        let (mut manager, mut engine) = manager_with_source();
        // Set in scrambled order; resolution order must not care.
        manager.set_adjustment(&mut engine, Adjustment::Hue, 30.0);
        manager.set_adjustment(&mut engine, Adjustment::Brightness, 10.0);
        manager.set_adjustment(&mut engine, Adjustment::Exposure, 20.0);
        manager.set_adjustment(&mut engine, Adjustment::Contrast, -5.0);

        assert_eq!(
            manager.resolve(),
            vec![
                ImageOp::Brightness(0.1),
                ImageOp::Contrast(-0.05),
                ImageOp::HueRotate(30.0),
                // Exposure expands into a brightness + contrast pair, last.
                ImageOp::Brightness(0.2),
                ImageOp::Contrast(0.2),
            ]
        );
    }

    #[test]
    fn out_of_range_adjustments_clamp() {
        let (mut manager, mut engine) = manager_with_source();
        manager.set_adjustment(&mut engine, Adjustment::Brightness, 250.0);
        assert_eq!(manager.adjustments().brightness, 100.0);
        manager.set_adjustment(&mut engine, Adjustment::Hue, -500.0);
        assert_eq!(manager.adjustments().hue, -180.0);
        manager.set_adjustment(&mut engine, Adjustment::Contrast, f32::NAN);
        assert_eq!(manager.adjustments().contrast, 0.0);
    }

    #[test]
    fn filters_resolve_in_insertion_order() {
        let (mut manager, mut engine) = manager_with_source();
        manager.toggle_filter(&mut engine, Filter::Edge);
        manager.toggle_filter(&mut engine, Filter::Blur);

        // Edge was toggled first, so it must precede blur in the output.
        assert_eq!(
            manager.resolve(),
            vec![ImageOp::EdgeDetect, ImageOp::Blur(1.0)]
        );
    }

    #[test]
    fn toggle_twice_removes_the_filter() {
        let (mut manager, mut engine) = manager_with_source();
        assert!(manager.toggle_filter(&mut engine, Filter::Sepia));
        assert!(!manager.toggle_filter(&mut engine, Filter::Sepia));
        assert!(!manager.filters().contains(Filter::Sepia));
        assert!(manager.resolve().is_empty());
    }

    #[test]
    fn shared_intensity_scales_all_active_filters() {
        let (mut manager, mut engine) = manager_with_engine_filters();

        manager.set_filter_intensity(&mut engine, 80.0);
        assert_eq!(
            manager.resolve(),
            vec![ImageOp::Blur(1.6), ImageOp::Noise(400.0)]
        );

        manager.set_filter_intensity(&mut engine, 20.0);
        assert_eq!(
            manager.resolve(),
            vec![ImageOp::Blur(0.4), ImageOp::Noise(100.0)]
        );
    }

    fn manager_with_engine_filters() -> (PipelineManager, RecordingEngine) {
        let (mut manager, mut engine) = manager_with_source();
        manager.toggle_filter(&mut engine, Filter::Blur);
        manager.toggle_filter(&mut engine, Filter::Noise);
        (manager, engine)
    }

    #[test]
    fn intensity_clamps_to_percent_range() {
        let (mut manager, mut engine) = manager_with_source();
        manager.set_filter_intensity(&mut engine, 900.0);
        assert_eq!(manager.intensity(), 100.0);
        manager.set_filter_intensity(&mut engine, -3.0);
        assert_eq!(manager.intensity(), 0.0);
    }

    #[test]
    fn reset_restores_the_empty_pipeline() {
        let (mut manager, mut engine) = manager_with_source();
        manager.set_adjustment(&mut engine, Adjustment::Saturation, -40.0);
        manager.toggle_filter(&mut engine, Filter::Pixelate);
        manager.set_filter_intensity(&mut engine, 75.0);

        manager.reset(&mut engine);
        assert!(manager.adjustments().is_neutral());
        assert!(manager.filters().is_empty());
        assert_eq!(manager.intensity(), DEFAULT_FILTER_INTENSITY);
        assert!(manager.resolve().is_empty());
        // The engine was told to render the bare source.
        assert!(engine.last_ops.is_empty());
    }

    #[test]
    fn apply_without_source_is_a_no_op() {
        let mut manager = PipelineManager::new();
        let mut engine = RecordingEngine::default();
        manager.set_adjustment(&mut engine, Adjustment::Brightness, 50.0);
        manager.toggle_filter(&mut engine, Filter::Invert);
        assert_eq!(engine.renders, 0);
        assert!(engine.op_history.is_empty());
        // State still tracks, ready for when an image arrives.
        assert_eq!(manager.adjustments().brightness, 50.0);
    }

    #[test]
    fn apply_is_idempotent_for_unchanged_state() {
        let (mut manager, mut engine) = manager_with_source();
        manager.toggle_filter(&mut engine, Filter::Grayscale);
        manager.apply(&mut engine);
        manager.apply(&mut engine);

        let n = engine.op_history.len();
        assert!(n >= 3);
        // Every apply sent the identical list; nothing stacked up.
        assert_eq!(engine.op_history[n - 1], engine.op_history[n - 2]);
        assert_eq!(engine.op_history[n - 1], vec![ImageOp::Grayscale]);
    }

    #[test]
    fn vintage_preset_matches_its_table() {
        let (mut manager, mut engine) = manager_with_source();
        // Dirty the state first; the preset must reset before installing.
        manager.set_adjustment(&mut engine, Adjustment::Exposure, 60.0);
        manager.toggle_filter(&mut engine, Filter::Invert);

        assert!(manager.apply_preset(&mut engine, "vintage"));
        assert_eq!(
            *manager.adjustments(),
            AdjustmentSet {
                saturation: -30.0,
                brightness: 10.0,
                contrast: 10.0,
                ..AdjustmentSet::default()
            }
        );
        let active: Vec<Filter> = manager.filters().iter().collect();
        assert_eq!(active, vec![Filter::Sepia, Filter::Noise]);
        assert_eq!(manager.intensity(), DEFAULT_FILTER_INTENSITY);
    }

    #[test]
    fn unknown_preset_leaves_state_untouched() {
        let (mut manager, mut engine) = manager_with_source();
        manager.set_adjustment(&mut engine, Adjustment::Brightness, 33.0);
        let renders_before = engine.renders;

        assert!(!manager.apply_preset(&mut engine, "definitely-not-a-preset"));
        assert_eq!(manager.adjustments().brightness, 33.0);
        assert_eq!(engine.renders, renders_before);
    }

    #[test]
    fn filter_names_round_trip() {
        for f in Filter::all() {
            assert_eq!(Filter::from_name(&f.label().to_lowercase()), Some(*f));
        }
        assert_eq!(Filter::from_name("vignette"), None);
    }
}
