// ============================================================================
// PhotoFE CLI — headless batch processing via command-line arguments
// ============================================================================
//
// Usage examples:
//   photofe --input photo.png --preset vintage --output result.png
//   photofe -i photo.jpg --brightness 20 --filter blur --filter noise -o out.png
//   photofe -i "*.jpg" --preset dramatic --output-dir processed/ --format png
//   photofe -i a.png b.png c.png --output-dir out/ --rotate 90 --flip-horizontal
//
// No GUI is opened in CLI mode. Each input runs through the exact same
// pipeline the GUI uses, synchronously on the current thread.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;

use crate::engine::{ExportFormat, RasterEngine};
use crate::io;
use crate::ops::transform::TransformState;
use crate::pipeline::{Adjustment, Filter, PipelineManager};
use crate::project::Project;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// PhotoFE headless image processor.
///
/// Apply adjustments, filters and presets to image files without opening
/// the GUI.
#[derive(Parser, Debug)]
#[command(
    name = "photofe",
    about = "PhotoFE headless batch image processor",
    long_about = "Apply the editor's adjustment/filter pipeline to image files without\n\
                  opening the GUI. Supports PNG, JPEG, WEBP, BMP, TGA, ICO and TIFF\n\
                  input; PNG and JPEG output.\n\n\
                  Example:\n  \
                  photofe --input photo.png --preset vintage --output result.png\n  \
                  photofe -i \"*.jpg\" --brightness 15 --filter sepia --output-dir out/"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for single-file input.
    /// For batch input use --output-dir instead.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    /// Files are written here with the original stem and the target extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png or jpeg. When omitted, inferred from --output's
    /// extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1-100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// Preset to apply before individual flags (vintage, dramatic,
    /// portrait, cool). Unknown names abort with an error.
    #[arg(short, long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Brightness, -100..100.
    #[arg(long, value_name = "VALUE")]
    pub brightness: Option<f32>,

    /// Contrast, -100..100.
    #[arg(long, value_name = "VALUE")]
    pub contrast: Option<f32>,

    /// Saturation, -100..100.
    #[arg(long, value_name = "VALUE")]
    pub saturation: Option<f32>,

    /// Hue rotation in degrees, -180..180.
    #[arg(long, value_name = "DEGREES")]
    pub hue: Option<f32>,

    /// Exposure, -100..100.
    #[arg(long, value_name = "VALUE")]
    pub exposure: Option<f32>,

    /// Filter to toggle on (repeatable): blur, sharpen, grayscale, sepia,
    /// invert, noise, pixelate, edge. Unknown names are skipped with a warning.
    #[arg(long = "filter", value_name = "NAME")]
    pub filters: Vec<String>,

    /// Shared intensity for all active filters, 0-100 (default 50).
    #[arg(long, value_name = "0-100")]
    pub intensity: Option<f32>,

    /// Mirror left-right.
    #[arg(long)]
    pub flip_horizontal: bool,

    /// Mirror top-bottom.
    #[arg(long)]
    pub flip_vertical: bool,

    /// Rotate clockwise by this many degrees (wraps at 360).
    #[arg(long, value_name = "DEGREES")]
    pub rotate: Option<f32>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process
    /// arguments. Used by `main()` to route before creating a window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i")
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing. Returns `true` when every file succeeded;
/// `main()` maps this onto the process exit code.
pub fn run(args: CliArgs) -> bool {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return false;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return false;
    }

    // A nonexistent preset is a hard error here: unlike a stray UI click
    // there is nothing interactive to fall back to.
    if let Some(ref preset) = args.preset
        && crate::presets::find(preset).is_none()
    {
        eprintln!("error: unknown preset '{}'.", preset);
        return false;
    }

    let mut engine = RasterEngine::new();
    let mut failures = 0usize;

    for input in &inputs {
        let started = Instant::now();
        match process_one(&mut engine, &args, input) {
            Ok(out_path) => {
                if args.verbose {
                    println!(
                        "{} -> {} ({} ms)",
                        input.display(),
                        out_path.display(),
                        started.elapsed().as_millis()
                    );
                }
            }
            Err(e) => {
                eprintln!("error: {}: {}", input.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!("{}/{} files failed.", failures, inputs.len());
        return false;
    }
    true
}

fn process_one(engine: &mut RasterEngine, args: &CliArgs, input: &Path) -> Result<PathBuf, String> {
    let bytes = io::read_file(input)?;
    let mut project = Project::new_untitled(1, 1, 1);
    project.load_source(engine, &bytes, Some(input.to_path_buf()))?;

    configure_pipeline(&mut project.pipeline, engine, args);
    project.transform = transform_from_args(args);
    project.reapply(engine);

    let out_path = output_path_for(args, input)?;
    let format = export_format_for(args, &out_path);
    let encoded = project
        .export(engine, format)
        .ok_or_else(|| "export produced no output".to_string())?;
    io::write_file(&out_path, &encoded)?;

    // One engine serves the whole batch; drop this image before the next.
    if let Some(src) = &project.source {
        engine.unload(src.handle);
    }
    Ok(out_path)
}

/// Install preset, adjustments, filters and intensity in the same order
/// the GUI would: preset first, then individual flags override on top.
fn configure_pipeline(pipeline: &mut PipelineManager, engine: &mut RasterEngine, args: &CliArgs) {
    if let Some(ref preset) = args.preset {
        pipeline.apply_preset(engine, preset);
    }

    let adjustments = [
        (Adjustment::Brightness, args.brightness),
        (Adjustment::Contrast, args.contrast),
        (Adjustment::Saturation, args.saturation),
        (Adjustment::Hue, args.hue),
        (Adjustment::Exposure, args.exposure),
    ];
    for (adj, value) in adjustments {
        if let Some(v) = value {
            pipeline.set_adjustment(engine, adj, v);
        }
    }

    for name in &args.filters {
        match Filter::from_name(name) {
            // Only switch on; a repeated flag should not toggle back off.
            Some(filter) if !pipeline.filters().contains(filter) => {
                pipeline.toggle_filter(engine, filter);
            }
            Some(_) => {}
            None => eprintln!("warning: skipping unknown filter '{}'", name),
        }
    }

    if let Some(intensity) = args.intensity {
        pipeline.set_filter_intensity(engine, intensity);
    }
}

fn transform_from_args(args: &CliArgs) -> TransformState {
    let mut t = TransformState::default();
    if args.flip_horizontal {
        t.toggle_flip_horizontal();
    }
    if args.flip_vertical {
        t.toggle_flip_vertical();
    }
    if let Some(deg) = args.rotate {
        t.rotate_by(deg);
    }
    t
}

fn output_path_for(args: &CliArgs, input: &Path) -> Result<PathBuf, String> {
    if let Some(ref dir) = args.output_dir {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let ext = match args.format.as_deref() {
            Some("jpeg") | Some("jpg") => "jpg",
            _ => "png",
        };
        return Ok(dir.join(format!("{}.{}", stem, ext)));
    }
    if let Some(ref out) = args.output {
        return Ok(out.clone());
    }
    // Neither given: write next to the input with the fixed default name.
    Ok(input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(io::DEFAULT_EXPORT_NAME))
}

fn export_format_for(args: &CliArgs, out_path: &Path) -> ExportFormat {
    match args.format.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("jpeg") | Some("jpg") => ExportFormat::Jpeg {
            quality: args.quality.clamp(1, 100),
        },
        Some("png") => ExportFormat::Png,
        Some(other) => {
            eprintln!("warning: unknown format '{}', writing png", other);
            ExportFormat::Png
        }
        None => io::format_for_path(out_path, args.quality.clamp(1, 100)),
    }
}

/// Expand glob patterns and literal paths into concrete files.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        if let Ok(paths) = glob::glob(pattern) {
            for path in paths.flatten() {
                if path.is_file() {
                    files.push(path);
                    matched = true;
                }
            }
        }
        // A literal path with glob metacharacters in its name still works.
        if !matched {
            let literal = PathBuf::from(pattern);
            if literal.is_file() {
                files.push(literal);
            }
        }
    }
    files
}

// ============================================================================
// Tests
// ============================================================================
