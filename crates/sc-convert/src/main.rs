//! `sc-convert`: vector outline file → STL, GLB, or glTF.
//!
//! Runs the same intake, generation, and export path as the editor, with
//! default solid parameters apart from `--depth` and `--no-bevel`.

use sc_core::id::NodeId;
use sc_core::params::ParamStore;
use sc_solid::export::{self, DownloadSink, ExportFormat, ExportRequest};
use sc_solid::{FileUpload, Presentation, SceneComposer};
use std::path::{Path, PathBuf};
use std::sync::Once;

const USAGE: &str = "usage: sc-convert <input.svg> <output.{stl|glb|gltf}> [--depth N] [--no-bevel]";

static LOGGER: Once = Once::new();

fn init_logging() {
    LOGGER.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
    });
}

#[derive(Debug, PartialEq)]
struct Options {
    input: PathBuf,
    output: PathBuf,
    format: ExportFormat,
    depth: Option<f32>,
    bevel: bool,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut positional = Vec::new();
    let mut depth = None;
    let mut bevel = true;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--depth" => {
                let value = iter.next().ok_or("--depth needs a value")?;
                let parsed: f32 = value.parse().map_err(|_| format!("invalid depth '{value}'"))?;
                if !parsed.is_finite() || parsed <= 0.0 {
                    return Err(format!("depth must be positive, got {parsed}"));
                }
                depth = Some(parsed);
            }
            "--no-bevel" => bevel = false,
            flag if flag.starts_with("--") => return Err(format!("unknown option '{flag}'")),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let [input, output] = <[PathBuf; 2]>::try_from(positional).map_err(|_| USAGE.to_string())?;
    let format = output
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ExportFormat::from_extension)
        .filter(|f| *f != ExportFormat::Png)
        .ok_or_else(|| format!("output must end in .stl, .glb or .gltf: {}", output.display()))?;
    Ok(Options {
        input,
        output,
        format,
        depth,
        bevel,
    })
}

/// Writes the exported bytes to a fixed path, ignoring the suggested name.
struct FileSink<'a> {
    path: &'a Path,
}

impl DownloadSink for FileSink<'_> {
    fn download(&mut self, _file_name: &str, _mime: &str, bytes: Vec<u8>) -> Result<(), String> {
        std::fs::write(self.path, bytes).map_err(|e| format!("{}: {e}", self.path.display()))
    }
}

fn run(opts: &Options) -> Result<(), String> {
    let bytes = std::fs::read(&opts.input).map_err(|e| format!("{}: {e}", opts.input.display()))?;
    let name = opts.input.file_name().and_then(|n| n.to_str()).unwrap_or("outline.svg");

    let mut store = ParamStore::new();
    let id = NodeId::intern("sc-convert");
    let upload = FileUpload {
        name,
        mime: "",
        bytes: &bytes,
    };
    sc_solid::finish_outline_load(&mut store, id, &upload).map_err(|e| e.user_message())?;
    store.update(id, |p| {
        if let Some(depth) = opts.depth {
            p.depth = depth;
        }
        p.bevel.enabled = opts.bevel;
    });

    let mut scene = SceneComposer::new(Presentation::Standalone);
    if let Some(params) = store.get(id) {
        scene.apply(params).map_err(|e| e.user_message())?;
    }
    if let Some(solid) = scene.solid() {
        log::info!("{} parts, {} materials", solid.geometry.parts.len(), solid.materials.len());
    }

    let req = ExportRequest {
        format: opts.format,
        source_name: name,
        png_multiplier: 1,
    };
    let mut sink = FileSink { path: &opts.output };
    export::export(&scene, &req, &mut sink).map_err(|e| export::failure_message(opts.format, &e))?;
    log::info!("wrote {}", opts.output.display());
    Ok(())
}

fn main() {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_args(&args).and_then(|opts| run(&opts));
    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_in_any_position() {
        let opts = parse_args(&args(&["--no-bevel", "in.svg", "--depth", "2.5", "out.GLB"])).unwrap();
        assert_eq!(opts.input, PathBuf::from("in.svg"));
        assert_eq!(opts.format, ExportFormat::Glb);
        assert_eq!(opts.depth, Some(2.5));
        assert!(!opts.bevel);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_args(&args(&["in.svg"])).is_err());
        assert!(parse_args(&args(&["in.svg", "out.png"])).is_err());
        assert!(parse_args(&args(&["in.svg", "out.stl", "--depth", "0"])).is_err());
        assert!(parse_args(&args(&["in.svg", "out.stl", "--depth"])).is_err());
        assert!(parse_args(&args(&["in.svg", "out.stl", "--fast"])).is_err());
    }
}
