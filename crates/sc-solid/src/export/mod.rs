//! Exporter: STL, glTF/GLB, and PNG downloads of the live scene.
//!
//! Every path serialises fully in memory before anything reaches the
//! [`DownloadSink`], so a failure never leaves a partial file behind.

pub mod gltf;
pub mod png;
pub mod stl;

use crate::error::ExportError;
use crate::scene::SceneComposer;

/// Output formats offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Binary STL.
    Stl,
    /// Binary glTF.
    Glb,
    /// JSON glTF with the buffer embedded as a data URI.
    Gltf,
    Png,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [ExportFormat::Stl, ExportFormat::Glb, ExportFormat::Gltf, ExportFormat::Png];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Stl => "stl",
            ExportFormat::Glb => "glb",
            ExportFormat::Gltf => "gltf",
            ExportFormat::Png => "png",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Stl | ExportFormat::Glb => "application/octet-stream",
            ExportFormat::Gltf => "application/json",
            ExportFormat::Png => "image/png",
        }
    }

    /// Look a format up by file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<ExportFormat> {
        Self::ALL.into_iter().find(|f| f.extension().eq_ignore_ascii_case(ext))
    }
}

/// Where finished files go. The host typically triggers a browser or
/// desktop download.
pub trait DownloadSink {
    fn download(&mut self, file_name: &str, mime: &str, bytes: Vec<u8>) -> Result<(), String>;
}

/// A file captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Keeps downloads in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub files: Vec<DownloadedFile>,
}

impl DownloadSink for MemorySink {
    fn download(&mut self, file_name: &str, mime: &str, bytes: Vec<u8>) -> Result<(), String> {
        self.files.push(DownloadedFile {
            name: file_name.to_string(),
            mime: mime.to_string(),
            bytes,
        });
        Ok(())
    }
}

/// `logo.SVG` → `logo.stl`. Only image extensions are stripped.
pub fn download_name(source: &str, format: ExportFormat) -> String {
    let base = source
        .rsplit_once('.')
        .filter(|(_, ext)| ["svg", "png", "jpg", "jpeg"].iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .map_or(source, |(stem, _)| stem);
    format!("{base}.{}", format.extension())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportRequest<'a> {
    pub format: ExportFormat,
    /// Name of the loaded source file.
    pub source_name: &'a str,
    /// Raster scale, 1 to 3. Ignored by mesh formats.
    pub png_multiplier: u32,
}

/// Serialise the scene's solid (or last frame) and hand it to `sink`.
/// Returns the success message to show.
pub fn export(scene: &SceneComposer, req: &ExportRequest<'_>, sink: &mut dyn DownloadSink) -> Result<String, ExportError> {
    let solid = || scene.handle().map(|h| h.solid).ok_or(ExportError::NoSolid);
    let bytes = match req.format {
        ExportFormat::Stl => stl::encode(&stl::prepare(solid()?)),
        ExportFormat::Glb => gltf::encode_glb(solid()?)?,
        ExportFormat::Gltf => gltf::encode_gltf(solid()?)?,
        ExportFormat::Png => {
            let frame = scene.frame().ok_or(ExportError::NoFrame)?;
            png::encode(frame, req.png_multiplier)?
        }
    };

    let name = download_name(req.source_name, req.format);
    log::debug!("exporting {name} ({} bytes)", bytes.len());
    sink.download(&name, req.format.mime(), bytes).map_err(ExportError::Download)?;
    Ok(format!("{name} downloaded successfully"))
}

/// Text to show when an export fails.
pub fn failure_message(format: ExportFormat, err: &ExportError) -> String {
    match err {
        ExportError::NoSolid | ExportError::NoFrame => err.user_message(),
        _ => format!("Failed to export {}", format.extension().to_ascii_uppercase()),
    }
}
