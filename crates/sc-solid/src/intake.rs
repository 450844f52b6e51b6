//! File intake: vector outlines and environment images.
//!
//! Both paths validate before touching parameters. An outline load that
//! fails keeps the previous outline and records the message on the node.

use crate::error::{ParseError, SolidError};
use crate::markup;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use sc_core::id::NodeId;
use sc_core::params::{EnvironmentImage, ParamStore};

/// Largest accepted environment image, in bytes.
pub const ENVIRONMENT_SIZE_LIMIT: usize = 10 * 1024 * 1024;

pub const OUTLINE_MIME: &str = "image/svg+xml";

/// A file handed over by the host's file picker.
#[derive(Debug, Clone, Copy)]
pub struct FileUpload<'a> {
    pub name: &'a str,
    /// Declared media type; may be empty.
    pub mime: &'a str,
    pub bytes: &'a [u8],
}

fn is_outline(file: &FileUpload<'_>) -> bool {
    file.mime.eq_ignore_ascii_case(OUTLINE_MIME) || file.name.to_ascii_lowercase().ends_with(".svg")
}

/// Mark `id` as loading; the node shows a spinner until the read finishes.
pub fn begin_outline_load(store: &mut ParamStore, id: NodeId) {
    store.update(id, |p| {
        p.loading = true;
        p.error = None;
    });
}

/// Validate and install a read outline file.
pub fn finish_outline_load(store: &mut ParamStore, id: NodeId, file: &FileUpload<'_>) -> Result<(), SolidError> {
    match read_outline(file) {
        Ok(text) => {
            log::debug!("outline {:?} loaded for {:?}", file.name, id);
            store.update(id, |p| {
                p.outline = Some(text);
                p.file_name = file.name.to_string();
                p.loading = false;
                p.error = None;
            });
            Ok(())
        }
        Err(e) => {
            log::warn!("outline {:?} rejected: {e}", file.name);
            let message = e.user_message();
            store.update(id, |p| {
                p.loading = false;
                p.error = Some(message);
            });
            Err(e)
        }
    }
}

fn read_outline(file: &FileUpload<'_>) -> Result<String, SolidError> {
    if !is_outline(file) {
        return Err(SolidError::UnsupportedFileType(file.mime.to_string()));
    }
    let text = std::str::from_utf8(file.bytes).map_err(|e| ParseError::Syntax(e.to_string()))?;
    Ok(markup::validate(text)?.text)
}

/// Validate a JPEG/PNG environment image and install it as the custom
/// environment of `id`. Nothing changes on error.
pub fn upload_environment(store: &mut ParamStore, id: NodeId, file: &FileUpload<'_>) -> Result<(), SolidError> {
    let mime = file.mime.to_ascii_lowercase();
    let expected = match mime.as_str() {
        "image/jpeg" | "image/jpg" => ImageFormat::Jpeg,
        "image/png" => ImageFormat::Png,
        _ => return Err(SolidError::UnsupportedFileType(file.mime.to_string())),
    };
    if file.bytes.len() > ENVIRONMENT_SIZE_LIMIT {
        return Err(SolidError::FileTooLarge {
            size: file.bytes.len(),
            limit: ENVIRONMENT_SIZE_LIMIT,
        });
    }
    match image::guess_format(file.bytes) {
        Ok(found) if found == expected => {}
        Ok(found) => {
            return Err(SolidError::UnsupportedFileType(format!("{mime} declared, {found:?} content")));
        }
        Err(_) => return Err(SolidError::UnsupportedFileType(format!("{mime} declared, unknown content"))),
    }

    let data_url = format!("data:{mime};base64,{}", STANDARD.encode(file.bytes));
    store.update(id, |p| p.set_environment_image(EnvironmentImage { mime, data_url }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::params::EnvironmentPreset;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const GIF_MAGIC: &[u8] = b"GIF89a\x01\0\x01\0";

    #[test]
    fn outline_load_installs_sanitised_text() {
        let mut store = ParamStore::new();
        let id = NodeId::intern("intake_ok");
        begin_outline_load(&mut store, id);
        assert!(store.get(id).unwrap().loading);

        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"><title>Acme&reg;</title></svg>"#;
        let file = FileUpload {
            name: "logo.svg",
            mime: "image/svg+xml",
            bytes: svg,
        };
        finish_outline_load(&mut store, id, &file).unwrap();
        let p = store.get(id).unwrap();
        assert!(!p.loading);
        assert_eq!(p.file_name, "logo.svg");
        assert!(!p.outline.as_deref().unwrap().contains("&reg;"));
    }

    #[test]
    fn failed_outline_keeps_previous_text() {
        let mut store = ParamStore::new();
        let id = NodeId::intern("intake_keep");
        store.update(id, |p| p.outline = Some("<svg/>".to_string()));

        let file = FileUpload {
            name: "page.html",
            mime: "text/html",
            bytes: b"<html/>",
        };
        let err = finish_outline_load(&mut store, id, &file).unwrap_err();
        assert!(matches!(err, SolidError::UnsupportedFileType(_)));

        let file = FileUpload {
            name: "broken.svg",
            mime: "",
            bytes: b"<html/>",
        };
        assert_eq!(
            finish_outline_load(&mut store, id, &file),
            Err(SolidError::Parse(ParseError::MissingRoot))
        );
        let p = store.get(id).unwrap();
        assert_eq!(p.outline.as_deref(), Some("<svg/>"));
        assert_eq!(p.error.as_deref(), Some("Invalid SVG: No SVG element found"));
    }

    #[test]
    fn png_environment_is_installed() {
        let mut store = ParamStore::new();
        let id = NodeId::intern("intake_png");
        let file = FileUpload {
            name: "sky.png",
            mime: "image/png",
            bytes: PNG_MAGIC,
        };
        upload_environment(&mut store, id, &file).unwrap();
        let env = &store.get(id).unwrap().environment;
        assert_eq!(env.preset, EnvironmentPreset::Custom);
        assert!(env.enabled);
        assert!(env.custom_image.as_ref().unwrap().data_url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn mismatched_content_is_rejected() {
        let mut store = ParamStore::new();
        let id = NodeId::intern("intake_mismatch");
        let file = FileUpload {
            name: "sky.png",
            mime: "image/png",
            bytes: GIF_MAGIC,
        };
        assert!(matches!(
            upload_environment(&mut store, id, &file),
            Err(SolidError::UnsupportedFileType(_))
        ));
        assert!(!store.contains(id));
    }

    #[test]
    fn oversized_environment_is_rejected() {
        let mut store = ParamStore::new();
        let id = NodeId::intern("intake_big");
        let big = vec![0u8; ENVIRONMENT_SIZE_LIMIT + 1];
        let file = FileUpload {
            name: "huge.jpg",
            mime: "image/jpeg",
            bytes: &big,
        };
        let err = upload_environment(&mut store, id, &file).unwrap_err();
        assert_eq!(err.user_message(), "File too large: Image must be smaller than 10MB");
    }
}
