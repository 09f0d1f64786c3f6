use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use arboard::Clipboard;
use tracing::debug;

use crate::error::ClipboardError;
use crate::models::{ClipboardEntry, Payload};
use crate::utils::sanitize_file_stem;

// ============================================================================
// CLIPBOARD BACKEND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardBackend {
    WlClipboard,
    Arboard,
}

pub fn detect_clipboard_backend() -> ClipboardBackend {
    if (env::var("WAYLAND_DISPLAY").is_ok()
        || env::var("XDG_SESSION_TYPE").map_or(false, |v| v == "wayland"))
        && Command::new("wl-copy").arg("--version").output().is_ok()
    {
        ClipboardBackend::WlClipboard
    } else {
        ClipboardBackend::Arboard
    }
}

/// What ended up on the clipboard after a copy.
#[derive(Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    Text,
    Image,
    Audio,
    /// The audio payload was written to this file and its path copied.
    ExportedPath(PathBuf),
}

/// Put an entry's payload on the system clipboard.
pub fn copy_entry(
    entry: &ClipboardEntry,
    backend: ClipboardBackend,
    exports_dir: &Path,
) -> Result<CopyOutcome, ClipboardError> {
    let outcome = match (&entry.payload, backend) {
        (Payload::Text(value), _) => {
            set_clipboard_text(value, backend)?;
            CopyOutcome::Text
        }
        (Payload::Image { data, format }, ClipboardBackend::WlClipboard) => {
            wl_copy_bytes(data, format.mime_type())?;
            CopyOutcome::Image
        }
        (Payload::Image { data, .. }, ClipboardBackend::Arboard) => {
            set_arboard_image(data)?;
            CopyOutcome::Image
        }
        (Payload::Audio { data, format }, ClipboardBackend::WlClipboard) => {
            wl_copy_bytes(data, format.mime_type())?;
            CopyOutcome::Audio
        }
        (Payload::Audio { data, format }, ClipboardBackend::Arboard) => {
            let path = export_payload(
                exports_dir,
                &entry.display_name,
                format.extension(),
                data,
            )?;
            set_clipboard_text(&path.to_string_lossy(), backend)?;
            CopyOutcome::ExportedPath(path)
        }
    };

    debug!(kind = ?entry.kind(), ?backend, "entry copied to clipboard");
    Ok(outcome)
}

pub fn set_clipboard_text(content: &str, backend: ClipboardBackend) -> Result<(), ClipboardError> {
    match backend {
        ClipboardBackend::WlClipboard => {
            let output = Command::new("wl-copy")
                .arg("--")
                .arg(content)
                .output()
                .map_err(|e| ClipboardError::Tool {
                    tool: "wl-copy",
                    message: e.to_string(),
                })?;
            if output.status.success() {
                Ok(())
            } else {
                Err(ClipboardError::Tool {
                    tool: "wl-copy",
                    message: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
        }
        ClipboardBackend::Arboard => Clipboard::new()
            .and_then(|mut cb| cb.set_text(content))
            .map_err(|e| ClipboardError::Unavailable(e.to_string())),
    }
}

fn wl_copy_bytes(data: &[u8], mime_type: &str) -> Result<(), ClipboardError> {
    let tool_error = |e: std::io::Error| ClipboardError::Tool {
        tool: "wl-copy",
        message: e.to_string(),
    };

    let mut child = Command::new("wl-copy")
        .arg("--type")
        .arg(mime_type)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(tool_error)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(data).map_err(tool_error)?;
    }

    let status = child.wait().map_err(tool_error)?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::Tool {
            tool: "wl-copy",
            message: format!("exited with {}", status),
        })
    }
}

fn set_arboard_image(data: &[u8]) -> Result<(), ClipboardError> {
    let rgba = image::load_from_memory(data)?.to_rgba8();
    let (width, height) = rgba.dimensions();

    let img_data = arboard::ImageData {
        width: width as usize,
        height: height as usize,
        bytes: rgba.into_raw().into(),
    };

    Clipboard::new()
        .and_then(|mut cb| cb.set_image(img_data))
        .map_err(|e| ClipboardError::Unavailable(e.to_string()))
}

/// Write a payload to `<exports_dir>/<name><ext>` and return the path.
pub fn export_payload(
    exports_dir: &Path,
    display_name: &str,
    extension: &str,
    data: &[u8],
) -> Result<PathBuf, ClipboardError> {
    let path = exports_dir.join(format!("{}{}", sanitize_file_stem(display_name), extension));
    let export_error = |source| ClipboardError::Export {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(exports_dir).map_err(export_error)?;
    fs::write(&path, data).map_err(export_error)?;
    Ok(path)
}
