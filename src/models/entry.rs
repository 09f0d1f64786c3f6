use std::fs;
use std::path::Path;

use crate::error::EntryError;
use crate::utils::format_size;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Text,
    Image,
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Bmp,
    Jpg,
    Jpeg,
    Gif,
    Img,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Ogg,
}

/// What a button puts on the clipboard. Exactly one kind per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Image { data: Vec<u8>, format: ImageFormat },
    Audio { data: Vec<u8>, format: AudioFormat },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardEntry {
    pub display_name: String,
    pub payload: Payload,
}

// ============================================================================
// PAYLOAD FORMATS
// ============================================================================

impl ImageFormat {
    pub const ALL: [ImageFormat; 6] = [
        ImageFormat::Png,
        ImageFormat::Bmp,
        ImageFormat::Jpg,
        ImageFormat::Jpeg,
        ImageFormat::Gif,
        ImageFormat::Img,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => ".png",
            ImageFormat::Bmp => ".bmp",
            ImageFormat::Jpg => ".jpg",
            ImageFormat::Jpeg => ".jpeg",
            ImageFormat::Gif => ".gif",
            ImageFormat::Img => ".img",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let wanted = normalize_extension(ext);
        Self::ALL.into_iter().find(|f| f.extension() == wanted)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png | ImageFormat::Img => "image/png",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Jpg | ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 3] = [AudioFormat::Mp3, AudioFormat::Wav, AudioFormat::Ogg];

    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => ".mp3",
            AudioFormat::Wav => ".wav",
            AudioFormat::Ogg => ".ogg",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let wanted = normalize_extension(ext);
        Self::ALL.into_iter().find(|f| f.extension() == wanted)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Ogg => "audio/ogg",
        }
    }
}

fn normalize_extension(ext: &str) -> String {
    let lower = ext.trim().to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

// ============================================================================
// ENTRY
// ============================================================================

impl ClipboardEntry {
    pub fn text(display_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            payload: Payload::Text(value.into()),
        }
    }

    pub fn image(display_name: impl Into<String>, data: Vec<u8>, format: ImageFormat) -> Self {
        Self {
            display_name: display_name.into(),
            payload: Payload::Image { data, format },
        }
    }

    pub fn audio(display_name: impl Into<String>, data: Vec<u8>, format: AudioFormat) -> Self {
        Self {
            display_name: display_name.into(),
            payload: Payload::Audio { data, format },
        }
    }

    /// Build an image or audio entry from a file on disk, picking the kind
    /// from the file extension. The display name is the file stem.
    pub fn from_file(path: &Path) -> Result<Self, EntryError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| EntryError::UnsupportedFile(path.to_path_buf()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let image_format = ImageFormat::from_extension(ext);
        let audio_format = AudioFormat::from_extension(ext);
        if image_format.is_none() && audio_format.is_none() {
            return Err(EntryError::UnsupportedFile(path.to_path_buf()));
        }

        let data = fs::read(path).map_err(|source| EntryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if data.is_empty() {
            return Err(EntryError::EmptyFile(path.to_path_buf()));
        }

        match (image_format, audio_format) {
            (Some(format), _) => Ok(Self::image(name, data, format)),
            (None, Some(format)) => Ok(Self::audio(name, data, format)),
            (None, None) => Err(EntryError::UnsupportedFile(path.to_path_buf())),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self.payload {
            Payload::Text(_) => EntryKind::Text,
            Payload::Image { .. } => EntryKind::Image,
            Payload::Audio { .. } => EntryKind::Audio,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.payload, Payload::Text(_))
    }

    pub fn is_image(&self) -> bool {
        matches!(&self.payload, Payload::Image { data, .. } if !data.is_empty())
    }

    pub fn is_audio(&self) -> bool {
        matches!(&self.payload, Payload::Audio { data, .. } if !data.is_empty())
    }

    pub fn text_value(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self.kind() {
            EntryKind::Text => "T",
            EntryKind::Image => "I",
            EntryKind::Audio => "A",
        }
    }

    pub fn metadata_label(&self) -> String {
        match &self.payload {
            Payload::Text(value) => format!("{} char", value.chars().count()),
            Payload::Image { data, format } => {
                format!("{} {}", format.extension(), format_size(data.len() as u64))
            }
            Payload::Audio { data, format } => {
                format!("{} {}", format.extension(), format_size(data.len() as u64))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn extensions_parse_case_insensitively() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension(".jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(AudioFormat::from_extension("Ogg"), Some(AudioFormat::Ogg));
        assert_eq!(AudioFormat::from_extension(".flac"), None);
        assert_eq!(ImageFormat::from_extension("mp3"), None);
    }

    #[test]
    fn predicates_follow_payload() {
        let text = ClipboardEntry::text("a", "b");
        assert!(text.is_text());
        assert!(!text.is_image());

        let image = ClipboardEntry::image("pic", vec![1, 2, 3], ImageFormat::Gif);
        assert!(image.is_image());
        assert_eq!(image.kind(), EntryKind::Image);

        let empty_audio = ClipboardEntry::audio("silence", Vec::new(), AudioFormat::Wav);
        assert_eq!(empty_audio.kind(), EntryKind::Audio);
        assert!(!empty_audio.is_audio());
    }

    #[test]
    fn from_file_picks_kind_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let song = dir.path().join("jingle.MP3");
        fs::write(&song, [0x49, 0x44, 0x33]).unwrap();

        let entry = ClipboardEntry::from_file(&song).unwrap();
        assert_eq!(entry.display_name, "jingle");
        assert_eq!(
            entry.payload,
            Payload::Audio {
                data: vec![0x49, 0x44, 0x33],
                format: AudioFormat::Mp3
            }
        );
    }

    #[test]
    fn from_file_rejects_unknown_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("notes.txt");
        fs::write(&doc, "hi").unwrap();
        assert!(matches!(
            ClipboardEntry::from_file(&doc),
            Err(EntryError::UnsupportedFile(_))
        ));

        let blank = dir.path().join("blank.png");
        fs::write(&blank, b"").unwrap();
        assert!(matches!(
            ClipboardEntry::from_file(&blank),
            Err(EntryError::EmptyFile(_))
        ));
    }

    #[test]
    fn metadata_label_describes_payload() {
        assert_eq!(ClipboardEntry::text("x", "héllo").metadata_label(), "5 char");
        let image = ClipboardEntry::image("x", vec![0; 2048], ImageFormat::Png);
        assert_eq!(image.metadata_label(), ".png 2.0 KB");
    }
}
