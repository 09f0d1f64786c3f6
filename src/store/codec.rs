//! Tagged-record encoding of the entry list.
//!
//! ```text
//! magic    "CLKB"
//! version  u8
//! count    u32 LE
//! record   count times:
//!   kind         u8   0 = text, 1 = image, 2 = audio
//!   name_len     u32 LE, name bytes (UTF-8)
//!   payload_len  u32 LE, payload bytes
//!   format_len   u8,    format bytes (".png", ... ; empty for text)
//! ```

use crate::error::FormatError;
use crate::models::{AudioFormat, ClipboardEntry, ImageFormat, Payload};

pub const MAGIC: &[u8; 4] = b"CLKB";
pub const VERSION: u8 = 1;

const KIND_TEXT: u8 = 0;
const KIND_IMAGE: u8 = 1;
const KIND_AUDIO: u8 = 2;

// Smallest possible record: kind + name_len + payload_len + format_len.
const MIN_RECORD_SIZE: usize = 1 + 4 + 4 + 1;

/// Fails only when a count or length does not fit its prefix.
pub fn encode_entries(entries: &[ClipboardEntry]) -> Result<Vec<u8>, FormatError> {
    let payload_total: usize = entries
        .iter()
        .map(|e| e.display_name.len() + payload_bytes(&e.payload).0.len() + 16)
        .sum();

    let mut buf = Vec::with_capacity(MAGIC.len() + 5 + payload_total);
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.extend_from_slice(&length_prefix(entries.len(), "entry count")?.to_le_bytes());

    for entry in entries {
        let (payload, kind, format) = payload_bytes(&entry.payload);
        buf.push(kind);
        put_bytes(&mut buf, entry.display_name.as_bytes(), "display name")?;
        put_bytes(&mut buf, payload, "payload")?;
        let format_len =
            u8::try_from(format.len()).map_err(|_| FormatError::TooLarge("payload format"))?;
        buf.push(format_len);
        buf.extend_from_slice(format.as_bytes());
    }

    Ok(buf)
}

fn payload_bytes(payload: &Payload) -> (&[u8], u8, &'static str) {
    match payload {
        Payload::Text(value) => (value.as_bytes(), KIND_TEXT, ""),
        Payload::Image { data, format } => (data, KIND_IMAGE, format.extension()),
        Payload::Audio { data, format } => (data, KIND_AUDIO, format.extension()),
    }
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8], field: &'static str) -> Result<(), FormatError> {
    buf.extend_from_slice(&length_prefix(bytes.len(), field)?.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

fn length_prefix(len: usize, field: &'static str) -> Result<u32, FormatError> {
    u32::try_from(len).map_err(|_| FormatError::TooLarge(field))
}

pub fn decode_entries(data: &[u8]) -> Result<Vec<ClipboardEntry>, FormatError> {
    let mut reader = Reader::new(data);

    if reader.take(MAGIC.len(), "header")? != MAGIC {
        return Err(FormatError::BadMagic);
    }
    let version = reader.u8("version")?;
    if version != VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }

    let count = reader.u32("entry count")? as usize;
    // The count comes from disk; never preallocate more than the data can hold.
    let mut entries = Vec::with_capacity(count.min(reader.remaining() / MIN_RECORD_SIZE));

    for _ in 0..count {
        entries.push(decode_record(&mut reader)?);
    }

    if reader.remaining() > 0 {
        return Err(FormatError::TrailingBytes(reader.remaining()));
    }

    Ok(entries)
}

fn decode_record(reader: &mut Reader<'_>) -> Result<ClipboardEntry, FormatError> {
    let kind = reader.u8("entry kind")?;

    let name_len = reader.u32("display name length")? as usize;
    let display_name = std::str::from_utf8(reader.take(name_len, "display name")?)
        .map_err(|_| FormatError::InvalidUtf8("display name"))?
        .to_string();

    let payload_len = reader.u32("payload length")? as usize;
    let payload = reader.take(payload_len, "payload")?;

    let format_len = reader.u8("format length")? as usize;
    let format = std::str::from_utf8(reader.take(format_len, "payload format")?)
        .map_err(|_| FormatError::InvalidUtf8("payload format"))?;

    let payload = match kind {
        KIND_TEXT => {
            if !format.is_empty() {
                return Err(FormatError::UnexpectedFormat);
            }
            let text = std::str::from_utf8(payload)
                .map_err(|_| FormatError::InvalidUtf8("text payload"))?;
            Payload::Text(text.to_string())
        }
        KIND_IMAGE => Payload::Image {
            data: payload.to_vec(),
            format: ImageFormat::from_extension(format)
                .filter(|f| f.extension() == format)
                .ok_or_else(|| FormatError::UnknownFormat(format.to_string()))?,
        },
        KIND_AUDIO => Payload::Audio {
            data: payload.to_vec(),
            format: AudioFormat::from_extension(format)
                .filter(|f| f.extension() == format)
                .ok_or_else(|| FormatError::UnknownFormat(format.to_string()))?,
        },
        other => return Err(FormatError::UnknownKind(other)),
    };

    Ok(ClipboardEntry {
        display_name,
        payload,
    })
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], FormatError> {
        if self.remaining() < len {
            return Err(FormatError::Truncated(field));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, FormatError> {
        Ok(self.take(1, field)?[0])
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, FormatError> {
        let bytes = self.take(4, field)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ClipboardEntry> {
        vec![
            ClipboardEntry::text("hello", "hello"),
            ClipboardEntry::text("", ""),
            ClipboardEntry::image("logo", vec![0x89, b'P', b'N', b'G', 0, 255], ImageFormat::Png),
            ClipboardEntry::audio("beep", vec![0; 3], AudioFormat::Wav),
            ClipboardEntry::audio("empty", Vec::new(), AudioFormat::Ogg),
        ]
    }

    #[test]
    fn entries_survive_encoding_in_order() {
        let entries = sample();
        let decoded = decode_entries(&encode_entries(&entries).unwrap()).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn empty_list_has_header_only() {
        let data = encode_entries(&[]).unwrap();
        assert_eq!(data.len(), MAGIC.len() + 1 + 4);
        assert!(decode_entries(&data).unwrap().is_empty());
    }

    #[test]
    fn rejects_wrong_magic_and_version() {
        assert_eq!(decode_entries(b"NOPE\x01\0\0\0\0"), Err(FormatError::BadMagic));
        assert_eq!(
            decode_entries(b"CLKB\x09\0\0\0\0"),
            Err(FormatError::UnsupportedVersion(9))
        );
        assert_eq!(decode_entries(b"CL"), Err(FormatError::Truncated("header")));
    }

    #[test]
    fn rejects_truncated_record() {
        let data = encode_entries(&sample()).unwrap();
        let cut = &data[..data.len() - 2];
        assert!(matches!(decode_entries(cut), Err(FormatError::Truncated(_))));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut data = encode_entries(&sample()).unwrap();
        data.extend_from_slice(b"junk");
        assert_eq!(decode_entries(&data), Err(FormatError::TrailingBytes(4)));
    }

    #[test]
    fn huge_count_does_not_preallocate() {
        let mut data = Vec::new();
        data.extend_from_slice(MAGIC);
        data.push(VERSION);
        data.extend_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(
            decode_entries(&data),
            Err(FormatError::Truncated("entry kind"))
        );
    }

    #[test]
    fn rejects_unknown_kind_and_format() {
        let mut data = encode_entries(&[ClipboardEntry::text("a", "b")]).unwrap();
        data[9] = 7;
        assert_eq!(decode_entries(&data), Err(FormatError::UnknownKind(7)));

        let mut data =
            encode_entries(&[ClipboardEntry::image("a", vec![1], ImageFormat::Bmp)]).unwrap();
        let len = data.len();
        data[len - 3..].copy_from_slice(b"xyz");
        assert_eq!(
            decode_entries(&data),
            Err(FormatError::UnknownFormat(".xyz".to_string()))
        );
    }

    #[test]
    fn rejects_invalid_utf8_text() {
        let mut data = encode_entries(&[ClipboardEntry::text("a", "b")]).unwrap();
        let len = data.len();
        // payload byte sits just before the empty format length
        data[len - 2] = 0xFF;
        assert_eq!(
            decode_entries(&data),
            Err(FormatError::InvalidUtf8("text payload"))
        );
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_lengths_are_refused_not_truncated() {
        assert_eq!(length_prefix(u32::MAX as usize, "payload"), Ok(u32::MAX));
        assert_eq!(
            length_prefix(u32::MAX as usize + 1, "payload"),
            Err(FormatError::TooLarge("payload"))
        );

        let mut buf = Vec::new();
        assert_eq!(put_bytes(&mut buf, &[], "display name"), Ok(()));
        assert_eq!(buf, [0, 0, 0, 0]);
    }
}
