//! Media resource classification: metadata key families and encoding formats.

/// MIME type used when no suffix in [`ENCODING_FORMATS`] matches.
pub const DEFAULT_ENCODING_FORMAT: &str = "application/octet-stream";

/// Suffix → MIME type, matched case-insensitively against the URL path.
const ENCODING_FORMATS: &[(&str, &str)] = &[
    (".mp3", "audio/mpeg"),
    (".wav", "audio/wav"),
    (".mp4", "video/mp4"),
    (".webm", "video/webm"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".png", "image/png"),
    (".pdf", "application/pdf"),
    (
        ".ppt",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    (
        ".pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
];

/// Guess the encoding format of a media URL from its suffix.
///
/// Query strings and fragments are ignored, so signed CDN links still match.
pub fn guess_encoding_format(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    ENCODING_FORMATS
        .iter()
        .find(|(suffix, _)| path.ends_with(suffix))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_ENCODING_FORMAT)
}

/// Canonical metadata key families that denote an attached media object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFamily {
    Audio,
    Video,
    Image,
    Presentation,
}

impl MediaFamily {
    /// Classify a metadata key (case-insensitive, surrounding whitespace ignored).
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "audiourl" | "podcasturl" => Some(Self::Audio),
            "videourl" => Some(Self::Video),
            "imageurl" => Some(Self::Image),
            "presentationurl" | "slidesurl" => Some(Self::Presentation),
            _ => None,
        }
    }

    /// schema.org class local name for the media resource.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Audio => "AudioObject",
            Self::Video => "VideoObject",
            Self::Image => "ImageObject",
            Self::Presentation => "MediaObject",
        }
    }
}
