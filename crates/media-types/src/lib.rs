// Shared media domain types: stream formats, track categories and roles,
// codec descriptions and video resolution.

use std::fmt;

/// Video resolution information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a `WIDTHxHEIGHT` string as found in manifests.
    pub fn parse(value: &str) -> Option<Self> {
        let (w, h) = value.trim().split_once(['x', 'X'])?;
        Some(Self::new(w.parse().ok()?, h.parse().ok()?))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Container or elementary format carried by a representation's segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StreamFormat {
    #[default]
    Unknown,
    MpegTs,
    Mp4,
    WebVtt,
    Ttml,
    PackedAac,
    PackedMp3,
    PackedAc3,
    WebM,
    Ogg,
}

impl StreamFormat {
    /// Map a MIME type (parameters ignored) to a format.
    pub fn from_mime_type(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let Some((kind, subtype)) = essence.split_once('/') else {
            return Self::Unknown;
        };

        match (kind, subtype) {
            ("video" | "audio", "mp4") | ("application", "mp4") => Self::Mp4,
            ("video", "mp2t") => Self::MpegTs,
            ("video" | "audio", "webm") => Self::WebM,
            ("audio" | "video", "ogg") => Self::Ogg,
            ("text", "vtt") => Self::WebVtt,
            ("application", "ttml+xml") => Self::Ttml,
            ("audio", "aac") => Self::PackedAac,
            ("audio", "mpeg") => Self::PackedMp3,
            ("audio", "ac3") => Self::PackedAc3,
            _ => Self::Unknown,
        }
    }

    /// Map a file extension (without the leading dot) to a format.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "ts" | "m2ts" | "mts" => Self::MpegTs,
            "mp4" | "m4s" | "m4a" | "m4v" | "cmfv" | "cmfa" => Self::Mp4,
            "vtt" | "webvtt" => Self::WebVtt,
            "ttml" | "dfxp" => Self::Ttml,
            "aac" => Self::PackedAac,
            "mp3" => Self::PackedMp3,
            "ac3" => Self::PackedAc3,
            "webm" => Self::WebM,
            "ogg" | "oga" | "opus" => Self::Ogg,
            _ => Self::Unknown,
        }
    }

    /// Guess the format from a segment URI, ignoring query and fragment.
    pub fn from_uri(uri: &str) -> Self {
        let path = uri.split(['?', '#']).next().unwrap_or_default();
        let file = path.rsplit('/').next().unwrap_or_default();
        match file.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Unknown,
        }
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::MpegTs => "mpeg-ts",
            Self::Mp4 => "mp4",
            Self::WebVtt => "webvtt",
            Self::Ttml => "ttml",
            Self::PackedAac => "aac",
            Self::PackedMp3 => "mp3",
            Self::PackedAc3 => "ac3",
            Self::WebM => "webm",
            Self::Ogg => "ogg",
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elementary stream category of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackCategory {
    Video,
    Audio,
    Text,
    #[default]
    Unknown,
}

impl TrackCategory {
    pub fn from_mime_type(mime: &str) -> Self {
        let kind = mime.split('/').next().unwrap_or_default().trim();
        match kind.to_ascii_lowercase().as_str() {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "text" => Self::Text,
            "application" if mime.contains("ttml") => Self::Text,
            _ => Self::Unknown,
        }
    }

    /// Category implied by an RFC 6381 codec identifier.
    pub fn from_codec(codec: &str) -> Self {
        let fourcc = codec.split('.').next().unwrap_or_default();
        match fourcc {
            "avc1" | "avc3" | "hvc1" | "hev1" | "av01" | "vp09" | "vp08" | "dvh1" | "dvhe" => {
                Self::Video
            }
            "mp4a" | "ac-3" | "ec-3" | "opus" | "flac" | "vorbis" => Self::Audio,
            "wvtt" | "stpp" | "tx3g" => Self::Text,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for TrackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Text => "text",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Role of a track within its presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackRole {
    #[default]
    Main,
    Alternate,
    Supplementary,
    Commentary,
    Dub,
    Caption,
    Subtitle,
    Sign,
    Description,
}

impl TrackRole {
    /// Parse a manifest role value (e.g. DASH `urn:mpeg:dash:role:2011`).
    pub fn from_value(value: &str) -> Option<Self> {
        let role = match value.trim().to_ascii_lowercase().as_str() {
            "main" => Self::Main,
            "alternate" => Self::Alternate,
            "supplementary" => Self::Supplementary,
            "commentary" => Self::Commentary,
            "dub" => Self::Dub,
            "caption" => Self::Caption,
            "subtitle" => Self::Subtitle,
            "sign" => Self::Sign,
            "description" => Self::Description,
            _ => return None,
        };
        Some(role)
    }

    /// Whether the role is selected by default when nothing else is requested.
    #[inline]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Main)
    }
}

impl fmt::Display for TrackRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Main => "main",
            Self::Alternate => "alternate",
            Self::Supplementary => "supplementary",
            Self::Commentary => "commentary",
            Self::Dub => "dub",
            Self::Caption => "caption",
            Self::Subtitle => "subtitle",
            Self::Sign => "sign",
            Self::Description => "description",
        };
        f.write_str(s)
    }
}

/// Human readable description of the codec carried by a representation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodecDescription {
    /// RFC 6381 codec string, e.g. `avc1.64001f`
    pub codec: String,
    pub category: TrackCategory,
    pub language: Option<String>,
    pub description: Option<String>,
    pub resolution: Option<Resolution>,
    /// Declared bandwidth in bits per second
    pub bitrate: Option<u64>,
}

impl CodecDescription {
    pub fn new(codec: impl Into<String>) -> Self {
        let codec = codec.into();
        let category = TrackCategory::from_codec(&codec);
        Self {
            codec,
            category,
            ..Default::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = Some(bitrate);
        self
    }
}

impl fmt::Display for CodecDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.codec, self.category)?;
        if let Some(resolution) = self.resolution {
            write!(f, " {resolution}")?;
        }
        if let Some(lang) = &self.language {
            write!(f, " [{lang}]")?;
        }
        Ok(())
    }
}

/// Split a `CODECS` attribute (`"avc1.64001f,mp4a.40.2"`) into descriptions.
pub fn parse_codecs(list: &str) -> Vec<CodecDescription> {
    list.trim_matches('"')
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(CodecDescription::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_display() {
        let r = Resolution::new(1920, 1080);
        assert_eq!(r.to_string(), "1920x1080");
    }

    #[test]
    fn test_resolution_parse() {
        assert_eq!(Resolution::parse("1280x720"), Some(Resolution::new(1280, 720)));
        assert_eq!(Resolution::parse("640X360"), Some(Resolution::new(640, 360)));
        assert_eq!(Resolution::parse("wide"), None);
    }

    #[test]
    fn test_stream_format_from_mime() {
        assert_eq!(StreamFormat::from_mime_type("video/mp4"), StreamFormat::Mp4);
        assert_eq!(
            StreamFormat::from_mime_type("video/MP2T; charset=binary"),
            StreamFormat::MpegTs
        );
        assert_eq!(StreamFormat::from_mime_type("text/vtt"), StreamFormat::WebVtt);
        assert_eq!(StreamFormat::from_mime_type("garbage"), StreamFormat::Unknown);
    }

    #[test]
    fn test_stream_format_from_uri() {
        assert_eq!(
            StreamFormat::from_uri("https://cdn/v/seg-10.m4s?token=a.ts"),
            StreamFormat::Mp4
        );
        assert_eq!(StreamFormat::from_uri("chunk_3.ts"), StreamFormat::MpegTs);
        assert_eq!(StreamFormat::from_uri("https://cdn/v/noext"), StreamFormat::Unknown);
        assert!(StreamFormat::from_uri("dir.d/file").is_unknown());
    }

    #[test]
    fn test_track_category() {
        assert_eq!(TrackCategory::from_mime_type("audio/mp4"), TrackCategory::Audio);
        assert_eq!(
            TrackCategory::from_mime_type("application/ttml+xml"),
            TrackCategory::Text
        );
        assert_eq!(TrackCategory::from_codec("hvc1.1.6.L93"), TrackCategory::Video);
        assert_eq!(TrackCategory::from_codec("stpp"), TrackCategory::Text);
    }

    #[test]
    fn test_track_role_from_value() {
        assert_eq!(TrackRole::from_value("Commentary"), Some(TrackRole::Commentary));
        assert_eq!(TrackRole::from_value("bogus"), None);
        assert!(TrackRole::default().is_default());
    }

    #[test]
    fn test_parse_codecs() {
        let codecs = parse_codecs("\"avc1.64001f, mp4a.40.2\"");
        assert_eq!(codecs.len(), 2);
        assert_eq!(codecs[0].category, TrackCategory::Video);
        assert_eq!(codecs[1].codec, "mp4a.40.2");
        assert_eq!(codecs[1].category, TrackCategory::Audio);
    }

    #[test]
    fn test_codec_description_display() {
        let desc = CodecDescription::new("avc1.4d401f")
            .with_resolution(Resolution::new(1280, 720))
            .with_language("en");
        assert_eq!(desc.to_string(), "avc1.4d401f (video) 1280x720 [en]");
    }
}
