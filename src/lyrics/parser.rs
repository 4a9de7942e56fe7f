//! LRC format parser
//!
//! Parses timed lyrics in LRC format:
//! [ti:Song title]
//! [ar:Artist]
//! [00:12.34] Lyrics line here
//! [00:15.00][01:02.500] Chorus sung twice
//!
//! Metadata tags (`ti`, `ar`, `al`, `by`) become entries of their own and are
//! given display times ahead of the first lyric, so they show one after the
//! other during the intro.

/// Upper bound for the window metadata entries are spread across.
const METADATA_WINDOW_SECS: f64 = 20.0;

/// Header tag of an LRC document, in display precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetadataTag {
    Title,
    Artist,
    Album,
    Publisher,
}

impl MetadataTag {
    /// Match an LRC tag name (`ti`, `ar`, `al`, `by`), case-insensitively
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "ti" => Some(Self::Title),
            "ar" => Some(Self::Artist),
            "al" => Some(Self::Album),
            "by" => Some(Self::Publisher),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Artist => "Artist",
            Self::Album => "Album",
            Self::Publisher => "Lyrics by",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Lyric,
    Metadata(MetadataTag),
}

/// A single timed line of a lyric document
#[derive(Debug, Clone, PartialEq)]
pub struct LyricEntry {
    /// Display time in seconds from the start of the track
    pub time: f64,
    pub text: String,
    pub kind: EntryKind,
}

impl LyricEntry {
    pub fn lyric(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
            kind: EntryKind::Lyric,
        }
    }

    pub fn metadata(time: f64, tag: MetadataTag, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
            kind: EntryKind::Metadata(tag),
        }
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self.kind, EntryKind::Metadata(_))
    }

    /// `[mm:ss.xx]` time tag, rounded to the nearest centisecond
    pub fn lrc_tag(&self) -> String {
        let cs = (self.time.max(0.0) * 100.0).round() as u64;
        format!("[{:02}:{:02}.{:02}]", cs / 6000, cs / 100 % 60, cs % 100)
    }
}

/// Parsed lyric document, sorted by display time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricDocument {
    entries: Vec<LyricEntry>,
}

impl LyricDocument {
    /// Parse LRC text. Never fails: lines that are not understood are skipped.
    pub fn parse(content: &str) -> Self {
        let mut metadata = Vec::new();
        let mut lyrics = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Header tags like [ti:Title] are never scanned for timestamps
            if let Some((tag, value)) = Self::parse_metadata(line) {
                if !value.is_empty() {
                    metadata.push((tag, value));
                }
                continue;
            }

            if let Some(parsed) = Self::parse_timed_line(line) {
                lyrics.extend(parsed);
            }
        }

        Self::assemble(metadata, lyrics)
    }

    /// Add title/artist entries taken from the track when the document carries
    /// no header tags of its own. Documents without any lyric are left empty.
    pub fn with_track_metadata(mut self, name: Option<&str>, author: Option<&str>) -> Self {
        if self.entries.is_empty() || self.entries.iter().any(LyricEntry::is_metadata) {
            return self;
        }

        let mut entries = Vec::with_capacity(self.entries.len() + 2);
        if let Some(name) = name.map(str::trim).filter(|s| !s.is_empty()) {
            entries.push(LyricEntry::metadata(0.0, MetadataTag::Title, name));
        }
        if let Some(author) = author.map(str::trim).filter(|s| !s.is_empty()) {
            entries.push(LyricEntry::metadata(1.0, MetadataTag::Artist, author));
        }
        entries.append(&mut self.entries);
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));

        Self { entries }
    }

    pub fn entries(&self) -> &[LyricEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&LyricEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of real lyric lines, metadata excluded
    pub fn lyric_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_metadata()).count()
    }

    fn assemble(mut metadata: Vec<(MetadataTag, String)>, mut lyrics: Vec<LyricEntry>) -> Self {
        // Both sorts are stable, so equal keys keep source order
        metadata.sort_by_key(|(tag, _)| *tag);
        lyrics.sort_by(|a, b| a.time.total_cmp(&b.time));

        let span = lyrics
            .first()
            .map_or(METADATA_WINDOW_SECS, |first| first.time.min(METADATA_WINDOW_SECS));
        let count = metadata.len() as f64;

        let mut entries: Vec<LyricEntry> = metadata
            .into_iter()
            .enumerate()
            .map(|(i, (tag, text))| LyricEntry::metadata(span * i as f64 / count, tag, text))
            .collect();
        entries.extend(lyrics);
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));

        Self { entries }
    }

    /// Parse metadata tag like [ti:Title]
    fn parse_metadata(line: &str) -> Option<(MetadataTag, String)> {
        let inner = line.strip_prefix('[')?;
        let end = inner.rfind(']')?;
        let (key, value) = inner[..end].split_once(':')?;
        let tag = MetadataTag::from_key(key.trim())?;
        Some((tag, value.trim().to_string()))
    }

    /// Parse a timed line like [00:12.34]Lyrics or [00:12.34][00:15.00]Lyrics
    fn parse_timed_line(line: &str) -> Option<Vec<LyricEntry>> {
        let mut timestamps = Vec::new();
        let mut rest = line;

        // Only the leading run of tags counts
        while let Some(inner) = rest.strip_prefix('[') {
            let Some(end) = inner.find(']') else {
                break;
            };
            match Self::parse_timestamp(&inner[..end]) {
                Some(secs) => {
                    timestamps.push(secs);
                    rest = &inner[end + 1..];
                }
                None => break,
            }
        }

        let text = rest.trim();
        if timestamps.is_empty() || text.is_empty() {
            return None;
        }

        Some(
            timestamps
                .into_iter()
                .map(|time| LyricEntry::lyric(time, text))
                .collect(),
        )
    }

    /// Parse timestamp string like "01:23.45" or "01:23.456" to seconds
    fn parse_timestamp(s: &str) -> Option<f64> {
        let b = s.as_bytes();
        if !s.is_ascii() || !(8..=9).contains(&b.len()) {
            return None;
        }

        let digits = |range: std::ops::Range<usize>| b[range].iter().all(u8::is_ascii_digit);
        if !digits(0..2) || b[2] != b':' || !digits(3..5) || b[5] != b'.' || !digits(6..b.len()) {
            return None;
        }

        let minutes: u32 = s[0..2].parse().ok()?;
        let seconds: f64 = s[3..].parse().ok()?;
        Some(f64::from(minutes) * 60.0 + seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(close(LyricDocument::parse_timestamp("00:12.34").unwrap(), 12.34));
        assert!(close(LyricDocument::parse_timestamp("01:30.500").unwrap(), 90.5));
        assert!(close(LyricDocument::parse_timestamp("10:00.00").unwrap(), 600.0));
        assert_eq!(LyricDocument::parse_timestamp("00:12"), None);
        assert_eq!(LyricDocument::parse_timestamp("0:12.34"), None);
        assert_eq!(LyricDocument::parse_timestamp("00:12.3"), None);
        assert_eq!(LyricDocument::parse_timestamp("00:12.3456"), None);
        assert_eq!(LyricDocument::parse_timestamp("00:12:34"), None);
        assert_eq!(LyricDocument::parse_timestamp("ab:cd.ef"), None);
    }

    #[test]
    fn test_parse_lrc() {
        let lrc = r#"
[00:12.34]First line
[00:15.00]Second line
"#;
        let doc = LyricDocument::parse(lrc);
        assert_eq!(doc.len(), 2);
        assert!(close(doc.entries()[0].time, 12.34));
        assert_eq!(doc.entries()[0].text, "First line");
        assert_eq!(doc.entries()[0].kind, EntryKind::Lyric);
    }

    #[test]
    fn repeated_tags_share_text() {
        let doc = LyricDocument::parse("[00:30.00][00:10.00]Chorus\n[00:20.00]Verse");
        let texts: Vec<_> = doc.entries().iter().map(|e| (e.time, e.text.as_str())).collect();
        assert_eq!(
            texts,
            vec![(10.0, "Chorus"), (20.0, "Verse"), (30.0, "Chorus")]
        );
    }

    #[test]
    fn metadata_is_spread_before_first_lyric() {
        let lrc = "[by:Someone]\n[ar:Band]\n[ti:Song]\n[00:09.00]Start";
        let doc = LyricDocument::parse(lrc);

        let kinds: Vec<_> = doc.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Metadata(MetadataTag::Title),
                EntryKind::Metadata(MetadataTag::Artist),
                EntryKind::Metadata(MetadataTag::Publisher),
                EntryKind::Lyric,
            ]
        );
        assert!(close(doc.entries()[0].time, 0.0));
        assert!(close(doc.entries()[1].time, 3.0));
        assert!(close(doc.entries()[2].time, 6.0));
        assert!(close(doc.entries()[3].time, 9.0));
    }

    #[test]
    fn metadata_window_is_capped() {
        let doc = LyricDocument::parse("[ti:Song]\n[ar:Band]\n[01:00.00]Late start");
        assert!(close(doc.entries()[1].time, 10.0));
        assert!(doc.entries()[1].time < doc.entries()[2].time);
    }

    #[test]
    fn metadata_tags_are_case_insensitive() {
        let doc = LyricDocument::parse("[TI:Loud]\n[Ar: Spaced ]\n[00:05.00]x");
        assert_eq!(doc.entries()[0].text, "Loud");
        assert_eq!(doc.entries()[1].text, "Spaced");
    }

    #[test]
    fn metadata_value_may_contain_brackets() {
        let doc = LyricDocument::parse("[ti:Song [Remix]]\n[00:05.00]x");
        assert_eq!(doc.entries()[0].text, "Song [Remix]");
    }

    #[test]
    fn malformed_and_empty_lines_are_dropped() {
        let lrc = "[offset:+100]\n[00:01.00]\n[1:02.30]bad\nplain text\n[00:02.00]   \n[00:03.00]ok\n[re:tool]";
        let doc = LyricDocument::parse(lrc);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.entries()[0].text, "ok");
    }

    #[test]
    fn only_leading_tags_are_timestamps() {
        let doc = LyricDocument::parse("[00:01.00]Hello [00:02.00] world");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.entries()[0].text, "Hello [00:02.00] world");
    }

    #[test]
    fn ties_keep_source_order() {
        let doc = LyricDocument::parse("[00:05.00]first\n[00:05.00]second");
        assert_eq!(doc.entries()[0].text, "first");
        assert_eq!(doc.entries()[1].text, "second");
    }

    #[test]
    fn entries_are_non_decreasing() {
        let lrc = "[ti:T]\n[02:00.00]c\n[00:00.50]a\n[01:00.123]b\n[00:30.00][03:00.00]d\n[al:A]";
        let doc = LyricDocument::parse(lrc);
        assert!(doc.entries().windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(doc.lyric_count(), 5);
    }

    #[test]
    fn windows_line_endings() {
        let doc = LyricDocument::parse("[00:01.00]one\r\n[00:02.00]two\r\n");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.entries()[1].text, "two");
    }

    #[test]
    fn track_metadata_fills_missing_header() {
        let doc = LyricDocument::parse("[00:05.00]Hello")
            .with_track_metadata(Some("Song"), Some("Artist"));
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.entries()[0].kind, EntryKind::Metadata(MetadataTag::Title));
        assert!(close(doc.entries()[0].time, 0.0));
        assert_eq!(doc.entries()[1].text, "Artist");
        assert!(close(doc.entries()[1].time, 1.0));
    }

    #[test]
    fn track_metadata_does_not_override_source_tags() {
        let doc = LyricDocument::parse("[ti:From file]\n[00:05.00]Hello")
            .with_track_metadata(Some("Song"), Some("Artist"));
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.entries()[0].text, "From file");
    }

    #[test]
    fn track_metadata_skips_empty_documents() {
        let doc = LyricDocument::parse("garbage").with_track_metadata(Some("Song"), None);
        assert!(doc.is_empty());
    }

    #[test]
    fn garbage_never_panics() {
        for input in ["[", "]", "[[[", "[ti:", "[00:0", "[éé:ßß.ab]x", "\u{0}[00:01.00]"] {
            let _ = LyricDocument::parse(input);
        }
    }

    #[test]
    fn lrc_tag_carries_rounding_into_minutes() {
        assert_eq!(LyricEntry::lyric(0.0, "").lrc_tag(), "[00:00.00]");
        assert_eq!(LyricEntry::lyric(5.5, "").lrc_tag(), "[00:05.50]");
        assert_eq!(LyricEntry::lyric(59.996, "").lrc_tag(), "[01:00.00]");
        assert_eq!(LyricEntry::lyric(125.004, "").lrc_tag(), "[02:05.00]");
    }
}
