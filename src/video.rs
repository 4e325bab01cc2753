use crate::record::Record;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref YOUTUBE_REGEX: Regex =
        Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/.+").unwrap();
}

/// Columns holding demonstration links
pub const VIDEO_FIELDS: [&str; 2] = ["Short YouTube Demonstration", "In-Depth YouTube Explanation"];

pub fn is_valid_video_url(url: &str) -> bool {
    YOUTUBE_REGEX.is_match(url)
}

/// The link itself when it points at YouTube, otherwise an empty string
pub fn normalize_video_link(value: Option<&str>) -> String {
    match value {
        Some(url) if is_valid_video_url(url) => url.to_string(),
        _ => String::new(),
    }
}

/// Copy of `record` with every video field present and normalized
pub fn with_normalized_videos(record: &Record) -> Record {
    let mut out = record.clone();
    for field in VIDEO_FIELDS {
        let link = normalize_video_link(record.get(field));
        out.set(field, link);
    }
    out
}

/// True if any video field of the record holds a usable link
pub fn has_video(record: &Record) -> bool {
    VIDEO_FIELDS
        .iter()
        .any(|field| record.get(field).is_some_and(is_valid_video_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_youtube_hosts() {
        for url in [
            "https://www.youtube.com/watch?v=abc",
            "http://youtube.com/shorts/xyz",
            "youtu.be/abc",
            "www.youtube.com/embed/1",
        ] {
            assert_eq!(normalize_video_link(Some(url)), url);
        }
    }

    #[test]
    fn rejects_everything_else() {
        for url in [
            "ftp://bad",
            "",
            "https://vimeo.com/123",
            "https://youtube.com",
            "https://youtube.com/",
            " https://youtube.com/watch",
            "https://m.youtube.com/watch?v=1",
        ] {
            assert_eq!(normalize_video_link(Some(url)), "", "{url}");
        }
        assert_eq!(normalize_video_link(None), "");
    }

    #[test]
    fn adds_missing_video_fields() {
        let mut record = Record::new(1);
        record.set("Exercise", "Row");
        record.set(VIDEO_FIELDS[0], "ftp://bad");

        let out = with_normalized_videos(&record);
        assert_eq!(out.get(VIDEO_FIELDS[0]), Some(""));
        assert_eq!(out.get(VIDEO_FIELDS[1]), Some(""));
        assert_eq!(out.get("Exercise"), Some("Row"));
        assert!(!has_video(&record));
    }
}
