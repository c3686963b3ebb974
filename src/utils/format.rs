use chrono::{DateTime, Utc};

use crate::models::{AnnotatedEntry, FileEntry};

pub const FOLDER_ICON: &str = "fa fa-folder";
pub const PICTURE_ICON: &str = "fa fa-picture-o";
pub const FILE_ICON: &str = "fa fa-file";

const IMAGE_MIME_TYPES: [&str; 3] = ["image/gif", "image/jpeg", "image/png"];
const SIZE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Formats a byte count with base-1024 units, e.g. `1536` -> `"1.5 KB"`.
///
/// The value is rounded to `decimals` places and trailing zeros are dropped.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut scaled = bytes as f64;
    let mut unit = 0;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    // Halves round away from zero; `{:.*}` alone would round them to even.
    let factor = 10f64.powi(decimals as i32);
    let rounded = (scaled * factor).round() / factor;

    let mut number = format!("{:.*}", decimals, rounded);
    if number.contains('.') {
        let trimmed = number.trim_end_matches('0').trim_end_matches('.').len();
        number.truncate(trimmed);
    }

    format!("{} {}", number, SIZE_UNITS[unit])
}

pub fn icon_class_for(mime_type: Option<&str>) -> &'static str {
    match mime_type {
        Some(mime) if IMAGE_MIME_TYPES.contains(&mime) => PICTURE_ICON,
        _ => FILE_ICON,
    }
}

/// Renders a timestamp as `DD-Mon-YYYY` in UTC; a missing timestamp renders empty.
pub fn format_date(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|ts| ts.format("%d-%b-%Y").to_string())
        .unwrap_or_default()
}

/// Adds the display fields to a listing entry. Collections get the folder
/// icon and are sized by their aggregate size.
pub fn annotate(entry: FileEntry) -> AnnotatedEntry {
    let (icon_class, display_size) = if entry.is_directory {
        (FOLDER_ICON, format_bytes(entry.aggregate_size.unwrap_or(0), 2))
    } else {
        (
            icon_class_for(entry.mime_type.as_deref()),
            format_bytes(entry.size_bytes, 2),
        )
    };
    let display_date = format_date(entry.last_modified);

    AnnotatedEntry {
        entry,
        display_size,
        icon_class,
        display_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0, 2), "0 Bytes");
        assert_eq!(format_bytes(1, 2), "1 Bytes");
        assert_eq!(format_bytes(1000, 2), "1000 Bytes");
        assert_eq!(format_bytes(1024, 2), "1 KB");
        assert_eq!(format_bytes(1536, 2), "1.5 KB");
        assert_eq!(format_bytes(1048576, 2), "1 MB");
        assert_eq!(format_bytes(1073741824, 2), "1 GB");
        assert_eq!(format_bytes(1116, 2), "1.09 KB");
    }

    #[test]
    fn test_format_bytes_decimals() {
        assert_eq!(format_bytes(1536, 0), "2 KB");
        assert_eq!(format_bytes(1300, 1), "1.3 KB");
    }

    #[test]
    fn test_format_bytes_rounds_halves_up() {
        assert_eq!(format_bytes(1152, 2), "1.13 KB");
        assert_eq!(format_bytes(1664, 2), "1.63 KB");
        assert_eq!(format_bytes(2560, 0), "3 KB");
        assert_eq!(format_bytes(1280, 1), "1.3 KB");
    }

    #[test]
    fn test_format_bytes_largest_unit() {
        assert!(format_bytes(u64::MAX, 2).ends_with(" EB"));
    }

    #[test]
    fn test_icon_class_for() {
        assert_eq!(icon_class_for(Some("image/gif")), PICTURE_ICON);
        assert_eq!(icon_class_for(Some("image/jpeg")), PICTURE_ICON);
        assert_eq!(icon_class_for(Some("image/png")), PICTURE_ICON);
        assert_eq!(icon_class_for(Some("image/svg+xml")), FILE_ICON);
        assert_eq!(icon_class_for(Some("application/pdf")), FILE_ICON);
        assert_eq!(icon_class_for(None), FILE_ICON);
    }

    #[test]
    fn test_format_date() {
        let ts = Utc.with_ymd_and_hms(2023, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(format_date(Some(ts)), "05-Mar-2023");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn test_annotate_directory_uses_aggregate_size() {
        let mut dir = FileEntry::new("/Photos", "Photos", true);
        dir.mime_type = Some("image/png".to_string());
        dir.aggregate_size = Some(2048);

        let annotated = annotate(dir);
        assert_eq!(annotated.icon_class, FOLDER_ICON);
        assert_eq!(annotated.display_size, "2 KB");
    }

    #[test]
    fn test_annotate_file() {
        let mut file = FileEntry::new("/cat.jpg", "cat.jpg", false);
        file.mime_type = Some("image/jpeg".to_string());
        file.size_bytes = 1536;
        file.aggregate_size = Some(99);
        file.last_modified = Some(Utc.with_ymd_and_hms(2023, 3, 5, 10, 0, 0).unwrap());

        let annotated = annotate(file);
        assert_eq!(annotated.icon_class, PICTURE_ICON);
        assert_eq!(annotated.display_size, "1.5 KB");
        assert_eq!(annotated.display_date, "05-Mar-2023");
    }
}
