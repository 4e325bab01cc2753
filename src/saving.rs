use crate::loader::SourceFormat;
use log::warn;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stem of the file every upload is stored under
pub const SOURCE_STEM: &str = "exercise-database";

pub fn source_file_name(format: SourceFormat) -> String {
    format!("{}.{}", SOURCE_STEM, format.extension())
}

/// Store an uploaded file under the fixed name, replacing the previous one.
///
/// The bytes go to a temporary file in the same directory first and are
/// renamed into place, so a crash mid-write never leaves a truncated source.
/// Stored copies of the other format are removed so start-up picks this one.
pub fn save_source(dir: &Path, bytes: &[u8], format: SourceFormat) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let target = dir.join(source_file_name(format));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(&target).map_err(|e| e.error)?;

    for other in [SourceFormat::Workbook, SourceFormat::Csv] {
        if other != format {
            let stale = dir.join(source_file_name(other));
            if stale.exists() {
                if let Err(e) = fs::remove_file(&stale) {
                    warn!("could not remove old source {}: {}", stale.display(), e);
                }
            }
        }
    }

    Ok(target)
}

/// Find the stored source in `dir`.
///
/// The fixed names win. Failing that, the first file (by name) that mentions
/// "exercise" and has a spreadsheet extension is used, which picks up files
/// dropped into the directory by hand.
pub fn find_source(dir: &Path) -> Option<(PathBuf, SourceFormat)> {
    for format in [SourceFormat::Workbook, SourceFormat::Csv] {
        let path = dir.join(source_file_name(format));
        if path.is_file() {
            return Some((path, format));
        }
    }

    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_lowercase();
            let supported = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(SourceFormat::is_supported_extension);
            name.contains("exercise") && supported
        })
        .collect();
    candidates.sort();

    candidates.into_iter().next().map(|path| {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let format = SourceFormat::from_file_name(name);
        (path, format)
    })
}

/// Names of the spreadsheet files present in `dir`, for the debug endpoint
pub fn list_spreadsheets(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| {
            Path::new(name)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(SourceFormat::is_supported_extension)
        })
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_overwrites_fixed_name() {
        let dir = tempdir().unwrap();

        let first = save_source(dir.path(), b"one", SourceFormat::Workbook).unwrap();
        let second = save_source(dir.path(), b"two", SourceFormat::Workbook).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.file_name().unwrap(), "exercise-database.xlsx");
        assert_eq!(fs::read(&second).unwrap(), b"two");
        assert_eq!(list_spreadsheets(dir.path()), vec!["exercise-database.xlsx"]);
    }

    #[test]
    fn saving_csv_retires_old_workbook() {
        let dir = tempdir().unwrap();
        save_source(dir.path(), b"x", SourceFormat::Workbook).unwrap();
        save_source(dir.path(), b"Exercise\nPlank\n", SourceFormat::Csv).unwrap();

        let (path, format) = find_source(dir.path()).unwrap();
        assert_eq!(format, SourceFormat::Csv);
        assert!(path.ends_with("exercise-database.csv"));
        assert!(!dir.path().join("exercise-database.xlsx").exists());
    }

    #[test]
    fn stale_copy_that_cannot_be_removed_does_not_fail_save() {
        let dir = tempdir().unwrap();
        // a directory under the csv name makes remove_file fail
        fs::create_dir(dir.path().join("exercise-database.csv")).unwrap();

        let saved = save_source(dir.path(), b"new", SourceFormat::Workbook).unwrap();
        assert_eq!(fs::read(&saved).unwrap(), b"new");

        let (path, format) = find_source(dir.path()).unwrap();
        assert_eq!(path, saved);
        assert_eq!(format, SourceFormat::Workbook);
    }

    #[test]
    fn falls_back_to_any_exercise_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.xlsx"), b"").unwrap();
        fs::write(dir.path().join("My Exercises.CSV"), b"").unwrap();
        fs::write(dir.path().join("exercise-list.txt"), b"").unwrap();

        let (path, format) = find_source(dir.path()).unwrap();
        assert!(path.ends_with("My Exercises.CSV"));
        assert_eq!(format, SourceFormat::Csv);
    }

    #[test]
    fn missing_directory_has_no_source() {
        let dir = tempdir().unwrap();
        assert!(find_source(&dir.path().join("nope")).is_none());
        assert!(list_spreadsheets(&dir.path().join("nope")).is_empty());
    }
}
