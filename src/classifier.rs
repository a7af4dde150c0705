//! Extension-based file classification.
//!
//! A [`Classifier`] is built once from the category table and shared
//! read-only. Lookup walks the table in definition order and the first
//! category claiming the extension wins; anything unmatched falls back to
//! the catch-all category.

use crate::config::{CategoryRule, OrganizerConfig};

/// Outcome of classifying a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<'a> {
    /// The extension matched a category rule.
    Matched(&'a str),
    /// No rule matched; the file belongs in the fallback category.
    /// `empty_extension` distinguishes a file with no extension at all,
    /// which callers warn about rather than route silently.
    Fallback { empty_extension: bool },
    /// The filename carries a partial-download suffix and must not be
    /// classified or moved.
    SkippedTemp,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CategoryRule>,
    skip_suffixes: Vec<String>,
}

impl Classifier {
    pub fn new(config: &OrganizerConfig) -> Self {
        Self {
            rules: config.categories.clone(),
            skip_suffixes: config
                .skip_suffixes
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether the filename marks an in-progress download
    /// (`.crdownload`, `.part`, ...). Case-insensitive.
    pub fn is_partial_download(&self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        self.skip_suffixes
            .iter()
            .any(|suffix| lower.ends_with(suffix.as_str()))
    }

    /// Classify a filename by its extension.
    pub fn classify(&self, file_name: &str) -> Classification<'_> {
        if self.is_partial_download(file_name) {
            return Classification::SkippedTemp;
        }

        let extension = extension_of(file_name);
        if extension.is_empty() {
            return Classification::Fallback {
                empty_extension: true,
            };
        }

        for rule in &self.rules {
            if rule.extensions.iter().any(|ext| *ext == extension) {
                return Classification::Matched(&rule.name);
            }
        }

        Classification::Fallback {
            empty_extension: false,
        }
    }
}

/// Destination folder name for a category: first letter upper-cased, the
/// rest lowered (`others` -> `Others`, `web_files` -> `Web_files`).
pub fn folder_name(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Extension of a filename, lowercased, including the leading dot. A name
/// whose only dot leads it (`.gitignore`) has no extension, nor does a
/// dotless name.
fn extension_of(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name[idx..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rule;

    fn classifier() -> Classifier {
        Classifier::new(&OrganizerConfig::default())
    }

    #[test]
    fn test_recognized_extension_is_case_insensitive() {
        let classifier = classifier();
        assert_eq!(classifier.classify("A.PNG"), Classification::Matched("images"));
        assert_eq!(classifier.classify("song.Mp3"), Classification::Matched("audios"));
        assert_eq!(classifier.classify("movie.mp4"), Classification::Matched("videos"));
    }

    #[test]
    fn test_compound_extension_uses_last_segment() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify("backup.tar.gz"),
            Classification::Matched("archives")
        );
    }

    #[test]
    fn test_unrecognized_extension_falls_back() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify("data.xyz"),
            Classification::Fallback {
                empty_extension: false
            }
        );
    }

    #[test]
    fn test_missing_extension_falls_back_with_flag() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify("README"),
            Classification::Fallback {
                empty_extension: true
            }
        );
        assert_eq!(
            classifier.classify(".gitignore"),
            Classification::Fallback {
                empty_extension: true
            }
        );
    }

    #[test]
    fn test_partial_download_suffixes_are_skipped() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify("setup.exe.crdownload"),
            Classification::SkippedTemp
        );
        assert_eq!(classifier.classify("video.part"), Classification::SkippedTemp);
        assert_eq!(classifier.classify("page.tmp"), Classification::SkippedTemp);
        assert_eq!(
            classifier.classify("SETUP.EXE.CRDOWNLOAD"),
            Classification::SkippedTemp
        );
    }

    #[test]
    fn test_first_matching_category_wins() {
        let mut config = OrganizerConfig::default();
        config.categories = vec![rule("first", &[".dat"]), rule("second", &[".dat"])];
        let classifier = Classifier::new(&config);

        assert_eq!(classifier.classify("dump.dat"), Classification::Matched("first"));
    }

    #[test]
    fn test_folder_name_capitalization() {
        assert_eq!(folder_name("images"), "Images");
        assert_eq!(folder_name("others"), "Others");
        assert_eq!(folder_name("web_files"), "Web_files");
        assert_eq!(folder_name(""), "");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("report.PDF"), ".pdf");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".gitignore"), "");
    }
}
