//! Segment naming pattern.
//!
//! A floating concat stream is opened from the path of *one* of its segments
//! (e.g. `clip0007.dat`). The last run of decimal digits in that path is the
//! segment index, everything around it is reused verbatim to name the
//! neighbouring segments (`clip0008.dat`, `clip0006.dat`, …). A digit run
//! with a leading zero fixes a minimum width for rendered indices, otherwise
//! indices are rendered in plain decimal.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde::Serialize;

use crate::error::{FloatcatError, Result};

/// Optional URI scheme accepted in front of the initial path.
pub const URI_SCHEME: &str = "flccat:";

/// Upper bound for a template, placeholder included.
pub const MAX_TEMPLATE_LEN: usize = 1023;

/// Prefix and suffix surrounding the index of every segment path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentPattern {
    prefix: String,
    suffix: String,
    /// Zero padded width, `0` when the index is not padded.
    width: usize,
}

impl SegmentPattern {
    /// Derive the pattern and the starting index from an initial path.
    ///
    /// # Errors
    ///
    /// * [`FloatcatError::SegmentNotFound`] when the path is empty.
    /// * [`FloatcatError::NoSegmentIndex`] when the path holds no digit.
    /// * [`FloatcatError::IndexOutOfRange`] when the digit run overflows an `i64`.
    /// * [`FloatcatError::TemplateTooLong`] when the template exceeds [`MAX_TEMPLATE_LEN`].
    pub fn derive(path: &str) -> Result<(SegmentPattern, i64)> {
        // Only ASCII digits count, `\d` would also match other scripts.
        static SEGMENT_INDEX_REGEX: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"([0-9]+)[^0-9]*$").unwrap());

        let path = path.strip_prefix(URI_SCHEME).unwrap_or(path);
        if path.is_empty() {
            return Err(FloatcatError::SegmentNotFound("empty path".into()));
        }

        let digits = SEGMENT_INDEX_REGEX
            .captures(path)
            .and_then(|c| c.get(1))
            .ok_or_else(|| FloatcatError::NoSegmentIndex(path.to_string()))?;

        let index = digits
            .as_str()
            .parse::<i64>()
            .map_err(|_| FloatcatError::IndexOutOfRange(digits.as_str().to_string()))?;

        let run = digits.as_str();
        let width = if run.len() > 1 && run.starts_with('0') {
            run.len()
        } else {
            0
        };

        let pattern = SegmentPattern {
            prefix: path[..digits.start()].to_string(),
            suffix: path[digits.end()..].to_string(),
            width,
        };

        let len = pattern.template().len();
        if len > MAX_TEMPLATE_LEN {
            return Err(FloatcatError::TemplateTooLong {
                len,
                max: MAX_TEMPLATE_LEN,
            });
        }

        debug!(
            "Derived segment template '{}' (start index {}) from '{}'",
            pattern.template(),
            index,
            path
        );
        Ok((pattern, index))
    }

    /// Path of the segment carrying `index`.
    pub fn render(&self, index: i64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            index,
            self.suffix,
            width = self.width
        )
    }

    /// The template with a printf style placeholder, e.g. `clip%d.dat` or
    /// `clip%04d.dat`.
    pub fn template(&self) -> String {
        let placeholder = if self.width > 0 {
            format!("%0{}d", self.width)
        } else {
            "%d".to_string()
        };
        format!("{}{}{}", self.prefix, placeholder, self.suffix)
    }

    /// List the segments matching this pattern that exist right now, sorted
    /// by index.
    ///
    /// Only names reachable through [`SegmentPattern::render`] are returned,
    /// so `clip07.dat` is skipped when the pattern renders `clip7.dat`, and
    /// each path is returned as `render` spells it. The result is a snapshot:
    /// in a floating window it may be stale as soon as it is returned.
    pub fn discover(&self) -> Result<Vec<(i64, PathBuf)>> {
        let pattern = format!(
            "{}*{}",
            glob::Pattern::escape(&self.prefix),
            glob::Pattern::escape(&self.suffix)
        );

        let entries = glob::glob(&pattern).map_err(|e| FloatcatError::Glob(e.to_string()))?;

        // glob hands back cleaned up paths (`./a//b1` comes back as `a/b1`),
        // so both sides are compared in that form. The digit run never holds
        // a separator, which lets a NUL mark where the index goes.
        let marked = normalize(Path::new(&format!("{}\0{}", self.prefix, self.suffix)));
        let Some((prefix, suffix)) = marked.split_once('\0') else {
            return Err(FloatcatError::Glob(format!(
                "cannot normalize template '{}'",
                self.template()
            )));
        };

        let mut segments = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable glob entry: {}", e);
                    continue;
                }
            };
            let name = normalize(&path);
            let middle = name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix));
            let Some(index) = middle.and_then(|m| m.parse::<i64>().ok()) else {
                continue;
            };
            let rendered = format!("{}{:0width$}{}", prefix, index, suffix, width = self.width);
            if rendered == name {
                segments.push((index, PathBuf::from(self.render(index))));
            }
        }

        segments.sort_by_key(|(index, _)| *index);
        Ok(segments)
    }
}

/// Drop `.` components and repeated separators.
fn normalize(path: &Path) -> String {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_derive_last_digit_run() {
        let (pattern, index) = SegmentPattern::derive("/data/cam2/clip17.dat").unwrap();
        assert_eq!(index, 17);
        assert_eq!(pattern.template(), "/data/cam2/clip%d.dat");
        assert_eq!(pattern.render(8), "/data/cam2/clip8.dat");
    }

    #[test]
    fn test_zero_padding_is_kept() {
        let (pattern, index) = SegmentPattern::derive("clip0007.dat").unwrap();
        assert_eq!(index, 7);
        assert_eq!(pattern.template(), "clip%04d.dat");
        assert_eq!(pattern.render(8), "clip0008.dat");
        assert_eq!(pattern.render(12345), "clip12345.dat");

        let (pattern, index) = SegmentPattern::derive("clip0.dat").unwrap();
        assert_eq!(index, 0);
        assert_eq!(pattern.template(), "clip%d.dat");
        assert_eq!(pattern.render(10), "clip10.dat");
    }

    #[test]
    fn test_render_reproduces_path() {
        for path in ["a1.dat", "seg42", "99", "x/y12z/b345.c", "rec-1.ts", "cam00.ts", "v000123"] {
            let (pattern, index) = SegmentPattern::derive(path).unwrap();
            assert_eq!(pattern.render(index), path);
        }
    }

    #[test]
    fn test_digits_at_start_and_end() {
        let (pattern, index) = SegmentPattern::derive("123abc").unwrap();
        assert_eq!((pattern.template().as_str(), index), ("%dabc", 123));

        let (pattern, index) = SegmentPattern::derive("abc123").unwrap();
        assert_eq!((pattern.template().as_str(), index), ("abc%d", 123));
    }

    #[test]
    fn test_negative_render_keeps_prefix() {
        let (pattern, index) = SegmentPattern::derive("part0.bin").unwrap();
        assert_eq!(index, 0);
        assert_eq!(pattern.render(-1), "part-1.bin");
    }

    #[test]
    fn test_uri_scheme_is_stripped() {
        let (pattern, index) = SegmentPattern::derive("flccat:clip3.dat").unwrap();
        assert_eq!(index, 3);
        assert_eq!(pattern.render(3), "clip3.dat");
    }

    #[test]
    fn test_derive_errors() {
        assert!(matches!(
            SegmentPattern::derive("no-digits.dat"),
            Err(FloatcatError::NoSegmentIndex(_))
        ));
        assert!(matches!(
            SegmentPattern::derive("flccat:"),
            Err(FloatcatError::SegmentNotFound(_))
        ));
        assert!(matches!(
            SegmentPattern::derive("clip99999999999999999999999.dat"),
            Err(FloatcatError::IndexOutOfRange(_))
        ));

        let long = format!("{}1", "a".repeat(MAX_TEMPLATE_LEN));
        assert!(matches!(
            SegmentPattern::derive(&long),
            Err(FloatcatError::TemplateTooLong { .. })
        ));
        let fits = format!("{}1", "a".repeat(MAX_TEMPLATE_LEN - 2));
        assert!(SegmentPattern::derive(&fits).is_ok());
    }

    #[test]
    fn test_non_ascii_digits_are_ignored() {
        // U+0663 ARABIC-INDIC DIGIT THREE
        let (pattern, index) = SegmentPattern::derive("v2-\u{663}.dat").unwrap();
        assert_eq!(index, 2);
        assert_eq!(pattern.render(5), "v5-\u{663}.dat");
    }

    #[test]
    fn test_discover_lists_reachable_segments() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["cap3.bin", "cap1.bin", "cap2.bin", "cap02.bin", "capx.bin", "other1.bin"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let first = dir.path().join("cap1.bin");
        let (pattern, _) = SegmentPattern::derive(first.to_str().unwrap()).unwrap();

        let found: Vec<i64> = pattern
            .discover()
            .unwrap()
            .into_iter()
            .map(|(index, _)| index)
            .collect();
        assert_eq!(found, vec![1, 2, 3]);
    }

    #[test]
    fn test_discover_unnormalized_paths() {
        // Relative to the working directory so the path can start with `./`.
        let dir = tempfile::tempdir_in(".").unwrap();
        let name = dir.path().file_name().unwrap().to_str().unwrap().to_string();
        for segment in ["c1.dat", "c2.dat", "c02.dat"] {
            fs::write(dir.path().join(segment), b"x").unwrap();
        }

        for first in [
            format!("./{}/c1.dat", name),
            format!("{}//c1.dat", name),
            format!("./{}/./c2.dat", name),
        ] {
            let (pattern, _) = SegmentPattern::derive(&first).unwrap();
            let found = pattern.discover().unwrap();
            let indices: Vec<i64> = found.iter().map(|(index, _)| *index).collect();
            assert_eq!(indices, vec![1, 2], "discovering from {}", first);
            assert_eq!(found[0].1, PathBuf::from(pattern.render(1)));
            assert!(found[0].1.is_file());
        }
    }
}
