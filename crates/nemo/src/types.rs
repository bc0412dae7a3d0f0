//! Search result types and ordering.

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One entry returned by search or browse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Bare entry name.
    pub name: String,
    /// Milliseconds since the Unix epoch, `-1` if unknown.
    pub last_modified: i64,
    /// Size in bytes, `-1` for directories and unknown sizes.
    pub size: i64,
    /// Path of the containing directory, starting with the indexed root path.
    pub parent_path: String,
    /// Label of the snapshot the entry came from.
    pub volume: String,
    pub is_directory: bool,
}

impl Match {
    /// Full path of the entry: `parent_path` joined with `name`.
    pub fn full_path(&self) -> String {
        PathBuf::from(&self.parent_path)
            .join(&self.name)
            .to_string_lossy()
            .into_owned()
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}    Volume: {}\nPath: {}  Last-Mod: {}  Size: {}",
            self.name,
            self.volume,
            self.parent_path,
            format_timestamp(self.last_modified),
            format_size(self.size)
        )
    }
}

/// Formats a millisecond timestamp as `"dd Mon yyyy  HH:MM:SS"` (UTC).
///
/// Negative (unknown) timestamps format as an empty string.
pub fn format_timestamp(millis: i64) -> String {
    if millis < 0 {
        return String::new();
    }
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|datetime| datetime.format("%d %b %Y  %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Formats a byte count, leaving unknown sizes blank.
pub fn format_size(size: i64) -> String {
    if size < 0 {
        String::new()
    } else {
        size.to_string()
    }
}

/// Column a result list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    #[default]
    Name,
    Modified,
    Size,
    Volume,
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Ordering applied to a result list.
///
/// Directories always come before files, whatever the direction. Within a
/// kind, matches compare by `column`: name and path case-insensitively,
/// volume case-sensitively, time and size numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// The ordering after the user picks `column`: the same column flips the
    /// direction, a different column starts ascending.
    pub fn toggled(self, column: SortColumn) -> Self {
        if column == self.column {
            Self::new(column, self.direction.reversed())
        } else {
            Self::new(column, SortDirection::Ascending)
        }
    }

    pub fn compare_matches(&self, left: &Match, right: &Match) -> Ordering {
        match (left.is_directory, right.is_directory) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }

        let ordering = match self.column {
            SortColumn::Name => compare_ignore_case(&left.name, &right.name),
            SortColumn::Modified => left.last_modified.cmp(&right.last_modified),
            SortColumn::Size => left.size.cmp(&right.size),
            SortColumn::Volume => left.volume.cmp(&right.volume),
            SortColumn::Path => compare_ignore_case(&left.parent_path, &right.parent_path),
        };

        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    /// Sorts `matches` in place. The sort is stable, so ties keep their order.
    pub fn sort_matches(&self, matches: &mut [Match]) {
        matches.sort_by(|left, right| self.compare_matches(left, right));
    }
}

fn compare_ignore_case(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}

/// Position of the first row equal (field by field) to `value`.
pub fn find_row_by_value(rows: &[Match], value: &Match) -> Option<usize> {
    rows.iter().position(|row| row == value)
}

/// Type-ahead lookup: the next row after `current` whose name starts with
/// `initial` (case-insensitively), wrapping around to the top.
///
/// Returns `None` for an empty list and `Some(0)` for a single row. When
/// nothing matches, the current row is returned unchanged.
pub fn find_next_row_by_initial(
    rows: &[Match],
    current: Option<usize>,
    initial: char,
) -> Option<usize> {
    match rows.len() {
        0 => return None,
        1 => return Some(0),
        _ => {}
    }

    let initial: String = initial.to_lowercase().collect();
    let starts_with = |index: &usize| rows[*index].name.to_lowercase().starts_with(&initial);

    let start = current.map_or(0, |row| row + 1).min(rows.len());
    (start..rows.len())
        .chain(0..start)
        .find(starts_with)
        .or(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn file(name: &str, modified: i64, size: i64, volume: &str, path: &str) -> Match {
        Match {
            name: name.to_string(),
            last_modified: modified,
            size,
            parent_path: path.to_string(),
            volume: volume.to_string(),
            is_directory: false,
        }
    }

    fn dir(name: &str) -> Match {
        Match {
            is_directory: true,
            size: -1,
            ..file(name, 0, -1, "vol", "/root")
        }
    }

    fn names(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn directories_sort_first_in_every_column_and_direction() {
        let columns = [
            SortColumn::Name,
            SortColumn::Modified,
            SortColumn::Size,
            SortColumn::Volume,
            SortColumn::Path,
        ];
        for column in columns {
            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let mut rows = vec![
                    file("a.txt", 5, 10, "vol", "/root"),
                    dir("zeta"),
                    file("b.txt", 1, 20, "vol", "/root"),
                ];
                SortSpec::new(column, direction).sort_matches(&mut rows);
                assert!(rows[0].is_directory, "{column:?} {direction:?}");
            }
        }
    }

    #[test]
    fn name_sort_ignores_case() {
        let mut rows = vec![
            file("beta", 0, 0, "v", "/"),
            file("Alpha", 0, 0, "v", "/"),
            file("gamma", 0, 0, "v", "/"),
        ];
        SortSpec::default().sort_matches(&mut rows);
        assert_eq!(names(&rows), vec!["Alpha", "beta", "gamma"]);

        SortSpec::new(SortColumn::Name, SortDirection::Descending).sort_matches(&mut rows);
        assert_eq!(names(&rows), vec!["gamma", "beta", "Alpha"]);
    }

    #[test]
    fn volume_sort_is_case_sensitive() {
        let mut rows = vec![
            file("one", 0, 0, "archive", "/"),
            file("two", 0, 0, "Backup", "/"),
        ];
        SortSpec::new(SortColumn::Volume, SortDirection::Ascending).sort_matches(&mut rows);
        assert_eq!(names(&rows), vec!["two", "one"]);
    }

    #[test]
    fn numeric_columns() {
        let mut rows = vec![
            file("big", 30, 900, "v", "/"),
            file("small", 10, 1, "v", "/"),
            file("mid", 20, 50, "v", "/"),
        ];
        SortSpec::new(SortColumn::Size, SortDirection::Ascending).sort_matches(&mut rows);
        assert_eq!(names(&rows), vec!["small", "mid", "big"]);

        SortSpec::new(SortColumn::Modified, SortDirection::Descending).sort_matches(&mut rows);
        assert_eq!(names(&rows), vec!["big", "mid", "small"]);
    }

    #[test]
    fn ties_compare_equal_but_values_differ() {
        let left = file("same", 1, 1, "v1", "/a");
        let right = file("SAME", 2, 2, "v2", "/b");
        assert_eq!(SortSpec::default().compare_matches(&left, &right), Ordering::Equal);
        assert_ne!(left, right);
    }

    #[test]
    fn toggling_sort_spec() {
        let spec = SortSpec::default();
        let flipped = spec.toggled(SortColumn::Name);
        assert_eq!(flipped.direction, SortDirection::Descending);
        assert_eq!(flipped.toggled(SortColumn::Name).direction, SortDirection::Ascending);

        let size = flipped.toggled(SortColumn::Size);
        assert_eq!(size, SortSpec::new(SortColumn::Size, SortDirection::Ascending));
    }

    #[test]
    fn find_row_uses_field_equality() {
        let rows = vec![file("a", 1, 1, "v", "/"), file("a", 2, 1, "v", "/")];
        assert_eq!(find_row_by_value(&rows, &file("a", 2, 1, "v", "/")), Some(1));
        assert_eq!(find_row_by_value(&rows, &file("a", 3, 1, "v", "/")), None);
    }

    #[test]
    fn type_ahead_wraps_around() {
        let rows = vec![
            file("apple", 0, 0, "v", "/"),
            file("banana", 0, 0, "v", "/"),
            file("Avocado", 0, 0, "v", "/"),
            file("cherry", 0, 0, "v", "/"),
        ];
        assert_eq!(find_next_row_by_initial(&rows, None, 'a'), Some(0));
        assert_eq!(find_next_row_by_initial(&rows, Some(0), 'A'), Some(2));
        assert_eq!(find_next_row_by_initial(&rows, Some(2), 'a'), Some(0));
        assert_eq!(find_next_row_by_initial(&rows, Some(1), 'z'), Some(1));
        assert_eq!(find_next_row_by_initial(&rows, None, 'z'), None);
        assert_eq!(find_next_row_by_initial(&rows[..1], Some(0), 'z'), Some(0));
        assert_eq!(find_next_row_by_initial(&[], None, 'a'), None);
    }

    #[test]
    fn full_path_joins_parent_and_name() {
        let m = file("notes.txt", 0, 0, "v", "/data/docs");
        assert_eq!(Path::new(&m.full_path()), Path::new("/data/docs/notes.txt"));
    }

    #[test]
    fn display_formats_time_and_size() {
        let m = file("notes.txt", 0, 12, "Work", "/data");
        let text = m.to_string();
        assert!(text.contains("Name: notes.txt"));
        assert!(text.contains("Volume: Work"));
        assert!(text.contains("Last-Mod: 01 Jan 1970  00:00:00"));
        assert!(text.contains("Size: 12"));
        assert_eq!(format_timestamp(-1), "");
        assert_eq!(format_size(-1), "");
    }
}
