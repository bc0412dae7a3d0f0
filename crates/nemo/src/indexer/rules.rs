//! Inclusion rules applied while walking a directory tree.

/// Decides which children of a directory are indexed.
///
/// All comparisons are case-insensitive. `.` and `..` are always excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionRules {
    pub excluded_dir_names: Vec<String>,
    pub excluded_dir_prefixes: Vec<String>,
    pub excluded_file_suffixes: Vec<String>,
}

impl Default for InclusionRules {
    fn default() -> Self {
        Self {
            excluded_dir_names: vec!["temp".into(), "tmp".into(), ".svn".into()],
            excluded_dir_prefixes: vec!["temp".into()],
            excluded_file_suffixes: vec![".tmp".into()],
        }
    }
}

impl InclusionRules {
    /// Creates rules from raw lists; entries are lowercased once here.
    pub fn new(
        excluded_dir_names: Vec<String>,
        excluded_dir_prefixes: Vec<String>,
        excluded_file_suffixes: Vec<String>,
    ) -> Self {
        let lower = |values: Vec<String>| values.into_iter().map(|v| v.to_lowercase()).collect();
        Self {
            excluded_dir_names: lower(excluded_dir_names),
            excluded_dir_prefixes: lower(excluded_dir_prefixes),
            excluded_file_suffixes: lower(excluded_file_suffixes),
        }
    }

    /// Returns true if a child with this name and kind should be indexed.
    pub fn includes(&self, name: &str, is_directory: bool) -> bool {
        if name == "." || name == ".." {
            return false;
        }

        let lowered = name.to_lowercase();
        if is_directory {
            !self.excluded_dir_names.iter().any(|n| *n == lowered)
                && !self
                    .excluded_dir_prefixes
                    .iter()
                    .any(|prefix| lowered.starts_with(prefix.as_str()))
        } else {
            !self
                .excluded_file_suffixes
                .iter()
                .any(|suffix| lowered.ends_with(suffix.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_skip_temp_directories() {
        let rules = InclusionRules::default();
        for name in ["temp", "Temp", "TMP", ".svn", ".SVN", "temporary", "TempFiles"] {
            assert!(!rules.includes(name, true), "{name} should be excluded");
        }
        for name in ["src", "my-temp", "attempt", "tmpl"] {
            assert!(rules.includes(name, true), "{name} should be included");
        }
    }

    #[test]
    fn default_rules_skip_tmp_files() {
        let rules = InclusionRules::default();
        assert!(!rules.includes("cache.tmp", false));
        assert!(!rules.includes("CACHE.TMP", false));
        assert!(rules.includes("cache.tmp2", false));
        // Directory names only apply to directories.
        assert!(rules.includes("temp", false));
    }

    #[test]
    fn pseudo_entries_are_excluded() {
        let rules = InclusionRules::default();
        assert!(!rules.includes(".", true));
        assert!(!rules.includes("..", true));
    }

    #[test]
    fn custom_rules_are_case_insensitive() {
        let rules = InclusionRules::new(vec!["Node_Modules".into()], vec![], vec![".BAK".into()]);
        assert!(!rules.includes("node_modules", true));
        assert!(!rules.includes("report.bak", false));
        assert!(rules.includes("temp", true));
    }
}
