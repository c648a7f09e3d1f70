use crate::config::SearchConfig;

/// Matches a shell-style name pattern against a bare file name.
///
/// `*` stands for any run of bytes; only the first `*` is expanded, so the
/// remainder of the pattern is compared literally. In patterns without a
/// `*`, each `?` stands for one byte. Comparison is byte-wise and
/// case-sensitive.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    if let Some(star) = pattern.find('*') {
        let prefix = &pattern[..star];
        let suffix = &pattern[star + 1..];
        if !name.starts_with(prefix) {
            return false;
        }
        if suffix.is_empty() {
            return true;
        }
        if name.len() < prefix.len() + suffix.len() {
            return false;
        }
        return name.ends_with(suffix);
    }

    if pattern.contains('?') {
        let pattern = pattern.as_bytes();
        let name = name.as_bytes();
        return pattern.len() == name.len()
            && pattern
                .iter()
                .zip(name.iter())
                .all(|(p, n)| *p == b'?' || p == n);
    }

    pattern == name
}

/// Name-based filters applied while walking the input set.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    include: Option<String>,
    exclude: Option<String>,
    exclude_dir: Option<String>,
    exclude_names: Vec<String>,
}

impl FilterSet {
    pub fn from_config(config: &SearchConfig) -> Self {
        FilterSet {
            include: config.include_glob.clone(),
            exclude: config.exclude_glob.clone(),
            exclude_dir: config.exclude_dir_glob.clone(),
            exclude_names: config.exclude_names.clone(),
        }
    }

    /// Whether a file with this bare name should be searched.
    ///
    /// The include pattern is consulted first, then the exclude pattern,
    /// then the exclusion list.
    pub fn admits_file(&self, name: &str) -> bool {
        if let Some(include) = &self.include {
            if !glob_match(include, name) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if glob_match(exclude, name) {
                return false;
            }
        }
        !self.exclude_names.iter().any(|glob| glob_match(glob, name))
    }

    /// Whether a directory with this bare name may be descended into.
    pub fn admits_dir(&self, name: &str) -> bool {
        match &self.exclude_dir {
            Some(glob) => !glob_match(glob, name),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_literal() {
        assert!(glob_match("main.rs", "main.rs"));
        assert!(!glob_match("main.rs", "main.rc"));
        assert!(!glob_match("main.rs", "Main.rs"));
    }

    #[test]
    fn test_glob_star() {
        assert!(glob_match("*.rs", "main.rs"));
        assert!(glob_match("*.rs", ".rs"));
        assert!(!glob_match("*.rs", "main.rc"));
        assert!(glob_match("test_*", "test_search"));
        assert!(glob_match("a*c", "abc"));
        assert!(glob_match("a*c", "ac"));
        assert!(!glob_match("a*c", "ab"));
    }

    #[test]
    fn test_glob_first_star_only() {
        // the second star is part of the literal suffix
        assert!(glob_match("a*b*c", "axb*c"));
        assert!(!glob_match("a*b*c", "axbyc"));
    }

    #[test]
    fn test_glob_question_mark() {
        assert!(glob_match("a?c", "abc"));
        assert!(glob_match("???", "abc"));
        assert!(!glob_match("a?c", "abbc"));
        // '?' is literal once a '*' is present
        assert!(!glob_match("*?c", "xyc"));
        assert!(glob_match("*?c", "x?c"));
    }

    #[test]
    fn test_admits_file_order() {
        let filters = FilterSet {
            include: Some("*.rs".to_string()),
            exclude: Some("test_*".to_string()),
            exclude_dir: None,
            exclude_names: vec!["*.bak".to_string()],
        };
        assert!(filters.admits_file("main.rs"));
        assert!(!filters.admits_file("main.c"));
        assert!(!filters.admits_file("test_main.rs"));

        let filters = FilterSet {
            include: None,
            exclude: None,
            exclude_dir: None,
            exclude_names: vec!["*.bak".to_string(), "*.tmp".to_string()],
        };
        assert!(!filters.admits_file("save.bak"));
        assert!(!filters.admits_file("save.tmp"));
        assert!(filters.admits_file("save.txt"));
    }

    #[test]
    fn test_admits_dir() {
        let filters = FilterSet {
            exclude_dir: Some("target".to_string()),
            ..FilterSet::default()
        };
        assert!(!filters.admits_dir("target"));
        assert!(filters.admits_dir("src"));

        let open = FilterSet::default();
        assert!(open.admits_dir("target"));
    }

    #[test]
    fn test_from_config() {
        let mut config = SearchConfig::default();
        config.include_glob = Some("*.txt".to_string());
        config.exclude_names = vec!["old_*".to_string()];
        let filters = FilterSet::from_config(&config);
        assert!(filters.admits_file("notes.txt"));
        assert!(!filters.admits_file("notes.md"));
        assert!(!filters.admits_file("old_notes.txt"));
    }
}
