//! Pattern search over entries, ranked for interactive selection.

use std::cmp::Reverse;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::database::Database;
use crate::entry::{Entry, EntryMatch};
use crate::error::{JournalError, Result};

/// Compile a user-supplied search pattern.
///
/// `/expr/` compiles `expr` case-sensitively; anything else compiles
/// case-insensitively. A pattern that opens with `/` must also close with
/// one.
pub fn compile_pattern(source: &str) -> Result<Regex> {
    let Some(rest) = source.strip_prefix('/') else {
        return Ok(RegexBuilder::new(source).case_insensitive(true).build()?);
    };
    match rest.strip_suffix('/') {
        Some(inner) => Ok(Regex::new(inner)?),
        None => Err(JournalError::InvalidPattern(format!(
            "pattern '{source}' must begin and end with /"
        ))),
    }
}

/// Limits applied to a search listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of entries listed.
    pub max_entries: usize,

    /// Matches shown per entry.
    pub matches_per_entry: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_entries: 11,
            matches_per_entry: 2,
        }
    }
}

/// One listed entry.
#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    /// Number shown to the user for selection, starting at 0.
    pub index: usize,

    pub entry: &'a Entry,

    /// The first `matches_per_entry` matches, in line order.
    pub matches: Vec<EntryMatch<'a>>,

    /// Number of matching lines in the entry.
    pub total_matches: usize,
}

/// Result of [`search`].
#[derive(Debug, Clone)]
pub struct SearchResults<'a> {
    /// Number of entries that matched, listed or not.
    pub total_entries: usize,

    /// Listed entries, best first.
    pub hits: Vec<SearchHit<'a>>,
}

impl<'a> SearchResults<'a> {
    /// The hit numbered `index`.
    pub fn choose(&self, index: usize) -> Option<&SearchHit<'a>> {
        self.hits.iter().find(|hit| hit.index == index)
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Entries matching `pattern`, those with the most matching lines first.
/// Ties keep database order.
pub fn search<'a>(
    db: &'a Database,
    pattern: &Regex,
    options: SearchOptions,
) -> Result<SearchResults<'a>> {
    let mut ranked: Vec<Vec<EntryMatch<'a>>> = db.entries_matching(pattern)?.into_values().collect();
    let total_entries = ranked.len();
    ranked.sort_by_key(|matches| Reverse(matches.len()));

    let hits: Vec<SearchHit<'a>> = ranked
        .into_iter()
        .take(options.max_entries)
        .enumerate()
        .filter_map(|(index, mut matches)| {
            let entry = matches.first()?.entry();
            let total_matches = matches.len();
            matches.truncate(options.matches_per_entry);
            Some(SearchHit {
                index,
                entry,
                matches,
                total_matches,
            })
        })
        .collect();

    debug!(
        "Search {} listed {} of {} entries",
        pattern.as_str(),
        hits.len(),
        total_entries
    );
    Ok(SearchResults {
        total_entries,
        hits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JournalConfig;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn database(files: &[(&str, &str)]) -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("worklogs");
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
        let db = Database::open(JournalConfig::new(temp_dir.path())).unwrap();
        (temp_dir, db)
    }

    #[test]
    fn test_compile_pattern_case() {
        let loose = compile_pattern("perf").unwrap();
        assert!(loose.is_match("PERF-1188"));

        let strict = compile_pattern("/perf/").unwrap();
        assert!(!strict.is_match("PERF-1188"));
        assert!(strict.is_match("perf budget"));
    }

    #[test]
    fn test_compile_pattern_folds_non_ascii_case() {
        let loose = compile_pattern("été").unwrap();
        assert!(loose.is_match("ÉTÉ 2019"));

        let strict = compile_pattern("/été/").unwrap();
        assert!(!strict.is_match("ÉTÉ 2019"));
    }

    #[test]
    fn test_compile_pattern_errors() {
        assert!(matches!(compile_pattern("/perf"), Err(JournalError::InvalidPattern(_))));
        assert!(matches!(compile_pattern("/"), Err(JournalError::InvalidPattern(_))));
        assert!(matches!(compile_pattern("(unclosed"), Err(JournalError::InvalidPattern(_))));
    }

    #[test]
    fn test_ranked_by_matching_lines() {
        let (_temp_dir, db) = database(&[
            ("AAA.txt", "one perf\n"),
            ("BBB.txt", "perf\nperf\nperf\n"),
            ("CCC.txt", "nothing\n"),
        ]);

        let pattern = compile_pattern("perf").unwrap();
        let results = search(&db, &pattern, SearchOptions::default()).unwrap();

        assert_eq!(results.total_entries, 2);
        let listed: Vec<(usize, &str, usize, usize)> = results
            .hits
            .iter()
            .map(|h| (h.index, h.entry.file_name(), h.matches.len(), h.total_matches))
            .collect();
        assert_eq!(listed, vec![(0, "BBB.txt", 2, 3), (1, "AAA.txt", 1, 1)]);
        assert_eq!(results.choose(1).map(|h| h.entry.file_name()), Some("AAA.txt"));
        assert!(results.choose(2).is_none());
    }

    #[test]
    fn test_listing_is_truncated() {
        let files: Vec<(String, &str)> = (0..15).map(|i| (format!("E{i:02}.txt"), "hit\n")).collect();
        let borrowed: Vec<(&str, &str)> = files.iter().map(|(n, c)| (n.as_str(), *c)).collect();
        let (_temp_dir, db) = database(&borrowed);

        let pattern = compile_pattern("hit").unwrap();
        let results = search(&db, &pattern, SearchOptions::default()).unwrap();

        assert_eq!(results.total_entries, 15);
        assert_eq!(results.hits.len(), 11);
        assert_eq!(results.hits.last().map(|h| h.index), Some(10));
    }

    #[test]
    fn test_no_matches() {
        let (_temp_dir, db) = database(&[("AAA.txt", "quiet\n")]);
        let pattern = compile_pattern("loud").unwrap();

        let results = search(&db, &pattern, SearchOptions::default()).unwrap();
        assert!(results.is_empty());
        assert_eq!(results.total_entries, 0);
    }
}
