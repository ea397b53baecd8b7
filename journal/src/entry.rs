//! Journal entries backed by plain-text files.
//!
//! An entry's guid comes from its file name (`<GUID>.<ext>`) or, failing
//! that, from a `My Reference: <GUID>` line inside the file. Tags are parsed
//! lazily on first access and cached for the entry's lifetime.

use std::cell::OnceCell;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{JournalError, Result};
use crate::guid::Guid;
use crate::tag::{NOSCAN, QUICK, Tag};

#[allow(clippy::expect_used)]
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:My Reference):\s+([A-Z0-9]+)\s*$").expect("reference pattern compiles")
});

/// One journal record.
#[derive(Debug, Clone)]
pub struct Entry {
    guid: Guid,
    dir: PathBuf,
    file_name: String,
    tags: OnceCell<Vec<Tag>>,
}

impl Entry {
    /// Build an entry for an existing file in `dir`.
    pub fn from_file(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        let file_name = file_name.into();

        let guid = match guid_from_file_name(&file_name) {
            Some(guid) => guid,
            None => guid_from_reference_line(&dir.join(&file_name))?
                .ok_or_else(|| JournalError::MalformedEntry(file_name.clone()))?,
        };

        Ok(Self {
            guid,
            dir,
            file_name,
            tags: OnceCell::new(),
        })
    }

    /// Write a new entry file into `dir` and return it.
    ///
    /// The skeleton is a blank line, the reference line and one line per seed
    /// tag. Every non-blank line ends in two spaces, a soft line break for
    /// markdown-style renderers.
    pub fn create(dir: impl Into<PathBuf>, extension: &str, tags: &[Tag]) -> Result<Self> {
        let dir = dir.into();
        let guid = Guid::generate();
        let file_name = format!("{guid}.{extension}");
        let path = dir.join(&file_name);

        let mut skeleton = format!("\nMy Reference: {guid}  \n");
        for tag in tags {
            skeleton.push_str(&format!("{tag}  \n"));
        }

        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(skeleton.as_bytes())?;
        info!("Created entry {}", path.display());

        Ok(Self {
            guid,
            dir,
            file_name,
            tags: OnceCell::new(),
        })
    }

    pub fn guid(&self) -> &Guid {
        &self.guid
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Directory holding the entry file.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Text after the last `.` of the file name.
    pub fn file_extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(_, ext)| ext)
    }

    /// Tags up to and including the first line carrying `@noscan`.
    pub fn tags(&self) -> Result<&[Tag]> {
        if let Some(tags) = self.tags.get() {
            return Ok(tags);
        }

        let mut tags = Vec::new();
        for line in self.lines(0, None)? {
            let on_line = Tag::parse(&line?.text);
            let stop = on_line.iter().any(|t| t.name() == NOSCAN);
            tags.extend(on_line);
            if stop {
                break;
            }
        }
        debug!("Parsed {} tags from {}", tags.len(), self.file_name);

        Ok(self.tags.get_or_init(|| tags))
    }

    /// Lines with index in `min..=max` (to the end of file when `max` is
    /// `None`). Each call re-opens the file.
    pub fn lines(&self, min: usize, max: Option<usize>) -> Result<Lines> {
        if max.is_some_and(|max| min > max) {
            return Err(JournalError::InvalidRange { min, max });
        }
        let file = File::open(self.file_path())?;
        Ok(Lines {
            inner: BufReader::new(file).lines(),
            next_index: 0,
            min,
            max,
        })
    }

    /// Whole file content, lines joined with `\n`.
    pub fn text(&self) -> Result<String> {
        let lines = self
            .lines(0, None)?
            .map(|line| line.map(|l| l.text))
            .collect::<Result<Vec<_>>>()?;
        Ok(lines.join("\n"))
    }

    /// True if any tag has this name and, when given, exactly this value.
    pub fn has_tag(&self, name: &str, value: Option<&str>) -> Result<bool> {
        Ok(self
            .tags()?
            .iter()
            .any(|t| t.name() == name && value.is_none_or(|v| t.value() == Some(v))))
    }

    /// True if any tag with this name has a value starting with `prefix`.
    pub fn tag_starts_with(&self, name: &str, prefix: &str) -> Result<bool> {
        Ok(self
            .tags()?
            .iter()
            .any(|t| t.name() == name && t.value().is_some_and(|v| v.starts_with(prefix))))
    }

    /// The date of the first `@quick(daily/<date>)` tag, if any.
    pub fn is_a_daily_entry(&self) -> Result<Option<&str>> {
        Ok(self.tags()?.iter().find_map(Tag::daily))
    }

    /// The value of the entry's only quick tag, when that value is a plain
    /// name (no `/`) and the entry is not a daily entry.
    pub fn single_quick_value(&self) -> Result<Option<&str>> {
        if self.is_a_daily_entry()?.is_some() {
            return Ok(None);
        }
        let mut quick = self.tags()?.iter().filter(|t| t.name() == QUICK);
        let (Some(only), None) = (quick.next(), quick.next()) else {
            return Ok(None);
        };
        Ok(only.value().filter(|v| !v.contains('/')))
    }

    /// First match of `pattern` on every line that matches.
    pub fn matches(&self, pattern: &Regex) -> Result<Vec<EntryMatch<'_>>> {
        let mut out = Vec::new();
        for line in self.lines(0, None)? {
            let line = line?;
            if let Some(found) = pattern.find(&line.text) {
                out.push(EntryMatch {
                    entry: self,
                    span: found.range(),
                    line_index: line.index,
                    line: line.text,
                });
            }
        }
        Ok(out)
    }

    /// Apply `replacements` in order to every line and write the file back if
    /// anything changed. Returns whether the file was rewritten.
    pub fn rewrite(&mut self, replacements: &[&dyn Fn(&str) -> String]) -> Result<bool> {
        let path = self.file_path();
        let original = fs::read_to_string(&path)?;

        let mut rewritten = String::with_capacity(original.len());
        for raw in original.split_inclusive('\n') {
            let (body, ending) = split_line_ending(raw);
            let replaced = replacements
                .iter()
                .fold(body.to_string(), |line, replace| replace(&line));
            rewritten.push_str(&replaced);
            rewritten.push_str(ending);
        }

        if rewritten == original {
            return Ok(false);
        }
        fs::write(&path, rewritten)?;
        self.tags = OnceCell::new();
        info!("Rewrote {}", path.display());
        Ok(true)
    }

    /// Turn `@quick(One/<person>/<date>)` into `#one/<person> <date>`, with
    /// spaces in the person's name replaced by underscores.
    pub fn convert_one_on_one_tags(&mut self) -> Result<bool> {
        self.rewrite(&[&convert_one_on_one_line])
    }
}

fn convert_one_on_one_line(line: &str) -> String {
    let tags = Tag::parse(line);
    let Some((tag, (person, when))) = tags.iter().find_map(|t| Some((t, t.one_on_one()?))) else {
        return line.to_string();
    };
    let person = person.replace(' ', "_");
    line.replace(&tag.to_string(), &format!("#one/{person} {when}"))
}

fn split_line_ending(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}

/// `<GUID>.<extension>` where the guid is uppercase letters and digits.
pub(crate) fn guid_from_file_name(file_name: &str) -> Option<Guid> {
    let (stem, _extension) = file_name.split_once('.')?;
    let valid = !stem.is_empty()
        && stem
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    valid.then(|| Guid::from(stem))
}

fn guid_from_reference_line(path: &Path) -> Result<Option<Guid>> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        let line = line?;
        if let Some(caps) = REFERENCE_RE.captures(&line) {
            return Ok(caps.get(1).map(|m| Guid::from(m.as_str())));
        }
    }
    Ok(None)
}

/// A line of an entry file with its zero-based index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLine {
    pub text: String,
    pub index: usize,
}

/// Iterator over a window of an entry's lines.
pub struct Lines {
    inner: std::io::Lines<BufReader<File>>,
    next_index: usize,
    min: usize,
    max: Option<usize>,
}

impl Iterator for Lines {
    type Item = Result<EntryLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.max.is_some_and(|max| self.next_index > max) {
                return None;
            }
            let text = match self.inner.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            let index = self.next_index;
            self.next_index += 1;
            if index >= self.min {
                return Some(Ok(EntryLine { text, index }));
            }
        }
    }
}

/// The first match of a pattern on one line of an entry.
#[derive(Debug, Clone)]
pub struct EntryMatch<'a> {
    entry: &'a Entry,
    line: String,
    span: Range<usize>,
    line_index: usize,
}

impl<'a> EntryMatch<'a> {
    pub fn entry(&self) -> &'a Entry {
        self.entry
    }

    /// Byte range of the match within the line.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn matched_text(&self) -> &str {
        &self.line[self.span.clone()]
    }

    /// The matched line split into text before, inside and after the match.
    pub fn segments(&self) -> (&str, &str, &str) {
        (
            &self.line[..self.span.start],
            &self.line[self.span.clone()],
            &self.line[self.span.end..],
        )
    }

    /// Lines around the match, the matched line included.
    pub fn context(&self, before: usize, after: usize) -> Result<Vec<EntryLine>> {
        let min = self.line_index.saturating_sub(before);
        let max = self.line_index + after;
        self.entry.lines(min, Some(max))?.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const GUID: &str = "HMKYKM4NNG4KREW61D55";

    fn write_entry(dir: &Path, file_name: &str, content: &str) -> Entry {
        fs::write(dir.join(file_name), content).unwrap();
        Entry::from_file(dir, file_name).unwrap()
    }

    fn tag_strings(entry: &Entry) -> Vec<String> {
        entry.tags().unwrap().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_guid_from_file_name() {
        assert_eq!(guid_from_file_name("HMKYKM4NNG4KREW61D55.txt"), Some(Guid::from(GUID)));
        assert_eq!(guid_from_file_name("ABC.tar.gz"), Some(Guid::from("ABC")));
        assert_eq!(guid_from_file_name("notes.txt"), None);
        assert_eq!(guid_from_file_name(".txt"), None);
        assert_eq!(guid_from_file_name("NODOT"), None);
    }

    #[test]
    fn test_guid_from_reference_line() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_entry(
            temp_dir.path(),
            "notes.txt",
            "\nMy Reference: W5BNE202WYF031H7J3RY  \n@ft\n",
        );
        assert_eq!(entry.guid(), &Guid::from("W5BNE202WYF031H7J3RY"));
        assert_eq!(entry.file_name(), "notes.txt");
    }

    #[test]
    fn test_malformed_entry() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "no reference here\n").unwrap();

        let result = Entry::from_file(temp_dir.path(), "notes.txt");
        assert!(matches!(result, Err(JournalError::MalformedEntry(name)) if name == "notes.txt"));
    }

    #[test]
    fn test_tags_stop_at_noscan_line() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_entry(
            temp_dir.path(),
            &format!("{GUID}.txt"),
            "@ft\n@quick(a) @noscan @quick(b)\n@quick(c)\n",
        );
        assert_eq!(tag_strings(&entry), vec!["@ft", "@quick(a)", "@noscan", "@quick(b)"]);
    }

    #[test]
    fn test_tags_are_cached() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_entry(temp_dir.path(), &format!("{GUID}.txt"), "@ft\n");
        assert_eq!(tag_strings(&entry), vec!["@ft"]);

        fs::write(entry.file_path(), "@done\n").unwrap();
        assert_eq!(tag_strings(&entry), vec!["@ft"]);
    }

    #[test]
    fn test_lines_window() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_entry(temp_dir.path(), &format!("{GUID}.txt"), "a\nb\nc\nd\n");

        let window: Vec<_> = entry
            .lines(1, Some(2))
            .unwrap()
            .map(|l| l.unwrap())
            .map(|l| (l.text, l.index))
            .collect();
        assert_eq!(window, vec![("b".to_string(), 1), ("c".to_string(), 2)]);

        let tail: Vec<_> = entry.lines(3, None).unwrap().map(|l| l.unwrap().index).collect();
        assert_eq!(tail, vec![3]);

        // Restartable: each call re-reads from the top.
        assert_eq!(entry.lines(0, None).unwrap().count(), 4);
        assert_eq!(entry.lines(0, None).unwrap().count(), 4);
    }

    #[test]
    fn test_lines_invalid_range() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_entry(temp_dir.path(), &format!("{GUID}.txt"), "a\n");

        let result = entry.lines(3, Some(1));
        assert!(matches!(
            result,
            Err(JournalError::InvalidRange { min: 3, max: Some(1) })
        ));
    }

    #[test]
    fn test_has_tag_and_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_entry(
            temp_dir.path(),
            &format!("{GUID}.txt"),
            "@ft @project(jnl/rust) @quick\n",
        );

        assert!(entry.has_tag("ft", None).unwrap());
        assert!(entry.has_tag("project", Some("jnl/rust")).unwrap());
        assert!(!entry.has_tag("project", Some("jnl")).unwrap());
        assert!(entry.tag_starts_with("project", "jnl").unwrap());
        assert!(!entry.tag_starts_with("quick", "").unwrap());
        assert!(!entry.tag_starts_with("quick", "x").unwrap());
        assert!(!entry.tag_starts_with("ft", "").unwrap());
    }

    #[test]
    fn test_daily_and_single_quick() {
        let temp_dir = TempDir::new().unwrap();
        let daily = write_entry(
            temp_dir.path(),
            "AAAA.txt",
            "@quick(foo) @quick(daily/2009-11-28)\n",
        );
        assert_eq!(daily.is_a_daily_entry().unwrap(), Some("2009-11-28"));
        assert_eq!(daily.single_quick_value().unwrap(), None);

        let plain = write_entry(temp_dir.path(), "BBBB.txt", "@quick(foo)\n");
        assert_eq!(plain.is_a_daily_entry().unwrap(), None);
        assert_eq!(plain.single_quick_value().unwrap(), Some("foo"));

        let nested = write_entry(temp_dir.path(), "CCCC.txt", "@quick(tickets/X-1)\n");
        assert_eq!(nested.single_quick_value().unwrap(), None);

        let two = write_entry(temp_dir.path(), "DDDD.txt", "@quick(a) @quick(b)\n");
        assert_eq!(two.single_quick_value().unwrap(), None);
    }

    #[test]
    fn test_create_writes_skeleton() {
        let temp_dir = TempDir::new().unwrap();
        let entry = Entry::create(
            temp_dir.path(),
            "txt",
            &[Tag::with_value("quick", "daily/2009-11-28"), Tag::new("ft")],
        )
        .unwrap();

        assert_eq!(entry.file_name(), format!("{}.txt", entry.guid()));
        let content = fs::read_to_string(entry.file_path()).unwrap();
        assert_eq!(
            content,
            format!("\nMy Reference: {}  \n@quick(daily/2009-11-28)  \n@ft  \n", entry.guid())
        );
        assert_eq!(tag_strings(&entry), vec!["@quick(daily/2009-11-28)", "@ft"]);

        let reread = Entry::from_file(temp_dir.path(), entry.file_name()).unwrap();
        assert_eq!(reread.guid(), entry.guid());
    }

    #[test]
    fn test_matches_first_per_line() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_entry(
            temp_dir.path(),
            &format!("{GUID}.txt"),
            "nothing\nfoo and foo\nbar\nFOO\n",
        );
        let pattern = Regex::new("foo").unwrap();

        let found = entry.matches(&pattern).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line_index(), 1);
        assert_eq!(found[0].span(), 0..3);
        assert_eq!(found[0].segments(), ("", "foo", " and foo"));
        assert_eq!(found[0].entry().guid(), entry.guid());

        let context = found[0].context(1, 1).unwrap();
        let indices: Vec<_> = context.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_convert_one_on_one_tags() {
        let temp_dir = TempDir::new().unwrap();
        let mut entry = write_entry(
            temp_dir.path(),
            &format!("{GUID}.txt"),
            "header\n@quick(One/Jane Doe/2019-01-02)  \n@ft\n",
        );
        assert_eq!(tag_strings(&entry).len(), 2);

        assert!(entry.convert_one_on_one_tags().unwrap());
        let content = fs::read_to_string(entry.file_path()).unwrap();
        assert_eq!(content, "header\n#one/Jane_Doe 2019-01-02  \n@ft\n");
        assert_eq!(tag_strings(&entry), vec!["@ft"]);

        assert!(!entry.convert_one_on_one_tags().unwrap());
    }
}
