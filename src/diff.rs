//! Character level diff based on the longest common subsequence of two strings.

use serde::Serialize;

/// How a span of text differs between the old and the new string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// In both strings.
    Equal,
    /// Only in the new string.
    Inserted,
    /// Only in the old string.
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DiffSpan {
    pub text: String,
    pub kind: DiffKind,
}

impl DiffSpan {
    pub fn new(text: impl Into<String>, kind: DiffKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Diffs the two strings character by character.
///
/// The equal and deleted spans make up `old` and the equal and inserted spans make up `new`.
/// Neighbouring spans never have the same kind, and where both are present, deleted text comes before inserted text.
pub fn diff_chars(old: &str, new: &str) -> Vec<DiffSpan> {
    let old = old.chars().collect::<Vec<_>>();
    let new = new.chars().collect::<Vec<_>>();
    let lcs = lcs_table(&old, &new);

    let mut spans = Diff::default();
    let mut i = 0;
    let mut j = 0;
    while i < old.len() || j < new.len() {
        if i < old.len() && j < new.len() && old[i] == new[j] {
            spans.push(old[i], DiffKind::Equal);
            i += 1;
            j += 1;
        } else if j == new.len() || (i < old.len() && lcs[i + 1][j] >= lcs[i][j + 1]) {
            spans.push(old[i], DiffKind::Deleted);
            i += 1;
        } else {
            spans.push(new[j], DiffKind::Inserted);
            j += 1;
        }
    }
    spans.finish()
}

// lcs[i][j] is the length of the longest common subsequence of old[i..] and new[j..]
fn lcs_table(old: &[char], new: &[char]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0; new.len() + 1]; old.len() + 1];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            table[i][j] = if old[i] == new[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }
    table
}

// collects characters into spans, holding changes back until the next equal character
// so that deletions can be placed before insertions
#[derive(Debug, Default)]
struct Diff {
    spans: Vec<DiffSpan>,
    deleted: String,
    inserted: String,
}

impl Diff {
    fn push(&mut self, c: char, kind: DiffKind) {
        match kind {
            DiffKind::Deleted => self.deleted.push(c),
            DiffKind::Inserted => self.inserted.push(c),
            DiffKind::Equal => {
                self.flush_changes();
                match self.spans.last_mut() {
                    Some(last) if last.kind == DiffKind::Equal => last.text.push(c),
                    _ => self.spans.push(DiffSpan::new(c, DiffKind::Equal)),
                }
            }
        }
    }

    fn flush_changes(&mut self) {
        if !self.deleted.is_empty() {
            let deleted = std::mem::take(&mut self.deleted);
            self.spans.push(DiffSpan::new(deleted, DiffKind::Deleted));
        }
        if !self.inserted.is_empty() {
            let inserted = std::mem::take(&mut self.inserted);
            self.spans.push(DiffSpan::new(inserted, DiffKind::Inserted));
        }
    }

    fn finish(mut self) -> Vec<DiffSpan> {
        self.flush_changes();
        self.spans
    }
}
