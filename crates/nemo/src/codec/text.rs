//! Line-oriented text encoding of snapshots.
//!
//! Layout, one record per line:
//!
//! ```text
//! <len(name)>,<name>,<directory>                                   header
//! <len(name)>,<name>,<lastModified>,<size>,<0|1>,<childCount>      one per entry, pre-order
//! ```
//!
//! `len(name)` counts Unicode scalar values. Exactly that many characters are
//! taken as the name, so names (and the header directory) may contain commas.

use crate::error::{NemoError, Result};
use crate::storage::{EntryIndex, EntryMetadata, EntryTree};
use crate::store::Snapshot;

/// Encodes a snapshot as text lines: the header followed by every entry in pre-order.
pub fn encode(snapshot: &Snapshot) -> Vec<String> {
    let mut lines = Vec::with_capacity(snapshot.entry_count() + 1);
    lines.push(format!(
        "{},{},{}",
        snapshot.name().chars().count(),
        snapshot.name(),
        snapshot.directory()
    ));

    if let Some(tree) = snapshot.tree() {
        for (_, entry) in tree.preorder() {
            lines.push(format!(
                "{},{},{},{},{},{}",
                entry.name().chars().count(),
                entry.name(),
                entry.last_modified(),
                entry.size(),
                if entry.is_directory() { '1' } else { '0' },
                entry.child_count()
            ));
        }
    }

    lines
}

/// Decodes lines produced by [`encode`].
///
/// Any malformed record, missing child record, or unexpected trailing record
/// is a hard failure naming the offending line. No partial snapshot is returned.
pub fn decode<I, S>(lines: I) -> Result<Snapshot>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = lines.into_iter().enumerate().map(|(i, line)| (i + 1, line));

    let Some((header_no, header)) = lines.next() else {
        return Err(NemoError::decode(1, "missing snapshot header"));
    };
    let (name, directory) = parse_header(header.as_ref(), header_no)?;

    let Some((root_no, root_line)) = lines.next() else {
        return Ok(Snapshot::new(name, directory));
    };
    let root = parse_entry(root_line.as_ref(), root_no)?;
    let mut tree = EntryTree::with_root(root.name, root.metadata);
    let mut last_line = root_no;

    // (directory, children still to read)
    let mut pending: Vec<(EntryIndex, usize)> = Vec::new();
    if root.child_count > 0 {
        pending.push((tree.root(), root.child_count));
    }

    loop {
        let Some(top) = pending.last_mut() else {
            break;
        };
        if top.1 == 0 {
            pending.pop();
            continue;
        }
        top.1 -= 1;
        let parent = top.0;

        let Some((line_no, line)) = lines.next() else {
            return Err(NemoError::decode(
                last_line + 1,
                format!(
                    "snapshot ended while reading children of '{}'",
                    tree[parent].name()
                ),
            ));
        };
        last_line = line_no;

        let record = parse_entry(line.as_ref(), line_no)?;
        let child = tree
            .push_child(parent, record.name, record.metadata)
            .map_err(|error| NemoError::decode(line_no, error.to_string()))?;
        if record.child_count > 0 {
            pending.push((child, record.child_count));
        }
    }

    if let Some((line_no, _)) = lines.find(|(_, line)| !line.as_ref().trim().is_empty()) {
        return Err(NemoError::decode(
            line_no,
            "unexpected record after the entry tree",
        ));
    }

    Ok(Snapshot::with_tree(name, directory, tree))
}

/// One decoded entry record.
#[derive(Debug)]
struct EntryRecord {
    name: String,
    metadata: EntryMetadata,
    child_count: usize,
}

fn parse_header(line: &str, line_no: usize) -> Result<(String, String)> {
    let mut cursor = RecordCursor::new(line, line_no);
    let name = cursor.length_prefixed_name()?;
    cursor.expect_comma("header name")?;
    let directory = cursor.rest();
    Ok((name.to_string(), directory.to_string()))
}

fn parse_entry(line: &str, line_no: usize) -> Result<EntryRecord> {
    let mut cursor = RecordCursor::new(line, line_no);
    let name = cursor.length_prefixed_name()?.to_string();
    cursor.expect_comma("entry name")?;
    let last_modified = cursor.number_field::<i64>("last modified")?;
    let size = cursor.number_field::<i64>("size")?;
    let is_directory = match cursor.field("directory flag")? {
        "1" => true,
        "0" => false,
        other => {
            return Err(NemoError::decode(
                line_no,
                format!("directory flag must be 0 or 1, found '{other}'"),
            ))
        }
    };
    let count_text = cursor.rest();
    let child_count = count_text.parse::<usize>().map_err(|_| {
        NemoError::decode(line_no, format!("invalid child count '{count_text}'"))
    })?;

    if !is_directory && child_count > 0 {
        return Err(NemoError::decode(
            line_no,
            format!("file '{name}' declares {child_count} children"),
        ));
    }

    let metadata = EntryMetadata {
        last_modified,
        size,
        is_directory,
    };
    Ok(EntryRecord {
        name,
        metadata,
        child_count,
    })
}

/// Positional reader over one record line.
struct RecordCursor<'a> {
    line: &'a str,
    pos: usize,
    line_no: usize,
}

impl<'a> RecordCursor<'a> {
    fn new(line: &'a str, line_no: usize) -> Self {
        Self {
            line,
            pos: 0,
            line_no,
        }
    }

    fn error(&self, reason: impl Into<String>) -> NemoError {
        NemoError::decode(self.line_no, reason)
    }

    /// Reads up to (not including) the next comma and consumes the comma.
    fn field(&mut self, what: &str) -> Result<&'a str> {
        let line = self.line;
        let remaining = &line[self.pos..];
        let Some(offset) = remaining.find(',') else {
            return Err(self.error(format!("missing {what} field")));
        };
        self.pos += offset + 1;
        Ok(&remaining[..offset])
    }

    fn number_field<T: std::str::FromStr>(&mut self, what: &str) -> Result<T> {
        let text = self.field(what)?;
        text.parse::<T>()
            .map_err(|_| self.error(format!("invalid {what} '{text}'")))
    }

    /// Reads `<len>,` followed by exactly `len` characters.
    fn length_prefixed_name(&mut self) -> Result<&'a str> {
        let length = self.number_field::<usize>("name length")?;
        let line = self.line;
        let remaining = &line[self.pos..];
        let end = match remaining.char_indices().nth(length) {
            Some((offset, _)) => offset,
            None if remaining.chars().count() == length => remaining.len(),
            None => {
                return Err(self.error(format!(
                    "name length {length} exceeds the {} characters available",
                    remaining.chars().count()
                )))
            }
        };
        self.pos += end;
        Ok(&remaining[..end])
    }

    fn expect_comma(&mut self, after: &str) -> Result<()> {
        if self.line[self.pos..].starts_with(',') {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!(
                "expected ',' after {after}; the length prefix does not match the record"
            )))
        }
    }

    fn rest(&mut self) -> &'a str {
        let line = self.line;
        let rest = &line[self.pos..];
        self.pos = self.line.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> Snapshot {
        let mut tree = EntryTree::with_root("/data/a,b", EntryMetadata::directory(1_000));
        let docs = tree
            .push_child(tree.root(), "docs, old", EntryMetadata::directory(2_000))
            .unwrap();
        tree.push_child(docs, "notes,v2.txt", EntryMetadata::file(3_000, 17))
            .unwrap();
        tree.push_child(docs, "empty", EntryMetadata::directory(-1))
            .unwrap();
        tree.push_child(tree.root(), "zeta.bin", EntryMetadata::file(4_000, 0))
            .unwrap();
        Snapshot::with_tree("My, Volume", "/data/a,b", tree)
    }

    #[test]
    fn encode_writes_header_and_preorder_records() {
        let lines = encode(&sample_snapshot());
        assert_eq!(
            lines,
            vec![
                "10,My, Volume,/data/a,b",
                "9,/data/a,b,1000,-1,1,2",
                "9,docs, old,2000,-1,1,2",
                "12,notes,v2.txt,3000,17,0,0",
                "5,empty,-1,-1,1,0",
                "8,zeta.bin,4000,0,0,0",
            ]
        );
    }

    #[test]
    fn decode_restores_structure() {
        let original = sample_snapshot();
        let decoded = decode(encode(&original)).unwrap();

        assert_eq!(decoded.name(), "My, Volume");
        assert_eq!(decoded.directory(), "/data/a,b");

        let before: Vec<_> = original
            .tree()
            .unwrap()
            .preorder()
            .map(|(_, e)| (e.name().to_string(), e.metadata(), e.child_count()))
            .collect();
        let after: Vec<_> = decoded
            .tree()
            .unwrap()
            .preorder()
            .map(|(_, e)| (e.name().to_string(), e.metadata(), e.child_count()))
            .collect();
        assert_eq!(before, after);

        let tree = decoded.tree().unwrap();
        let docs = tree.child_directory(tree.root(), "docs, old").unwrap();
        assert_eq!(tree[docs].parent(), Some(tree.root()));
    }

    #[test]
    fn name_length_counts_characters() {
        let mut tree = EntryTree::with_root("/fotos", EntryMetadata::directory(5));
        tree.push_child(tree.root(), "été,ü.jpg", EntryMetadata::file(6, 7))
            .unwrap();
        let snapshot = Snapshot::with_tree("Fotos", "/fotos", tree);

        let lines = encode(&snapshot);
        assert_eq!(lines[2], "9,été,ü.jpg,6,7,0,0");

        let decoded = decode(lines).unwrap();
        let tree = decoded.tree().unwrap();
        let (_, child) = tree.children(tree.root()).next().unwrap();
        assert_eq!(child.name(), "été,ü.jpg");
    }

    #[test]
    fn header_only_decodes_without_tree() {
        let decoded = decode(["4,Test,/tmp/x"]).unwrap();
        assert_eq!(decoded.name(), "Test");
        assert_eq!(decoded.directory(), "/tmp/x");
        assert!(decoded.tree().is_none());
    }

    #[test]
    fn short_name_is_rejected() {
        let error = decode(["5,abc,/tmp"]).unwrap_err();
        assert!(matches!(error, NemoError::Decode { line: 1, .. }));

        let error = decode(["5,abc"]).unwrap_err();
        assert!(matches!(error, NemoError::Decode { line: 1, .. }));
    }

    #[test]
    fn bad_length_prefix_is_rejected() {
        assert!(matches!(
            decode(["x,abc,/tmp"]).unwrap_err(),
            NemoError::Decode { line: 1, .. }
        ));
        assert!(matches!(
            decode(["3,abc,/tmp", "-1,root,0,-1,1,0"]).unwrap_err(),
            NemoError::Decode { line: 2, .. }
        ));
    }

    #[test]
    fn missing_children_are_rejected() {
        let error = decode(["1,v,/r", "2,/r,0,-1,1,2", "1,a,0,3,0,0"]).unwrap_err();
        match error {
            NemoError::Decode { line, reason } => {
                assert_eq!(line, 4);
                assert!(reason.contains("/r"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_fields_are_rejected() {
        let cases = [
            "1,a,zero,3,0,0",
            "1,a,0,3,2,0",
            "1,a,0,3,0,many",
            "1,a,0,3,0,1",
            "1,a,0,3",
        ];
        for record in cases {
            let error = decode(["1,v,/r", "2,/r,0,-1,1,1", record]).unwrap_err();
            assert!(
                matches!(error, NemoError::Decode { line: 3, .. }),
                "record {record:?} gave {error}"
            );
        }
    }

    #[test]
    fn trailing_records_are_rejected() {
        let error = decode(["1,v,/r", "2,/r,0,-1,1,0", "1,a,0,3,0,0"]).unwrap_err();
        assert!(matches!(error, NemoError::Decode { line: 3, .. }));

        assert!(decode(["1,v,/r", "2,/r,0,-1,1,0", ""]).is_ok());
    }

    #[test]
    fn empty_input_is_rejected() {
        let lines: Vec<String> = Vec::new();
        assert!(matches!(
            decode(lines).unwrap_err(),
            NemoError::Decode { line: 1, .. }
        ));
    }
}
