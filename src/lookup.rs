use std::collections::BTreeMap;
use std::mem::take;

use tracing::warn;

use crate::error::{ExtractError, Result};
use crate::xml::RawBlock;

pub const QUALIFICATION_LEVELS_HEADER: [&str; 2] = ["code", "level"];

#[derive(Debug, Clone)]
pub struct LookupIndex<V> {
    name: &'static str,
    entries: BTreeMap<String, V>,
}

impl<V> LookupIndex<V> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: BTreeMap::new(),
        }
    }

    fn insert(&mut self, key: &str, value: V) {
        if self.entries.contains_key(key) {
            warn!(index = self.name, key, "duplicate lookup key; keeping first entry");
            return;
        }
        self.entries.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn index_blocks<'d, V>(
    name: &'static str,
    parent: &'d RawBlock,
    element: &'static str,
    key_field: &'static str,
    value: impl Fn(&'d RawBlock) -> Result<V>,
) -> Result<LookupIndex<V>> {
    let blocks = parent.strict_blocks(element, |position| ExtractError::MalformedLookup {
        index: name,
        reason: format!("{element} entry {position} holds text"),
    })?;

    let mut index = LookupIndex::new(name);
    for (position, block) in blocks.into_iter().enumerate() {
        let key = block
            .non_empty_text(key_field)
            .ok_or_else(|| ExtractError::MalformedLookup {
                index: name,
                reason: format!("entry {position} has no {key_field}"),
            })?;
        index.insert(key, value(block)?);
    }
    Ok(index)
}

pub fn build_accreditations(root: &RawBlock) -> Result<LookupIndex<&RawBlock>> {
    index_blocks("accreditations", root, "ACCREDITATIONTABLE", "ACCTYPE", Ok)
}

pub fn build_locations(institution: &RawBlock) -> Result<LookupIndex<&RawBlock>> {
    index_blocks("locations", institution, "LOCATION", "LOCID", Ok)
}

pub fn build_kis_aims(root: &RawBlock) -> Result<LookupIndex<String>> {
    index_blocks("kis_aims", root, "KISAIM", "KISAIMCODE", |block| {
        block
            .text("KISAIMLABEL")
            .map(ToOwned::to_owned)
            .ok_or_else(|| ExtractError::MalformedLookup {
                index: "kis_aims",
                reason: "entry has no KISAIMLABEL".to_string(),
            })
    })
}

/// Qualification level per qualification code. The header must open with `code` and carry
/// a `level` column somewhere after it.
pub fn parse_qualification_levels(text: &str) -> Result<LookupIndex<String>> {
    let mut rows = parse_rows(text, ',').into_iter();
    let header = rows.next().unwrap_or_default();
    let header = header
        .iter()
        .map(|cell| cell.trim().trim_start_matches('\u{feff}').to_string())
        .collect::<Vec<_>>();

    let [code_name, level_name] = QUALIFICATION_LEVELS_HEADER;
    let level_column = header
        .iter()
        .position(|cell| cell == level_name)
        .filter(|_| header.first().is_some_and(|cell| cell == code_name));
    let Some(level_column) = level_column else {
        return Err(ExtractError::HeaderValidation {
            expected: QUALIFICATION_LEVELS_HEADER.map(str::to_string).to_vec(),
            found: header,
        });
    };

    let mut index = LookupIndex::new("qualification_levels");
    for (line, row) in rows.enumerate() {
        let code = row.first().map(|cell| cell.trim()).unwrap_or_default();
        let level = row.get(level_column).map(|cell| cell.trim());
        match (code, level) {
            ("", _) | (_, None) => {
                return Err(ExtractError::MalformedLookup {
                    index: "qualification_levels",
                    reason: format!("row {} is missing code or level", line + 2),
                });
            }
            (code, Some(level)) => index.insert(code, level.to_string()),
        }
    }

    Ok(index)
}

/// Minimal CSV parser: quoted fields, doubled-quote escapes, CRLF tolerant.
fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    row.push(field);
    if !(row.len() == 1 && row[0].is_empty()) {
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    #[test]
    fn accreditations_are_keyed_by_type() {
        let root = parse_document(
            "<KIS>
               <ACCREDITATIONTABLE><ACCTYPE>15</ACCTYPE><ACCTEXT>Accredited by the RSC</ACCTEXT></ACCREDITATIONTABLE>
               <ACCREDITATIONTABLE><ACCTYPE>16</ACCTYPE><ACCTEXT>Accredited by the IET</ACCTEXT></ACCREDITATIONTABLE>
             </KIS>",
        )
        .expect("fixture parses");

        let index = build_accreditations(&root).expect("index builds");
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.get("16").and_then(|entry| entry.text("ACCTEXT")),
            Some("Accredited by the IET")
        );
        assert!(index.get("99").is_none());
    }

    #[test]
    fn absent_collection_builds_empty_index() {
        let root = parse_document("<KIS><INSTITUTION><UKPRN>1</UKPRN></INSTITUTION></KIS>")
            .expect("fixture parses");
        assert!(build_accreditations(&root).expect("index builds").is_empty());
        assert!(build_kis_aims(&root).expect("index builds").is_empty());
    }

    #[test]
    fn location_without_id_is_malformed() {
        let institution = parse_document(
            "<INSTITUTION><LOCATION><LOCNAME>Main campus</LOCNAME></LOCATION></INSTITUTION>",
        )
        .expect("fixture parses");
        let err = build_locations(&institution).expect_err("missing LOCID fails");
        assert!(matches!(err, ExtractError::MalformedLookup { index: "locations", .. }));
    }

    #[test]
    fn text_valued_location_is_malformed() {
        let institution = parse_document(
            "<INSTITUTION>
               <LOCATION><LOCID>A</LOCID></LOCATION>
               <LOCATION>Main campus</LOCATION>
             </INSTITUTION>",
        )
        .expect("fixture parses");
        let err = build_locations(&institution).expect_err("text LOCATION fails");
        assert!(matches!(err, ExtractError::MalformedLookup { index: "locations", .. }));
    }

    #[test]
    fn accreditation_without_type_is_malformed() {
        let root = parse_document(
            "<KIS><ACCREDITATIONTABLE><ACCTEXT>Accredited</ACCTEXT></ACCREDITATIONTABLE></KIS>",
        )
        .expect("fixture parses");
        let err = build_accreditations(&root).expect_err("missing ACCTYPE fails");
        assert!(matches!(
            err,
            ExtractError::MalformedLookup { index: "accreditations", ref reason } if reason.contains("ACCTYPE")
        ));
    }

    #[test]
    fn empty_accreditation_entry_is_malformed() {
        let root = parse_document("<KIS><ACCREDITATIONTABLE/></KIS>").expect("fixture parses");
        assert!(matches!(
            build_accreditations(&root),
            Err(ExtractError::MalformedLookup { index: "accreditations", .. })
        ));
    }

    #[test]
    fn kis_aim_without_label_is_malformed() {
        let root = parse_document("<KIS><KISAIM><KISAIMCODE>021</KISAIMCODE></KISAIM></KIS>")
            .expect("fixture parses");
        let err = build_kis_aims(&root).expect_err("missing KISAIMLABEL fails");
        assert!(matches!(
            err,
            ExtractError::MalformedLookup { index: "kis_aims", ref reason } if reason.contains("KISAIMLABEL")
        ));
    }

    #[test]
    fn duplicate_location_keeps_first() {
        let institution = parse_document(
            "<INSTITUTION>
               <LOCATION><LOCID>A</LOCID><LOCNAME>First</LOCNAME></LOCATION>
               <LOCATION><LOCID>A</LOCID><LOCNAME>Second</LOCNAME></LOCATION>
             </INSTITUTION>",
        )
        .expect("fixture parses");
        let index = build_locations(&institution).expect("index builds");
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("A").and_then(|entry| entry.text("LOCNAME")), Some("First"));
    }

    #[test]
    fn kis_aims_store_label_only() {
        let root = parse_document(
            "<KIS><KISAIM><KISAIMCODE>021</KISAIMCODE><KISAIMLABEL>BSc</KISAIMLABEL></KISAIM></KIS>",
        )
        .expect("fixture parses");
        let index = build_kis_aims(&root).expect("index builds");
        assert_eq!(index.get("021").map(String::as_str), Some("BSc"));
    }

    #[test]
    fn qualification_levels_parse_with_extra_columns() {
        let csv = "code,label,level,notes\r\n021,BSc,6,\"honours, ordinary\"\r\n051,MSc,7,\n";
        let index = parse_qualification_levels(csv).expect("csv parses");
        assert_eq!(index.get("021").map(String::as_str), Some("6"));
        assert_eq!(index.get("051").map(String::as_str), Some("7"));
    }

    #[test]
    fn qualification_levels_reject_reordered_header() {
        let err = parse_qualification_levels("label,code,level\nBSc,021,6\n")
            .expect_err("reordered header fails");
        match err {
            ExtractError::HeaderValidation { expected, found } => {
                assert_eq!(expected, vec!["code", "level"]);
                assert_eq!(found, vec!["label", "code", "level"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn qualification_levels_accept_other_middle_columns() {
        let index = parse_qualification_levels("code,description,level\n021,BSc,6\n")
            .expect("csv parses");
        assert_eq!(index.get("021").map(String::as_str), Some("6"));

        let index = parse_qualification_levels("\u{feff}code,level\n051,7\n").expect("csv parses");
        assert_eq!(index.get("051").map(String::as_str), Some("7"));
    }

    #[test]
    fn qualification_levels_reject_missing_column() {
        assert!(matches!(
            parse_qualification_levels("code,label\n021,BSc\n"),
            Err(ExtractError::HeaderValidation { .. })
        ));
        assert!(matches!(
            parse_qualification_levels(""),
            Err(ExtractError::HeaderValidation { .. })
        ));
    }

    #[test]
    fn qualification_row_without_level_is_malformed() {
        let err = parse_qualification_levels("code,label,level\n021,BSc\n")
            .expect_err("short row fails");
        assert!(matches!(err, ExtractError::MalformedLookup { .. }));
    }

    #[test]
    fn parse_rows_handles_quotes_and_blank_lines() {
        let rows = parse_rows("a,\"b \"\"c\"\"\"\n\nd,e", ',');
        assert_eq!(rows, vec![vec!["a", "b \"c\""], vec!["d", "e"]]);
    }
}
