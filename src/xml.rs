use std::collections::BTreeMap;

use roxmltree::{Document, Node};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Text(String),
    Block(RawBlock),
    Repeated(Vec<Field>),
}

impl Field {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&RawBlock> {
        match self {
            Field::Block(block) => Some(block),
            _ => None,
        }
    }
}

// Presence is key membership only; an empty leaf is `Text("")`, never a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBlock {
    fields: BTreeMap<String, Field>,
}

static EMPTY_BLOCK: RawBlock = RawBlock {
    fields: BTreeMap::new(),
};

impl RawBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a child occurrence. A second occurrence of the same key turns the entry into
    /// [`Field::Repeated`].
    pub fn insert(&mut self, key: impl Into<String>, field: Field) {
        let key = key.into();
        match self.fields.remove(&key) {
            None => {
                self.fields.insert(key, field);
            }
            Some(Field::Repeated(mut items)) => {
                items.push(field);
                self.fields.insert(key, Field::Repeated(items));
            }
            Some(existing) => {
                self.fields.insert(key, Field::Repeated(vec![existing, field]));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Field::as_text)
    }

    pub fn non_empty_text(&self, key: &str) -> Option<&str> {
        self.text(key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(key, field)| (key.as_str(), field))
    }

    pub fn blocks(&self, key: &str) -> Vec<&RawBlock> {
        self.get(key)
            .map(coerce_to_sequence)
            .unwrap_or_default()
            .into_iter()
            .filter_map(Field::as_block)
            .collect()
    }

    /// Every occurrence of `key` as a block. An empty leaf reads as an empty block; an
    /// occurrence holding text fails with `mismatch(position)`.
    pub fn strict_blocks<E>(
        &self,
        key: &str,
        mismatch: impl Fn(usize) -> E,
    ) -> std::result::Result<Vec<&RawBlock>, E> {
        self.get(key)
            .map(coerce_to_sequence)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(position, field)| match field {
                Field::Block(block) => Ok(block),
                Field::Text(text) if text.is_empty() => Ok(&EMPTY_BLOCK),
                _ => Err(mismatch(position)),
            })
            .collect()
    }

    pub fn texts(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .map(coerce_to_sequence)
            .unwrap_or_default()
            .into_iter()
            .filter_map(Field::as_text)
            .collect()
    }
}

/// One occurrence becomes a single-element sequence; a repeated field is returned as-is.
pub fn coerce_to_sequence(field: &Field) -> Vec<&Field> {
    match field {
        Field::Repeated(items) => items.iter().collect(),
        other => vec![other],
    }
}

pub fn parse_document(xml: &str) -> Result<RawBlock> {
    let document = Document::parse(xml)?;
    let root = document.root_element();
    Ok(match normalize_element(root) {
        Field::Block(block) => block,
        _ => RawBlock::new(),
    })
}

fn normalize_element(node: Node<'_, '_>) -> Field {
    let mut children = node.children().filter(Node::is_element).peekable();
    if children.peek().is_none() {
        return Field::Text(node.text().unwrap_or_default().trim().to_string());
    }

    let mut block = RawBlock::new();
    for child in children {
        block.insert(child.tag_name().name(), normalize_element(child));
    }
    Field::Block(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_to_sequence_wraps_scalar_in_single_element() {
        let field = Field::Text("100".to_string());
        let sequence = coerce_to_sequence(&field);
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence[0], &field);
    }

    #[test]
    fn coerce_to_sequence_returns_repeated_items_unchanged() {
        let field = Field::Repeated(vec![
            Field::Text("100".to_string()),
            Field::Text("101".to_string()),
        ]);
        let sequence = coerce_to_sequence(&field);
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence[0].as_text(), Some("100"));
        assert_eq!(sequence[1].as_text(), Some("101"));
    }

    #[test]
    fn coerce_to_sequence_wraps_single_block() {
        let mut block = RawBlock::new();
        block.insert("LOCID", Field::Text("A".to_string()));
        let field = Field::Block(block);
        assert_eq!(coerce_to_sequence(&field).len(), 1);
    }

    #[test]
    fn parse_document_collapses_repeated_children() {
        let root = parse_document(
            r#"<KIS>
                 <INSTITUTION><PUBUKPRN>1</PUBUKPRN></INSTITUTION>
                 <INSTITUTION><PUBUKPRN>2</PUBUKPRN></INSTITUTION>
                 <KISAIM><KISAIMCODE>021</KISAIMCODE></KISAIM>
               </KIS>"#,
        )
        .expect("xml should parse");

        let institutions = root.blocks("INSTITUTION");
        assert_eq!(institutions.len(), 2);
        assert_eq!(institutions[0].text("PUBUKPRN"), Some("1"));
        assert_eq!(institutions[1].text("PUBUKPRN"), Some("2"));
        assert_eq!(root.blocks("KISAIM").len(), 1);
    }

    #[test]
    fn empty_leaf_is_present_but_blank() {
        let root = parse_document("<A><B/><C> x </C></A>").expect("xml should parse");
        assert!(root.contains("B"));
        assert_eq!(root.text("B"), Some(""));
        assert_eq!(root.non_empty_text("B"), None);
        assert_eq!(root.text("C"), Some("x"));
        assert!(!root.contains("D"));
    }

    #[test]
    fn texts_handles_one_or_many_occurrences() {
        let root = parse_document("<A><SBJ>100048</SBJ><SBJ>100050</SBJ><ONE>x</ONE></A>")
            .expect("xml should parse");
        assert_eq!(root.texts("SBJ"), vec!["100048", "100050"]);
        assert_eq!(root.texts("ONE"), vec!["x"]);
        assert!(root.texts("MISSING").is_empty());
    }

    #[test]
    fn strict_blocks_reads_empty_leaf_as_empty_block() {
        let root = parse_document("<A><B/><B><C>1</C></B></A>").expect("xml should parse");
        let blocks = root.strict_blocks("B", |position| position).expect("all blocks");
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[0].contains("C"));
        assert_eq!(blocks[1].text("C"), Some("1"));
        assert!(root.strict_blocks("D", |position| position).expect("absent").is_empty());
    }

    #[test]
    fn strict_blocks_rejects_text_occurrence() {
        let root = parse_document("<A><B><C>1</C></B><B>text</B></A>").expect("xml should parse");
        assert_eq!(root.strict_blocks("B", |position| position), Err(1));
        assert_eq!(root.blocks("B").len(), 1);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_document("<A><B></A>").is_err());
    }
}
