use crate::stats::{StatFamily, ValueKind};
use crate::xml::RawBlock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectorKey {
    pub subject: String,
    pub mode: String,
    pub level: String,
}

impl SectorKey {
    pub fn new(subject: &str, mode: &str, level: &str) -> Self {
        Self {
            subject: subject.to_string(),
            mode: mode.to_string(),
            level: level.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectorRecord<'d> {
    pub key: SectorKey,
    pub block: &'d RawBlock,
}

#[derive(Debug)]
pub struct SectorMatcher<'d> {
    records: Vec<SectorRecord<'d>>,
}

impl<'d> SectorMatcher<'d> {
    /// Collects `family`'s sector records from the document root, in document order.
    /// Records lacking any key part can never match and are left out.
    pub fn new(family: StatFamily, root: &'d RawBlock) -> Self {
        let table = family.table();
        let key_field = |kind| table.spec_of_kind(kind).map(|spec| spec.raw_key);
        let (subject_key, mode_key, level_key) = (
            key_field(ValueKind::Subject),
            key_field(ValueKind::Mode),
            key_field(ValueKind::Level),
        );

        let records = root
            .blocks(family.element())
            .into_iter()
            .filter_map(|block| {
                let key = SectorKey::new(
                    block.text(subject_key?)?,
                    block.text(mode_key?)?,
                    block.text(level_key?)?,
                );
                Some(SectorRecord { key, block })
            })
            .collect();

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Duplicate keys resolve to the first record in document order.
    pub fn match_single(&self, key: &SectorKey) -> Option<&SectorRecord<'d>> {
        self.records.iter().find(|record| record.key == *key)
    }

    /// Matches every course subject in one pass over the collection. The result is aligned
    /// with `subjects`; scanning stops once each subject has a match.
    pub fn match_many(
        &self,
        mode: &str,
        level: &str,
        subjects: &[&str],
    ) -> Vec<Option<&SectorRecord<'d>>> {
        let mut matches = vec![None; subjects.len()];
        let mut unmatched = subjects.len();

        for record in &self.records {
            if unmatched == 0 {
                break;
            }
            if record.key.mode != mode || record.key.level != level {
                continue;
            }
            for (slot, subject) in matches.iter_mut().zip(subjects) {
                if slot.is_none() && record.key.subject == *subject {
                    *slot = Some(record);
                    unmatched -= 1;
                }
            }
        }

        matches
    }
}
