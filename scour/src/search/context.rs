use super::splitter::Record;

/// Which records of a file print, with group boundaries for separators.
///
/// Built per file from the selected records: every record within the
/// configured distance of a selection is marked, and overlapping or
/// touching windows fuse into one group.
#[derive(Debug)]
pub struct ContextWindow {
    mask: Vec<bool>,
}

impl ContextWindow {
    pub fn build(records: &[Record], before: usize, after: usize) -> Self {
        let mut mask = vec![false; records.len()];
        for (i, record) in records.iter().enumerate() {
            if record.is_match {
                let lo = i.saturating_sub(before);
                let hi = i.saturating_add(after).min(records.len() - 1);
                for slot in &mut mask[lo..=hi] {
                    *slot = true;
                }
            }
        }
        ContextWindow { mask }
    }

    pub fn is_printable(&self, index: usize) -> bool {
        self.mask.get(index).copied().unwrap_or(false)
    }

    /// True when `index` begins a new contiguous printable run.
    pub fn starts_group(&self, index: usize) -> bool {
        self.is_printable(index) && (index == 0 || !self.mask[index - 1])
    }
}
