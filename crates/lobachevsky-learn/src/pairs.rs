//! Similar/dissimilar pair construction from a label vector.

/// Unordered index pairs split by label equality.
///
/// Pairs are canonicalized as `(i, j)` with `i < j`; together the two sets
/// partition all C(n,2) unordered pairs exactly.
#[derive(Debug, Clone, Default)]
pub struct PairSets {
    pub similar: Vec<(usize, usize)>,
    pub dissimilar: Vec<(usize, usize)>,
}

impl PairSets {
    /// O(n²) sweep over all index pairs, deterministic in label order.
    pub fn build(labels: &[usize]) -> Self {
        let n = labels.len();
        let mut sets = PairSets::default();
        for i in 0..n {
            for j in (i + 1)..n {
                if labels[i] == labels[j] {
                    sets.similar.push((i, j));
                } else {
                    sets.dissimilar.push((i, j));
                }
            }
        }
        sets
    }
}
