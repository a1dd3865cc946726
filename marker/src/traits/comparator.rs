use crate::types::AlignmentResult;

/// OutputComparator is a strategy trait for comparing outputs.
///
/// An implementation produces a global alignment of the whole observed output against the whole
/// expected output. Removing the gaps from either side of the result must give back the
/// corresponding input exactly.
pub trait OutputComparator: Send + Sync {
    fn align(&self, observed: &str, expected: &str) -> AlignmentResult;
}
