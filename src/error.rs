use thiserror::{Error};

use super::{ArrayIndex};

/// The failure reported by the safe indexing facade.
///
/// The message always names both the array's size and the offending
/// index, rendered compactly (e.g. `(3,0)`), so a failed lookup is never
/// silently wrong and never ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("index {index} is out of bounds for array of size {size}")]
pub struct IndexError {
    /// The array's size, rendered by [`ArrayIndex::describe_size`].
    pub size: String,
    /// The offending index, rendered by [`ArrayIndex::describe`].
    pub index: String,
}

impl IndexError {
    pub(crate) fn new<I: ArrayIndex>(size: I::Size, index: I) -> Self {
        IndexError {
            size: I::describe_size(size),
            index: index.describe(),
        }
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_size_and_index() {
        let e = IndexError::new::<(usize, usize)>((3, 2), (3, 0));
        let message = e.to_string();
        assert!(message.contains("(3,0)"));
        assert!(message.contains("(3,2)"));
    }
}
