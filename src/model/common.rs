use crate::types::BlockId;

/// Common fields for all blocks
#[derive(Debug, Clone, PartialEq)]
pub struct BlockCommon {
    pub id: BlockId,
    /// Children are not embedded; the walker fetches them by `id` on demand.
    pub has_children: bool,
}

impl BlockCommon {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            has_children: false,
        }
    }

    pub fn with_children(mut self) -> Self {
        self.has_children = true;
        self
    }
}
