use bytes::Bytes;

use crate::{Category, HandleId, ItemId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand one pending item to the conversion engine.
    Dispatch {
        item_id: ItemId,
        source: Bytes,
        category: Category,
        target: String,
    },
    /// Back a freshly minted display handle with these bytes.
    RegisterHandle { handle: HandleId, bytes: Bytes },
    /// Release a display handle and its backing memory.
    ReleaseHandle { handle: HandleId },
}
