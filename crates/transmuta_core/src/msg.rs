use crate::{Category, ConvertedPayload, IncomingFile, ItemId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Raw files submitted by the shell. The timestamp is supplied by the
    /// caller so the reducer stays clock-free.
    FilesAdded {
        files: Vec<IncomingFile>,
        submitted_at_ms: u64,
    },
    /// User picked a new target format for one item.
    TargetChanged { item_id: ItemId, format: String },
    /// User applied a format to every compatible item of one category.
    FormatApplied { format: String, category: Category },
    /// User started a batch round: convert everything eligible now.
    ConvertClicked,
    /// User removed one item from the collection.
    ItemRemoved { item_id: ItemId },
    /// User cleared the whole collection.
    Cleared,
    /// Engine began converting a dispatched item.
    ConversionStarted { item_id: ItemId },
    /// Engine progress tick; a synthetic estimate, not byte-level truth.
    ConversionProgressed { item_id: ItemId, increment: u8 },
    /// Engine finished a dispatched item, successfully or not.
    ConversionFinished {
        item_id: ItemId,
        result: Result<ConvertedPayload, String>,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
