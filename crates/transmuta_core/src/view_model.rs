use crate::{Category, ConversionStatus, HandleId, ItemId, TrackedItem};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub items: Vec<ItemRowView>,
    /// Items currently Pending or Converting.
    pub in_flight: usize,
    pub completed: usize,
    pub last_batch_format: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub item_id: ItemId,
    pub name: String,
    pub size: u64,
    pub category: Category,
    pub status: ConversionStatus,
    pub progress: u8,
    pub target_format: String,
    pub error: Option<String>,
    pub preview: Option<HandleId>,
    pub result: Option<HandleId>,
}

impl ItemRowView {
    pub(crate) fn from_item(item: &TrackedItem) -> Self {
        Self {
            item_id: item.item_id,
            name: item.name.clone(),
            size: item.size,
            category: item.category,
            status: item.status,
            progress: item.progress,
            target_format: item.target_format.clone(),
            error: item.error.clone(),
            preview: item.preview,
            result: item.result.as_ref().map(|result| result.handle),
        }
    }
}
