use std::collections::BTreeMap;

use bytes::Bytes;

use crate::classify::{classify, Category};
use crate::formats::{default_target, is_valid_target};
use crate::view_model::{AppViewModel, ItemRowView};

pub type ItemId = u64;

/// Opaque reference to a memory-backed, revocable display buffer. The core
/// only mints ids; the owning store lives with whoever executes effects.
pub type HandleId = u64;

/// Item lifecycle: `Idle -> Pending -> Converting -> {Completed | Error}`.
/// Idle and Error items are eligible for the next batch round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionStatus {
    #[default]
    Idle,
    Pending,
    Converting,
    Completed,
    Error,
}

/// A raw file as handed over by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    pub name: String,
    pub declared_media_type: String,
    pub bytes: Bytes,
}

/// Output of a conversion strategy. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedPayload {
    pub bytes: Bytes,
    pub media_type: String,
}

/// Result attached to a completed item: the payload plus the display handle
/// that was registered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedResult {
    pub payload: ConvertedPayload,
    pub handle: HandleId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedItem {
    pub item_id: ItemId,
    pub name: String,
    pub source: Bytes,
    pub size: u64,
    pub category: Category,
    pub submitted_at_ms: u64,
    pub target_format: String,
    pub status: ConversionStatus,
    pub progress: u8,
    pub error: Option<String>,
    pub preview: Option<HandleId>,
    pub result: Option<CompletedResult>,
}

impl TrackedItem {
    /// Handles this item owns right now; all of them must be released when
    /// the item leaves the collection.
    fn owned_handles(&self) -> Vec<HandleId> {
        let mut handles = Vec::new();
        if let Some(handle) = self.preview {
            handles.push(handle);
        }
        if let Some(result) = &self.result {
            handles.push(result.handle);
        }
        handles
    }

    /// Drops a stale result, returning its handle for release.
    fn take_result_handle(&mut self) -> Option<HandleId> {
        self.result.take().map(|result| result.handle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    items: BTreeMap<ItemId, TrackedItem>,
    next_item_id: ItemId,
    next_handle_id: HandleId,
    last_batch_format: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            next_item_id: 1,
            next_handle_id: 1,
            last_batch_format: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let items: Vec<ItemRowView> = self.items.values().map(ItemRowView::from_item).collect();
        let in_flight = items
            .iter()
            .filter(|row| {
                matches!(
                    row.status,
                    ConversionStatus::Pending | ConversionStatus::Converting
                )
            })
            .count();
        let completed = items
            .iter()
            .filter(|row| row.status == ConversionStatus::Completed)
            .count();
        AppViewModel {
            items,
            in_flight,
            completed,
            last_batch_format: self.last_batch_format.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns and resets the dirty flag; shells use this to coalesce renders.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn item(&self, item_id: ItemId) -> Option<&TrackedItem> {
        self.items.get(&item_id)
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.keys().copied().collect()
    }

    pub fn last_batch_format(&self) -> Option<&str> {
        self.last_batch_format.as_deref()
    }

    fn mint_handle(&mut self) -> HandleId {
        let handle = self.next_handle_id;
        self.next_handle_id += 1;
        handle
    }

    /// Admits one raw file: classifies it, picks a target (the batch
    /// preference when valid for this specific file, the category default
    /// otherwise), and mints a preview handle for images.
    pub(crate) fn admit_file(
        &mut self,
        file: IncomingFile,
        submitted_at_ms: u64,
    ) -> (ItemId, Option<(HandleId, Bytes)>) {
        let category = classify(&file.name, &file.declared_media_type);
        let target = self
            .last_batch_format
            .as_deref()
            .filter(|pref| is_valid_target(category, &file.name, pref))
            .unwrap_or(default_target(category))
            .to_string();

        let preview = if category == Category::Image {
            Some((self.mint_handle(), file.bytes.clone()))
        } else {
            None
        };

        let item_id = self.next_item_id;
        self.next_item_id += 1;
        let size = file.bytes.len() as u64;
        self.items.insert(
            item_id,
            TrackedItem {
                item_id,
                name: file.name,
                source: file.bytes,
                size,
                category,
                submitted_at_ms,
                target_format: target,
                status: ConversionStatus::Idle,
                progress: 0,
                error: None,
                preview: preview.as_ref().map(|(handle, _)| *handle),
                result: None,
            },
        );
        self.dirty = true;
        (item_id, preview)
    }

    /// Changes one item's target format. Validated against the item's own
    /// available set; in-flight items are immutable. Returns `None` when the
    /// change was rejected, otherwise the stale result handle to release.
    pub(crate) fn change_target(
        &mut self,
        item_id: ItemId,
        format: &str,
    ) -> Option<Option<HandleId>> {
        let item = self.items.get_mut(&item_id)?;
        if matches!(
            item.status,
            ConversionStatus::Pending | ConversionStatus::Converting
        ) {
            return None;
        }
        if !is_valid_target(item.category, &item.name, format) {
            return None;
        }
        item.target_format = format.to_string();
        item.status = ConversionStatus::Idle;
        item.progress = 0;
        item.error = None;
        let released = item.take_result_handle();
        self.dirty = true;
        Some(released)
    }

    /// Bulk-applies `format` to every non-in-flight item of `category` whose
    /// available set includes it, resetting them to Idle. Records the format
    /// as the batch preference for later submissions. Returns released
    /// result handles.
    pub(crate) fn apply_format_to_category(
        &mut self,
        format: &str,
        category: Category,
    ) -> Vec<HandleId> {
        self.last_batch_format = Some(format.to_string());
        let mut released = Vec::new();
        for item in self.items.values_mut() {
            if item.category != category {
                continue;
            }
            if matches!(
                item.status,
                ConversionStatus::Pending | ConversionStatus::Converting
            ) {
                continue;
            }
            if !is_valid_target(item.category, &item.name, format) {
                continue;
            }
            item.target_format = format.to_string();
            item.status = ConversionStatus::Idle;
            item.progress = 0;
            item.error = None;
            released.extend(item.take_result_handle());
        }
        self.dirty = true;
        released
    }

    /// Selects every Idle/Error item for a batch round and marks all of them
    /// Pending in this single state update, so observers never see a
    /// half-selected batch.
    pub(crate) fn select_for_round(&mut self) -> Vec<ItemId> {
        let mut selected = Vec::new();
        for item in self.items.values_mut() {
            if matches!(
                item.status,
                ConversionStatus::Idle | ConversionStatus::Error
            ) {
                item.status = ConversionStatus::Pending;
                item.progress = 0;
                item.error = None;
                selected.push(item.item_id);
            }
        }
        if !selected.is_empty() {
            self.dirty = true;
        }
        selected
    }

    pub(crate) fn begin_item(&mut self, item_id: ItemId) {
        if let Some(item) = self.items.get_mut(&item_id) {
            if item.status == ConversionStatus::Pending {
                item.status = ConversionStatus::Converting;
                item.progress = 10;
                item.error = None;
                self.dirty = true;
            }
        }
    }

    /// Applies one synthetic progress tick, capped at 90 until completion.
    pub(crate) fn advance_progress(&mut self, item_id: ItemId, increment: u8) {
        if let Some(item) = self.items.get_mut(&item_id) {
            if item.status == ConversionStatus::Converting {
                item.progress = item.progress.saturating_add(increment).min(90);
                self.dirty = true;
            }
        }
    }

    /// Terminal transition for one dispatched item. A finish for an id that
    /// was removed mid-flight is a safe no-op. On success, returns the
    /// freshly minted result handle and its backing bytes for registration.
    pub(crate) fn finish_item(
        &mut self,
        item_id: ItemId,
        result: Result<ConvertedPayload, String>,
    ) -> Option<(HandleId, Bytes)> {
        let in_flight = matches!(
            self.items.get(&item_id).map(|item| item.status),
            Some(ConversionStatus::Pending | ConversionStatus::Converting)
        );
        if !in_flight {
            return None;
        }
        let registration = match result {
            Ok(payload) => {
                let handle = self.mint_handle();
                let bytes = payload.bytes.clone();
                if let Some(item) = self.items.get_mut(&item_id) {
                    item.status = ConversionStatus::Completed;
                    item.progress = 100;
                    item.error = None;
                    item.result = Some(CompletedResult { payload, handle });
                }
                Some((handle, bytes))
            }
            Err(reason) => {
                if let Some(item) = self.items.get_mut(&item_id) {
                    item.status = ConversionStatus::Error;
                    item.progress = 0;
                    item.error = Some(reason);
                    item.result = None;
                }
                None
            }
        };
        self.dirty = true;
        registration
    }

    /// Removes one item, returning every handle it owned. Removal does not
    /// abort in-flight work; the eventual finish event no-ops.
    pub(crate) fn remove_item(&mut self, item_id: ItemId) -> Vec<HandleId> {
        match self.items.remove(&item_id) {
            Some(item) => {
                self.dirty = true;
                item.owned_handles()
            }
            None => Vec::new(),
        }
    }

    /// Empties the collection, returning every owned handle.
    pub(crate) fn clear_items(&mut self) -> Vec<HandleId> {
        let released: Vec<HandleId> = self
            .items
            .values()
            .flat_map(TrackedItem::owned_handles)
            .collect();
        if !self.items.is_empty() {
            self.dirty = true;
        }
        self.items.clear();
        released
    }
}
