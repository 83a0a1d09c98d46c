use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;

use transmuta_core::{
    update, AppState, AppViewModel, Category, Effect, IncomingFile, ItemId, Msg,
};

use crate::engine::{EngineConfig, EngineHandle};
use crate::filename::download_filename;
use crate::handle::HandleStore;
use crate::types::{ConvertRequest, EngineEvent};

/// Pause between successive bulk downloads, so rapid back-to-back downloads
/// are not swallowed by whatever consumes them.
const DOWNLOAD_STAGGER: Duration = Duration::from_millis(200);

/// One completed item's output, ready to hand to a download sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFile {
    pub item_id: ItemId,
    pub filename: String,
    pub media_type: String,
    pub bytes: Bytes,
}

/// The external surface of the converter: wires the pure state machine to
/// the engine and the handle store, executing effects as they are produced.
///
/// All state mutation funnels through `update` on the caller's thread; the
/// engine only ever talks back through its event channel, so interleaved
/// conversions never race the collection.
pub struct ConverterSession {
    state: AppState,
    engine: EngineHandle,
    handles: HandleStore,
}

impl Default for ConverterSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterSession {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            state: AppState::new(),
            engine: EngineHandle::new(config),
            handles: HandleStore::new(),
        }
    }

    /// Submits raw files and returns the ids of the newly tracked items.
    pub fn submit_files(&mut self, files: Vec<IncomingFile>) -> Vec<ItemId> {
        let before: HashSet<ItemId> = self.state.item_ids().into_iter().collect();
        let submitted_at_ms = Utc::now().timestamp_millis().max(0) as u64;
        self.apply(Msg::FilesAdded {
            files,
            submitted_at_ms,
        });
        self.state
            .item_ids()
            .into_iter()
            .filter(|id| !before.contains(id))
            .collect()
    }

    pub fn set_target(&mut self, item_id: ItemId, format: &str) {
        self.apply(Msg::TargetChanged {
            item_id,
            format: format.to_string(),
        });
    }

    pub fn apply_format_to_category(&mut self, format: &str, category: Category) {
        self.apply(Msg::FormatApplied {
            format: format.to_string(),
            category,
        });
    }

    pub fn remove(&mut self, item_id: ItemId) {
        self.apply(Msg::ItemRemoved { item_id });
    }

    pub fn clear(&mut self) {
        self.apply(Msg::Cleared);
    }

    pub fn snapshot(&self) -> AppViewModel {
        self.state.view()
    }

    /// Runs one batch round to completion: selects every eligible item,
    /// dispatches them all concurrently, and returns once the slowest has
    /// reached a terminal state. Returns the ids that were dispatched.
    pub fn start_batch_conversion(&mut self) -> Vec<ItemId> {
        let dispatched = self.begin_round();
        self.wait_round(&dispatched);
        dispatched
    }

    /// Phase one of a round: mark-all-pending plus dispatch, without
    /// waiting. Exposed separately so callers can interleave other
    /// operations (removal, snapshots) while conversions run.
    pub fn begin_round(&mut self) -> Vec<ItemId> {
        self.apply(Msg::ConvertClicked)
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Dispatch { item_id, .. } => Some(item_id),
                _ => None,
            })
            .collect()
    }

    /// Phase two: drains engine events until every dispatched item has
    /// produced its terminal event. Events for since-removed items are
    /// absorbed as no-ops.
    pub fn wait_round(&mut self, dispatched: &[ItemId]) {
        let mut outstanding: HashSet<ItemId> = dispatched.iter().copied().collect();
        while !outstanding.is_empty() {
            let Some(event) = self.engine.recv() else {
                break;
            };
            if let EngineEvent::Finished { item_id, .. } = &event {
                outstanding.remove(item_id);
            }
            self.apply_engine_event(event);
        }
        // Absorb any progress ticks that raced the final events.
        self.pump();
    }

    /// Applies already-queued engine events without blocking.
    pub fn pump(&mut self) {
        while let Some(event) = self.engine.try_recv() {
            self.apply_engine_event(event);
        }
    }

    /// Download payload for one completed item, with its suggested filename.
    pub fn download(&self, item_id: ItemId) -> Option<DownloadFile> {
        let item = self.state.item(item_id)?;
        let result = item.result.as_ref()?;
        Some(DownloadFile {
            item_id,
            filename: download_filename(&item.name, &item.target_format),
            media_type: result.payload.media_type.clone(),
            bytes: result.payload.bytes.clone(),
        })
    }

    /// Sequential bulk download: every completed item in id order, with a
    /// small stagger between consecutive items. Returns the download count.
    pub fn download_all_completed(&self, mut sink: impl FnMut(DownloadFile)) -> usize {
        let mut count = 0;
        for item_id in self.state.item_ids() {
            let Some(download) = self.download(item_id) else {
                continue;
            };
            if count > 0 {
                thread::sleep(DOWNLOAD_STAGGER);
            }
            sink(download);
            count += 1;
        }
        count
    }

    /// Live display buffers; useful for leak diagnostics.
    pub fn live_handles(&self) -> usize {
        self.handles.len()
    }

    /// Resolves a preview or result handle to its backing bytes.
    pub fn handle_bytes(&self, handle: transmuta_core::HandleId) -> Option<Bytes> {
        self.handles.get(handle)
    }

    fn apply_engine_event(&mut self, event: EngineEvent) {
        let msg = match event {
            EngineEvent::Started { item_id } => Msg::ConversionStarted { item_id },
            EngineEvent::Progress { item_id, increment } => {
                Msg::ConversionProgressed { item_id, increment }
            }
            EngineEvent::Finished { item_id, result } => Msg::ConversionFinished {
                item_id,
                result: result.map_err(|err| err.to_string()),
            },
        };
        self.apply(msg);
    }

    fn apply(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in &effects {
            self.run_effect(effect);
        }
        effects
    }

    fn run_effect(&self, effect: &Effect) {
        match effect {
            Effect::Dispatch {
                item_id,
                source,
                category,
                target,
            } => {
                self.engine.dispatch(ConvertRequest {
                    item_id: *item_id,
                    source: source.clone(),
                    category: *category,
                    target: target.clone(),
                });
            }
            Effect::RegisterHandle { handle, bytes } => {
                self.handles.register(*handle, bytes.clone());
            }
            Effect::ReleaseHandle { handle } => {
                self.handles.revoke(*handle);
            }
        }
    }
}

impl Drop for ConverterSession {
    fn drop(&mut self) {
        // Store teardown releases every remaining display buffer.
        self.handles.revoke_all();
    }
}
