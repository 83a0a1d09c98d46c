//! Transmuta core: pure conversion state machine and view-model helpers.
mod classify;
mod effect;
mod formats;
mod msg;
mod state;
mod update;
mod view_model;

pub use classify::{classify, file_extension, Category};
pub use effect::Effect;
pub use formats::{
    available_formats, default_target, image_format, is_valid_target, FormatOption, EBOOK_FORMATS,
    IMAGE_FORMATS,
};
pub use msg::Msg;
pub use state::{
    AppState, CompletedResult, ConversionStatus, ConvertedPayload, HandleId, IncomingFile, ItemId,
    TrackedItem,
};
pub use update::update;
pub use view_model::{AppViewModel, ItemRowView};
