//! Transmuta engine: conversion strategies, effect execution, and the
//! session facade over the core state machine.
mod engine;
mod filename;
mod handle;
mod passthrough;
mod raster;
mod session;
mod strategy;
mod types;

pub use engine::{EngineConfig, EngineHandle};
pub use filename::download_filename;
pub use handle::HandleStore;
pub use passthrough::PassthroughStrategy;
pub use raster::RasterStrategy;
pub use session::{ConverterSession, DownloadFile};
pub use strategy::{select_strategy, ConvertStrategy};
pub use types::{ConvertError, ConvertRequest, EngineEvent, FailureKind};
