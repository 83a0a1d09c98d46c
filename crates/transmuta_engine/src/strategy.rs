use transmuta_core::{image_format, Category, ConvertedPayload};

use crate::passthrough::PassthroughStrategy;
use crate::raster::RasterStrategy;
use crate::types::{ConvertError, ConvertRequest};

/// Category-specific transformation of source bytes into target-format bytes.
#[async_trait::async_trait]
pub trait ConvertStrategy: Send + Sync {
    async fn convert(&self, request: &ConvertRequest) -> Result<ConvertedPayload, ConvertError>;
}

/// Dispatch rule: real pixel work only for image sources with an image
/// target; everything else, including the defensively handled
/// image-to-non-image case, goes through the passthrough stub.
pub fn select_strategy(request: &ConvertRequest) -> &'static dyn ConvertStrategy {
    static RASTER: RasterStrategy = RasterStrategy;
    static PASSTHROUGH: PassthroughStrategy = PassthroughStrategy;

    if request.category == Category::Image && image_format(&request.target).is_some() {
        &RASTER
    } else {
        &PASSTHROUGH
    }
}
