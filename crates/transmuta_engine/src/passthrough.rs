use std::time::Duration;

use transmuta_core::ConvertedPayload;

use crate::strategy::ConvertStrategy;
use crate::types::{ConvertError, ConvertRequest};

/// Media type stamped on passthrough output so consumers treat it as an
/// opaque download.
const GENERIC_MEDIA_TYPE: &str = "application/octet-stream";

const MIN_DELAY_MS: u64 = 800;
const MAX_DELAY_MS: u64 = 2_500;
/// Simulated throughput: one millisecond of "work" per five source bytes.
const BYTES_PER_MS: u64 = 5;

/// Identity transform with artificial latency.
///
/// This is an explicit stub: document and e-book conversion performs no real
/// byte-level transformation here, only a size-proportional delay and a copy
/// of the original bytes under the generic media type. Substituting a real
/// codec for a given format pair means replacing this strategy in the
/// dispatch rule, nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughStrategy;

/// Simulated processing time, linear in source size and clamped so small
/// files still show visible progress and large ones stay bounded.
pub(crate) fn simulated_delay(size_bytes: u64) -> Duration {
    Duration::from_millis((size_bytes / BYTES_PER_MS).clamp(MIN_DELAY_MS, MAX_DELAY_MS))
}

#[async_trait::async_trait]
impl ConvertStrategy for PassthroughStrategy {
    async fn convert(&self, request: &ConvertRequest) -> Result<ConvertedPayload, ConvertError> {
        tokio::time::sleep(simulated_delay(request.source.len() as u64)).await;
        Ok(ConvertedPayload {
            bytes: request.source.clone(),
            media_type: GENERIC_MEDIA_TYPE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::simulated_delay;
    use std::time::Duration;

    #[test]
    fn delay_is_linear_then_clamped() {
        // 200ms of work raised to the floor.
        assert_eq!(simulated_delay(1_000), Duration::from_millis(800));
        // 4000ms of work clamped to the ceiling.
        assert_eq!(simulated_delay(20_000), Duration::from_millis(2_500));
        assert_eq!(simulated_delay(50_000_000), Duration::from_millis(2_500));
        // In the linear band.
        assert_eq!(simulated_delay(6_000), Duration::from_millis(1_200));
        assert_eq!(simulated_delay(0), Duration::from_millis(800));
    }
}
