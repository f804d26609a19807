use {
    crate::{DEFAULT_MAX_PAYLOAD_SIZE_BYTES, Error, Result},
    byte_unit::Byte,
    serde::Deserialize,
};

///
/// Configuration for request pipelines built with `RouteOptions::from_config`.
///
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum request body size read by the pipeline before extraction fails.
    /// Supports human readable sizes such as "64KiB" or "1MiB".
    /// By default `max_payload_size_bytes` is set to 1MiB.
    #[serde(default = "PipelineConfig::default_max_payload_size_bytes")]
    pub max_payload_size_bytes: Byte,
}

impl PipelineConfig {
    fn default_max_payload_size_bytes() -> Byte {
        Byte::from_u64(DEFAULT_MAX_PAYLOAD_SIZE_BYTES as u64)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_payload_size_bytes.as_u64() == 0 {
            return Err(Error::config(
                "pipeline.max_payload_size_bytes must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_payload_size_bytes: Self::default_max_payload_size_bytes(),
        }
    }
}
