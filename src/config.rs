//! Validated engine configuration (§3, §4.10): a builder that rejects a
//! zero sample rate, block size, or channel count at construction, so an
//! `Engine` is never observed half-initialised.

use crate::error::EngineError;

/// Where the engine writes its mixed PCM output.
#[derive(Debug, Clone)]
pub enum SinkChoice {
    /// The platform's default output device, via `cpal`.
    Realtime,
    /// A WAV file at the given path, written once rendering completes.
    Offline(std::path::PathBuf),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub nchnls: u32,
    pub block_size: u32,
    pub sink: SinkChoice,
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

pub struct EngineConfigBuilder {
    sample_rate: u32,
    nchnls: u32,
    block_size: u32,
    sink: SinkChoice,
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            nchnls: 1,
            block_size: 64,
            sink: SinkChoice::Realtime,
        }
    }
}

impl EngineConfigBuilder {
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn nchnls(mut self, nchnls: u32) -> Self {
        self.nchnls = nchnls;
        self
    }

    pub fn block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn sink(mut self, sink: SinkChoice) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Result<EngineConfig, EngineError> {
        if self.sample_rate == 0 {
            return Err(EngineError::InvalidConfig("sample_rate must be nonzero".into()));
        }
        if self.block_size == 0 {
            return Err(EngineError::InvalidConfig("block_size must be nonzero".into()));
        }
        if self.nchnls == 0 {
            return Err(EngineError::InvalidConfig("nchnls must be nonzero".into()));
        }
        Ok(EngineConfig {
            sample_rate: self.sample_rate,
            nchnls: self.nchnls,
            block_size: self.block_size,
            sink: self.sink,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        let cfg = EngineConfig::builder().build().unwrap();
        assert_eq!(cfg.sample_rate, 44100);
        assert_eq!(cfg.nchnls, 1);
        assert_eq!(cfg.block_size, 64);
    }

    #[test]
    fn rejects_zero_sample_rate() {
        let err = EngineConfig::builder().sample_rate(0).build().unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_block_size() {
        let err = EngineConfig::builder().block_size(0).build().unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_nchnls() {
        let err = EngineConfig::builder().nchnls(0).build().unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }
}
