use crate::{Error, Result};
use std::time::Duration;

/// Session settings for a [`ViscaController`][crate::ViscaController].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViscaConfig {
    /// Camera address on the serial bus, `1..=7`.
    pub address: u8,

    /// How long to wait for a reply to an inquiry before giving up with
    /// [`Error::Timeout`].
    pub inquiry_timeout: Duration,

    /// Number of requests which may wait in the queue while another is in
    /// flight. Callers block once the queue is full.
    pub queue_depth: usize,
}

impl ViscaConfig {
    pub const DEFAULT_ADDRESS: u8 = 1;
    pub const MAX_ADDRESS: u8 = 7;
    pub const DEFAULT_INQUIRY_TIMEOUT: Duration = Duration::from_secs(1);
    pub const DEFAULT_QUEUE_DEPTH: usize = 16;

    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_inquiry_timeout(mut self, inquiry_timeout: Duration) -> Self {
        self.inquiry_timeout = inquiry_timeout;
        self
    }

    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth;
        self
    }

    /// Checks the settings are usable.
    ///
    /// ## Errors
    ///
    /// * [`Error::ParameterOutOfRange`] if the camera address is outside
    ///   `1..=7`, or the queue depth is 0.
    pub fn validate(&self) -> Result {
        if !(1..=Self::MAX_ADDRESS).contains(&self.address) {
            error!("camera address {} out of range", self.address);
            return Err(Error::ParameterOutOfRange);
        }

        if self.queue_depth == 0 {
            error!("queue depth must be at least 1");
            return Err(Error::ParameterOutOfRange);
        }

        Ok(())
    }
}

impl Default for ViscaConfig {
    fn default() -> Self {
        Self {
            address: Self::DEFAULT_ADDRESS,
            inquiry_timeout: Self::DEFAULT_INQUIRY_TIMEOUT,
            queue_depth: Self::DEFAULT_QUEUE_DEPTH,
        }
    }
}
