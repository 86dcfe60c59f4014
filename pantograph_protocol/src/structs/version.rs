use binrw::binrw;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Camera identification, from a version inquiry (`CAM_VersionInq`).
///
/// ## Packet format
///
/// * `u16`: vendor ID (`0x0020` for Sony)
/// * `u16`: model ID
/// * `u16`: ROM revision
/// * `u8`: maximum number of command sockets
#[binrw]
#[brw(big)]
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VersionInfo {
    pub vendor_id: u16,
    pub model_id: u16,
    pub rom_revision: u16,
    pub max_sockets: u8,
}

impl Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "vendor {:#06x}, model {:#06x}, ROM {:#06x}, {} socket(s)",
            self.vendor_id, self.model_id, self.rom_revision, self.max_sockets
        )
    }
}
