use serde::{Deserialize, Serialize};

use crate::private_group::PrivateGroupAddress;

/// Default private creator of the CSA block.
pub const CSA_CREATOR: &str = "SIEMENS CSA HEADER";
/// Group scanned for the creator.
pub const CSA_GROUP: u16 = 0x0029;
/// Block used by most scanners when no creator element is present.
pub const DEFAULT_CSA_ADDRESS: PrivateGroupAddress = PrivateGroupAddress::new(CSA_GROUP, 0x10);

/// Where to look for the CSA block and what to do when it is not found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsaOptions {
    /// Private creator string identifying the block.
    pub creator: String,
    /// Group to scan for the creator.
    pub group: u16,
    /// Address assumed when the creator is missing; `None` makes a missing
    /// creator an error.
    pub fallback: Option<PrivateGroupAddress>,
}

impl Default for CsaOptions {
    fn default() -> Self {
        Self {
            creator: CSA_CREATOR.to_string(),
            group: CSA_GROUP,
            fallback: Some(DEFAULT_CSA_ADDRESS),
        }
    }
}

impl CsaOptions {
    /// Same creator and group, but a missing creator is an error.
    pub fn strict() -> Self {
        Self {
            fallback: None,
            ..Self::default()
        }
    }

    /// Replaces the fallback address.
    pub fn with_fallback(mut self, fallback: Option<PrivateGroupAddress>) -> Self {
        self.fallback = fallback;
        self
    }
}
