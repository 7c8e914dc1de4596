use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract interfaces a delegate instance can report for discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Consulted before a payment or redemption is recorded.
    DataSource,
    /// Notified after a payment has been recorded.
    PayDelegate,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::DataSource, Capability::PayDelegate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::DataSource => "data-source",
            Capability::PayDelegate => "pay-delegate",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
