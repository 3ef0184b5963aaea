use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Which ledger call produced an [`AnchorEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorAction {
    /// A digest was submitted to the ledger.
    Anchor,
    /// The ledger was polled for confirmation of a digest.
    Status,
}

impl fmt::Display for AnchorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anchor => write!(f, "anchor"),
            Self::Status => write!(f, "status"),
        }
    }
}

impl FromStr for AnchorAction {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anchor" => Ok(Self::Anchor),
            "status" => Ok(Self::Status),
            other => Err(TypeError::UnknownAction(other.to_string())),
        }
    }
}

/// One completed ledger interaction, as recorded in proof history.
///
/// Events are immutable once appended. Use [`AnchorEvent::anchor`] and
/// [`AnchorEvent::status`] so that `tx_hash` only ever appears on anchor
/// events and `anchored` only on status events. Unset fields serialize as
/// `null`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorEvent {
    /// Epoch milliseconds at which the ledger call completed.
    pub ts: u64,
    pub action: AnchorAction,
    /// The combined hash being tracked.
    pub hash: String,
    pub tx_hash: Option<String>,
    pub anchored: Option<bool>,
    pub explorer_url: Option<String>,
    pub contract_url: Option<String>,
}

impl AnchorEvent {
    /// Event for a successful submission.
    pub fn anchor(
        ts: u64,
        hash: impl Into<String>,
        tx_hash: impl Into<String>,
        explorer_url: Option<String>,
    ) -> Self {
        Self {
            ts,
            action: AnchorAction::Anchor,
            hash: hash.into(),
            tx_hash: Some(tx_hash.into()),
            anchored: None,
            explorer_url,
            contract_url: None,
        }
    }

    /// Event for a completed confirmation poll.
    pub fn status(
        ts: u64,
        hash: impl Into<String>,
        anchored: bool,
        contract_url: Option<String>,
    ) -> Self {
        Self {
            ts,
            action: AnchorAction::Status,
            hash: hash.into(),
            tx_hash: None,
            anchored: Some(anchored),
            explorer_url: None,
            contract_url,
        }
    }
}
