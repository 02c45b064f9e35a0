use serde::{Deserialize, Serialize};

/// Progress of the most recently issued fetch cycle.
///
/// `generation` identifies the cycle; a status from an older generation is
/// never reported once a newer filter has been issued.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FetchStatus {
    Idle,
    Loading { generation: u64, pages: usize },
    Ready { generation: u64, records: usize },
    Failed { generation: u64, message: String },
}

/// Answer to a filter edit: whether a new cycle was started, and the status
/// right after the edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTicket {
    pub started: bool,
    pub status: FetchStatus,
}
