use serde::{Deserialize, Serialize};

/// A named monotonic counter plus an auxiliary `data` pointer, lazily
/// created with `sequence = 0` on first `get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicSequence {
    pub id: String,
    pub sequence: u64,
    /// Last-value pointer used to chain the next record's `previousId`.
    /// Empty string is the documented "unset" state.
    #[serde(default)]
    pub data: String,
}

impl DynamicSequence {
    pub fn empty(id: impl Into<String>) -> Self {
        DynamicSequence {
            id: id.into(),
            sequence: 0,
            data: String::new(),
        }
    }
}
