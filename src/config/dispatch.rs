use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// Claim numbers with a single conditional update instead of a separate
    /// read and write. Turning this off restores the legacy behavior where two
    /// concurrent callers can be handed the same number.
    /// TOML: `dispatch.atomic_claim`. Default: `true`.
    #[serde(default = "default_atomic_claim")]
    pub atomic_claim: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            atomic_claim: default_atomic_claim(),
        }
    }
}

fn default_atomic_claim() -> bool {
    true
}
