use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub status: String,
}

impl Health {
    pub fn ok() -> Self { Self { status: "ok".into() } }
}

/// Error payload returned by every failing API call.
///
/// `code` is a short machine-readable tag (`NotFound`, `InvalidArgument`, ...),
/// `message` the human-readable text shown to the user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
