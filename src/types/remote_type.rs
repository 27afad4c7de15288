//! RemoteType - The closed set of file kinds a remote project stores

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote file kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteType {
    /// Server-side script
    ServerJs,

    /// Markup served by the project
    Html,

    /// Project manifest (only one per project)
    Json,
}

impl RemoteType {
    /// Every remote type, in a fixed order
    pub const ALL: [RemoteType; 3] = [RemoteType::ServerJs, RemoteType::Html, RemoteType::Json];

    /// Wire label of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteType::ServerJs => "SERVER_JS",
            RemoteType::Html => "HTML",
            RemoteType::Json => "JSON",
        }
    }
}

impl fmt::Display for RemoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_labels_match_display() {
        for remote_type in RemoteType::ALL {
            let json = serde_json::to_string(&remote_type).expect("serialize");
            assert_eq!(json, format!("\"{}\"", remote_type));
        }
    }

    #[test]
    fn test_deserialize_server_js() {
        let parsed: RemoteType = serde_json::from_str("\"SERVER_JS\"").expect("deserialize");
        assert_eq!(parsed, RemoteType::ServerJs);
    }
}
