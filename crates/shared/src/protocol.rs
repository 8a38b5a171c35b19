use serde::{Deserialize, Serialize};

/// Release entry returned by `forum.get_version_details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDetails {
    pub number: String,
    pub name: String,
    pub lts: bool,
    pub active: bool,
    pub current: bool,
    pub dev: bool,
    pub link: String,
}
