use serde::{Deserialize, Serialize};

/// Contact record as returned by the remote partner resource. The remote
/// system owns these; dialdex never writes them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub name: String,
    pub phone: Option<String>,
    pub phone_sanitized: Option<String>,
}

impl Partner {
    /// Candidate phone fields in match order: the sanitized value first,
    /// then the raw one.
    pub fn phone_candidates(&self) -> [Option<&str>; 2] {
        [self.phone_sanitized.as_deref(), self.phone.as_deref()]
    }
}
