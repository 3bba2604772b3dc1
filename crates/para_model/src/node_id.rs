//! Stable node handles

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle of one node in a [`DocumentTree`](crate::DocumentTree).
///
/// A handle is minted once when the node is created and never reused.
/// Splitting, repacking and merging move nodes between parents without
/// changing their handles, so a [`Position`](crate::Position) or a
/// collected block list taken before a command still names the same nodes
/// afterwards. A handle outlives its node: after removal it simply stops
/// resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Short form for logs and error messages: the first eight hex digits
impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = Uuid::encode_buffer();
        let hex = self.0.simple().encode_lower(&mut buf);
        write!(f, "#{}", &hex[..8])
    }
}
