//! STORYLOOM Core - Entity Types
//!
//! Pure data structures shared by every other crate in the workspace: epics,
//! stories, backlogs, sprint plans, the persona registry, configuration and
//! the error taxonomy. Behavior (decomposition, synthesis, scoring,
//! allocation) lives in the downstream crates.

pub mod config;
pub mod entities;
pub mod enums;
pub mod error;
pub mod persona;
pub mod report;

pub use config::*;
pub use entities::*;
pub use enums::*;
pub use error::*;
pub use persona::*;
pub use report::*;

use sha2::{Digest, Sha256};

/// SHA-256 content hash.
pub type ContentHash = [u8; 32];

/// Story point scale, smallest first.
pub const STORY_POINT_SCALE: [u32; 4] = [1, 3, 8, 13];

/// Compute SHA-256 hash of content.
pub fn compute_content_hash(content: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Hex-encoded SHA-256 of content.
pub fn content_hash_hex(content: &[u8]) -> String {
    hex::encode(compute_content_hash(content))
}
