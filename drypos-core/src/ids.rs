//! Identifier generation for new records.

use uuid::Uuid;

/// Source of fresh primary keys.
///
/// Production code uses [`UuidIds`]; tests substitute scripted sequences to
/// make generated ids predictable.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs rendered as hyphenated strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
