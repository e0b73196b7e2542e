//! Record identifier generation.

use uuid::Uuid;

/// Source of fresh record identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs in canonical lowercase hyphenated form (36 chars).
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String { Uuid::new_v4().to_string() }
}

/// Deterministic generator for tests: `user-1`, `user-2`, ...
#[cfg(test)]
#[derive(Default)]
pub struct SequenceIds(std::sync::atomic::AtomicU64);

#[cfg(test)]
impl IdGenerator for SequenceIds {
    fn next_id(&self) -> String {
        let n = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        format!("user-{n}")
    }
}
