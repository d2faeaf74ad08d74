//! ID generation utilities.

use ulid::Ulid;
use uuid::Uuid;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based entity ID.
    ///
    /// ULIDs are lexicographically sortable and monotonically increasing
    /// within the same millisecond, which keeps primary-key indexes compact.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a short random suffix for stored file names.
    ///
    /// Eight hex characters are enough to disambiguate uploads that land
    /// in the same second for the same complaint.
    #[must_use]
    pub fn generate_file_suffix(&self) -> String {
        let simple = Uuid::new_v4().simple().to_string();
        simple[..8].to_string()
    }
}
