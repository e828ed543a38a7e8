use crate::errors::ServerError;
use crate::models::note::{Note, NoteChanges};

pub mod memory;
pub mod postgres;

pub use memory::MemoryNoteStore;
pub use postgres::PgNoteStore;

/// Document storage for notes.
///
/// The store knows nothing about callers or ownership; those checks live in
/// [`crate::service::NoteService`]. Each method is atomic with respect to a
/// single document.
pub trait NoteStore: Send + Sync {
    /// Fails with [`ServerError::DuplicateId`] if a note with the same id exists.
    fn insert(&self, note: Note) -> Result<(), ServerError>;

    fn find_by_id(&self, id: &str) -> Result<Option<Note>, ServerError>;

    /// Every note whose owner is `owner_id`, oldest first. Each call runs a
    /// fresh query.
    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Note>, ServerError>;

    /// Writes the listed fields and raises `updated_at` to at least
    /// `touched_at`, as one atomic step. Fails with [`ServerError::NotFound`]
    /// if no note has this id.
    fn update_fields(
        &self,
        id: &str,
        changes: &NoteChanges,
        touched_at: i64,
    ) -> Result<(), ServerError>;

    /// Removing an absent id is not an error.
    fn remove(&self, id: &str) -> Result<(), ServerError>;
}
