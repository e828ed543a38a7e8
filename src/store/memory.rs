use std::sync::{Mutex, MutexGuard, PoisonError};

use super::NoteStore;
use crate::errors::ServerError;
use crate::models::note::{Note, NoteChanges};

/// In-process store. All access is serialized behind one lock, so every
/// read-modify-write on a document is atomic.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: Mutex<Vec<Note>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notes(&self) -> MutexGuard<'_, Vec<Note>> {
        self.notes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NoteStore for MemoryNoteStore {
    fn insert(&self, note: Note) -> Result<(), ServerError> {
        let mut notes = self.notes();
        if notes.iter().any(|n| n.id == note.id) {
            return Err(ServerError::DuplicateId(note.id));
        }
        notes.push(note);
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Note>, ServerError> {
        Ok(self.notes().iter().find(|n| n.id == id).cloned())
    }

    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Note>, ServerError> {
        Ok(self
            .notes()
            .iter()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn update_fields(
        &self,
        id: &str,
        changes: &NoteChanges,
        touched_at: i64,
    ) -> Result<(), ServerError> {
        let mut notes = self.notes();
        match notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                changes.apply_to(note, touched_at);
                Ok(())
            }
            None => Err(ServerError::NotFound(id.to_string())),
        }
    }

    fn remove(&self, id: &str) -> Result<(), ServerError> {
        self.notes().retain(|n| n.id != id);
        Ok(())
    }
}
