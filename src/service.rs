use std::sync::Arc;

use nanoid::nanoid;
use serde_json::Value;

use crate::errors::ServerError;
use crate::feed::NoteFeed;
use crate::models::note::{note_id_from_arg, NewNote, Note, NoteChanges};
use crate::store::NoteStore;
use crate::utils::now_millis;

const ID_ALPHABET: [char; 55] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
    'i', 'j', 'k', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const ID_LENGTH: usize = 17;
const INSERT_ATTEMPTS: usize = 3;

/// The identity a request was made with. Anonymous callers are rejected by
/// every [`NoteService`] operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller(Option<String>);

impl Caller {
    pub fn user(id: impl Into<String>) -> Self {
        Caller(Some(id.into()))
    }

    pub fn anonymous() -> Self {
        Caller(None)
    }

    pub fn user_id(&self) -> Result<&str, ServerError> {
        match self.0.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ServerError::Unauthenticated),
        }
    }
}

/// Note operations exposed to remote callers.
///
/// Arguments arrive as untyped JSON and are validated here, after the caller
/// is authenticated. A note owned by someone else is never reported: update
/// and remove on it succeed without touching it, while an unknown id is
/// `NotFound`.
#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
    feed: Arc<NoteFeed>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        NoteService {
            store,
            feed: Arc::new(NoteFeed::new()),
        }
    }

    pub fn feed(&self) -> &NoteFeed {
        &self.feed
    }

    pub fn create(&self, caller: &Caller, fields: Option<&Value>) -> Result<String, ServerError> {
        let owner_id = caller.user_id()?;
        let new_note = NewNote::from_arg(fields);
        let now = now_millis();

        let mut attempts = 0;
        let mut note =
            new_note.to_insertable(nanoid!(ID_LENGTH, &ID_ALPHABET), owner_id.to_string(), now);
        loop {
            attempts += 1;
            match self.store.insert(note.clone()) {
                Ok(()) => break,
                Err(ServerError::DuplicateId(taken)) if attempts < INSERT_ATTEMPTS => {
                    log::warn!("note id {taken} already taken, drawing another");
                    note.id = nanoid!(ID_LENGTH, &ID_ALPHABET);
                }
                Err(e) => return Err(e),
            }
        }

        log::info!("note {} created by {}", note.id, owner_id);
        self.feed.notify(owner_id);
        Ok(note.id)
    }

    pub fn remove(&self, caller: &Caller, id: Option<&Value>) -> Result<(), ServerError> {
        let user_id = caller.user_id()?;
        let id = note_id_from_arg(id)?;

        let note = self.find(&id)?;
        if note.owner_id != user_id {
            log::debug!("{user_id} tried to remove note {id} it does not own");
            return Ok(());
        }

        self.store.remove(&id)?;
        log::info!("note {id} removed by {user_id}");
        self.feed.notify(user_id);
        Ok(())
    }

    pub fn update(
        &self,
        caller: &Caller,
        id: Option<&Value>,
        fields: Option<&Value>,
    ) -> Result<(), ServerError> {
        let user_id = caller.user_id()?;
        let id = note_id_from_arg(id)?;
        let changes = NoteChanges::from_arg(fields)?;

        let note = self.find(&id)?;
        if note.owner_id != user_id {
            log::debug!("{user_id} tried to update note {id} it does not own");
            return Ok(());
        }

        // owner_id never changes, so the check above holds for the write below
        self.store.update_fields(&id, &changes, now_millis())?;
        log::debug!("note {id} updated by {user_id}");
        self.feed.notify(user_id);
        Ok(())
    }

    pub fn list_mine(&self, caller: &Caller) -> Result<Vec<Note>, ServerError> {
        let user_id = caller.user_id()?;
        self.store.find_by_owner(user_id)
    }

    fn find(&self, id: &str) -> Result<Note, ServerError> {
        self.store
            .find_by_id(id)?
            .ok_or_else(|| ServerError::NotFound(id.to_string()))
    }
}
