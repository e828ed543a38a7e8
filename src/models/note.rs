use crate::errors::ServerError;
use crate::schema::notes;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

/// Fields a caller may set through `notes.update`.
pub const UPDATABLE_FIELDS: [&str; 2] = ["title", "body"];

#[derive(Clone, Debug, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = notes)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Milliseconds since the unix epoch.
    pub updated_at: i64,
    pub owner_id: String,
}

/// Partial update applied by the store. `None` leaves a column untouched.
/// `updated_at` is not part of the changeset; stores raise it separately so
/// it never moves backwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = notes)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NoteChanges {
    /// Validates the `fields` argument of `notes.update`.
    ///
    /// The whole argument is rejected if it is missing, not an object, holds a
    /// key other than `title`/`body`, or holds a non-string value.
    pub fn from_arg(arg: Option<&Value>) -> Result<Self, ServerError> {
        let fields = match arg {
            Some(Value::Object(fields)) => fields,
            Some(_) => return Err(ServerError::invalid_argument("fields must be an object")),
            None => return Err(ServerError::invalid_argument("fields is required")),
        };

        if let Some(key) = fields
            .keys()
            .find(|k| !UPDATABLE_FIELDS.contains(&k.as_str()))
        {
            return Err(ServerError::invalid_argument(format!(
                "unknown field `{key}`"
            )));
        }

        let text = |key: &str| -> Result<Option<String>, ServerError> {
            match fields.get(key) {
                None => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(_) => Err(ServerError::invalid_argument(format!(
                    "`{key}` must be a string"
                ))),
            }
        };

        Ok(NoteChanges {
            title: text("title")?,
            body: text("body")?,
        })
    }

    /// Writes the listed fields and raises `updated_at` to at least `touched_at`.
    pub fn apply_to(&self, note: &mut Note, touched_at: i64) {
        if let Some(title) = &self.title {
            note.title = title.clone();
        }
        if let Some(body) = &self.body {
            note.body = body.clone();
        }
        note.updated_at = note.updated_at.max(touched_at);
    }
}

/// Input of `notes.insert`. Unknown keys and non-string values are dropped.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NewNote {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NewNote {
    pub fn from_arg(arg: Option<&Value>) -> Self {
        let text = |key: &str| {
            arg.and_then(|v| v.get(key))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        NewNote {
            title: text("title"),
            body: text("body"),
        }
    }

    pub fn to_insertable(self, id: String, owner_id: String, now: i64) -> Note {
        Note {
            id,
            title: self.title.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            updated_at: now,
            owner_id,
        }
    }
}

/// Validates a note id argument: a non-empty string.
pub fn note_id_from_arg(arg: Option<&Value>) -> Result<String, ServerError> {
    match arg {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::String(_)) => Err(ServerError::invalid_argument("id must not be empty")),
        Some(_) => Err(ServerError::invalid_argument("id must be a string")),
        None => Err(ServerError::invalid_argument("id is required")),
    }
}
