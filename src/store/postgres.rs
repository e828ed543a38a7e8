use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use diesel::result::DatabaseErrorKind;
use diesel::sql_types::BigInt;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use super::NoteStore;
use crate::errors::ServerError;
use crate::models::note::{Note, NoteChanges};
use crate::schema::notes;

diesel::sql_function!(fn greatest(a: BigInt, b: BigInt) -> BigInt);

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn build_pool(database_url: &str) -> Result<Pool, ServerError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(r2d2::Pool::builder().build(manager)?)
}

pub fn run_migrations(pool: &Pool) -> Result<(), ServerError> {
    let mut pooled = pool.get()?;
    let connection: &mut PgConnection = &mut pooled;
    let applied = connection.run_pending_migrations(MIGRATIONS).map_err(|e| {
        log::error!("migrations: {e}");
        ServerError::MigrationError
    })?;
    for version in applied {
        log::info!("applied migration {version}");
    }
    Ok(())
}

pub struct PgNoteStore {
    pool: Pool,
}

impl PgNoteStore {
    pub fn new(pool: Pool) -> Self {
        PgNoteStore { pool }
    }
}

impl NoteStore for PgNoteStore {
    fn insert(&self, note: Note) -> Result<(), ServerError> {
        let mut connection = self.pool.get()?;

        match diesel::insert_into(notes::table)
            .values(&note)
            .execute(&mut connection)
        {
            Ok(_) => Ok(()),
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(ServerError::DuplicateId(note.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Note>, ServerError> {
        let mut connection = self.pool.get()?;

        Ok(notes::table
            .find(id)
            .select(Note::as_select())
            .first(&mut connection)
            .optional()?)
    }

    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Note>, ServerError> {
        let mut connection = self.pool.get()?;

        Ok(notes::table
            .filter(notes::owner_id.eq(owner_id))
            .order(notes::created_at.asc())
            .select(Note::as_select())
            .load(&mut connection)?)
    }

    fn update_fields(
        &self,
        id: &str,
        changes: &NoteChanges,
        touched_at: i64,
    ) -> Result<(), ServerError> {
        let mut connection = self.pool.get()?;
        let updated = diesel::update(notes::table.find(id))
            .set((
                changes,
                notes::updated_at.eq(greatest(notes::updated_at, touched_at)),
            ))
            .execute(&mut connection)?;

        if updated == 0 {
            return Err(ServerError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), ServerError> {
        let mut connection = self.pool.get()?;

        diesel::delete(notes::table.find(id)).execute(&mut connection)?;
        Ok(())
    }
}
