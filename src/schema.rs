diesel::table! {
    notes (id) {
        id -> Varchar,
        title -> Varchar,
        body -> Varchar,
        updated_at -> Int8,
        owner_id -> Varchar,
        created_at -> Timestamp,
    }
}
