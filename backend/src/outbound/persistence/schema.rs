//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. `diesel
//! print-schema` against a migrated database regenerates them.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        email -> Varchar,
        /// Argon2id hash in PHC string format.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Characters with their ordered sheet-entry references.
    characters (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        race -> Nullable<Varchar>,
        class_name -> Nullable<Varchar>,
        level -> Nullable<Int2>,
        skill_ids -> Array<Uuid>,
        stat_ids -> Array<Uuid>,
        save_ids -> Array<Uuid>,
        spell_ids -> Array<Uuid>,
        attack_ids -> Array<Uuid>,
        created_at -> Timestamptz,
        /// Insertion counter used for creation ordering.
        seq -> Int8,
    }
}

// The five sheet-entry tables share one layout; the kind-specific fields live
// in the `payload` JSON object.

diesel::table! {
    skills (id) {
        id -> Uuid,
        character_id -> Uuid,
        owner_id -> Uuid,
        payload -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    stats (id) {
        id -> Uuid,
        character_id -> Uuid,
        owner_id -> Uuid,
        payload -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    saves (id) {
        id -> Uuid,
        character_id -> Uuid,
        owner_id -> Uuid,
        payload -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    spells (id) {
        id -> Uuid,
        character_id -> Uuid,
        owner_id -> Uuid,
        payload -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    attacks (id) {
        id -> Uuid,
        character_id -> Uuid,
        owner_id -> Uuid,
        payload -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(characters -> users (owner_id));
diesel::joinable!(skills -> characters (character_id));
diesel::joinable!(stats -> characters (character_id));
diesel::joinable!(saves -> characters (character_id));
diesel::joinable!(spells -> characters (character_id));
diesel::joinable!(attacks -> characters (character_id));

diesel::allow_tables_to_appear_in_same_query!(
    users, characters, skills, stats, saves, spells, attacks,
);
