//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `whitelist` table (identities allowed to use the caller pages)
/// - `call_recipient` table (one row per phone number, never deleted)
/// - `survey_form` table (single row, `id` pinned to 1)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Caller whitelist
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS whitelist (
    id INTEGER PRIMARY KEY NOT NULL,
    identity TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL -- RFC3339
);

-- ---------------------------------------------------------------------------
-- Call recipients (phone_number is the natural key)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS call_recipient (
    id INTEGER PRIMARY KEY NOT NULL,
    phone_number INTEGER NOT NULL UNIQUE,
    assigned_caller TEXT NULL,
    contacted INTEGER NOT NULL DEFAULT 0,
    last_contact TEXT NULL, -- RFC3339
    contact_response TEXT NULL,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_call_recipient_pending ON call_recipient(contacted, assigned_caller);

-- ---------------------------------------------------------------------------
-- Active survey form (at most one row)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS survey_form (
    id INTEGER PRIMARY KEY NOT NULL CHECK (id = 1),
    form_key TEXT NOT NULL,
    updated_at TEXT NOT NULL -- RFC3339
);
"#;
