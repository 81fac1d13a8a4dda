//! SQL schema for the Folio SQLite store.
//!
//! Executed once when the store is opened. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE … IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Every text category plus the biography singleton. The singleton is
-- kept by the conditional biography insert, not by a constraint.
CREATE TABLE IF NOT EXISTS content_items (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    category    TEXT NOT NULL,   -- 'esai' | 'novel' | … | 'biography'
    title       TEXT NOT NULL,
    content     TEXT NOT NULL DEFAULT '',
    image_url   TEXT,
    created_at  TEXT NOT NULL    -- RFC 3339 UTC, second precision
);

CREATE TABLE IF NOT EXISTS gallery (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    image_url   TEXT NOT NULL,
    caption     TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS hero_slider (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    image_url   TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    setting_key   TEXT PRIMARY KEY,
    setting_value TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS page_views (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    path        TEXT NOT NULL,
    ip_address  TEXT NOT NULL,
    user_agent  TEXT,
    country     TEXT,
    city        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id          TEXT PRIMARY KEY,
    data        TEXT NOT NULL,   -- JSON object
    expiry_date INTEGER NOT NULL -- unix seconds
);

CREATE INDEX IF NOT EXISTS content_items_category_idx ON content_items(category, created_at);
CREATE INDEX IF NOT EXISTS page_views_created_idx     ON page_views(created_at);
CREATE INDEX IF NOT EXISTS page_views_path_idx        ON page_views(path);
CREATE INDEX IF NOT EXISTS sessions_expiry_idx        ON sessions(expiry_date);

PRAGMA user_version = 1;
";
