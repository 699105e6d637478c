//! SQLite-backed persistence for roles, players, and their permission
//! grants. This module only talks to the database; it never caches
//! anything, that's [`super::Cache`]'s job.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use super::types::{PlayerRecord, Role};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("role {0:?} already exists")]
    RoleNameConflict(String),
    #[error("role {0} not found")]
    RoleNotFound(i64),
    #[error("player {0} not found")]
    PlayerNotFound(u64),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS roles (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL UNIQUE,
    display_name  TEXT NOT NULL,
    immunity      INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS role_permissions (
    role_id     INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
    permission  TEXT NOT NULL,
    PRIMARY KEY (role_id, permission)
);

CREATE TABLE IF NOT EXISTS players (
    steam_id    INTEGER PRIMARY KEY,
    name        TEXT NOT NULL DEFAULT '',
    immunity    INTEGER NOT NULL DEFAULT 0,
    expires_at  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS player_roles (
    steam_id  INTEGER NOT NULL REFERENCES players(steam_id) ON DELETE CASCADE,
    role_id   INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
    PRIMARY KEY (steam_id, role_id)
);

CREATE TABLE IF NOT EXISTS player_permissions (
    steam_id    INTEGER NOT NULL REFERENCES players(steam_id) ON DELETE CASCADE,
    permission  TEXT NOT NULL,
    PRIMARY KEY (steam_id, permission)
);
";

/// The four roles every fresh database starts with.
const DEFAULT_ROLES: &[(&str, &str, i64, &[&str])] = &[
    ("root", "Root", 100, &["*"]),
    ("admin", "Admin", 80, &["gostrike.*"]),
    (
        "moderator",
        "Moderator",
        50,
        &["gostrike.kick", "gostrike.ban", "gostrike.slay", "gostrike.chat"],
    ),
    ("vip", "VIP", 10, &["gostrike.reservation"]),
];

pub fn open(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.execute_batch(SCHEMA)?;
    seed_default_roles(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.execute_batch(SCHEMA)?;
    seed_default_roles(&conn)?;
    Ok(conn)
}

fn seed_default_roles(conn: &Connection) -> Result<(), StoreError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM roles", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }
    for (name, display_name, immunity, perms) in DEFAULT_ROLES {
        conn.execute(
            "INSERT INTO roles (name, display_name, immunity) VALUES (?1, ?2, ?3)",
            params![name, display_name, immunity],
        )?;
        let role_id = conn.last_insert_rowid();
        for perm in *perms {
            conn.execute(
                "INSERT INTO role_permissions (role_id, permission) VALUES (?1, ?2)",
                params![role_id, perm],
            )?;
        }
    }
    Ok(())
}

pub fn create_role(
    conn: &Connection,
    name: &str,
    display_name: &str,
    immunity: i64,
) -> Result<i64, StoreError> {
    let exists: Option<i64> = conn
        .query_row("SELECT id FROM roles WHERE name = ?1", params![name], |r| r.get(0))
        .optional()?;
    if exists.is_some() {
        return Err(StoreError::RoleNameConflict(name.to_string()));
    }
    conn.execute(
        "INSERT INTO roles (name, display_name, immunity) VALUES (?1, ?2, ?3)",
        params![name, display_name, immunity],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_role(conn: &Connection, role_id: i64) -> Result<(), StoreError> {
    let affected = conn.execute("DELETE FROM roles WHERE id = ?1", params![role_id])?;
    if affected == 0 {
        return Err(StoreError::RoleNotFound(role_id));
    }
    Ok(())
}

pub fn add_role_permission(conn: &Connection, role_id: i64, permission: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO role_permissions (role_id, permission) VALUES (?1, ?2)",
        params![role_id, permission],
    )?;
    Ok(())
}

pub fn remove_role_permission(conn: &Connection, role_id: i64, permission: &str) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM role_permissions WHERE role_id = ?1 AND permission = ?2",
        params![role_id, permission],
    )?;
    Ok(())
}

pub fn upsert_player(conn: &Connection, steam_id: u64, name: &str, immunity: i64, expires_at: i64) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO players (steam_id, name, immunity, expires_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(steam_id) DO UPDATE SET name = excluded.name, immunity = excluded.immunity, expires_at = excluded.expires_at",
        params![steam_id as i64, name, immunity, expires_at],
    )?;
    Ok(())
}

pub fn delete_player(conn: &Connection, steam_id: u64) -> Result<(), StoreError> {
    conn.execute("DELETE FROM players WHERE steam_id = ?1", params![steam_id as i64])?;
    Ok(())
}

pub fn assign_role(conn: &Connection, steam_id: u64, role_id: i64) -> Result<(), StoreError> {
    ensure_player_row(conn, steam_id)?;
    conn.execute(
        "INSERT OR IGNORE INTO player_roles (steam_id, role_id) VALUES (?1, ?2)",
        params![steam_id as i64, role_id],
    )?;
    Ok(())
}

pub fn unassign_role(conn: &Connection, steam_id: u64, role_id: i64) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM player_roles WHERE steam_id = ?1 AND role_id = ?2",
        params![steam_id as i64, role_id],
    )?;
    Ok(())
}

pub fn add_player_permission(conn: &Connection, steam_id: u64, permission: &str) -> Result<(), StoreError> {
    ensure_player_row(conn, steam_id)?;
    conn.execute(
        "INSERT OR IGNORE INTO player_permissions (steam_id, permission) VALUES (?1, ?2)",
        params![steam_id as i64, permission],
    )?;
    Ok(())
}

pub fn remove_player_permission(conn: &Connection, steam_id: u64, permission: &str) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM player_permissions WHERE steam_id = ?1 AND permission = ?2",
        params![steam_id as i64, permission],
    )?;
    Ok(())
}

fn ensure_player_row(conn: &Connection, steam_id: u64) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO players (steam_id) VALUES (?1)",
        params![steam_id as i64],
    )?;
    Ok(())
}

/// Full read of every role and player, for rebuilding the in-memory cache.
pub struct Snapshot {
    pub roles: Vec<Role>,
    pub players: Vec<PlayerRecord>,
}

pub fn load_all(conn: &Connection) -> Result<Snapshot, StoreError> {
    let mut roles = Vec::new();
    {
        let mut stmt = conn.prepare("SELECT id, name, display_name, immunity FROM roles")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            roles.push(Role {
                id,
                name: row.get(1)?,
                display_name: row.get(2)?,
                immunity: row.get(3)?,
                permissions: HashSet::new(),
            });
        }
    }
    {
        let mut stmt = conn.prepare("SELECT role_id, permission FROM role_permissions")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let role_id: i64 = row.get(0)?;
            let perm: String = row.get(1)?;
            if let Some(role) = roles.iter_mut().find(|r| r.id == role_id) {
                role.permissions.insert(perm);
            }
        }
    }

    let mut players = Vec::new();
    {
        let mut stmt = conn.prepare("SELECT steam_id, name, immunity, expires_at FROM players")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let steam_id: i64 = row.get(0)?;
            players.push(PlayerRecord {
                steam_id: steam_id as u64,
                name: row.get(1)?,
                immunity: row.get(2)?,
                expires_at: row.get(3)?,
                roles: HashSet::new(),
                permissions: HashSet::new(),
            });
        }
    }
    {
        let mut stmt = conn.prepare("SELECT steam_id, role_id FROM player_roles")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let steam_id: i64 = row.get(0)?;
            let role_id: i64 = row.get(1)?;
            if let Some(player) = players.iter_mut().find(|p| p.steam_id == steam_id as u64) {
                player.roles.insert(role_id);
            }
        }
    }
    {
        let mut stmt = conn.prepare("SELECT steam_id, permission FROM player_permissions")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let steam_id: i64 = row.get(0)?;
            let perm: String = row.get(1)?;
            if let Some(player) = players.iter_mut().find(|p| p.steam_id == steam_id as u64) {
                player.permissions.insert(perm);
            }
        }
    }

    Ok(Snapshot { roles, players })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_seeds_four_default_roles() {
        let conn = open_in_memory().unwrap();
        let snapshot = load_all(&conn).unwrap();
        assert_eq!(snapshot.roles.len(), 4);
        let root = snapshot.roles.iter().find(|r| r.name == "root").unwrap();
        assert!(root.permissions.contains("*"));
    }

    #[test]
    fn seeding_is_idempotent() {
        let conn = open_in_memory().unwrap();
        seed_default_roles(&conn).unwrap();
        let snapshot = load_all(&conn).unwrap();
        assert_eq!(snapshot.roles.len(), 4);
    }

    #[test]
    fn create_role_rejects_duplicate_name() {
        let conn = open_in_memory().unwrap();
        let err = create_role(&conn, "admin", "Admin Again", 1).unwrap_err();
        assert!(matches!(err, StoreError::RoleNameConflict(_)));
    }

    #[test]
    fn deleting_role_cascades_to_role_permissions_and_player_roles() {
        let conn = open_in_memory().unwrap();
        let role_id = create_role(&conn, "events", "Events", 5).unwrap();
        add_role_permission(&conn, role_id, "gostrike.event.run").unwrap();
        assign_role(&conn, 111, role_id).unwrap();

        delete_role(&conn, role_id).unwrap();

        let snapshot = load_all(&conn).unwrap();
        assert!(snapshot.roles.iter().all(|r| r.id != role_id));
        let player = snapshot.players.iter().find(|p| p.steam_id == 111).unwrap();
        assert!(player.roles.is_empty());
    }

    #[test]
    fn player_permission_round_trip() {
        let conn = open_in_memory().unwrap();
        add_player_permission(&conn, 42, "gostrike.fly").unwrap();
        let snapshot = load_all(&conn).unwrap();
        let player = snapshot.players.iter().find(|p| p.steam_id == 42).unwrap();
        assert!(player.permissions.contains("gostrike.fly"));

        remove_player_permission(&conn, 42, "gostrike.fly").unwrap();
        let snapshot = load_all(&conn).unwrap();
        let player = snapshot.players.iter().find(|p| p.steam_id == 42).unwrap();
        assert!(player.permissions.is_empty());
    }

    #[test]
    fn upsert_player_updates_existing_row() {
        let conn = open_in_memory().unwrap();
        upsert_player(&conn, 7, "first", 0, 0).unwrap();
        upsert_player(&conn, 7, "second", 10, 999).unwrap();
        let snapshot = load_all(&conn).unwrap();
        let player = snapshot.players.iter().find(|p| p.steam_id == 7).unwrap();
        assert_eq!(player.name, "second");
        assert_eq!(player.immunity, 10);
        assert_eq!(player.expires_at, 999);
    }
}
