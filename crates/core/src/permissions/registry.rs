//! The write-through cache and process-wide facade in front of
//! [`super::store`]. Every mutation re-reads the entire database into a
//! fresh cache under one write lock; reads never touch the database.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use parking_lot::{Mutex, RwLock};
use rusqlite::Connection;

use super::store::{self, Snapshot, StoreError};
use super::types::{permission_matches, PlayerRecord, RegisteredPermission, Role};

struct Cache {
    roles_by_id: HashMap<i64, Role>,
    roles_by_name: HashMap<String, i64>,
    players: HashMap<u64, PlayerRecord>,
}

impl Cache {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut roles_by_id = HashMap::new();
        let mut roles_by_name = HashMap::new();
        for role in snapshot.roles {
            roles_by_name.insert(role.name.clone(), role.id);
            roles_by_id.insert(role.id, role);
        }
        let players = snapshot.players.into_iter().map(|p| (p.steam_id, p)).collect();
        Self { roles_by_id, roles_by_name, players }
    }
}

/// Process-wide permission store: a guarded SQLite connection plus the
/// cache it feeds.
pub struct PermissionStore {
    conn: Mutex<Option<Connection>>,
    cache: RwLock<Cache>,
    registered: RwLock<HashMap<String, String>>,
}

impl PermissionStore {
    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let snapshot = store::load_all(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            cache: RwLock::new(Cache::from_snapshot(snapshot)),
            registered: RwLock::new(HashMap::new()),
        })
    }

    fn rebuild_cache(&self, conn: &Connection) -> Result<(), StoreError> {
        let snapshot = store::load_all(conn)?;
        *self.cache.write() = Cache::from_snapshot(snapshot);
        Ok(())
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, PermissionError> {
        let mut guard = self.conn.lock();
        let conn = guard.as_mut().ok_or(PermissionError::Closed)?;
        let result = f(conn)?;
        self.rebuild_cache(conn)?;
        Ok(result)
    }

    pub fn shutdown(&self) {
        *self.conn.lock() = None;
    }

    /// Force a full cache rebuild from the current database contents,
    /// without otherwise mutating anything. Exposed for the HTTP control
    /// plane's `reload` endpoint.
    pub fn reload(&self) -> Result<(), PermissionError> {
        self.with_conn(|_conn| Ok(()))
    }

    // -- mutations --------------------------------------------------

    pub fn create_role(&self, name: &str, display_name: &str, immunity: i64) -> Result<i64, PermissionError> {
        self.with_conn(|conn| store::create_role(conn, name, display_name, immunity))
    }

    pub fn delete_role(&self, role_id: i64) -> Result<(), PermissionError> {
        self.with_conn(|conn| store::delete_role(conn, role_id))
    }

    pub fn add_role_permission(&self, role_id: i64, permission: &str) -> Result<(), PermissionError> {
        self.with_conn(|conn| store::add_role_permission(conn, role_id, permission))
    }

    pub fn remove_role_permission(&self, role_id: i64, permission: &str) -> Result<(), PermissionError> {
        self.with_conn(|conn| store::remove_role_permission(conn, role_id, permission))
    }

    pub fn upsert_player(&self, steam_id: u64, name: &str, immunity: i64, expires_at: i64) -> Result<(), PermissionError> {
        self.with_conn(|conn| store::upsert_player(conn, steam_id, name, immunity, expires_at))
    }

    pub fn delete_player(&self, steam_id: u64) -> Result<(), PermissionError> {
        self.with_conn(|conn| store::delete_player(conn, steam_id))
    }

    pub fn assign_role(&self, steam_id: u64, role_id: i64) -> Result<(), PermissionError> {
        self.with_conn(|conn| store::assign_role(conn, steam_id, role_id))
    }

    pub fn unassign_role(&self, steam_id: u64, role_id: i64) -> Result<(), PermissionError> {
        self.with_conn(|conn| store::unassign_role(conn, steam_id, role_id))
    }

    pub fn add_player_permission(&self, steam_id: u64, permission: &str) -> Result<(), PermissionError> {
        self.with_conn(|conn| store::add_player_permission(conn, steam_id, permission))
    }

    pub fn remove_player_permission(&self, steam_id: u64, permission: &str) -> Result<(), PermissionError> {
        self.with_conn(|conn| store::remove_player_permission(conn, steam_id, permission))
    }

    /// Declare a permission name a plugin checks, with a description for
    /// admin tooling. Not persisted; lives only as long as the process.
    pub fn register_permission(&self, name: &str, description: &str) {
        self.registered
            .write()
            .insert(name.to_string(), description.to_string());
        crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Permission(name.to_string()));
    }

    /// Remove a declared permission name. Called when a plugin's scope is
    /// drained on unload.
    pub fn unregister_permission(&self, name: &str) {
        self.registered.write().remove(name);
    }

    // -- reads, cache-only --------------------------------------------

    pub fn get_role_by_name(&self, name: &str) -> Option<Role> {
        let cache = self.cache.read();
        cache.roles_by_name.get(name).and_then(|id| cache.roles_by_id.get(id)).cloned()
    }

    pub fn get_role_by_id(&self, id: i64) -> Option<Role> {
        self.cache.read().roles_by_id.get(&id).cloned()
    }

    pub fn list_roles(&self) -> Vec<Role> {
        self.cache.read().roles_by_id.values().cloned().collect()
    }

    pub fn get_player(&self, steam_id: u64) -> Option<PlayerRecord> {
        self.cache.read().players.get(&steam_id).cloned()
    }

    pub fn list_registered_permissions(&self) -> Vec<RegisteredPermission> {
        self.registered
            .read()
            .iter()
            .map(|(name, description)| RegisteredPermission {
                name: name.clone(),
                description: description.clone(),
            })
            .collect()
    }

    /// Effective permission set: direct player grants unioned with every
    /// assigned role's grants, empty if the player record has expired or
    /// doesn't exist.
    pub fn effective_permissions(&self, steam_id: u64, now_unix: i64) -> HashSet<String> {
        let cache = self.cache.read();
        let Some(player) = cache.players.get(&steam_id) else {
            return HashSet::new();
        };
        if player.is_expired(now_unix) {
            return HashSet::new();
        }
        let mut permissions = player.permissions.clone();
        for role_id in &player.roles {
            if let Some(role) = cache.roles_by_id.get(role_id) {
                permissions.extend(role.permissions.iter().cloned());
            }
        }
        permissions
    }

    pub fn has_permission(&self, steam_id: u64, wanted: &str, now_unix: i64) -> bool {
        self.effective_permissions(steam_id, now_unix)
            .iter()
            .any(|held| permission_matches(held, wanted))
    }

    /// `max(player immunity, max immunity across assigned roles)`, 0 if
    /// expired or unknown.
    pub fn effective_immunity(&self, steam_id: u64, now_unix: i64) -> i64 {
        let cache = self.cache.read();
        let Some(player) = cache.players.get(&steam_id) else {
            return 0;
        };
        if player.is_expired(now_unix) {
            return 0;
        }
        let mut immunity = player.immunity;
        for role_id in &player.roles {
            if let Some(role) = cache.roles_by_id.get(role_id) {
                immunity = immunity.max(role.immunity);
            }
        }
        immunity
    }

    /// True iff source holds `*` (root), or
    /// `source.immunity >= target.immunity`.
    pub fn can_target(&self, source: u64, target: u64, now_unix: i64) -> bool {
        if self.has_permission(source, "*", now_unix) {
            return true;
        }
        self.effective_immunity(source, now_unix) >= self.effective_immunity(target, now_unix)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    #[error("permission store is closed")]
    Closed,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Current Unix time in seconds, used for expiry checks. Not subject to
/// the cooperative-tick restriction that applies to timers: permission
/// expiry is wall-clock by definition.
pub fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

static STORE: OnceLock<PermissionStore> = OnceLock::new();

/// Open (or create) the permission database at the configured path
/// (`data/permissions.db` under the resolved base directory) and seed
/// its cache. Idempotent: a second call is a no-op.
pub fn init() -> Result<(), PermissionError> {
    if STORE.get().is_some() {
        return Ok(());
    }
    let path = crate::config::permissions_db_path().map_err(|_| PermissionError::Closed)?;
    let conn = store::open(&path)?;
    let store = PermissionStore::from_connection(conn)?;
    let _ = STORE.set(store);
    Ok(())
}

pub fn shutdown() {
    if let Some(store) = STORE.get() {
        store.shutdown();
    }
}

pub fn store() -> Option<&'static PermissionStore> {
    STORE.get()
}

#[cfg(test)]
pub(crate) fn test_store() -> PermissionStore {
    PermissionStore::from_connection(store::open_in_memory().unwrap()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_role_has_wildcard_permission() {
        let store = test_store();
        let root_role = store.get_role_by_name("root").unwrap();
        store.upsert_player(1, "admin", 0, 0).unwrap();
        store.assign_role(1, root_role.id).unwrap();

        assert!(store.has_permission(1, "gostrike.anything", 0));
        assert!(store.can_target(1, 1, 0));
    }

    #[test]
    fn admin_wildcard_matches_namespaced_but_not_other_namespace() {
        let store = test_store();
        let admin_role = store.get_role_by_name("admin").unwrap();
        store.upsert_player(2, "admin2", 0, 0).unwrap();
        store.assign_role(2, admin_role.id).unwrap();

        assert!(store.has_permission(2, "gostrike.kick", 0));
        assert!(!store.has_permission(2, "example.kick", 0));
    }

    #[test]
    fn expired_player_has_no_effective_permissions() {
        let store = test_store();
        let admin_role = store.get_role_by_name("admin").unwrap();
        store.upsert_player(3, "temp", 0, 100).unwrap();
        store.assign_role(3, admin_role.id).unwrap();

        assert!(store.has_permission(3, "gostrike.kick", 50));
        assert!(!store.has_permission(3, "gostrike.kick", 200));
        assert_eq!(store.effective_immunity(3, 200), 0);
    }

    #[test]
    fn direct_player_permission_and_role_permission_both_count() {
        let store = test_store();
        let vip_role = store.get_role_by_name("vip").unwrap();
        store.upsert_player(4, "vip-player", 0, 0).unwrap();
        store.assign_role(4, vip_role.id).unwrap();
        store.add_player_permission(4, "myplugin.feature").unwrap();

        assert!(store.has_permission(4, "gostrike.reservation", 0));
        assert!(store.has_permission(4, "myplugin.feature", 0));
        assert!(!store.has_permission(4, "gostrike.kick", 0));
    }

    #[test]
    fn can_target_compares_effective_immunity() {
        let store = test_store();
        let moderator = store.get_role_by_name("moderator").unwrap();
        let vip = store.get_role_by_name("vip").unwrap();
        store.upsert_player(10, "mod", 0, 0).unwrap();
        store.assign_role(10, moderator.id).unwrap();
        store.upsert_player(11, "vip", 0, 0).unwrap();
        store.assign_role(11, vip.id).unwrap();

        assert!(store.can_target(10, 11, 0));
        assert!(!store.can_target(11, 10, 0));
        assert!(store.can_target(10, 10, 0));
    }

    #[test]
    fn root_wildcard_can_target_anyone_regardless_of_immunity() {
        let store = test_store();
        let root = store.get_role_by_name("root").unwrap();
        store.upsert_player(20, "root", 0, 0).unwrap();
        store.assign_role(20, root.id).unwrap();
        store.upsert_player(21, "other", 999, 0).unwrap();

        assert!(store.can_target(20, 21, 0));
    }

    #[test]
    fn mutation_after_shutdown_fails_cleanly() {
        let store = test_store();
        store.shutdown();
        let err = store.upsert_player(1, "x", 0, 0).unwrap_err();
        assert!(matches!(err, PermissionError::Closed));
    }

    #[test]
    fn unknown_player_has_no_permissions_and_zero_immunity() {
        let store = test_store();
        assert!(!store.has_permission(999, "gostrike.kick", 0));
        assert_eq!(store.effective_immunity(999, 0), 0);
    }

    #[test]
    fn registered_permissions_are_listable_but_not_persisted_on_rebuild() {
        let store = test_store();
        store.register_permission("myplugin.fly", "Lets a player fly");
        let registered = store.list_registered_permissions();
        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].name, "myplugin.fly");

        // a mutation rebuilds the role/player cache but must not disturb
        // the independently-guarded registered-permission set.
        store.upsert_player(1, "x", 0, 0).unwrap();
        assert_eq!(store.list_registered_permissions().len(), 1);
    }
}
