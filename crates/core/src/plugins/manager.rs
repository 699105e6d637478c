//! Plugin lifecycle: dependency-ordered load/unload with panic isolation
//! and per-plugin resource scoping.

use std::collections::{HashMap, HashSet, VecDeque};

use parking_lot::{Mutex, RwLock};

use crate::panic::catch;

use super::scope::SCOPE;

/// Where in the boot sequence a plugin loads relative to its peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadOrderClass {
    Early,
    Normal,
    Late,
}

/// A loadable unit of user code. Implementors self-register via
/// [`register`], typically from a `#[plugin]`-generated `ctor` function.
pub trait Plugin: Send + Sync {
    /// Unique, lower-snake-case identity. Used for HTTP/DB/config
    /// namespacing and as the dependency graph's node key.
    fn slug(&self) -> &str;
    fn name(&self) -> &str {
        self.slug()
    }
    fn version(&self) -> &str {
        "0.0.0"
    }
    fn author(&self) -> &str {
        ""
    }
    fn description(&self) -> &str {
        ""
    }
    fn load_order(&self) -> LoadOrderClass {
        LoadOrderClass::Normal
    }
    fn required_dependencies(&self) -> Vec<String> {
        Vec::new()
    }
    fn optional_dependencies(&self) -> Vec<String> {
        Vec::new()
    }
    fn load(&self, hot_reload: bool) -> Result<(), String>;
    fn unload(&self, hot_reload: bool) -> Result<(), String> {
        let _ = hot_reload;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginState {
    Registered,
    Loading,
    Loaded,
    Failed(String),
    Unloading,
    Unloaded,
}

struct Entry {
    plugin: Box<dyn Plugin>,
    state: PluginState,
}

/// Plugins that have self-registered but not yet been through `Init`.
static PENDING: Mutex<Vec<Box<dyn Plugin>>> = Mutex::new(Vec::new());

/// Register a plugin for the next `init()` call. Safe to call from a
/// `ctor` constructor, before `main` runs.
pub fn register(plugin: Box<dyn Plugin>) {
    PENDING.lock().push(plugin);
}

#[derive(Default)]
pub struct PluginManager {
    entries: RwLock<HashMap<String, Entry>>,
    load_order: RwLock<Vec<String>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, slug: &str) -> Option<PluginState> {
        self.entries.read().get(slug).map(|e| e.state.clone())
    }

    pub fn load_order(&self) -> Vec<String> {
        self.load_order.read().clone()
    }

    /// Collect every plugin registered via [`register`] since the last
    /// `init`, partition by load-order class, topologically sort each
    /// class's dependency graph, and load plugins in the resulting
    /// order, each under its own [`SCOPE`] installation and panic guard.
    pub fn init(&self) {
        let pending = std::mem::take(&mut *PENDING.lock());
        {
            let mut entries = self.entries.write();
            for plugin in pending {
                let slug = plugin.slug().to_string();
                entries.insert(slug, Entry { plugin, state: PluginState::Registered });
            }
        }

        let mut known_loaded: HashSet<String> = HashSet::new();
        let mut order = Vec::new();

        for class in [LoadOrderClass::Early, LoadOrderClass::Normal, LoadOrderClass::Late] {
            let class_slugs: Vec<String> = {
                let entries = self.entries.read();
                let mut slugs: Vec<String> = entries
                    .iter()
                    .filter(|(_, e)| e.plugin.load_order() == class && e.state == PluginState::Registered)
                    .map(|(slug, _)| slug.clone())
                    .collect();
                slugs.sort();
                slugs
            };
            let class_set: HashSet<String> = class_slugs.iter().cloned().collect();

            let mut eligible: HashSet<String> = HashSet::new();
            let mut required_edges: HashMap<String, Vec<String>> = HashMap::new();

            for slug in &class_slugs {
                let (required, optional) = {
                    let entries = self.entries.read();
                    let entry = &entries[slug];
                    (entry.plugin.required_dependencies(), entry.plugin.optional_dependencies())
                };
                let mut missing_required = None;
                for dep in &required {
                    if !known_loaded.contains(dep) && !class_set.contains(dep) {
                        missing_required = Some(dep.clone());
                        break;
                    }
                }
                if let Some(dep) = missing_required {
                    self.entries.write().get_mut(slug).unwrap().state =
                        PluginState::Failed(format!("missing required dependency {dep:?}"));
                    continue;
                }
                eligible.insert(slug.clone());
                let mut edges = Vec::new();
                for dep in required.iter().chain(optional.iter()) {
                    if class_set.contains(dep) {
                        edges.push(dep.clone());
                    }
                }
                required_edges.insert(slug.clone(), edges);
            }

            let sorted = topo_sort(&eligible, &required_edges);
            for slug in &eligible {
                if !sorted.contains(slug) {
                    self.entries.write().get_mut(slug).unwrap().state =
                        PluginState::Failed("dependency cycle".to_string());
                }
            }

            for slug in sorted {
                self.load_one(&slug, false);
                if matches!(self.state_of(&slug), Some(PluginState::Loaded)) {
                    known_loaded.insert(slug.clone());
                }
                order.push(slug);
            }
        }

        *self.load_order.write() = order;
    }

    fn load_one(&self, slug: &str, hot_reload: bool) {
        self.entries.write().get_mut(slug).unwrap().state = PluginState::Loading;
        SCOPE.enter(slug);
        let result = {
            let entries = self.entries.read();
            catch(|| entries[slug].plugin.load(hot_reload))
        };
        SCOPE.exit();

        let new_state = match result {
            Some(Ok(())) => PluginState::Loaded,
            Some(Err(message)) => {
                self.best_effort_unload(slug, hot_reload);
                PluginState::Failed(message)
            }
            None => {
                self.best_effort_unload(slug, hot_reload);
                PluginState::Failed("plugin panicked during Load".to_string())
            }
        };
        self.entries.write().get_mut(slug).unwrap().state = new_state;
    }

    /// Called when `Load` fails or panics: give the plugin a best-effort
    /// chance to clean up whatever it already set up, then drain its
    /// scope regardless of what that call does.
    fn best_effort_unload(&self, slug: &str, hot_reload: bool) {
        let _ = {
            let entries = self.entries.read();
            catch(|| entries[slug].plugin.unload(hot_reload))
        };
        drain_scope(slug);
    }

    fn unload_one(&self, slug: &str, hot_reload: bool) {
        self.entries.write().get_mut(slug).unwrap().state = PluginState::Unloading;
        let result = {
            let entries = self.entries.read();
            catch(|| entries[slug].plugin.unload(hot_reload))
        };
        drain_scope(slug);
        let new_state = match result {
            Some(Ok(())) => PluginState::Unloaded,
            _ => PluginState::Unloaded,
        };
        self.entries.write().get_mut(slug).unwrap().state = new_state;
    }

    /// Reverse load order, `Unload(false)` under a panic guard, scope
    /// drained regardless of the return.
    pub fn shutdown(&self) {
        let order = self.load_order.read().clone();
        for slug in order.iter().rev() {
            if matches!(self.state_of(slug), Some(PluginState::Loaded)) {
                self.unload_one(slug, false);
            }
        }
    }

    /// `Unload(true)` with scope drain, then `Load(true)` with a fresh
    /// scope. On failure the plugin is left `Unloaded` with the error
    /// recorded.
    pub fn reload(&self, slug: &str) -> Result<(), String> {
        if !self.entries.read().contains_key(slug) {
            return Err(format!("unknown plugin {slug:?}"));
        }
        self.unload_one(slug, true);
        self.load_one(slug, true);
        match self.state_of(slug) {
            Some(PluginState::Loaded) => Ok(()),
            Some(PluginState::Failed(message)) => Err(message),
            _ => Err("reload did not reach a terminal state".to_string()),
        }
    }
}

fn drain_scope(slug: &str) {
    use super::scope::ScopedHandle;
    for handle in SCOPE.drain(slug) {
        match handle {
            ScopedHandle::Event(id) => {
                crate::events::EVENTS.unregister(id);
            }
            ScopedHandle::Timer(id) => {
                crate::timers::remove_timer(id);
            }
            ScopedHandle::ChatCommand(name) => {
                crate::commands::COMMANDS.unregister_by_name(&name);
            }
            ScopedHandle::ConsoleCommand(name) => {
                crate::commands::CONSOLE_COMMANDS.unregister_by_name(&name);
            }
            ScopedHandle::Permission(name) => {
                if let Some(store) = crate::permissions::store() {
                    store.unregister_permission(&name);
                }
            }
            // No standalone IPC subsystem is specified; nothing to drain.
            ScopedHandle::IpcSubscription(_) => {}
            ScopedHandle::Service(_) => {}
        }
    }
}

/// Kahn's algorithm over `eligible` with `edges[slug]` = the slugs that
/// must come before `slug`. Deterministic (sorted) tie-breaking among
/// simultaneously-ready nodes. Returns only the nodes that could be
/// fully ordered; anything left out participates in a cycle.
fn topo_sort(eligible: &HashSet<String>, edges: &HashMap<String, Vec<String>>) -> Vec<String> {
    let mut in_degree: HashMap<&str, usize> = eligible.iter().map(|s| (s.as_str(), 0)).collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for slug in eligible {
        for dep in edges.get(slug).into_iter().flatten() {
            if eligible.contains(dep) {
                *in_degree.get_mut(slug.as_str()).unwrap() += 1;
                dependents.entry(dep.as_str()).or_default().push(slug.as_str());
            }
        }
    }

    let mut ready: Vec<&str> = in_degree.iter().filter(|(_, &d)| d == 0).map(|(s, _)| *s).collect();
    ready.sort();
    let mut queue: VecDeque<&str> = ready.into_iter().collect();

    let mut order = Vec::new();
    while let Some(slug) = queue.pop_front() {
        order.push(slug.to_string());
        if let Some(deps) = dependents.get(slug) {
            let mut newly_ready = Vec::new();
            for dependent in deps {
                let degree = in_degree.get_mut(dependent).unwrap();
                *degree -= 1;
                if *degree == 0 {
                    newly_ready.push(*dependent);
                }
            }
            newly_ready.sort();
            for slug in newly_ready {
                queue.push_back(slug);
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct FakePlugin {
        slug: &'static str,
        required: Vec<&'static str>,
        class: LoadOrderClass,
        loaded: Arc<AtomicBool>,
        fail: bool,
    }

    impl Plugin for FakePlugin {
        fn slug(&self) -> &str {
            self.slug
        }
        fn load_order(&self) -> LoadOrderClass {
            self.class
        }
        fn required_dependencies(&self) -> Vec<String> {
            self.required.iter().map(|s| s.to_string()).collect()
        }
        fn load(&self, _hot_reload: bool) -> Result<(), String> {
            if self.fail {
                return Err("boom".to_string());
            }
            self.loaded.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn plugin(slug: &'static str, required: Vec<&'static str>) -> (Box<dyn Plugin>, Arc<AtomicBool>) {
        let loaded = Arc::new(AtomicBool::new(false));
        (
            Box::new(FakePlugin {
                slug,
                required,
                class: LoadOrderClass::Normal,
                loaded: loaded.clone(),
                fail: false,
            }),
            loaded,
        )
    }

    #[test]
    fn p6_required_dependency_loads_before_dependent() {
        let manager = PluginManager::new();
        let (base, base_loaded) = plugin("base", vec![]);
        let (dependent, dependent_loaded) = plugin("dependent", vec!["base"]);
        manager.entries.write().insert("base".into(), Entry { plugin: base, state: PluginState::Registered });
        manager.entries.write().insert("dependent".into(), Entry { plugin: dependent, state: PluginState::Registered });
        manager.init();

        let order = manager.load_order();
        assert!(order.iter().position(|s| s == "base") < order.iter().position(|s| s == "dependent"));
        assert!(base_loaded.load(Ordering::SeqCst));
        assert!(dependent_loaded.load(Ordering::SeqCst));
    }

    #[test]
    fn missing_required_dependency_fails_the_dependent() {
        let manager = PluginManager::new();
        let (dependent, _) = plugin("dependent", vec!["absent"]);
        manager.entries.write().insert("dependent".into(), Entry { plugin: dependent, state: PluginState::Registered });
        manager.init();

        assert!(matches!(manager.state_of("dependent"), Some(PluginState::Failed(_))));
    }

    #[test]
    fn dependency_cycle_fails_every_member() {
        let manager = PluginManager::new();
        let (a, _) = plugin("a", vec!["b"]);
        let (b, _) = plugin("b", vec!["a"]);
        manager.entries.write().insert("a".into(), Entry { plugin: a, state: PluginState::Registered });
        manager.entries.write().insert("b".into(), Entry { plugin: b, state: PluginState::Registered });
        manager.init();

        assert!(matches!(manager.state_of("a"), Some(PluginState::Failed(_))));
        assert!(matches!(manager.state_of("b"), Some(PluginState::Failed(_))));
    }

    #[test]
    fn panicking_load_marks_plugin_failed_and_drains_scope() {
        let manager = PluginManager::new();
        let loaded = Arc::new(AtomicBool::new(false));
        let plugin: Box<dyn Plugin> = Box::new(FakePlugin {
            slug: "panicky",
            required: vec![],
            class: LoadOrderClass::Normal,
            loaded,
            fail: true,
        });
        manager.entries.write().insert("panicky".into(), Entry { plugin, state: PluginState::Registered });
        manager.init();

        assert!(matches!(manager.state_of("panicky"), Some(PluginState::Failed(_))));
    }

    #[test]
    fn early_class_loads_before_normal_class() {
        let manager = PluginManager::new();
        let (normal, _) = plugin("normal-plugin", vec![]);
        let early_loaded = Arc::new(AtomicBool::new(false));
        let early: Box<dyn Plugin> = Box::new(FakePlugin {
            slug: "early-plugin",
            required: vec![],
            class: LoadOrderClass::Early,
            loaded: early_loaded,
            fail: false,
        });
        manager.entries.write().insert("normal-plugin".into(), Entry { plugin: normal, state: PluginState::Registered });
        manager.entries.write().insert("early-plugin".into(), Entry { plugin: early, state: PluginState::Registered });
        manager.init();

        let order = manager.load_order();
        assert!(order.iter().position(|s| s == "early-plugin") < order.iter().position(|s| s == "normal-plugin"));
    }
}
