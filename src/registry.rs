//! Shared command and variable registry.
//!
//! The registry is the default [`Host`]: a lock-guarded command table and
//! a string variable store. Names are looked up per evaluation, never at
//! parse time, so commands registered while scripts run (aliases, host
//! hot-plugging) take effect on the next invocation. Evaluation from
//! multiple threads against one registry is safe; the locks are held only
//! for the duration of a lookup or a write.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use crate::host::{Command, Host};

#[derive(Default)]
pub struct Registry {
    commands: RwLock<HashMap<String, Arc<dyn Command>>>,
    variables: RwLock<HashMap<String, String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any previous one of the same name.
    pub fn register(&self, name: &str, command: Arc<dyn Command>) {
        let mut commands = self.commands.write().unwrap();
        if commands.insert(name.to_string(), command).is_some() {
            tracing::debug!(command = %name, "replaced existing command");
        } else {
            tracing::debug!(command = %name, "registered command");
        }
    }

    /// Remove a command. Returns whether it existed.
    pub fn unregister(&self, name: &str) -> bool {
        self.commands.write().unwrap().remove(name).is_some()
    }

    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn set_var(&self, name: &str, value: impl Into<String>) {
        self.variables
            .write()
            .unwrap()
            .insert(name.to_string(), value.into());
    }

    pub fn unset_var(&self, name: &str) -> bool {
        self.variables.write().unwrap().remove(name).is_some()
    }

    pub fn var(&self, name: &str) -> Option<String> {
        self.variables.read().unwrap().get(name).cloned()
    }

    /// Typed read of a variable; `None` if absent or not parseable as `T`.
    pub fn var_as<T: FromStr>(&self, name: &str) -> Option<T> {
        self.var(name)?.parse().ok()
    }
}

impl Host for Registry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.read().unwrap().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Toggle};
    use crate::eval::{Context, Fault, Outcome};

    fn noop() -> Arc<dyn Command> {
        Arc::new(|_: Toggle, _: &Context, _: &[Arc<Expr>]| Ok(Outcome::ok("")))
            as Arc<dyn Command>
    }

    #[test]
    fn register_and_lookup() {
        let registry = Registry::new();
        assert!(registry.lookup("x").is_none());
        registry.register("x", noop());
        assert!(registry.lookup("x").is_some());
        assert!(registry.unregister("x"));
        assert!(registry.lookup("x").is_none());
    }

    #[test]
    fn late_binding_sees_new_registrations() {
        let registry = Arc::new(Registry::new());
        let expr = crate::parser::parse("later").unwrap();
        let context = Context::new(Arc::clone(&registry) as Arc<dyn Host>);

        let out = expr.evaluate(&context);
        assert_eq!(out.status(), crate::eval::STATUS_NOT_FOUND);

        registry.register(
            "later",
            Arc::new(|_: Toggle, _: &Context, _: &[Arc<Expr>]| {
                Ok(Outcome::ok("here now"))
            }) as Arc<dyn Command>,
        );
        let out = expr.evaluate(&context);
        assert_eq!(out.output(), "here now");
    }

    #[test]
    fn variables_and_typed_reads() {
        let registry = Registry::new();
        registry.set_var("n", "42");
        assert_eq!(registry.var("n").as_deref(), Some("42"));
        assert_eq!(registry.var_as::<i64>("n"), Some(42));
        assert_eq!(registry.var_as::<i64>("missing"), None);
        registry.set_var("s", "not a number");
        assert_eq!(registry.var_as::<i64>("s"), None);
        assert!(registry.unset_var("n"));
        assert!(!registry.unset_var("n"));
    }

    #[test]
    fn command_names_are_sorted() {
        let registry = Registry::new();
        registry.register("b", noop());
        registry.register("a", noop());
        assert_eq!(registry.command_names(), vec!["a", "b"]);
    }

    #[allow(dead_code)]
    fn faults_are_sendable(f: Fault) -> Box<dyn std::error::Error + Send + Sync> {
        Box::new(f)
    }
}
