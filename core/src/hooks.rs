//! Lifecycle hooks.
//!
//! A [`Hook`] observes a [`Cli`](crate::Cli) at fixed points: registration,
//! before the argument vector is parsed, and around the command handler.
//! Hooks see everything but change nothing; every method has an empty
//! default.

use std::fmt;

use tracing::debug;

use crate::context::ExecutionContext;
use crate::types::CliConfig;

/// Observer of the CLI lifecycle.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use clidef_core::*;
///
/// struct Recorder(Arc<Mutex<Vec<String>>>);
///
/// impl Hook for Recorder {
///     fn name(&self) -> &str {
///         "recorder"
///     }
///
///     fn before_run(&self, ctx: &ExecutionContext) {
///         self.0.lock().unwrap().push(ctx.command.display_path());
///     }
/// }
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let config = CliConfig::new("tool")
///     .with_command("build", CommandDef::new().with_handler(|_| Ok(None)));
/// let mut cli = Cli::new(config).unwrap();
/// cli.register_hook(Recorder(Arc::clone(&seen)));
///
/// assert_eq!(cli.run(&["build"]), 0);
/// assert_eq!(*seen.lock().unwrap(), vec!["build"]);
/// ```
pub trait Hook: Send + Sync {
    fn name(&self) -> &str;

    /// Called once when the hook is registered.
    fn on_register(&self, _config: &CliConfig) {}

    /// Called with the raw argument vector before any parsing.
    fn on_parse(&self, _argv: &[String]) {}

    fn before_run(&self, _ctx: &ExecutionContext) {}

    /// Called after a handler returned successfully, with its output.
    fn after_run(&self, _ctx: &ExecutionContext, _output: Option<&str>) {}
}

/// Registered hooks, fired in registration order.
#[derive(Default)]
pub struct HookManager {
    hooks: Vec<Box<dyn Hook>>,
}

impl HookManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hook and fires its `on_register`.
    pub fn register(&mut self, hook: Box<dyn Hook>, config: &CliConfig) {
        debug!(hook = hook.name(), "registering hook");
        hook.on_register(config);
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    pub fn emit_parse(&self, argv: &[String]) {
        for hook in &self.hooks {
            hook.on_parse(argv);
        }
    }

    pub fn emit_before_run(&self, ctx: &ExecutionContext) {
        for hook in &self.hooks {
            hook.before_run(ctx);
        }
    }

    pub fn emit_after_run(&self, ctx: &ExecutionContext, output: Option<&str>) {
        for hook in &self.hooks {
            hook.after_run(ctx, output);
        }
    }
}

impl fmt::Debug for HookManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Named {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Hook for Named {
        fn name(&self) -> &str {
            self.name
        }

        fn on_register(&self, config: &CliConfig) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:register:{}", self.name, config.name));
        }

        fn on_parse(&self, argv: &[String]) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:parse:{}", self.name, argv.join(" ")));
        }
    }

    #[test]
    fn test_hooks_fire_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let config = CliConfig::new("tool");
        let mut manager = HookManager::new();
        manager.register(
            Box::new(Named {
                name: "a",
                log: Arc::clone(&log),
            }),
            &config,
        );
        manager.register(
            Box::new(Named {
                name: "b",
                log: Arc::clone(&log),
            }),
            &config,
        );
        manager.emit_parse(&["build".to_string(), "-v".to_string()]);

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.names(), vec!["a", "b"]);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "a:register:tool",
                "b:register:tool",
                "a:parse:build -v",
                "b:parse:build -v",
            ]
        );
    }

    #[test]
    fn test_debug_lists_names() {
        let mut manager = HookManager::new();
        assert!(manager.is_empty());
        manager.register(
            Box::new(Named {
                name: "audit",
                log: Arc::new(Mutex::new(Vec::new())),
            }),
            &CliConfig::new("tool"),
        );
        assert_eq!(format!("{manager:?}"), r#"["audit"]"#);
    }
}
