//! Shutdown callbacks, run in reverse registration order

use tracing::{error, info};

/// Callback invoked once at shutdown
pub type UnloaderCallback = Box<dyn FnOnce() -> anyhow::Result<()>>;

pub struct Unloader {
    pub description: String,
    pub callback: UnloaderCallback,
}

/// Append-only registry of shutdown callbacks
#[derive(Default)]
pub struct Unloaders {
    entries: Vec<Unloader>,
}

impl Unloaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, description: impl Into<String>, callback: F)
    where
        F: FnOnce() -> anyhow::Result<()> + 'static,
    {
        self.entries.push(Unloader {
            description: description.into(),
            callback: Box::new(callback),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every callback exactly once, last registered first
    /// A failing callback is logged and doesn't stop the rest
    pub fn run_all(self) {
        for unloader in self.entries.into_iter().rev() {
            info!(unloader = %unloader.description, "Calling unloader");
            if let Err(e) = (unloader.callback)() {
                error!(unloader = %unloader.description, error = %e, "Unloader failed");
            }
        }
    }
}

impl std::fmt::Debug for Unloaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|u| &u.description))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_run_all_reverse_order_with_failure() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut unloaders = Unloaders::new();

        for name in ["A", "B", "C"] {
            let calls = Rc::clone(&calls);
            unloaders.register(format!("unloader {name}"), move || {
                calls.borrow_mut().push(name);
                if name == "B" {
                    anyhow::bail!("B failed");
                }
                Ok(())
            });
        }
        assert_eq!(unloaders.len(), 3);

        unloaders.run_all();
        assert_eq!(*calls.borrow(), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_run_all_empty() {
        let unloaders = Unloaders::new();
        assert!(unloaders.is_empty());
        unloaders.run_all();
    }

    #[test]
    fn test_debug_lists_descriptions() {
        let mut unloaders = Unloaders::new();
        unloaders.register("close db", || Ok(()));
        assert_eq!(format!("{unloaders:?}"), r#"["close db"]"#);
    }
}
