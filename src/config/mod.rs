//! Configuration contract and persistence
//!
//! This module provides:
//! - **codec**: JSON encoding/decoding of a live configuration value
//! - **store**: lock-guarded load/save with first-run bootstrap

pub mod codec;
pub mod store;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use store::ConfigOrigin;

/// Capabilities every application configuration must provide
///
/// The value is serialized as a JSON document with exactly the fields of the
/// implementing type. Fields skipped by serde are reset to their `Default`
/// on every load; recompute them in [`Resolve::resolve`].
pub trait Config: Serialize + DeserializeOwned {
    /// True only for the run that generated the config file
    fn first_run(&self) -> bool;

    fn set_first_run(&mut self, first_run: bool);

    /// Fill every field left unset with its documented default
    /// Called before each save
    fn set_defaults(&mut self);

    /// Opt-in post-load hook
    ///
    /// Return `Some(self)` to have [`Resolve::resolve`] called once after the
    /// config file has been loaded at startup.
    fn resolver(&mut self) -> Option<&mut dyn Resolve> {
        None
    }
}

/// Post-load hook for configs that derive runtime values from loaded fields
pub trait Resolve {
    fn resolve(&mut self);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    /// Config used across module tests
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TestConfig {
        #[serde(default)]
        pub first_run: bool,
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub port: u16,
        #[serde(default)]
        pub tags: Vec<String>,
        #[serde(default)]
        pub limits: BTreeMap<String, u32>,
        #[serde(default)]
        pub nested: Nested,
        #[serde(skip)]
        pub resolved: bool,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Nested {
        #[serde(default)]
        pub enabled: bool,
        #[serde(default)]
        pub level: u8,
    }

    pub const DEFAULT_NAME: &str = "unnamed";
    pub const DEFAULT_PORT: u16 = 8080;

    impl Config for TestConfig {
        fn first_run(&self) -> bool {
            self.first_run
        }

        fn set_first_run(&mut self, first_run: bool) {
            self.first_run = first_run;
        }

        fn set_defaults(&mut self) {
            if self.name.is_empty() {
                self.name = DEFAULT_NAME.to_string();
            }
            if self.port == 0 {
                self.port = DEFAULT_PORT;
            }
        }

        fn resolver(&mut self) -> Option<&mut dyn Resolve> {
            Some(self)
        }
    }

    impl Resolve for TestConfig {
        fn resolve(&mut self) {
            self.resolved = true;
        }
    }
}
