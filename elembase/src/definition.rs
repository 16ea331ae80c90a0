//! The static definition of an element type.
//!
//! A definition is usually generated by `#[custom_element]` ,
//! but it can also be written by hand or loaded from TOML:
//!
//! ```rust
//! use elembase::{Definition, DefinitionConfig};
//!
//! static HAND_WRITTEN: Definition = Definition {
//!     template: Some(r#"<span as="label"></span>"#),
//!     bound_methods: &["toggle"],
//!     mirrored_props: &["label"],
//! };
//!
//! let loaded = DefinitionConfig::from_toml_str(r#"
//!     template = '<span as="label"></span>'
//!     bound_methods = ["toggle"]
//!     mirrored_props = ["label"]
//! "#).unwrap().leak();
//! assert_eq!(loaded, &HAND_WRITTEN);
//! ```

use serde::Deserialize;

use crate::error::Error;

/// The marker attribute collected into `ElementRefs` .
pub const MARKER_ATTRIBUTE: &str = "as";

/// The declarative metadata of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Definition {
    /// The markup used to populate the shadow root.
    ///
    /// No shadow root is attached if this is `None` .
    pub template: Option<&'static str>,
    /// The methods that must be bound to the instance during construction.
    pub bound_methods: &'static [&'static str],
    /// The attributes mirrored as properties.
    pub mirrored_props: &'static [&'static str],
}

impl Definition {
    /// An empty definition: no template, no bound methods, no mirrored properties.
    pub const EMPTY: Self = Self {
        template: None,
        bound_methods: &[],
        mirrored_props: &[],
    };

    /// The declared method name equal to `name` .
    pub fn declared_method(&self, name: &str) -> Option<&'static str> {
        self.bound_methods.iter().copied().find(|x| *x == name)
    }

    /// The declared property name equal to `name` .
    pub fn declared_prop(&self, name: &str) -> Option<&'static str> {
        self.mirrored_props.iter().copied().find(|x| *x == name)
    }
}

/// A type that carries a static definition.
///
/// Implemented by `#[custom_element]` .
pub trait HasDefinition {
    /// Get the definition.
    fn definition() -> &'static Definition;
}

/// An owned definition read from a config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionConfig {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub bound_methods: Vec<String>,
    #[serde(default)]
    pub mirrored_props: Vec<String>,
}

impl DefinitionConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let ret: Self = toml::from_str(s).map_err(|err| Error::ConfigError(err.to_string()))?;
        for name in ret.bound_methods.iter().chain(ret.mirrored_props.iter()) {
            if name.is_empty() {
                return Err(Error::ConfigError("empty name in definition".into()));
            }
        }
        Ok(ret)
    }

    /// Leak the config into a static definition.
    ///
    /// Should be called once per element type, since the memory is never freed.
    pub fn leak(self) -> &'static Definition {
        fn leak_list(list: Vec<String>) -> &'static [&'static str] {
            let list: Vec<&'static str> = list
                .into_iter()
                .map(|s| &*Box::leak(s.into_boxed_str()))
                .collect();
            Box::leak(list.into_boxed_slice())
        }
        let def = Definition {
            template: self.template.map(|s| &*Box::leak(s.into_boxed_str())),
            bound_methods: leak_list(self.bound_methods),
            mirrored_props: leak_list(self.mirrored_props),
        };
        Box::leak(Box::new(def))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use once_cell::sync::Lazy;

    static LOADED: Lazy<&'static Definition> = Lazy::new(|| {
        DefinitionConfig::from_toml_str(
            r#"
                template = '<b as="title"></b>'
                mirrored_props = ["title", "open"]
            "#,
        )
        .unwrap()
        .leak()
    });

    #[test]
    fn toml_definition() {
        assert_eq!(LOADED.template, Some(r#"<b as="title"></b>"#));
        assert!(LOADED.bound_methods.is_empty());
        assert_eq!(LOADED.declared_prop("open"), Some("open"));
        assert_eq!(LOADED.declared_prop("closed"), None);
        assert_eq!(LOADED.declared_method("open"), None);
    }

    #[test]
    fn declared_names() {
        const DEF: Definition = Definition {
            template: None,
            bound_methods: &["run", "stop"],
            mirrored_props: &["data-state"],
        };
        let name = String::from("stop");
        let declared: &'static str = DEF.declared_method(&name).unwrap();
        assert_eq!(declared, "stop");
        assert_eq!(DEF.declared_method("data-state"), None);
        assert_eq!(DEF.declared_prop("data-state"), Some("data-state"));
        assert_eq!(DEF.declared_prop("data_state"), None);
    }

    #[test]
    fn empty_toml_definition() {
        let def = DefinitionConfig::from_toml_str("").unwrap().leak();
        assert_eq!(def, &Definition::EMPTY);
    }

    #[test]
    fn illegal_toml_definition() {
        assert!(matches!(
            DefinitionConfig::from_toml_str("templates = 'x'"),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            DefinitionConfig::from_toml_str("bound_methods = ['']"),
            Err(Error::ConfigError(_))
        ));
    }
}
