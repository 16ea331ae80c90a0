//! elembase: a base layer for authoring custom elements
//!
//! This is the *in-memory host* of the framework.
//! It implements the host contract without a browser:
//! shadow roots, markup parsing, attributes, synchronous event dispatch and a tag registry.
//! It is useful for tests and for prerendering elements into HTML with declarative shadow roots.
//!
//! All nodes of a thread live in a thread-local arena, like the elements of a browser window.
//! Handles are cheap `Copy` values.
//!
//! ```rust
//! use elembase::prelude::*;
//! use elembase_mem::{prelude::*, MemBackend};
//!
//! #[custom_element(template = r#"<p as="greeting">Hello</p>"#, mirrored_props(name))]
//! struct HelloWorld {
//!     base: ElementBase<MemBackend>,
//! }
//!
//! impl CustomElement<MemBackend> for HelloWorld {
//!     fn new(base: ElementBase<MemBackend>, _: &mut Binder<Self>) -> Self {
//!         Self { base }
//!     }
//!
//!     fn base(&self) -> &ElementBase<MemBackend> {
//!         &self.base
//!     }
//! }
//!
//! HelloWorld::define("hello-world").unwrap();
//! let elem = MemBackend::create_element("hello-world").unwrap();
//! let hello = elem.instance::<HelloWorld>().unwrap();
//! hello.set_name("world").unwrap();
//! assert_eq!(
//!     elem.to_prerendered_html(),
//!     r#"<hello-world name="world"><template shadowrootmode="open"><p as="greeting">Hello</p></template></hello-world>"#,
//! );
//! ```

#![warn(missing_docs)]

use elembase::{
    backend::{Backend, ElementConstructor},
    Error,
};

mod dom;
pub mod event;
mod node;
mod parser;
mod registry;
mod serialize;

pub use event::{EventPhase, ListenerHandle, MemEvent};
pub use node::{MemElement, MemNode, MemNodeKind, MemShadowRoot};

/// The types that should usually be imported.
pub mod prelude {
    pub use crate::{MemBackend, MemElement, MemEvent, MemNode, MemShadowRoot};
    pub use elembase::backend::{BackendElement, BackendShadowRoot};
}

/// The in-memory backend.
pub struct MemBackend {
    _private: (),
}

impl MemBackend {
    /// The document node.
    pub fn document() -> MemNode {
        MemNode(dom::DOCUMENT)
    }

    /// The `<body>` element of the document.
    pub fn body() -> MemElement {
        MemElement(MemNode(dom::BODY))
    }

    /// Create a detached element.
    ///
    /// If the tag name is defined, the element instance is constructed before this returns,
    /// and construction failures are returned.
    pub fn create_element(tag_name: &str) -> Result<MemElement, Error> {
        let valid = tag_name.chars().next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false)
            && tag_name
                .chars()
                .all(|c| !c.is_whitespace() && !matches!(c, '<' | '>' | '/' | '"' | '\'' | '='));
        if !valid {
            return Err(Error::InvalidTagName(tag_name.to_string()));
        }
        let id = dom::with_dom_mut(|dom| dom.create_element(tag_name));
        let elem = MemElement(MemNode(id));
        registry::upgrade(elem)?;
        Ok(elem)
    }
}

impl Backend for MemBackend {
    type Element = MemElement;
    type ShadowRoot = MemShadowRoot;

    fn define_element(tag_name: &str, constructor: ElementConstructor<Self>) -> Result<(), Error> {
        registry::define(tag_name, constructor)
    }

    fn is_defined(tag_name: &str) -> bool {
        registry::is_defined(tag_name)
    }
}
