//! elembase: a base layer for authoring custom elements
//!
//! An element type declares a static definition:
//! an optional template for its shadow root, the methods bound to the instance,
//! and the attributes mirrored as properties.
//! The definition and the mirrored accessors are generated by `#[custom_element]` .
//!
//! ```rust,ignore
//! use elembase::prelude::*;
//! use elembase_mem::MemBackend;
//!
//! #[custom_element(
//!     template = r#"<button as="button">+</button><span as="count"></span>"#,
//!     bound_methods(increase),
//!     mirrored_props(count),
//! )]
//! struct Counter {
//!     base: ElementBase<MemBackend>,
//!     increase: BoundMethod,
//! }
//!
//! impl CustomElement<MemBackend> for Counter {
//!     fn new(base: ElementBase<MemBackend>, binder: &mut Binder<Self>) -> Self {
//!         Self {
//!             base,
//!             // `this` is always the instance, wherever the method is called from
//!             increase: binder.bind("increase", |this: &Self, ()| {
//!                 let n: u32 = this.count().and_then(|x| x.parse().ok()).unwrap_or(0);
//!                 this.set_count(n + 1).unwrap();
//!                 this.broadcast("count-changed", serde_json::json!({ "count": n + 1 })).unwrap();
//!             }),
//!         }
//!     }
//!
//!     fn base(&self) -> &ElementBase<MemBackend> {
//!         &self.base
//!     }
//! }
//!
//! Counter::define("my-counter").unwrap();
//! ```

pub mod backend;
mod bound;
pub mod definition;
mod element;
pub mod error;
pub mod registry;

use std::rc::Rc;

pub use backend::{Backend, Detail};
pub use bound::{Binder, BoundMethod};
pub use definition::{Definition, DefinitionConfig, HasDefinition};
pub use element::{ElementBase, ElementRefs, MirroredProp};
pub use error::Error;
pub use registry::{define, is_valid_custom_element_name, RegisterResult};

/// The types that should usually be imported.
pub mod prelude {
    pub use crate::{
        Backend, Binder, BoundMethod, CustomElement, Detail, ElementBase, HasDefinition,
        RegisterResult,
    };
    pub use elembase_macro::custom_element;
}

/// A custom element type.
///
/// Instances are created by the backend when an element with a registered tag name is created,
/// or explicitly with `construct` .
pub trait CustomElement<B: Backend>: HasDefinition + Sized + 'static {
    /// Create the instance.
    ///
    /// The shadow root is ready in `base` .
    /// Every method declared in `bound_methods` should be bound with the `binder` .
    fn new(base: ElementBase<B>, binder: &mut Binder<Self>) -> Self;

    /// Get the base state.
    fn base(&self) -> &ElementBase<B>;

    /// Called when the instance is fully constructed.
    fn created(_this: &Rc<Self>) -> Result<(), Error> {
        Ok(())
    }

    /// Dispatch a bubbling, composed custom event from the element.
    ///
    /// The detail defaults to an empty object when `None` is given.
    fn broadcast(&self, event_type: &str, detail: impl Into<Option<Detail>>) -> Result<(), Error> {
        self.base().broadcast(event_type, detail)
    }

    /// Register this type under the tag name.
    ///
    /// See `registry::define` .
    fn define(tag_name: &str) -> Result<RegisterResult, Error> {
        registry::define::<B, Self>(tag_name)
    }
}

/// Construct an element instance on the host element.
///
/// The steps run in order: the shadow root setup, the method binding, and the `created` hook.
/// Any failure aborts the construction.
pub fn construct<B: Backend, T: CustomElement<B>>(host: B::Element) -> Result<Rc<T>, Error> {
    let definition = T::definition();
    let base = ElementBase::new(host, definition)?;
    let mut binder = Binder::new(definition);
    let this = Rc::new_cyclic(|weak| {
        binder.this = weak.clone();
        T::new(base, &mut binder)
    });
    binder.finish()?;
    T::created(&this)?;
    Ok(this)
}
