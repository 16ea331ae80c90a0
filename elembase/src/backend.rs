//! The backend-related interface.
//!
//! A backend is the host runtime that custom elements live in.
//! It supplies the element tree, shadow roots, attributes, events and the tag registry.
//! *In most cases, it should not be used in element implementors.*

use std::{any::Any, rc::Rc};

use crate::error::Error;

/// The payload carried by a custom event.
pub type Detail = serde_json::Value;

/// The constructor stored in a backend registry.
///
/// It is invoked by the host whenever an element with the registered tag name is created.
pub type ElementConstructor<B> =
    Rc<dyn Fn(&<B as Backend>::Element) -> Result<Rc<dyn Any>, Error>>;

/// The encapsulation mode of a shadow root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowRootMode {
    /// The shadow root is reachable from the host element.
    Open,
    /// The shadow root is hidden from the host element.
    Closed,
}

/// The options of a dispatched custom event.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomEventInit {
    /// Whether the event propagates to the ancestors.
    pub bubbles: bool,
    /// Whether the event crosses shadow root boundaries.
    pub composed: bool,
    /// Whether the default action can be prevented.
    pub cancelable: bool,
    /// The payload.
    pub detail: Detail,
}

impl Default for CustomEventInit {
    fn default() -> Self {
        Self {
            bubbles: false,
            composed: false,
            cancelable: false,
            detail: empty_detail(),
        }
    }
}

/// An empty structured payload.
#[inline]
pub fn empty_detail() -> Detail {
    Detail::Object(Default::default())
}

/// The interface that a backend should implement.
///
/// The registry is global to the backend, so the registry operations take no receiver.
pub trait Backend: 'static + Sized {
    /// The handle of a host element.
    type Element: BackendElement<BaseBackend = Self>;

    /// The handle of a shadow root.
    type ShadowRoot: BackendShadowRoot<BaseBackend = Self>;

    /// Register a constructor for the tag name.
    ///
    /// Should return `Error::AlreadyDefined` if the tag name has been registered.
    fn define_element(tag_name: &str, constructor: ElementConstructor<Self>) -> Result<(), Error>;

    /// Whether the tag name has been registered.
    fn is_defined(tag_name: &str) -> bool;
}

/// A host element.
pub trait BackendElement: Clone + 'static {
    /// The related backend type.
    type BaseBackend: Backend<Element = Self>;

    /// The tag name in lower case.
    fn tag_name(&self) -> String;

    /// Attach a new shadow root.
    fn attach_shadow(
        &self,
        mode: ShadowRootMode,
    ) -> Result<<Self::BaseBackend as Backend>::ShadowRoot, Error>;

    /// Get the shadow root if it is open.
    fn shadow_root(&self) -> Option<<Self::BaseBackend as Backend>::ShadowRoot>;

    /// Get an attribute value.
    fn get_attribute(&self, name: &str) -> Option<String>;

    /// Set an attribute value.
    fn set_attribute(&self, name: &str, value: &str) -> Result<(), Error>;

    /// Whether the attribute exists.
    fn has_attribute(&self, name: &str) -> bool;

    /// Remove an attribute.
    fn remove_attribute(&self, name: &str) -> Result<(), Error>;

    /// Dispatch a custom event from this element.
    ///
    /// Listeners are called before this method returns.
    fn dispatch_custom_event(&self, event_type: &str, init: &CustomEventInit) -> Result<(), Error>;
}

/// A shadow root attached to a host element.
pub trait BackendShadowRoot: Clone + 'static {
    /// The related backend type.
    type BaseBackend: Backend<ShadowRoot = Self>;

    /// The host element.
    fn host(&self) -> <Self::BaseBackend as Backend>::Element;

    /// Replace the content with the parsed markup.
    fn set_inner_html(&self, markup: &str) -> Result<(), Error>;

    /// Find all descendant elements carrying the attribute, in document order.
    fn query_attribute_all(
        &self,
        attr: &str,
    ) -> Result<Vec<<Self::BaseBackend as Backend>::Element>, Error>;
}
