//! The per-instance state shared by all custom elements.

use rustc_hash::FxHashMap;
use std::fmt::Display;

use crate::{
    backend::*,
    definition::{Definition, MARKER_ATTRIBUTE},
    error::Error,
};

/// The elements in the shadow root that carry the marker attribute.
///
/// Collected once during construction.
/// Later changes of the shadow tree are not reflected.
pub struct ElementRefs<B: Backend> {
    map: FxHashMap<String, B::Element>,
}

impl<B: Backend> Default for ElementRefs<B> {
    fn default() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }
}

impl<B: Backend> ElementRefs<B> {
    fn collect(shadow_root: &B::ShadowRoot) -> Result<Self, Error> {
        let mut map = FxHashMap::default();
        for elem in shadow_root.query_attribute_all(MARKER_ATTRIBUTE)? {
            if let Some(name) = elem.get_attribute(MARKER_ATTRIBUTE) {
                // later ones in document order win
                map.insert(name, elem);
            }
        }
        Ok(Self { map })
    }

    /// Get the element with the marker name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&B::Element> {
        self.map.get(name)
    }

    /// Whether the marker name exists.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// The count of marked elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether there is no marked element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over the marker names and the elements, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &B::Element)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<B: Backend> std::ops::Index<&str> for ElementRefs<B> {
    type Output = B::Element;

    fn index(&self, name: &str) -> &Self::Output {
        match self.map.get(name) {
            Some(x) => x,
            None => panic!("no element is marked as {:?}", name),
        }
    }
}

/// The base state of a custom element instance.
///
/// It owns the shadow root created from the template and the marked element references.
pub struct ElementBase<B: Backend> {
    host: B::Element,
    shadow_root: Option<B::ShadowRoot>,
    elements: ElementRefs<B>,
    definition: &'static Definition,
}

impl<B: Backend> ElementBase<B> {
    /// Set up the shadow root and collect marked elements.
    ///
    /// Without a template, the element keeps using its light children.
    pub fn new(host: B::Element, definition: &'static Definition) -> Result<Self, Error> {
        let (shadow_root, elements) = match definition.template {
            Some(template) => {
                let shadow_root = host.attach_shadow(ShadowRootMode::Open)?;
                shadow_root.set_inner_html(template)?;
                let elements = ElementRefs::collect(&shadow_root)?;
                (Some(shadow_root), elements)
            }
            None => (None, ElementRefs::default()),
        };
        Ok(Self {
            host,
            shadow_root,
            elements,
            definition,
        })
    }

    /// The host element.
    #[inline]
    pub fn host(&self) -> &B::Element {
        &self.host
    }

    /// The shadow root created from the template.
    #[inline]
    pub fn shadow_root(&self) -> Option<&B::ShadowRoot> {
        self.shadow_root.as_ref()
    }

    /// The marked elements in the shadow root.
    #[inline]
    pub fn elements(&self) -> &ElementRefs<B> {
        &self.elements
    }

    /// The definition this instance is built from.
    #[inline]
    pub fn definition(&self) -> &'static Definition {
        self.definition
    }

    /// Get a mirrored property by name.
    pub fn prop(&self, name: &str) -> Result<MirroredProp<'_, B>, Error> {
        let name = self
            .definition
            .declared_prop(name)
            .ok_or_else(|| Error::PropertyNotMirrored(name.to_string()))?;
        Ok(MirroredProp {
            host: &self.host,
            name,
        })
    }

    /// Read an attribute.
    ///
    /// Used by the generated mirrored-property getters.
    #[inline]
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.host.get_attribute(name)
    }

    /// Write the string form of a value to an attribute.
    ///
    /// Used by the generated mirrored-property setters.
    #[inline]
    pub fn set_attribute(&self, name: &str, value: impl Display) -> Result<(), Error> {
        self.host.set_attribute(name, &value.to_string())
    }

    /// Dispatch a custom event from the host element.
    ///
    /// The event bubbles and crosses shadow root boundaries.
    /// The detail defaults to an empty object when `None` is given.
    /// Listeners are called before this method returns.
    pub fn broadcast(&self, event_type: &str, detail: impl Into<Option<Detail>>) -> Result<(), Error> {
        let init = CustomEventInit {
            bubbles: true,
            composed: true,
            cancelable: false,
            detail: detail.into().unwrap_or_else(empty_detail),
        };
        self.host.dispatch_custom_event(event_type, &init)
    }
}

/// A property forwarded to the attribute with the same name.
///
/// Nothing is cached: every read re-reads the attribute, every write rewrites it.
pub struct MirroredProp<'a, B: Backend> {
    host: &'a B::Element,
    name: &'static str,
}

impl<'a, B: Backend> MirroredProp<'a, B> {
    /// The property name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the current attribute value.
    #[inline]
    pub fn get(&self) -> Option<String> {
        self.host.get_attribute(self.name)
    }

    /// Write the string form of the value.
    #[inline]
    pub fn set(&self, value: impl Display) -> Result<(), Error> {
        self.host.set_attribute(self.name, &value.to_string())
    }
}
