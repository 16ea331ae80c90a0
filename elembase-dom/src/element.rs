use elembase::{
    backend::{BackendElement, BackendShadowRoot, CustomEventInit, ShadowRootMode},
    Error,
};
use wasm_bindgen::JsCast;

use crate::{js_error, DomBackend};

/// An element in the document.
#[derive(Clone, PartialEq, Eq)]
pub struct DomElement {
    elem: web_sys::Element,
}

impl std::fmt::Debug for DomElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.elem.local_name())
    }
}

impl DomElement {
    pub(crate) fn new(elem: web_sys::Element) -> Self {
        Self { elem }
    }

    /// Wrap a DOM element.
    pub fn from_dom_elem(elem: web_sys::Element) -> Self {
        Self::new(elem)
    }

    /// Get the underlying DOM element.
    #[inline]
    pub fn dom_elem(&self) -> &web_sys::Element {
        &self.elem
    }

    /// Append a child element.
    ///
    /// Defined custom elements are upgraded by the browser when they are connected.
    pub fn append_child(&self, child: &DomElement) -> Result<(), Error> {
        self.elem
            .append_child(&child.elem)
            .map(|_| ())
            .map_err(|err| js_error("Cannot append the child", &err))
    }

    /// Get the serialized children.
    #[inline]
    pub fn inner_html(&self) -> String {
        self.elem.inner_html()
    }

    /// Replace the children with the parsed markup.
    #[inline]
    pub fn set_inner_html(&self, markup: &str) {
        self.elem.set_inner_html(markup)
    }

    /// Get the serialized element.
    #[inline]
    pub fn outer_html(&self) -> String {
        self.elem.outer_html()
    }
}

fn shadow_root_init(mode: ShadowRootMode) -> web_sys::ShadowRootInit {
    web_sys::ShadowRootInit::new(match mode {
        ShadowRootMode::Open => web_sys::ShadowRootMode::Open,
        ShadowRootMode::Closed => web_sys::ShadowRootMode::Closed,
    })
}

impl BackendElement for DomElement {
    type BaseBackend = DomBackend;

    fn tag_name(&self) -> String {
        self.elem.local_name()
    }

    fn attach_shadow(&self, mode: ShadowRootMode) -> Result<DomShadowRoot, Error> {
        // closed shadow roots cannot be detected here, so attaching over them fails as a backend error
        if self.elem.shadow_root().is_some() {
            return Err(Error::ShadowRootExists);
        }
        self.elem
            .attach_shadow(&shadow_root_init(mode))
            .map(|sr| DomShadowRoot { sr })
            .map_err(|err| js_error("Cannot attach the shadow root", &err))
    }

    fn shadow_root(&self) -> Option<DomShadowRoot> {
        self.elem.shadow_root().map(|sr| DomShadowRoot { sr })
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.elem.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), Error> {
        self.elem
            .set_attribute(name, value)
            .map_err(|_| Error::InvalidAttributeName(name.to_string()))
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.elem.has_attribute(name)
    }

    fn remove_attribute(&self, name: &str) -> Result<(), Error> {
        self.elem
            .remove_attribute(name)
            .map_err(|err| js_error("Cannot remove the attribute", &err))
    }

    fn dispatch_custom_event(&self, event_type: &str, init: &CustomEventInit) -> Result<(), Error> {
        // the DOM accepts an empty type, but listeners can never match it
        if event_type.is_empty() {
            return Err(Error::InvalidEventType(event_type.to_string()));
        }
        let detail = serde_json::to_string(&init.detail)
            .map_err(|err| Error::BackendError {
                msg: "Cannot serialize the event detail".into(),
                err: Some(Box::new(err)),
            })?;
        let detail = js_sys::JSON::parse(&detail)
            .map_err(|err| js_error("Cannot convert the event detail", &err))?;
        let event_init = web_sys::CustomEventInit::new();
        event_init.set_bubbles(init.bubbles);
        event_init.set_composed(init.composed);
        event_init.set_cancelable(init.cancelable);
        event_init.set_detail(&detail);
        let ev = web_sys::CustomEvent::new_with_event_init_dict(event_type, &event_init)
            .map_err(|err| js_error("Cannot create the event", &err))?;
        self.elem
            .dispatch_event(&ev)
            .map(|_| ())
            .map_err(|err| js_error("Cannot dispatch the event", &err))
    }
}

/// A shadow root in the document.
#[derive(Clone, PartialEq, Eq)]
pub struct DomShadowRoot {
    sr: web_sys::ShadowRoot,
}

impl std::fmt::Debug for DomShadowRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#shadow-root")
    }
}

impl DomShadowRoot {
    /// Get the underlying DOM shadow root.
    #[inline]
    pub fn dom_shadow_root(&self) -> &web_sys::ShadowRoot {
        &self.sr
    }

    /// Get the serialized children.
    #[inline]
    pub fn inner_html(&self) -> String {
        self.sr.inner_html()
    }
}

impl BackendShadowRoot for DomShadowRoot {
    type BaseBackend = DomBackend;

    fn host(&self) -> DomElement {
        DomElement::new(self.sr.host())
    }

    fn set_inner_html(&self, markup: &str) -> Result<(), Error> {
        self.sr.set_inner_html(markup);
        Ok(())
    }

    fn query_attribute_all(&self, attr: &str) -> Result<Vec<DomElement>, Error> {
        let list = self
            .sr
            .query_selector_all(&format!("[{}]", attr))
            .map_err(|err| js_error("Cannot query the shadow root", &err))?;
        let mut ret = Vec::with_capacity(list.length() as usize);
        for i in 0..list.length() {
            if let Some(elem) = list.get(i).and_then(|x| x.dyn_into::<web_sys::Element>().ok()) {
                ret.push(DomElement::new(elem));
            }
        }
        Ok(ret)
    }
}
