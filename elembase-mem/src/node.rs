use std::{ops::Deref, rc::Rc};

use elembase::{backend::*, Error};

use crate::{
    dom::{with_dom, with_dom_mut, CustomState, NodeId, NodeKind},
    event::{self, ListenerHandle, MemEvent},
    parser, registry, serialize, MemBackend,
};

/// The kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MemNodeKind {
    Document,
    Element,
    Text,
    Comment,
    ShadowRoot,
}

/// A node in the in-memory host.
///
/// It is a cheap handle: the node itself lives as long as the thread.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemNode(pub(crate) NodeId);

impl std::fmt::Debug for MemNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        with_dom(|dom| match &dom.node(self.0).kind {
            NodeKind::Document => write!(f, "#document"),
            NodeKind::Element(x) => write!(f, "<{}>", x.tag_name),
            NodeKind::Text(x) => write!(f, "{:?}", x),
            NodeKind::Comment(x) => write!(f, "<!--{}-->", x),
            NodeKind::ShadowRoot { .. } => write!(f, "#shadow-root"),
        })
    }
}

impl MemNode {
    /// Create a detached text node.
    pub fn new_text(content: &str) -> Self {
        Self(with_dom_mut(|dom| {
            dom.create_node(NodeKind::Text(content.to_string()))
        }))
    }

    /// The kind of the node.
    pub fn kind(&self) -> MemNodeKind {
        with_dom(|dom| match &dom.node(self.0).kind {
            NodeKind::Document => MemNodeKind::Document,
            NodeKind::Element(_) => MemNodeKind::Element,
            NodeKind::Text(_) => MemNodeKind::Text,
            NodeKind::Comment(_) => MemNodeKind::Comment,
            NodeKind::ShadowRoot { .. } => MemNodeKind::ShadowRoot,
        })
    }

    /// Cast to an element.
    pub fn as_element(&self) -> Option<MemElement> {
        match self.kind() {
            MemNodeKind::Element => Some(MemElement(*self)),
            _ => None,
        }
    }

    /// Cast to a shadow root.
    pub fn as_shadow_root(&self) -> Option<MemShadowRoot> {
        match self.kind() {
            MemNodeKind::ShadowRoot => Some(MemShadowRoot(*self)),
            _ => None,
        }
    }

    /// The parent node.
    ///
    /// A shadow root has no parent.
    pub fn parent(&self) -> Option<MemNode> {
        with_dom(|dom| dom.node(self.0).parent.map(MemNode))
    }

    /// The child nodes.
    pub fn children(&self) -> Vec<MemNode> {
        with_dom(|dom| dom.node(self.0).children.iter().map(|x| MemNode(*x)).collect())
    }

    /// The child elements.
    pub fn child_elements(&self) -> Vec<MemElement> {
        self.children()
            .into_iter()
            .filter_map(|x| x.as_element())
            .collect()
    }

    /// Whether the node is in the document, including through shadow hosts.
    pub fn is_connected(&self) -> bool {
        with_dom(|dom| dom.is_connected(self.0))
    }

    /// The concatenated text of the descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut ret = String::new();
        with_dom(|dom| dom.text_content(self.0, &mut ret));
        ret
    }

    /// Replace the children with a single text node.
    pub fn set_text_content(&self, content: &str) -> Result<(), Error> {
        let text = MemNode::new_text(content);
        with_dom_mut(|dom| dom.clear_children(self.0));
        self.append_child(text)
    }

    /// Append a child node.
    ///
    /// The child is removed from its previous parent first.
    /// Undefined custom elements connected by this operation are upgraded.
    pub fn append_child(&self, child: impl Into<MemNode>) -> Result<(), Error> {
        let child = child.into();
        let connected = with_dom_mut(|dom| {
            match dom.node(child.0).kind {
                NodeKind::Document | NodeKind::ShadowRoot { .. } => {
                    return Err(Error::backend("HierarchyRequestError: the node cannot be a child"));
                }
                _ => {}
            }
            match dom.node(self.0).kind {
                NodeKind::Text(_) | NodeKind::Comment(_) => {
                    return Err(Error::backend("HierarchyRequestError: the node cannot have children"));
                }
                _ => {}
            }
            if dom.is_host_including_inclusive_ancestor(child.0, self.0) {
                return Err(Error::backend("HierarchyRequestError: the node is an ancestor of the parent"));
            }
            dom.append(self.0, child.0);
            Ok(dom.is_connected(self.0))
        })?;
        if connected {
            registry::upgrade_connected(child.0);
        }
        Ok(())
    }

    /// Remove a child node.
    pub fn remove_child(&self, child: impl Into<MemNode>) -> Result<(), Error> {
        let child = child.into();
        with_dom_mut(|dom| {
            if dom.node(child.0).parent != Some(self.0) {
                return Err(Error::backend("NotFoundError: the node is not a child"));
            }
            dom.detach(child.0);
            Ok(())
        })
    }

    /// Serialize the children.
    pub fn inner_html(&self) -> String {
        serialize::inner_html(self.0, false)
    }

    /// Replace the children with the parsed markup.
    ///
    /// Custom elements in the markup are constructed if their tag names are defined.
    /// A construction failure does not stop the others:
    /// the markup is kept, and the first failure is returned after all elements are tried.
    pub fn set_inner_html(&self, markup: &str) -> Result<(), Error> {
        let created = with_dom_mut(|dom| {
            match dom.node(self.0).kind {
                NodeKind::Text(_) | NodeKind::Comment(_) => {
                    return Err(Error::backend("HierarchyRequestError: the node cannot have children"));
                }
                _ => {}
            }
            dom.clear_children(self.0);
            Ok(parser::parse_into(dom, self.0, markup))
        })?;
        let mut ret = Ok(());
        for id in created {
            if let Err(err) = registry::upgrade(MemElement(MemNode(id))) {
                if ret.is_ok() {
                    ret = Err(err);
                } else {
                    log::error!("Failed to upgrade {:?}: {}", MemNode(id), err);
                }
            }
        }
        ret
    }

    /// Find the descendant elements carrying the attribute, in tree order.
    ///
    /// Shadow roots of the descendants are not entered.
    pub fn query_attribute_all(&self, attr: &str) -> Vec<MemElement> {
        let attr = attr.to_ascii_lowercase();
        self.query_all(|elem| elem.attrs.iter().any(|(n, _)| *n == attr))
    }

    /// Find the descendant elements with the tag name, in tree order.
    pub fn elements_by_tag_name(&self, tag_name: &str) -> Vec<MemElement> {
        let tag_name = tag_name.to_ascii_lowercase();
        self.query_all(|elem| elem.tag_name == tag_name)
    }

    fn query_all(&self, f: impl Fn(&crate::dom::ElementData) -> bool) -> Vec<MemElement> {
        with_dom(|dom| {
            let mut list = vec![];
            dom.descendants(self.0, &mut list);
            list.into_iter()
                .filter(|id| dom.element(*id).map(|x| f(x)).unwrap_or(false))
                .map(|id| MemElement(MemNode(id)))
                .collect()
        })
    }

    /// Add an event listener.
    pub fn add_event_listener(
        &self,
        event_type: &str,
        f: impl 'static + Fn(&mut MemEvent),
    ) -> ListenerHandle {
        event::add_listener(self.0, event_type, f)
    }

    /// Remove an event listener.
    ///
    /// Returns `false` if it has been removed.
    pub fn remove_event_listener(&self, handle: ListenerHandle) -> bool {
        event::remove_listener(handle)
    }

    /// Dispatch an event from this node.
    ///
    /// Returns `false` if the default action is prevented.
    pub fn dispatch_event(&self, event: &mut MemEvent) -> Result<bool, Error> {
        event::dispatch(self.0, event)
    }
}

/// An element in the in-memory host.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemElement(pub(crate) MemNode);

impl std::fmt::Debug for MemElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Deref for MemElement {
    type Target = MemNode;

    fn deref(&self) -> &MemNode {
        &self.0
    }
}

impl From<MemElement> for MemNode {
    fn from(x: MemElement) -> Self {
        x.0
    }
}

fn check_attribute_name(name: &str) -> Result<String, Error> {
    let invalid = name.is_empty()
        || name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
        });
    if invalid {
        return Err(Error::InvalidAttributeName(name.to_string()));
    }
    Ok(name.to_ascii_lowercase())
}

const SHADOW_HOST_ELEMENTS: [&str; 18] = [
    "article", "aside", "blockquote", "body", "div", "footer", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "main", "nav", "p", "section", "span",
];

impl MemElement {
    /// The constructed element instance, if it has been upgraded to `T` .
    pub fn instance<T: 'static>(&self) -> Option<Rc<T>> {
        let instance = with_dom(|dom| dom.element(self.0 .0).and_then(|x| x.instance.clone()))?;
        instance.downcast::<T>().ok()
    }

    /// Whether a custom element instance is constructed on this element.
    pub fn is_upgraded(&self) -> bool {
        with_dom(|dom| {
            dom.element(self.0 .0)
                .map(|x| x.custom_state == CustomState::Custom)
                .unwrap_or(false)
        })
    }

    /// The attributes in insertion order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        with_dom(|dom| {
            dom.element(self.0 .0)
                .map(|x| x.attrs.clone())
                .unwrap_or_default()
        })
    }

    /// Serialize the element itself and its children.
    pub fn outer_html(&self) -> String {
        serialize::outer_html(self.0 .0, false)
    }

    /// Serialize the element with its shadow roots as declarative shadow roots.
    pub fn to_prerendered_html(&self) -> String {
        serialize::outer_html(self.0 .0, true)
    }

    /// Write the prerendered HTML to a `Write` .
    pub fn write_prerendered_html(&self, w: &mut impl std::io::Write) -> std::io::Result<()> {
        serialize::write_outer_html(self.0 .0, true, w)
    }
}

impl BackendElement for MemElement {
    type BaseBackend = MemBackend;

    fn tag_name(&self) -> String {
        with_dom(|dom| {
            dom.element(self.0 .0)
                .map(|x| x.tag_name.clone())
                .unwrap_or_default()
        })
    }

    fn attach_shadow(&self, mode: ShadowRootMode) -> Result<MemShadowRoot, Error> {
        let tag_name = self.tag_name();
        if !SHADOW_HOST_ELEMENTS.contains(&tag_name.as_str())
            && !elembase::is_valid_custom_element_name(&tag_name)
        {
            return Err(Error::backend(format!(
                "NotSupportedError: <{}> cannot host a shadow root",
                tag_name
            )));
        }
        with_dom_mut(|dom| {
            let host = self.0 .0;
            if dom.element(host).and_then(|x| x.shadow_root).is_some() {
                return Err(Error::ShadowRootExists);
            }
            let sr = dom.create_node(NodeKind::ShadowRoot { host, mode });
            if let Some(elem) = dom.element_mut(host) {
                elem.shadow_root = Some(sr);
            }
            Ok(MemShadowRoot(MemNode(sr)))
        })
    }

    fn shadow_root(&self) -> Option<MemShadowRoot> {
        with_dom(|dom| {
            let sr = dom.element(self.0 .0)?.shadow_root?;
            match dom.node(sr).kind {
                NodeKind::ShadowRoot {
                    mode: ShadowRootMode::Open,
                    ..
                } => Some(MemShadowRoot(MemNode(sr))),
                _ => None,
            }
        })
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        with_dom(|dom| {
            dom.element(self.0 .0)?
                .attrs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.clone())
        })
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), Error> {
        let name = check_attribute_name(name)?;
        with_dom_mut(|dom| {
            if let Some(elem) = dom.element_mut(self.0 .0) {
                match elem.attrs.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, v)) => *v = value.to_string(),
                    None => elem.attrs.push((name, value.to_string())),
                }
            }
        });
        Ok(())
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    fn remove_attribute(&self, name: &str) -> Result<(), Error> {
        let name = name.to_ascii_lowercase();
        with_dom_mut(|dom| {
            if let Some(elem) = dom.element_mut(self.0 .0) {
                elem.attrs.retain(|(n, _)| *n != name);
            }
        });
        Ok(())
    }

    fn dispatch_custom_event(&self, event_type: &str, init: &CustomEventInit) -> Result<(), Error> {
        let mut ev = MemEvent::new(event_type, init);
        event::dispatch(self.0 .0, &mut ev)?;
        Ok(())
    }
}

/// A shadow root in the in-memory host.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemShadowRoot(pub(crate) MemNode);

impl std::fmt::Debug for MemShadowRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Deref for MemShadowRoot {
    type Target = MemNode;

    fn deref(&self) -> &MemNode {
        &self.0
    }
}

impl From<MemShadowRoot> for MemNode {
    fn from(x: MemShadowRoot) -> Self {
        x.0
    }
}

impl MemShadowRoot {
    /// The mode it is attached with.
    pub fn mode(&self) -> ShadowRootMode {
        with_dom(|dom| match dom.node(self.0 .0).kind {
            NodeKind::ShadowRoot { mode, .. } => mode,
            _ => unreachable!(),
        })
    }
}

impl BackendShadowRoot for MemShadowRoot {
    type BaseBackend = MemBackend;

    fn host(&self) -> MemElement {
        with_dom(|dom| match dom.node(self.0 .0).kind {
            NodeKind::ShadowRoot { host, .. } => MemElement(MemNode(host)),
            _ => unreachable!(),
        })
    }

    fn set_inner_html(&self, markup: &str) -> Result<(), Error> {
        self.0.set_inner_html(markup)
    }

    fn query_attribute_all(&self, attr: &str) -> Result<Vec<MemElement>, Error> {
        Ok(self.0.query_attribute_all(attr))
    }
}
