use std::{any::Any, cell::RefCell, rc::Rc};

use elembase::backend::ShadowRootMode;

use crate::event::MemEvent;

thread_local! {
    static DOM: RefCell<Dom> = RefCell::new(Dom::new());
}

// the borrow must not be held while calling into element code
#[inline]
pub(crate) fn with_dom<R>(f: impl FnOnce(&Dom) -> R) -> R {
    DOM.with(|dom| f(&dom.borrow()))
}

#[inline]
pub(crate) fn with_dom_mut<R>(f: impl FnOnce(&mut Dom) -> R) -> R {
    DOM.with(|dom| f(&mut dom.borrow_mut()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CustomState {
    Undefined,
    Upgrading,
    Custom,
    Failed,
}

pub(crate) struct ElementData {
    pub(crate) tag_name: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) shadow_root: Option<NodeId>,
    pub(crate) custom_state: CustomState,
    pub(crate) instance: Option<Rc<dyn Any>>,
}

pub(crate) enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
    ShadowRoot { host: NodeId, mode: ShadowRootMode },
}

pub(crate) type ListenerFn = Rc<dyn Fn(&mut MemEvent)>;

pub(crate) struct Listener {
    pub(crate) id: u64,
    pub(crate) event_type: String,
    pub(crate) f: ListenerFn,
}

pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
    pub(crate) listeners: Vec<Listener>,
}

pub(crate) struct Dom {
    nodes: Vec<Node>,
    next_listener_id: u64,
}

pub(crate) const DOCUMENT: NodeId = NodeId(0);
pub(crate) const BODY: NodeId = NodeId(1);

impl Dom {
    fn new() -> Self {
        let mut ret = Self {
            nodes: vec![],
            next_listener_id: 1,
        };
        ret.create_node(NodeKind::Document);
        let body = ret.create_element("body");
        ret.append(DOCUMENT, body);
        ret
    }

    pub(crate) fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: vec![],
            kind,
            listeners: vec![],
        });
        id
    }

    pub(crate) fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.create_node(NodeKind::Element(ElementData {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: vec![],
            shadow_root: None,
            custom_state: CustomState::Undefined,
            instance: None,
        }))
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id).kind {
            NodeKind::Element(x) => Some(x),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(x) => Some(x),
            _ => None,
        }
    }

    pub(crate) fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node_mut(child).parent.take() {
            self.node_mut(parent).children.retain(|x| *x != child);
        }
    }

    pub(crate) fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    pub(crate) fn clear_children(&mut self, parent: NodeId) {
        let children = std::mem::take(&mut self.node_mut(parent).children);
        for child in children {
            self.node_mut(child).parent = None;
        }
    }

    /// Whether `ancestor` is `node` or contains it, crossing from shadow roots to their hosts.
    pub(crate) fn is_host_including_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent_or_host(id);
        }
        false
    }

    /// The parent, or the host for a shadow root.
    pub(crate) fn parent_or_host(&self, id: NodeId) -> Option<NodeId> {
        match &self.node(id).kind {
            NodeKind::ShadowRoot { host, .. } => Some(*host),
            _ => self.node(id).parent,
        }
    }

    pub(crate) fn is_connected(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(id) = cur {
            if id == DOCUMENT {
                return true;
            }
            cur = self.parent_or_host(id);
        }
        false
    }

    /// Collect the descendants in tree order, not entering shadow roots.
    pub(crate) fn descendants(&self, root: NodeId, ret: &mut Vec<NodeId>) {
        for child in &self.node(root).children {
            ret.push(*child);
            self.descendants(*child, ret);
        }
    }

    /// Collect the inclusive descendant elements in shadow-including tree order.
    pub(crate) fn shadow_including_elements(&self, root: NodeId, ret: &mut Vec<NodeId>) {
        if let Some(elem) = self.element(root) {
            ret.push(root);
            if let Some(sr) = elem.shadow_root {
                self.shadow_including_elements(sr, ret);
            }
        }
        for child in &self.node(root).children {
            self.shadow_including_elements(*child, ret);
        }
    }

    pub(crate) fn text_content(&self, id: NodeId, ret: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text(x) => ret.push_str(x),
            NodeKind::Comment(_) => {}
            _ => {
                for child in &self.node(id).children {
                    self.text_content(*child, ret);
                }
            }
        }
    }

    pub(crate) fn add_listener(&mut self, id: NodeId, event_type: &str, f: ListenerFn) -> u64 {
        let listener_id = self.next_listener_id;
        self.next_listener_id += 1;
        self.node_mut(id).listeners.push(Listener {
            id: listener_id,
            event_type: event_type.to_string(),
            f,
        });
        listener_id
    }

    pub(crate) fn has_listener(&self, id: NodeId, listener_id: u64) -> bool {
        self.node(id).listeners.iter().any(|x| x.id == listener_id)
    }
}
