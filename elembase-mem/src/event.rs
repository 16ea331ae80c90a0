//! Event dispatching.
//!
//! Events are dispatched along the composed path:
//! from the target up to the ancestors, crossing into the shadow host when the event is composed.
//! Listeners outside a shadow root see the host as the target.

use elembase::{
    backend::{empty_detail, CustomEventInit},
    Detail, Error,
};

use crate::{
    dom::{with_dom, with_dom_mut, NodeId, NodeKind},
    node::MemNode,
};

/// The phase of an event being dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    /// Not being dispatched.
    None,
    /// Calling the listeners of the target (or a shadow host the target is retargeted to).
    AtTarget,
    /// Calling the listeners of an ancestor.
    Bubbling,
}

/// An event in the in-memory host.
#[derive(Debug, Clone)]
pub struct MemEvent {
    event_type: String,
    detail: Detail,
    bubbles: bool,
    composed: bool,
    cancelable: bool,
    target: Option<MemNode>,
    current_target: Option<MemNode>,
    phase: EventPhase,
    path: Vec<MemNode>,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
    default_prevented: bool,
}

impl MemEvent {
    /// Create an event with the options of a custom event.
    pub fn new(event_type: &str, init: &CustomEventInit) -> Self {
        Self {
            event_type: event_type.to_string(),
            detail: init.detail.clone(),
            bubbles: init.bubbles,
            composed: init.composed,
            cancelable: init.cancelable,
            target: None,
            current_target: None,
            phase: EventPhase::None,
            path: vec![],
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            default_prevented: false,
        }
    }

    /// Create a plain event that neither bubbles nor crosses shadow roots.
    pub fn plain(event_type: &str) -> Self {
        Self::new(
            event_type,
            &CustomEventInit {
                detail: empty_detail(),
                ..Default::default()
            },
        )
    }

    /// The event type.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The payload.
    pub fn detail(&self) -> &Detail {
        &self.detail
    }

    /// Whether the event propagates to the ancestors.
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Whether the event crosses shadow root boundaries.
    pub fn composed(&self) -> bool {
        self.composed
    }

    /// Whether `prevent_default` takes effect.
    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// The target, retargeted for the current listener.
    pub fn target(&self) -> Option<MemNode> {
        self.target
    }

    /// The node whose listener is being called.
    pub fn current_target(&self) -> Option<MemNode> {
        self.current_target
    }

    /// The current phase.
    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    /// The nodes the event is dispatched through, from the target outwards.
    pub fn composed_path(&self) -> &[MemNode] {
        &self.path
    }

    /// Do not call the listeners of the following nodes.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Do not call any other listener.
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    /// Whether `stop_propagation` is called.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Cancel the event if it is cancelable.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Whether the default action is prevented.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A registered listener, used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle {
    pub(crate) node: NodeId,
    pub(crate) id: u64,
}

// (node, retargeted target) pairs from the target outwards
fn event_path(target: NodeId, composed: bool) -> Vec<(NodeId, NodeId)> {
    with_dom(|dom| {
        let mut ret = vec![];
        let mut visible = target;
        let mut cur = Some(target);
        while let Some(id) = cur {
            ret.push((id, visible));
            cur = match &dom.node(id).kind {
                NodeKind::ShadowRoot { host, .. } => {
                    if !composed {
                        break;
                    }
                    visible = *host;
                    Some(*host)
                }
                _ => dom.node(id).parent,
            };
        }
        ret
    })
}

/// Dispatch the event synchronously.
///
/// Returns `false` if the default action is prevented.
pub(crate) fn dispatch(target: NodeId, event: &mut MemEvent) -> Result<bool, Error> {
    if event.event_type.is_empty() {
        return Err(Error::InvalidEventType(event.event_type.clone()));
    }
    if event.phase != EventPhase::None {
        return Err(Error::backend("The event is already being dispatched"));
    }
    let path = event_path(target, event.composed);
    event.path = path.iter().map(|(id, _)| MemNode(*id)).collect();
    event.propagation_stopped = false;
    event.immediate_propagation_stopped = false;
    for (id, visible) in path {
        let at_target = id == visible;
        if !at_target && !event.bubbles {
            continue;
        }
        event.phase = if at_target {
            EventPhase::AtTarget
        } else {
            EventPhase::Bubbling
        };
        event.target = Some(MemNode(visible));
        event.current_target = Some(MemNode(id));
        let listeners: Vec<_> = with_dom(|dom| {
            dom.node(id)
                .listeners
                .iter()
                .filter(|x| x.event_type == event.event_type)
                .map(|x| (x.id, x.f.clone()))
                .collect()
        });
        for (listener_id, f) in listeners {
            // listeners removed by a previous listener are skipped
            if !with_dom(|dom| dom.has_listener(id, listener_id)) {
                continue;
            }
            f(event);
            if event.immediate_propagation_stopped {
                break;
            }
        }
        if event.propagation_stopped {
            break;
        }
    }
    event.phase = EventPhase::None;
    event.current_target = None;
    Ok(!event.default_prevented)
}

pub(crate) fn add_listener(
    node: NodeId,
    event_type: &str,
    f: impl 'static + Fn(&mut MemEvent),
) -> ListenerHandle {
    let id = with_dom_mut(|dom| dom.add_listener(node, event_type, std::rc::Rc::new(f)));
    ListenerHandle { node, id }
}

pub(crate) fn remove_listener(handle: ListenerHandle) -> bool {
    with_dom_mut(|dom| {
        let listeners = &mut dom.node_mut(handle.node).listeners;
        let len = listeners.len();
        listeners.retain(|x| x.id != handle.id);
        listeners.len() != len
    })
}
