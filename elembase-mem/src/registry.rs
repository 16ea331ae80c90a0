use rustc_hash::FxHashMap;
use std::cell::RefCell;

use elembase::{backend::ElementConstructor, is_valid_custom_element_name, Error};

use crate::{
    dom::{with_dom, with_dom_mut, CustomState, NodeId, DOCUMENT},
    node::{MemElement, MemNode},
    MemBackend,
};

thread_local! {
    static REGISTRY: RefCell<FxHashMap<String, ElementConstructor<MemBackend>>> =
        RefCell::new(FxHashMap::default());
}

pub(crate) fn define(tag_name: &str, constructor: ElementConstructor<MemBackend>) -> Result<(), Error> {
    if !is_valid_custom_element_name(tag_name) {
        return Err(Error::InvalidTagName(tag_name.to_string()));
    }
    REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        if registry.contains_key(tag_name) {
            return Err(Error::AlreadyDefined(tag_name.to_string()));
        }
        registry.insert(tag_name.to_string(), constructor);
        Ok(())
    })?;

    // upgrade the elements already in the document
    let candidates = with_dom(|dom| {
        let mut list = vec![];
        dom.shadow_including_elements(DOCUMENT, &mut list);
        list.retain(|id| {
            dom.element(*id)
                .map(|x| x.tag_name == tag_name && x.custom_state == CustomState::Undefined)
                .unwrap_or(false)
        });
        list
    });
    for id in candidates {
        if let Err(err) = upgrade(MemElement(MemNode(id))) {
            log::error!("Failed to upgrade <{}>: {}", tag_name, err);
        }
    }
    Ok(())
}

pub(crate) fn is_defined(tag_name: &str) -> bool {
    REGISTRY.with(|registry| registry.borrow().contains_key(tag_name))
}

/// Construct the element instance if the tag name is defined.
///
/// Does nothing for elements that are already upgraded or failed to upgrade.
pub(crate) fn upgrade(elem: MemElement) -> Result<(), Error> {
    let id = elem.0 .0;
    let tag_name = match with_dom(|dom| {
        dom.element(id)
            .filter(|x| x.custom_state == CustomState::Undefined)
            .map(|x| x.tag_name.clone())
    }) {
        Some(x) => x,
        None => return Ok(()),
    };
    let constructor = match REGISTRY.with(|registry| registry.borrow().get(&tag_name).cloned()) {
        Some(x) => x,
        None => return Ok(()),
    };
    set_state(id, CustomState::Upgrading);
    match constructor(&elem) {
        Ok(instance) => {
            with_dom_mut(|dom| {
                if let Some(x) = dom.element_mut(id) {
                    x.instance = Some(instance);
                    x.custom_state = CustomState::Custom;
                }
            });
            Ok(())
        }
        Err(err) => {
            set_state(id, CustomState::Failed);
            Err(err)
        }
    }
}

fn set_state(id: NodeId, state: CustomState) {
    with_dom_mut(|dom| {
        if let Some(x) = dom.element_mut(id) {
            x.custom_state = state;
        }
    });
}

/// Upgrade the defined elements in a subtree that has just been connected.
///
/// Failures are logged, not returned.
pub(crate) fn upgrade_connected(root: NodeId) {
    let candidates = with_dom(|dom| {
        let mut list = vec![];
        dom.shadow_including_elements(root, &mut list);
        list
    });
    for id in candidates {
        let elem = MemElement(MemNode(id));
        if let Err(err) = upgrade(elem) {
            log::error!("Failed to upgrade {:?}: {}", elem, err);
        }
    }
}
