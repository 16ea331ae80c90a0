use std::{any::Any, rc::Rc};
use wasm_bindgen::prelude::*;

use crate::DomElement;

/// The instance of a constructed element.
///
/// It is stored in the `__elembase` property of the element object,
/// so the instance lives as long as the element object does.
/// Rust memory is freed with the element only when the module is built with weak references enabled.
#[doc(hidden)]
#[wasm_bindgen]
pub struct ElementInstance {
    inner: Rc<dyn Any>,
}

#[wasm_bindgen]
impl ElementInstance {
    /// Another handle to the same instance.
    pub fn share(&self) -> ElementInstance {
        ElementInstance {
            inner: self.inner.clone(),
        }
    }
}

#[wasm_bindgen(inline_js = r#"
export function store_instance(elem, instance) {
    elem.__elembase = instance;
}
export function share_instance(elem) {
    const instance = elem.__elembase;
    return instance == null ? undefined : instance.share();
}
export function take_instance(elem) {
    const instance = elem.__elembase;
    delete elem.__elembase;
    return instance == null ? undefined : instance;
}
"#)]
extern "C" {
    fn store_instance(elem: &web_sys::Element, instance: ElementInstance);
    fn share_instance(elem: &web_sys::Element) -> Option<ElementInstance>;
    fn take_instance(elem: &web_sys::Element) -> Option<ElementInstance>;
}

pub(crate) fn insert(elem: &DomElement, instance: Rc<dyn Any>) {
    store_instance(elem.dom_elem(), ElementInstance { inner: instance });
}

pub(crate) fn get(elem: &DomElement) -> Option<Rc<dyn Any>> {
    share_instance(elem.dom_elem()).map(|x| x.inner)
}

pub(crate) fn remove(elem: &DomElement) -> bool {
    take_instance(elem.dom_elem()).is_some()
}
