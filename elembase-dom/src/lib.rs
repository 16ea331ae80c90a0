//! elembase: a base layer for authoring custom elements
//!
//! This is the *browser binding* of the framework.
//! Tag names are registered into the `customElements` registry of the window,
//! so the browser constructs the instances whenever the elements are created or parsed.
//!
//! ```rust,no_run
//! use wasm_bindgen::prelude::*;
//! use elembase::prelude::*;
//! use elembase_dom::prelude::*;
//!
//! #[custom_element(template = r#"<p as="greeting">Hello</p>"#)]
//! struct HelloWorld {
//!     base: ElementBase<DomBackend>,
//! }
//!
//! impl CustomElement<DomBackend> for HelloWorld {
//!     fn new(base: ElementBase<DomBackend>, _: &mut Binder<Self>) -> Self {
//!         Self { base }
//!     }
//!
//!     fn base(&self) -> &ElementBase<DomBackend> {
//!         &self.base
//!     }
//! }
//!
//! #[wasm_bindgen(start)]
//! pub fn wasm_main() {
//!     HelloWorld::define("hello-world").unwrap();
//! }
//! ```

#![warn(missing_docs)]

use elembase::{
    backend::{Backend, ElementConstructor},
    is_valid_custom_element_name, Error,
};
use std::rc::Rc;
use wasm_bindgen::{prelude::*, JsCast, JsValue};

mod element;
pub use element::{DomElement, DomShadowRoot};
mod instance;

/// The types that should usually be imported.
pub mod prelude {
    pub use crate::{DomBackend, DomElement, DomShadowRoot};
    pub use elembase::backend::{BackendElement, BackendShadowRoot};
}

thread_local! {
    pub(crate) static WINDOW: web_sys::Window = web_sys::window().expect("Cannot init DOM backend outside web page environment");
    pub(crate) static DOCUMENT: web_sys::Document = {
        WINDOW.with(|window| {
            window.document().expect("Cannot init DOM backend when document is not ready")
        })
    };
}

fn js_error_message(err: &JsValue) -> String {
    if let Some(err) = err.dyn_ref::<js_sys::Error>() {
        format!("{}: {}", err.name(), err.message())
    } else {
        "(JavaScript Error)".into()
    }
}

pub(crate) fn js_error(msg: &str, err: &JsValue) -> Error {
    Error::BackendError {
        msg: format!("{} ({})", msg, js_error_message(err)),
        err: None,
    }
}

#[wasm_bindgen(inline_js = r#"
export function element_class(ctor) {
    return class extends HTMLElement {
        constructor() {
            super();
            ctor(this);
        }
    };
}
"#)]
extern "C" {
    fn element_class(ctor: &JsValue) -> js_sys::Function;
}

/// The browser backend.
pub struct DomBackend {
    _private: (),
}

impl DomBackend {
    /// The `<body>` element of the document.
    pub fn body() -> Result<DomElement, Error> {
        DOCUMENT
            .with(|document| document.body())
            .map(|x| DomElement::new(x.into()))
            .ok_or_else(|| Error::backend("Cannot find the <body> element"))
    }

    /// Create an element with the document.
    ///
    /// If the tag name is defined, the instance is constructed by the browser before this returns,
    /// and construction failures are returned.
    pub fn create_element(tag_name: &str) -> Result<DomElement, Error> {
        DOCUMENT
            .with(|document| document.create_element(tag_name))
            .map(DomElement::new)
            .map_err(|err| {
                if is_invalid_character_err(&err) {
                    Error::InvalidTagName(tag_name.to_string())
                } else {
                    js_error(&format!("Cannot create <{}>", tag_name), &err)
                }
            })
    }

    /// The constructed element instance, if the element is upgraded to `T` .
    pub fn instance_of<T: 'static>(elem: &DomElement) -> Option<Rc<T>> {
        instance::get(elem)?.downcast::<T>().ok()
    }

    /// Detach the instance from the element and drop it.
    ///
    /// Instances are otherwise owned by the element objects and collected with them.
    /// Returns `false` if there is no instance.
    pub fn release_instance(elem: &DomElement) -> bool {
        instance::remove(elem)
    }
}

fn is_invalid_character_err(err: &JsValue) -> bool {
    err.dyn_ref::<js_sys::Error>()
        .map(|x| x.name() == "InvalidCharacterError")
        .unwrap_or(false)
}

impl Backend for DomBackend {
    type Element = DomElement;
    type ShadowRoot = DomShadowRoot;

    fn define_element(tag_name: &str, constructor: ElementConstructor<Self>) -> Result<(), Error> {
        if !is_valid_custom_element_name(tag_name) {
            return Err(Error::InvalidTagName(tag_name.to_string()));
        }
        if Self::is_defined(tag_name) {
            return Err(Error::AlreadyDefined(tag_name.to_string()));
        }
        let tag = tag_name.to_string();
        let ctor = Closure::<dyn Fn(web_sys::Element) -> Result<(), JsValue>>::new(
            move |elem: web_sys::Element| {
                let elem = DomElement::new(elem);
                match constructor(&elem) {
                    Ok(instance) => {
                        instance::insert(&elem, instance);
                        Ok(())
                    }
                    Err(err) => {
                        log::error!("Failed to construct <{}>: {}", tag, err);
                        Err(js_sys::Error::new(&err.to_string()).into())
                    }
                }
            },
        );
        let class = element_class(ctor.as_ref());
        // the class lives as long as the registry
        ctor.forget();
        WINDOW
            .with(|window| window.custom_elements().define(tag_name, &class))
            .map_err(|err| js_error(&format!("Cannot define <{}>", tag_name), &err))
    }

    fn is_defined(tag_name: &str) -> bool {
        !WINDOW
            .with(|window| window.custom_elements().get(tag_name))
            .is_undefined()
    }
}
