//! Tag name registration.

use std::{any::Any, rc::Rc};

use crate::{
    backend::{Backend, ElementConstructor},
    construct,
    error::Error,
    CustomElement,
};

/// The outcome of `define` .
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterResult {
    /// The tag name is registered for the element type.
    Registered,
    /// The tag name was registered before; nothing changed.
    AlreadyRegistered,
}

/// Register an element type under a tag name.
///
/// Registering an already registered tag name is not an error:
/// a warning is logged and `RegisterResult::AlreadyRegistered` is returned,
/// so that a module can be initialized more than once.
/// Other registry failures, such as an invalid tag name, are returned.
pub fn define<B: Backend, T: CustomElement<B>>(tag_name: &str) -> Result<RegisterResult, Error> {
    let constructor: ElementConstructor<B> = Rc::new(|host: &B::Element| {
        let this = construct::<B, T>(host.clone())?;
        Ok(this as Rc<dyn Any>)
    });
    match B::define_element(tag_name, constructor) {
        Ok(()) => Ok(RegisterResult::Registered),
        Err(Error::AlreadyDefined(_)) => {
            log::warn!(
                "Unable to (re)define <{}>: the tag name has already been defined",
                tag_name
            );
            Ok(RegisterResult::AlreadyRegistered)
        }
        Err(err) => Err(err),
    }
}

const RESERVED_NAMES: [&str; 8] = [
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

fn is_pcen_char(c: char) -> bool {
    matches!(c,
        '-' | '.' | '0'..='9' | '_' | 'a'..='z'
        | '\u{B7}'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{203F}'..='\u{2040}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}'
    )
}

/// Whether the name is a valid custom element name.
///
/// A valid name starts with a lower case ASCII letter, contains a hyphen,
/// has no upper case ASCII letters and is not one of the reserved SVG/MathML names.
pub fn is_valid_custom_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some('a'..='z') => {}
        _ => return false,
    }
    if !name.contains('-') || RESERVED_NAMES.contains(&name) {
        return false;
    }
    chars.all(is_pcen_char)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn custom_element_names() {
        assert!(is_valid_custom_element_name("my-tag"));
        assert!(is_valid_custom_element_name("x-"));
        assert!(is_valid_custom_element_name("math-α"));
        assert!(is_valid_custom_element_name("a.b-c_d"));
        assert!(!is_valid_custom_element_name("mytag"));
        assert!(!is_valid_custom_element_name("My-tag"));
        assert!(!is_valid_custom_element_name("my-Tag"));
        assert!(!is_valid_custom_element_name("-tag"));
        assert!(!is_valid_custom_element_name("1-tag"));
        assert!(!is_valid_custom_element_name("my tag-x"));
        assert!(!is_valid_custom_element_name(""));
        assert!(!is_valid_custom_element_name("font-face"));
    }
}
