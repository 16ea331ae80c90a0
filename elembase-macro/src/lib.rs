#![recursion_limit = "128"]

use proc_macro::TokenStream;

mod custom_element;

/// Generate the static definition and the mirrored property accessors of an element type.
///
/// ```ignore
/// #[custom_element(
///     template = r#"<span as="label"></span>"#, // or `template_file = "src/label.html"`
///     bound_methods(toggle),
///     mirrored_props(label, "data-state"),
/// )]
/// struct Label {
///     base: ElementBase<MemBackend>, // or any field marked with `#[base]`
///     toggle: BoundMethod,
/// }
/// ```
///
/// Every mirrored property `foo-bar` gets `fn foo_bar(&self) -> Option<String>`
/// and `fn set_foo_bar(&self, value: impl Display) -> Result<(), Error>` .
#[proc_macro_attribute]
pub fn custom_element(attr: TokenStream, item: TokenStream) -> TokenStream {
    custom_element::custom_element(attr, item)
}
