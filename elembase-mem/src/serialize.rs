use html_escape::{encode_double_quoted_attribute, encode_text};
use std::io::Write;

use elembase::backend::ShadowRootMode;

use crate::{
    dom::{with_dom, Dom, NodeId, NodeKind},
    parser::{RAW_TEXT_ELEMENTS, VOID_ELEMENTS},
};

fn write_children(
    dom: &Dom,
    id: NodeId,
    with_shadow: bool,
    w: &mut impl Write,
) -> std::io::Result<()> {
    let raw = dom
        .element(id)
        .map(|x| RAW_TEXT_ELEMENTS.contains(&x.tag_name.as_str()))
        .unwrap_or(false);
    for child in &dom.node(id).children {
        match &dom.node(*child).kind {
            NodeKind::Text(x) if raw => write!(w, "{}", x)?,
            _ => write_node(dom, *child, with_shadow, w)?,
        }
    }
    Ok(())
}

fn write_node(dom: &Dom, id: NodeId, with_shadow: bool, w: &mut impl Write) -> std::io::Result<()> {
    match &dom.node(id).kind {
        NodeKind::Text(x) => {
            write!(w, "{}", encode_text(x))?;
        }
        NodeKind::Comment(x) => {
            write!(w, "<!--{}-->", x)?;
        }
        NodeKind::Element(elem) => {
            write!(w, "<{}", elem.tag_name)?;
            for (name, value) in &elem.attrs {
                if value.is_empty() {
                    write!(w, " {}", name)?;
                } else {
                    write!(w, r#" {}="{}""#, name, encode_double_quoted_attribute(value))?;
                }
            }
            write!(w, ">")?;
            if VOID_ELEMENTS.contains(&elem.tag_name.as_str()) {
                return Ok(());
            }
            if with_shadow {
                if let Some(sr) = elem.shadow_root {
                    let mode = match dom.node(sr).kind {
                        NodeKind::ShadowRoot {
                            mode: ShadowRootMode::Closed,
                            ..
                        } => "closed",
                        _ => "open",
                    };
                    write!(w, r#"<template shadowrootmode="{}">"#, mode)?;
                    write_children(dom, sr, with_shadow, w)?;
                    write!(w, "</template>")?;
                }
            }
            write_children(dom, id, with_shadow, w)?;
            write!(w, "</{}>", elem.tag_name)?;
        }
        NodeKind::Document | NodeKind::ShadowRoot { .. } => {
            write_children(dom, id, with_shadow, w)?;
        }
    }
    Ok(())
}

pub(crate) fn write_outer_html(
    id: NodeId,
    with_shadow: bool,
    w: &mut impl Write,
) -> std::io::Result<()> {
    with_dom(|dom| write_node(dom, id, with_shadow, w))
}

pub(crate) fn outer_html(id: NodeId, with_shadow: bool) -> String {
    let mut ret = Vec::new();
    // writing to a `Vec` never fails
    let _ = write_outer_html(id, with_shadow, &mut ret);
    String::from_utf8_lossy(&ret).into_owned()
}

pub(crate) fn inner_html(id: NodeId, with_shadow: bool) -> String {
    let mut ret = Vec::new();
    let _ = with_dom(|dom| write_children(dom, id, with_shadow, &mut ret));
    String::from_utf8_lossy(&ret).into_owned()
}
