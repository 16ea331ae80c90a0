use once_cell::sync::Lazy;
use serde_json::json;
use std::{cell::RefCell, rc::Rc};

use elembase::{construct, prelude::*, Definition, DefinitionConfig, Error};
use elembase_mem::{event::EventPhase, prelude::*};

mod env;

#[custom_element(template = r#"<div as="x1"></div><span as="x2"><b as="x3">!</b></span><i></i>"#)]
struct Marked {
    base: ElementBase<MemBackend>,
}

impl CustomElement<MemBackend> for Marked {
    fn new(base: ElementBase<MemBackend>, _: &mut Binder<Self>) -> Self {
        Self { base }
    }

    fn base(&self) -> &ElementBase<MemBackend> {
        &self.base
    }
}

#[custom_element(template = r#"<p as="dup" id="first"></p><p><em as="dup" id="second"></em></p>"#)]
struct Duplicated {
    base: ElementBase<MemBackend>,
}

impl CustomElement<MemBackend> for Duplicated {
    fn new(base: ElementBase<MemBackend>, _: &mut Binder<Self>) -> Self {
        Self { base }
    }

    fn base(&self) -> &ElementBase<MemBackend> {
        &self.base
    }
}

#[custom_element(mirrored_props(label))]
struct Pinger {
    base: ElementBase<MemBackend>,
}

impl CustomElement<MemBackend> for Pinger {
    fn new(base: ElementBase<MemBackend>, _: &mut Binder<Self>) -> Self {
        Self { base }
    }

    fn base(&self) -> &ElementBase<MemBackend> {
        &self.base
    }
}

#[custom_element(mirrored_props("data-state", hidden))]
struct Toggle {
    #[base]
    inner: ElementBase<MemBackend>,
}

impl CustomElement<MemBackend> for Toggle {
    fn new(inner: ElementBase<MemBackend>, _: &mut Binder<Self>) -> Self {
        Self { inner }
    }

    fn base(&self) -> &ElementBase<MemBackend> {
        &self.inner
    }
}

#[custom_element(
    template = r#"<button as="button">+</button>"#,
    bound_methods(increase, reset),
    mirrored_props(count),
)]
struct Counter {
    base: ElementBase<MemBackend>,
    increase: BoundMethod<(), u32>,
    reset: BoundMethod,
}

impl Counter {
    fn current(&self) -> u32 {
        self.count().and_then(|x| x.parse().ok()).unwrap_or(0)
    }
}

impl CustomElement<MemBackend> for Counter {
    fn new(base: ElementBase<MemBackend>, binder: &mut Binder<Self>) -> Self {
        Self {
            base,
            increase: binder.bind("increase", |this: &Self, ()| {
                let n = this.current() + 1;
                this.set_count(n).unwrap();
                n
            }),
            reset: binder.bind("reset", |this: &Self, ()| {
                this.set_count(0).unwrap();
            }),
        }
    }

    fn base(&self) -> &ElementBase<MemBackend> {
        &self.base
    }

    fn created(this: &Rc<Self>) -> Result<(), Error> {
        let increase = this.increase.clone();
        this.base.elements()["button"].add_event_listener("click", move |_| {
            increase.call(());
        });
        Ok(())
    }
}

#[custom_element(bound_methods(run, stop))]
struct Forgetful {
    base: ElementBase<MemBackend>,
    run: BoundMethod,
}

impl CustomElement<MemBackend> for Forgetful {
    fn new(base: ElementBase<MemBackend>, binder: &mut Binder<Self>) -> Self {
        Self {
            base,
            run: binder.bind("run", |_: &Self, ()| {}),
        }
    }

    fn base(&self) -> &ElementBase<MemBackend> {
        &self.base
    }
}

#[custom_element(bound_methods(run))]
struct Overeager {
    base: ElementBase<MemBackend>,
    run: BoundMethod,
    walk: BoundMethod,
}

impl CustomElement<MemBackend> for Overeager {
    fn new(base: ElementBase<MemBackend>, binder: &mut Binder<Self>) -> Self {
        Self {
            base,
            run: binder.bind("run", |_: &Self, ()| {}),
            walk: binder.bind("walk", |_: &Self, ()| {}),
        }
    }

    fn base(&self) -> &ElementBase<MemBackend> {
        &self.base
    }
}

#[custom_element(template = r#"<section><x-inner as="inner"></x-inner></section>"#)]
struct Outer {
    base: ElementBase<MemBackend>,
}

impl CustomElement<MemBackend> for Outer {
    fn new(base: ElementBase<MemBackend>, _: &mut Binder<Self>) -> Self {
        Self { base }
    }

    fn base(&self) -> &ElementBase<MemBackend> {
        &self.base
    }
}

static CARD_DEFINITION: Lazy<&'static Definition> = Lazy::new(|| {
    DefinitionConfig::from_toml_str(
        r#"
            template = '<h1 as="title">Card</h1><slot></slot>'
            mirrored_props = ["heading"]
        "#,
    )
    .unwrap()
    .leak()
});

struct Card {
    base: ElementBase<MemBackend>,
}

impl HasDefinition for Card {
    fn definition() -> &'static Definition {
        *CARD_DEFINITION
    }
}

impl CustomElement<MemBackend> for Card {
    fn new(base: ElementBase<MemBackend>, _: &mut Binder<Self>) -> Self {
        Self { base }
    }

    fn base(&self) -> &ElementBase<MemBackend> {
        &self.base
    }
}

fn host(tag_name: &str) -> MemElement {
    MemBackend::create_element(tag_name).unwrap()
}

#[test]
fn marked_elements() {
    let host = host("x-marked");
    let marked = construct::<MemBackend, Marked>(host).unwrap();
    let elements = marked.base.elements();
    assert_eq!(elements.len(), 3);
    assert_eq!(elements["x1"].tag_name(), "div");
    assert_eq!(elements["x2"].tag_name(), "span");
    assert_eq!(elements["x3"].tag_name(), "b");
    assert_eq!(elements["x3"].parent(), Some(MemNode::from(elements["x2"])));
    assert!(elements.get("x4").is_none());
    let shadow_root = marked.base.shadow_root().unwrap();
    assert_eq!(host.shadow_root(), Some(*shadow_root));
    assert_eq!(shadow_root.host(), host);
    assert_eq!(
        shadow_root.inner_html(),
        r#"<div as="x1"></div><span as="x2"><b as="x3">!</b></span><i></i>"#,
    );
    // the host keeps its light children untouched
    assert!(host.children().is_empty());
}

#[test]
fn marked_elements_are_not_refreshed() {
    let marked = construct::<MemBackend, Marked>(host("x-marked")).unwrap();
    let shadow_root = *marked.base.shadow_root().unwrap();
    shadow_root.set_inner_html(r#"<p as="late"></p>"#).unwrap();
    assert_eq!(marked.base.elements().len(), 3);
    assert!(!marked.base.elements().contains("late"));
}

#[test]
fn duplicated_markers() {
    let dup = construct::<MemBackend, Duplicated>(host("x-dup")).unwrap();
    let elements = dup.base.elements();
    assert_eq!(elements.len(), 1);
    let elem = elements.get("dup").unwrap();
    assert_eq!(elem.get_attribute("id").as_deref(), Some("second"));
    assert_eq!(elem.tag_name(), "em");
}

#[test]
fn no_template() {
    let host = host("x-pinger");
    host.set_inner_html("<b>light</b>").unwrap();
    let pinger = construct::<MemBackend, Pinger>(host).unwrap();
    assert!(pinger.base.elements().is_empty());
    assert!(pinger.base.shadow_root().is_none());
    assert!(host.shadow_root().is_none());
    assert_eq!(host.inner_html(), "<b>light</b>");
}

#[test]
fn existing_shadow_root() {
    let host = host("x-marked");
    host.attach_shadow(elembase::backend::ShadowRootMode::Open).unwrap();
    assert!(matches!(
        construct::<MemBackend, Marked>(host),
        Err(Error::ShadowRootExists)
    ));
}

#[test]
fn mirrored_props() {
    let host = host("x-counter");
    let counter = construct::<MemBackend, Counter>(host).unwrap();
    assert_eq!(counter.count(), None);
    counter.set_count(5).unwrap();
    assert_eq!(host.get_attribute("count").as_deref(), Some("5"));
    host.set_attribute("count", "s").unwrap();
    assert_eq!(counter.count().as_deref(), Some("s"));
    host.remove_attribute("count").unwrap();
    assert_eq!(counter.count(), None);
    counter.set_count(1.5).unwrap();
    assert_eq!(host.get_attribute("count").as_deref(), Some("1.5"));

    let prop = counter.base.prop("count").unwrap();
    assert_eq!(prop.name(), "count");
    assert_eq!(prop.get().as_deref(), Some("1.5"));
    prop.set("abc").unwrap();
    assert_eq!(counter.count().as_deref(), Some("abc"));
    assert!(matches!(
        counter.base.prop("label"),
        Err(Error::PropertyNotMirrored(name)) if name == "label"
    ));
}

#[test]
fn mirrored_props_with_custom_base_field() {
    let host = host("x-toggle");
    let toggle = construct::<MemBackend, Toggle>(host).unwrap();
    toggle.set_data_state("on").unwrap();
    toggle.set_hidden("").unwrap();
    assert_eq!(host.outer_html(), r#"<x-toggle data-state="on" hidden></x-toggle>"#);
    assert_eq!(toggle.data_state().as_deref(), Some("on"));
    assert_eq!(toggle.hidden().as_deref(), Some(""));
    assert_eq!(
        Toggle::definition().mirrored_props,
        &["data-state", "hidden"][..]
    );
}

#[test]
fn bound_methods() {
    let host = host("x-counter");
    let counter = construct::<MemBackend, Counter>(host).unwrap();
    let f = counter.increase.clone();
    assert_eq!(f.name(), "increase");
    assert_eq!(f.call(()), Some(1));
    assert_eq!(counter.increase.call(()), Some(2));
    assert_eq!(counter.count().as_deref(), Some("2"));
    let reset = counter.reset.clone();
    reset.call(());
    assert_eq!(counter.current(), 0);

    // bound in `created` as a click listener inside the shadow root
    let button = counter.base.elements()["button"];
    button.dispatch_event(&mut MemEvent::plain("click")).unwrap();
    button.dispatch_event(&mut MemEvent::plain("click")).unwrap();
    assert_eq!(counter.current(), 2);

    drop(counter);
    assert_eq!(f.call(()), None);
}

#[test]
fn method_not_bound() {
    let ret = construct::<MemBackend, Forgetful>(host("x-forgetful"));
    assert!(matches!(ret, Err(Error::MethodNotBound(name)) if name == "stop"));
}

#[test]
fn undeclared_method() {
    let ret = construct::<MemBackend, Overeager>(host("x-overeager"));
    assert!(matches!(ret, Err(Error::UndeclaredMethod(name)) if name == "walk"));
}

#[test]
fn broadcast() {
    let container = host("div");
    let host = host("x-pinger");
    container.append_child(host).unwrap();
    let pinger = construct::<MemBackend, Pinger>(host).unwrap();
    let received = Rc::new(RefCell::new(vec![]));
    let r = received.clone();
    container.add_event_listener("ping", move |ev| {
        r.borrow_mut().push((
            ev.detail()["n"].clone(),
            ev.bubbles(),
            ev.composed(),
            ev.target(),
            ev.current_target(),
            ev.phase(),
        ));
    });
    pinger.broadcast("ping", json!({ "n": 1 })).unwrap();
    // listeners are called synchronously
    assert_eq!(received.borrow().len(), 1);
    let (n, bubbles, composed, target, current_target, phase) = received.borrow()[0].clone();
    assert_eq!(n, json!(1));
    assert!(bubbles);
    assert!(composed);
    assert_eq!(target, Some(MemNode::from(host)));
    assert_eq!(current_target, Some(MemNode::from(container)));
    assert_eq!(phase, EventPhase::Bubbling);
}

#[test]
fn broadcast_default_detail() {
    let host = host("x-pinger");
    let pinger = construct::<MemBackend, Pinger>(host).unwrap();
    let detail = Rc::new(RefCell::new(None));
    let d = detail.clone();
    host.add_event_listener("ready", move |ev| {
        *d.borrow_mut() = Some(ev.detail().clone());
    });
    pinger.broadcast("ready", None).unwrap();
    assert_eq!(*detail.borrow(), Some(json!({})));
    assert!(matches!(
        pinger.broadcast("", None),
        Err(Error::InvalidEventType(_))
    ));
}

#[test]
fn broadcast_across_shadow_roots() {
    Pinger::define("x-inner").unwrap();
    let container = host("div");
    let outer_host = host("x-outer");
    container.append_child(outer_host).unwrap();
    let outer = construct::<MemBackend, Outer>(outer_host).unwrap();
    let inner_host = outer.base.elements()["inner"];
    let inner = inner_host.instance::<Pinger>().unwrap();
    let shadow_root = *outer.base.shadow_root().unwrap();

    let targets = Rc::new(RefCell::new(vec![]));
    let t = targets.clone();
    shadow_root.add_event_listener("ping", move |ev| {
        t.borrow_mut().push(("shadow", ev.target()));
    });
    let t = targets.clone();
    container.add_event_listener("ping", move |ev| {
        t.borrow_mut().push(("container", ev.target()));
        assert_eq!(
            ev.composed_path().len(),
            5, // x-inner, section, shadow root, x-outer, div
        );
    });
    inner.broadcast("ping", json!({ "from": "inner" })).unwrap();
    assert_eq!(
        *targets.borrow(),
        vec![
            ("shadow", Some(MemNode::from(inner_host))),
            ("container", Some(MemNode::from(outer_host))),
        ]
    );
}

#[test]
fn define_twice() {
    env::init();
    env::take_logs();
    assert_eq!(Pinger::define("my-tag").unwrap(), RegisterResult::Registered);
    assert!(env::take_logs().is_empty());
    assert_eq!(
        Counter::define("my-tag").unwrap(),
        RegisterResult::AlreadyRegistered
    );
    let logs = env::take_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].0, log::Level::Warn);
    assert!(logs[0].1.contains("my-tag"));
    assert!(MemBackend::is_defined("my-tag"));
    // the first definition is kept
    let elem = host("my-tag");
    assert!(elem.instance::<Pinger>().is_some());
    assert!(elem.instance::<Counter>().is_none());
}

#[test]
fn define_invalid_tag_name() {
    env::init();
    env::take_logs();
    assert!(matches!(
        Pinger::define("pinger"),
        Err(Error::InvalidTagName(name)) if name == "pinger"
    ));
    assert!(matches!(
        Pinger::define("font-face"),
        Err(Error::InvalidTagName(_))
    ));
    assert!(env::take_logs().is_empty());
    assert!(!MemBackend::is_defined("pinger"));
}

#[test]
fn upgrade_on_creation() {
    Counter::define("x-counter").unwrap();
    let container = host("div");
    container
        .set_inner_html(r#"<x-counter count="3"></x-counter><x-counter></x-counter>"#)
        .unwrap();
    let counters = container.elements_by_tag_name("x-counter");
    assert_eq!(counters.len(), 2);
    let first = counters[0].instance::<Counter>().unwrap();
    assert_eq!(first.increase.call(()), Some(4));
    assert!(counters[1].is_upgraded());
    assert!(host("x-counter").is_upgraded());
}

#[test]
fn upgrade_failure() {
    Forgetful::define("x-forgetful").unwrap();
    assert!(matches!(
        MemBackend::create_element("x-forgetful"),
        Err(Error::MethodNotBound(_))
    ));
    let container = host("div");
    assert!(matches!(
        container.set_inner_html("<x-forgetful></x-forgetful>"),
        Err(Error::MethodNotBound(_))
    ));
}

#[test]
fn upgrade_continues_after_failure() {
    env::init();
    Forgetful::define("x-forgetful").unwrap();
    Counter::define("x-counter").unwrap();
    let container = host("div");
    assert!(matches!(
        container.set_inner_html("<x-forgetful></x-forgetful><x-counter></x-counter>"),
        Err(Error::MethodNotBound(name)) if name == "stop"
    ));
    assert_eq!(
        container.inner_html(),
        "<x-forgetful></x-forgetful><x-counter></x-counter>"
    );
    let elements = container.child_elements();
    assert!(!elements[0].is_upgraded());
    assert!(elements[1].is_upgraded());
    assert!(elements[1].instance::<Counter>().is_some());
}

#[test]
fn upgrade_on_define() {
    env::init();
    let body = MemBackend::body();
    let early = host("x-late");
    body.append_child(early).unwrap();
    let detached = host("x-late");
    assert!(!early.is_upgraded());
    Pinger::define("x-late").unwrap();
    assert!(early.is_upgraded());
    assert!(!detached.is_upgraded());
    body.append_child(detached).unwrap();
    assert!(detached.is_upgraded());
    assert!(detached.instance::<Pinger>().is_some());
}

#[test]
fn definition_from_toml() {
    let host = host("x-card");
    let card = construct::<MemBackend, Card>(host).unwrap();
    assert_eq!(card.base.elements()["title"].text_content(), "Card");
    card.base.prop("heading").unwrap().set("Hi").unwrap();
    assert_eq!(host.get_attribute("heading").as_deref(), Some("Hi"));
    assert_eq!(
        host.to_prerendered_html(),
        r#"<x-card heading="Hi"><template shadowrootmode="open"><h1 as="title">Card</h1><slot></slot></template></x-card>"#,
    );
}
