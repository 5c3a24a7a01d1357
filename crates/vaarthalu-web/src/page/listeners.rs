//! DOM listener wiring for the page runtime.

use std::rc::Rc;

use vaarthalu_engagement::{Click, Link, ScrollMetrics, ShareButton, VideoEvent, VideoInfo};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlAnchorElement, HtmlInputElement, HtmlMediaElement,
    MouseEvent, Window,
};

use super::{
    PageEngagement,
    host::{NEWSLETTER_FORM, NEWSLETTER_INPUT, ad_tag},
};

/// Add a listener that lives as long as the page.
fn listen(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

fn target_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into().ok()
}

/// Resolve everything a click landed in.
fn click_from(target: &Element) -> Click {
    Click {
        share_button: closest(target, ".share-btn").map(|button| ShareButton {
            platform: button.get_attribute("data-platform").unwrap_or_default(),
            title: button.get_attribute("data-title"),
            url: button.get_attribute("data-url"),
        }),
        floating_option: closest(target, ".floating-option")
            .and_then(|button| button.get_attribute("data-platform")),
        floating_toggle: closest(target, ".floating-share-btn").is_some(),
        link: closest(target, "a")
            .and_then(|anchor| anchor.dyn_into::<HtmlAnchorElement>().ok())
            .map(|anchor| Link {
                href: anchor.href(),
                text: anchor.text_content().unwrap_or_default(),
            })
            .filter(|link| !link.href.is_empty()),
        ad_slot: closest(target, ".ad-unit").map(|slot| ad_tag(&slot)),
    }
}

/// Position of `form` among the newsletter forms, in document order.
fn form_index(document: &Document, form: &Element) -> usize {
    let Ok(forms) = document.query_selector_all(NEWSLETTER_FORM) else {
        return 0;
    };
    (0..forms.length())
        .position(|i| forms.item(i).is_some_and(|node| node.is_same_node(Some(&**form))))
        .unwrap_or(0)
}

fn scroll_metrics(window: &Window, document: &Document) -> Option<ScrollMetrics> {
    let root = document.document_element()?;
    let viewport = window.inner_height().ok()?.as_f64()?;
    Some(ScrollMetrics::new(
        window.scroll_y().unwrap_or(0.0),
        f64::from(root.scroll_height()),
        viewport,
    ))
}

pub(super) fn attach(
    window: &Window,
    document: &Document,
    engagement: &Rc<PageEngagement>,
) -> Result<(), JsValue> {
    let e = Rc::clone(engagement);
    listen(document, "click", move |event| {
        let Some(target) = target_element(&event) else { return };
        let click = click_from(&target);
        let engagement = Rc::clone(&e);
        spawn_local(async move { engagement.on_click(&click).await });
    })?;

    let e = Rc::clone(engagement);
    let d = document.clone();
    listen(document, "submit", move |event| {
        let Some(form) = target_element(&event).and_then(|t| closest(&t, NEWSLETTER_FORM))
        else {
            return;
        };
        event.prevent_default();
        let index = form_index(&d, &form);
        let email = form
            .query_selector(NEWSLETTER_INPUT)
            .ok()
            .flatten()
            .and_then(|input| input.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default();
        let engagement = Rc::clone(&e);
        spawn_local(async move {
            engagement.on_newsletter_submit(index, &email).await;
        });
    })?;

    let e = Rc::clone(engagement);
    let (w, d) = (window.clone(), document.clone());
    listen(window, "scroll", move |_| {
        if let Some(metrics) = scroll_metrics(&w, &d) {
            e.on_scroll(metrics);
        }
    })?;

    let e = Rc::clone(engagement);
    listen(document, "mousemove", move |event| {
        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
            e.on_pointer_move(f64::from(mouse.client_y()));
        }
    })?;

    let e = Rc::clone(engagement);
    listen(document, "mouseout", move |event| {
        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
            e.on_pointer_out(f64::from(mouse.client_y()), mouse.related_target().is_none());
        }
    })?;

    let e = Rc::clone(engagement);
    listen(window, "beforeunload", move |_| {
        e.on_unload();
    })?;

    attach_videos(document, engagement)
}

fn attach_videos(document: &Document, engagement: &Rc<PageEngagement>) -> Result<(), JsValue> {
    let videos = document.query_selector_all("video")?;

    for video in (0..videos.length())
        .filter_map(|i| videos.item(i))
        .filter_map(|node| node.dyn_into::<HtmlMediaElement>().ok())
    {
        for (kind, media_event) in [("play", VideoEvent::Play), ("ended", VideoEvent::Ended)] {
            let e = Rc::clone(engagement);
            let element = video.clone();
            listen(&video, kind, move |_| {
                let info = VideoInfo {
                    src: element.src(),
                    title: element.get_attribute("title"),
                };
                e.on_video(media_event, &info);
            })?;
        }
    }

    Ok(())
}
