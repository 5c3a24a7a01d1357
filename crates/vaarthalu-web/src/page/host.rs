//! DOM-backed page host.

use std::{cell::RefCell, collections::HashMap};

use tracing::warn;
use vaarthalu_engagement::{
    AdSlot, AdTag, MessageKind, Rect, ScriptTag, Viewport,
    host::{NoticeSurface, Overlay, PageHost, PageInfo},
};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlScriptElement, Window};

use crate::convert::js_error_message;

const PROGRESS_BAR: &str = ".reading-progress-bar";
const AD_UNIT: &str = ".ad-unit";
pub(crate) const NEWSLETTER_FORM: &str = ".newsletter-form";
pub(crate) const NEWSLETTER_INPUT: &str = ".newsletter-input";
const FLOATING_OPTIONS: &str = ".floating-share-options";
const SHARE_COUNT: &str = ".share-count strong";
const TOAST_CLASS: &str = "share-toast";

const MESSAGE_STYLE: &str = "position: fixed; top: 2rem; right: 2rem; padding: 1rem 1.5rem; \
     border-radius: 6px; color: white; z-index: 1004; animation: slideInRight 0.3s ease;";

/// `data-position` / `data-type` of an `.ad-unit` element.
pub(crate) fn ad_tag(element: &Element) -> AdTag {
    AdTag {
        position: element.get_attribute("data-position"),
        kind: element.get_attribute("data-type"),
    }
}

pub struct BrowserPage {
    window: Window,
    document: Document,
    toasts: RefCell<HashMap<u64, Element>>,
    messages: RefCell<HashMap<u64, Element>>,
}

impl BrowserPage {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            toasts: RefCell::default(),
            messages: RefCell::default(),
        }
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_html(&self, selector: &str) -> Option<HtmlElement> {
        self.query(selector)?.dyn_into().ok()
    }

    /// Create a `div` and append it to the body.
    fn append_div(&self, class: &str, text: &str) -> Option<Element> {
        let body = self.document.body()?;
        let div = match self.document.create_element("div") {
            Ok(div) => div,
            Err(err) => {
                warn!(error = %js_error_message(&err), "could not create notice");
                return None;
            }
        };
        div.set_class_name(class);
        div.set_text_content(Some(text));
        body.append_child(&div).ok()?;
        Some(div)
    }
}

impl PageHost for BrowserPage {
    fn info(&self) -> PageInfo {
        let location = self.window.location();
        PageInfo {
            title: self.document.title(),
            href: location.href().unwrap_or_default(),
            pathname: location.pathname().unwrap_or_default(),
            hostname: location.hostname().unwrap_or_default(),
        }
    }

    fn reveal(&self, overlay: Overlay) -> bool {
        self.query(overlay.selector())
            .is_some_and(|element| element.class_list().add_1("show").is_ok())
    }

    fn set_progress(&self, percent: f64) -> bool {
        let Some(bar) = self.query_html(PROGRESS_BAR) else {
            return false;
        };
        bar.style()
            .set_property("width", &format!("{percent}%"))
            .is_ok()
    }

    fn ad_slots(&self) -> Vec<AdSlot> {
        let Ok(nodes) = self.document.query_selector_all(AD_UNIT) else {
            return Vec::new();
        };

        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| {
                let rect = element.get_bounding_client_rect();
                AdSlot {
                    tag: ad_tag(&element),
                    rect: Rect::new(rect.top(), rect.left(), rect.bottom(), rect.right()),
                }
            })
            .collect()
    }

    fn viewport(&self) -> Viewport {
        let root = self.document.document_element();
        let dimension = |inner: Option<f64>, client: fn(&Element) -> i32| {
            inner
                .filter(|v| *v > 0.0)
                .or_else(|| root.as_ref().map(|el| f64::from(client(el))))
                .unwrap_or(0.0)
        };

        Viewport::new(
            dimension(
                self.window.inner_width().ok().and_then(|v| v.as_f64()),
                Element::client_width,
            ),
            dimension(
                self.window.inner_height().ok().and_then(|v| v.as_f64()),
                Element::client_height,
            ),
        )
    }

    fn inject_script(&self, script: &ScriptTag) {
        let Some(head) = self.document.head() else {
            warn!("document has no head");
            return;
        };
        let element = match self
            .document
            .create_element("script")
            .map(|el| el.unchecked_into::<HtmlScriptElement>())
        {
            Ok(element) => element,
            Err(err) => {
                warn!(error = %js_error_message(&err), "could not create script");
                return;
            }
        };

        element.set_src(&script.src);
        element.set_async(script.is_async);
        element.set_cross_origin(script.cross_origin.as_deref());
        if let Err(err) = head.append_child(&element) {
            warn!(src = %script.src, error = %js_error_message(&err), "could not inject script");
        }
    }

    fn clear_newsletter_input(&self, form: usize) {
        let input = self
            .document
            .query_selector_all(NEWSLETTER_FORM)
            .ok()
            .zip(u32::try_from(form).ok())
            .and_then(|(forms, index)| forms.item(index))
            .and_then(|node| node.dyn_into::<Element>().ok())
            .and_then(|el| el.query_selector(NEWSLETTER_INPUT).ok().flatten())
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        if let Some(input) = input {
            input.set_value("");
        }
    }

    fn toggle_floating_share(&self) {
        let Some(options) = self.query_html(FLOATING_OPTIONS) else {
            return;
        };
        let style = options.style();
        let display = style.get_property_value("display").unwrap_or_default();
        let next = if display == "flex" { "none" } else { "flex" };
        let _ = style.set_property("display", next);
    }

    fn share_count_text(&self) -> Option<String> {
        self.query(SHARE_COUNT)
            .map(|el| el.text_content().unwrap_or_default())
    }

    fn set_share_count(&self, count: u64) {
        if let Some(el) = self.query(SHARE_COUNT) {
            el.set_text_content(Some(&count.to_string()));
        }
    }

    fn open_window(&self, url: &str, name: &str, features: &str) -> bool {
        matches!(
            self.window
                .open_with_url_and_target_and_features(url, name, features),
            Ok(Some(_))
        )
    }
}

impl NoticeSurface for BrowserPage {
    fn mount_toast(&self, id: u64, text: &str) {
        if let Some(toast) = self.append_div(TOAST_CLASS, text) {
            self.toasts.borrow_mut().insert(id, toast);
        }
    }

    fn set_toast_visible(&self, id: u64, visible: bool) {
        if let Some(toast) = self.toasts.borrow().get(&id) {
            let classes = toast.class_list();
            let _ = if visible {
                classes.add_1("show")
            } else {
                classes.remove_1("show")
            };
        }
    }

    fn remove_toast(&self, id: u64) {
        if let Some(toast) = self.toasts.borrow_mut().remove(&id) {
            toast.remove();
        }
    }

    fn mount_message(&self, id: u64, text: &str, kind: MessageKind) {
        let Some(message) = self.append_div(kind.class_name(), text) else {
            return;
        };
        if let Some(html) = message.dyn_ref::<HtmlElement>() {
            let style = html.style();
            style.set_css_text(MESSAGE_STYLE);
            let _ = style.set_property("background", kind.background());
        }
        self.messages.borrow_mut().insert(id, message);
    }

    fn remove_message(&self, id: u64) {
        if let Some(message) = self.messages.borrow_mut().remove(&id) {
            message.remove();
        }
    }
}
