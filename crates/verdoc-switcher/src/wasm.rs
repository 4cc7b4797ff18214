//! Browser bindings for the version switcher.
//!
//! Built with `wasm-pack build --target web --features wasm`. The generated
//! `versions.js` module loads the bundle and calls [`initialize`] with the
//! embedded [`SwitcherData`] as a JSON string:
//!
//! ```javascript,ignore
//! import init, { initialize } from "./verdoc_switcher.js";
//!
//! await init();
//! initialize(JSON.stringify(VERDOC_DATA));
//! ```

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, DocumentReadyState, HtmlOptionElement, HtmlSelectElement, Window, console,
};

use crate::mount::{self, MountError, Page};
use crate::{SelectOption, Switcher, SwitcherData};

/// Class of the element wrapping the `<select>`.
const CONTAINER_CLASS: &str = "verdoc-switcher";

/// The live document.
struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    fn current() -> Result<Self, MountError> {
        let window = web_sys::window().ok_or_else(|| MountError::Dom("no global window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| MountError::Dom("window has no document".into()))?;
        Ok(Self { window, document })
    }
}

fn dom(err: JsValue) -> MountError {
    MountError::Dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl Page for DomPage {
    type Control = HtmlSelectElement;

    fn is_loading(&self) -> bool {
        self.document.ready_state() == DocumentReadyState::Loading
    }

    fn href(&self) -> Result<String, MountError> {
        self.window.location().href().map_err(dom)
    }

    fn count_matches(&self, selector: &str) -> Result<u32, MountError> {
        Ok(self.document.query_selector_all(selector).map_err(dom)?.length())
    }

    fn insert_first(
        &self,
        selector: &str,
        options: &[SelectOption],
    ) -> Result<HtmlSelectElement, MountError> {
        let anchor = self
            .document
            .query_selector(selector)
            .map_err(dom)?
            .ok_or_else(|| MountError::NoInjectionPoint(selector.to_owned()))?;

        let select: HtmlSelectElement = self
            .document
            .create_element("select")
            .map_err(dom)?
            .dyn_into()
            .map_err(|_| MountError::Dom("created element is not a <select>".into()))?;
        select
            .set_attribute("aria-label", "Documentation version")
            .map_err(dom)?;
        for option in options {
            let element = HtmlOptionElement::new_with_text_and_value(&option.label, &option.value)
                .map_err(dom)?;
            element.set_selected(option.selected);
            select.append_child(&element).map_err(dom)?;
        }

        let container = self.document.create_element("div").map_err(dom)?;
        container.set_class_name(CONTAINER_CLASS);
        container.append_child(&select).map_err(dom)?;
        anchor
            .insert_before(&container, anchor.first_child().as_ref())
            .map_err(dom)?;
        Ok(select)
    }
}

/// Render the version selector once the document has been parsed.
///
/// Throws if the data cannot be parsed or mounting fails right away.
/// Failures of a deferred mount are written to the console.
#[wasm_bindgen]
pub fn initialize(data: &str) -> Result<(), JsValue> {
    let data = SwitcherData::from_json(data)
        .map_err(|e| js_error(&format!("invalid version data: {e}")))?;
    let page = DomPage::current().map_err(|e| js_error(&e.to_string()))?;

    let mounted = mount::initialize(&page, data, |data| {
        let callback = Closure::once_into_js(move || {
            if let Err(err) = mount_and_listen(data) {
                console::error_1(&err);
            }
        });
        page.document
            .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
            .map_err(dom)
    })
    .map_err(|e| js_error(&e.to_string()))?;

    match mounted {
        Some((switcher, select)) => listen(switcher, &select),
        None => Ok(()),
    }
}

fn mount_and_listen(data: SwitcherData) -> Result<(), JsValue> {
    let page = DomPage::current().map_err(|e| js_error(&e.to_string()))?;
    let (switcher, select) = mount::mount(&page, data).map_err(|e| js_error(&e.to_string()))?;
    listen(switcher, &select)
}

/// Navigate when another version is picked.
fn listen(switcher: Switcher, select: &HtmlSelectElement) -> Result<(), JsValue> {
    let on_change = {
        let select = select.clone();
        Closure::<dyn FnMut()>::new(move || {
            if let Err(err) = navigate(&switcher, &select.value()) {
                console::error_1(&err);
            }
        })
    };
    select.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
    // The listener lives as long as the page.
    on_change.forget();
    Ok(())
}

/// Full page load of the equivalent page in `target`.
fn navigate(switcher: &Switcher, target: &str) -> Result<(), JsValue> {
    let location = web_sys::window()
        .ok_or_else(|| js_error("no global window"))?
        .location();
    let destination = switcher
        .destination(&location.href()?, target)
        .map_err(|e| js_error(&e.to_string()))?;
    location.set_href(&destination)
}

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}
