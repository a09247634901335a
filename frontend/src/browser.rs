//! `localStorage`, DOM and `File` adapters for the wasm build.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlElement, Storage};

use crate::error::StorageError;
use crate::preferences::PreferenceStore;
use crate::render::{background_declarations, Renderer};
use crate::storage::KeyValueStore;
use crate::theme::{ThemeDefinition, ThemeId};
use crate::wallpaper::ByteSource;

pub type BrowserPreferences = PreferenceStore<LocalStorage, DomRenderer>;

thread_local! {
    static SESSION: RefCell<Option<Rc<BrowserPreferences>>> = const { RefCell::new(None) };
}

/// The preference store created by [`start`].
pub fn session() -> Option<Rc<BrowserPreferences>> {
    SESSION.with(|slot| slot.borrow().clone())
}

#[wasm_bindgen(start)]
pub fn start() {
    let store = Rc::new(PreferenceStore::new(LocalStorage::new(), DomRenderer));
    store.initialize();
    SESSION.with(|slot| *slot.borrow_mut() = Some(store));
    info!("organizze frontend started");
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// `window.localStorage`. Reads from a missing storage yield nothing,
/// writes fail with [`StorageError::Unavailable`].
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            warn!("localStorage unavailable, preferences will not persist");
        }
        LocalStorage { storage }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("localStorage".to_string()))
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match &self.storage {
            Some(storage) => storage
                .get_item(key)
                .map_err(|err| StorageError::Unavailable(js_message(&err))),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // setItem only throws on QuotaExceededError
        self.storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::QuotaExceeded {
                key: key.to_string(),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|err| StorageError::Unavailable(js_message(&err)))
    }
}

/// Applies themes through `data-theme`, body classes and CSS variables.
#[derive(Clone, Copy, Debug, Default)]
pub struct DomRenderer;

impl DomRenderer {
    fn document() -> Option<Document> {
        web_sys::window().and_then(|window| window.document())
    }

    fn root() -> Option<HtmlElement> {
        Self::document()
            .and_then(|doc| doc.document_element())
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }
}

impl Renderer for DomRenderer {
    fn apply_theme(&self, theme: &ThemeDefinition) {
        let (Some(root), Some(body)) = (Self::root(), Self::document().and_then(|d| d.body())) else {
            return;
        };

        let classes = body.class_list();
        if theme.id == ThemeId::Dark {
            let _ = root.set_attribute("data-theme", "dark");
            let _ = classes.add_1("dark-theme");
            let _ = classes.remove_1("warm-theme");
        } else {
            let _ = root.remove_attribute("data-theme");
            let _ = classes.add_1("warm-theme");
            let _ = classes.remove_1("dark-theme");
        }

        let style = root.style();
        let _ = style.set_property("--color-primary", theme.colors.primary);
        let _ = style.set_property("--color-accent", theme.colors.accent);
        let _ = style.set_property("--color-dark", theme.colors.dark);
        let _ = style.set_property("--base-background", theme.colors.base_background);
    }

    fn apply_background(&self, image: Option<&str>, opacity: f64) {
        let (Some(root), Some(body)) = (Self::root(), Self::document().and_then(|d| d.body())) else {
            return;
        };

        for (name, value) in background_declarations(image, opacity) {
            // the opacity variable is read from the root element
            let target = if name.starts_with("--") { &root } else { &body };
            let _ = target.style().set_property(name, &value);
        }
    }
}

/// A file picked through an `<input type="file">`.
pub struct BrowserFile {
    file: web_sys::File,
}

impl BrowserFile {
    pub fn new(file: web_sys::File) -> Self {
        BrowserFile { file }
    }

    pub fn mime_type(&self) -> String {
        self.file.type_()
    }

    pub fn size(&self) -> u64 {
        self.file.size() as u64
    }
}

impl ByteSource for BrowserFile {
    async fn read_all(self) -> io::Result<Vec<u8>> {
        let buffer = JsFuture::from(self.file.array_buffer())
            .await
            .map_err(|err| io::Error::other(js_message(&err)))?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }
}
