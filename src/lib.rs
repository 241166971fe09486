/// Text Util - Chrome Extension for storing and copying text snippets
/// Built with Rust + WASM + Yew

mod backend;
pub mod collection;
pub mod item;
pub mod storage;
pub mod ui;

pub use backend::{js_error_message, BrowserStorage, LocalStorage, SyncStorage};
pub use collection::{Collection, ItemFilter, ItemManager, PendingSave, ALL_CATEGORY};
pub use item::{NewItem, TextItem, ValidationError};
pub use storage::{
    export_json, BackendKind, ItemStore, QuotaUsage, StorageBackend, StorageError,
    STORAGE_KEY,
};

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
