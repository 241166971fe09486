/// Popup UI for Text Util extension

use yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use patternfly_yew::prelude::{Alert, AlertType, Button, ButtonVariant, Spinner};
use crate::backend::{js_error_message, BrowserStorage};
use crate::collection::{Collection, ItemManager, ALL_CATEGORY};
use crate::item::{now_millis, NewItem, TextItem};
use crate::storage::{export_json, ItemStore};
use crate::ui::components::{AddItemForm, CategoryTabs, ItemCard, SearchBar};

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn copyToClipboard(text: &str) -> Result<(), JsValue>;

    fn exportToFile(data: &str, filename: &str);
}

#[derive(Clone, PartialEq)]
enum PopupState {
    Loading,
    Idle,
    Error(String),
}

impl PopupState {
    // Edits made before the stored items arrive would be overwritten by the load
    fn accepts_edits(&self) -> bool {
        !matches!(self, PopupState::Loading)
    }
}

fn confirm_delete(_item: &TextItem) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message("Delete this item?").ok())
        .unwrap_or(false)
}

#[function_component(App)]
pub fn app() -> Html {
    let store = use_memo((), |_| ItemStore::new(BrowserStorage::detect()));
    let manager = use_state({
        let store = store.clone();
        move || ItemManager::new(store)
    });
    let state = use_state(|| PopupState::Loading);
    let active_category = use_state(|| ALL_CATEGORY.to_string());
    let search_query = use_state(String::new);
    let is_form_open = use_state(|| false);

    // Load stored items on mount
    {
        let manager = manager.clone();
        let state = state.clone();
        let store = store.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                manager.set(ItemManager::load(store).await);
                state.set(PopupState::Idle);
            });
            || ()
        });
    }

    let on_add = {
        let manager = manager.clone();
        let state = state.clone();
        let is_form_open = is_form_open.clone();

        Callback::from(move |draft: NewItem| {
            if !state.accepts_edits() {
                return;
            }
            let mut next = (*manager).clone();
            if let Some(save) = next.add(&draft.title, &draft.content, &draft.category) {
                manager.set(next);
                is_form_open.set(false);

                let state = state.clone();
                save.spawn(move |e| state.set(PopupState::Error(format!("Failed to save: {}", e))));
            }
        })
    };

    let on_delete = {
        let manager = manager.clone();
        let state = state.clone();
        let active_category = active_category.clone();

        Callback::from(move |id: String| {
            if !state.accepts_edits() {
                return;
            }
            let mut next = (*manager).clone();
            if let Some(save) = next.delete(&id, confirm_delete) {
                // Leave an emptied category
                if !next.categories().contains(&*active_category) {
                    active_category.set(ALL_CATEGORY.to_string());
                }
                manager.set(next);

                let state = state.clone();
                save.spawn(move |e| state.set(PopupState::Error(format!("Failed to save: {}", e))));
            }
        })
    };

    let on_copy = Callback::from(move |text: String| {
        spawn_local(async move {
            if let Err(e) = copyToClipboard(&text).await {
                log::error!("Clipboard write failed: {}", js_error_message(&e));
            }
        });
    });

    let on_export = {
        let manager = manager.clone();

        Callback::from(move |_: MouseEvent| {
            match export_json(manager.collection().items()) {
                Ok(json) => {
                    let filename = format!("text-util-export-{}.json", now_millis());
                    exportToFile(&json, &filename);
                }
                Err(e) => {
                    log::error!("Export failed: {}", e);
                }
            }
        })
    };

    let on_select_category = {
        let active_category = active_category.clone();
        Callback::from(move |category: String| active_category.set(category))
    };

    let on_search = {
        let search_query = search_query.clone();
        Callback::from(move |query: String| search_query.set(query))
    };

    let on_open_form = {
        let is_form_open = is_form_open.clone();
        Callback::from(move |_: MouseEvent| is_form_open.set(true))
    };

    let on_close_form = {
        let is_form_open = is_form_open.clone();
        Callback::from(move |_: ()| is_form_open.set(false))
    };

    let on_dismiss_error = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| state.set(PopupState::Idle))
    };

    let categories = manager.categories();
    let visible: Vec<TextItem> = manager
        .filter(&active_category, &search_query)
        .cloned()
        .collect();

    let usage = use_memo(manager.collection().clone(), {
        let store = store.clone();
        move |collection: &Collection| store.usage(collection.items())
    });
    let storage_warning = usage
        .is_near_limit()
        .then(|| format!("Storage {}% full!", usage.percent_used()));

    html! {
        <div class="popup">
            <header class="popup-header">
                <h1 class="popup-title">{"Text Util"}</h1>
                <div class="header-actions">
                    <Button
                        onclick={on_export}
                        disabled={manager.collection().is_empty()}
                        variant={ButtonVariant::Secondary}
                    >
                        {"📥"}
                    </Button>
                    <Button
                        onclick={on_open_form}
                        disabled={!state.accepts_edits()}
                        variant={ButtonVariant::Primary}
                    >
                        {"+"}
                    </Button>
                </div>
            </header>

            // Storage warning
            if let Some(warning) = storage_warning {
                <Alert r#type={AlertType::Warning} title={warning} inline={true}>
                </Alert>
            }

            // Status display
            {match &*state {
                PopupState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{"Loading..."}</p>
                    </div>
                },
                PopupState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                        <Button onclick={on_dismiss_error} variant={ButtonVariant::Link}>
                            {"Dismiss"}
                        </Button>
                    </div>
                },
                PopupState::Idle => html! {}
            }}

            if *is_form_open {
                <AddItemForm
                    categories={categories.clone()}
                    on_submit={on_add}
                    on_cancel={on_close_form}
                />
            }

            <CategoryTabs
                categories={categories}
                active={(*active_category).clone()}
                on_select={on_select_category}
            />
            <SearchBar value={(*search_query).clone()} on_input={on_search} />

            <div class="item-list">
                if visible.is_empty() {
                    <div class="empty-state">
                        <p>{"No items found."}</p>
                        <p class="empty-state-hint">{"Click + to add one."}</p>
                    </div>
                } else {
                    {for visible.iter().map(|item| html! {
                        <ItemCard
                            key={item.id.clone()}
                            item={item.clone()}
                            on_copy={on_copy.clone()}
                            on_delete={on_delete.clone()}
                        />
                    })}
                }
            </div>

            <p class="footer-popup">
                {format!("{} items • {} storage", manager.collection().len(), store.kind().label())}
            </p>
        </div>
    }
}
