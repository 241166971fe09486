/// Reusable UI components

use crate::collection::ALL_CATEGORY;
use crate::item::{NewItem, TextItem};
use patternfly_yew::prelude::{Button, ButtonVariant};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

/// How long a card shows "Copied" after a copy.
const COPIED_FEEDBACK_MS: i32 = 2000;

#[derive(Properties, PartialEq)]
pub struct CategoryTabsProps {
    pub categories: Vec<String>,
    pub active: String,
    pub on_select: Callback<String>,
}

#[function_component(CategoryTabs)]
pub fn category_tabs(props: &CategoryTabsProps) -> Html {
    html! {
        <div class="pf-v5-c-tabs tabs-nav">
            <ul class="pf-v5-c-tabs__list">
                {for props.categories.iter().map(|category| {
                    let class = if *category == props.active {
                        "pf-v5-c-tabs__item pf-m-current"
                    } else {
                        "pf-v5-c-tabs__item"
                    };
                    let onclick = props.on_select.reform({
                        let category = category.clone();
                        move |_: MouseEvent| category.clone()
                    });

                    html! {
                        <li key={category.clone()} class={class}>
                            <button class="pf-v5-c-tabs__link" {onclick}>
                                <span class="pf-v5-c-tabs__item-text">{category}</span>
                            </button>
                        </li>
                    }
                })}
            </ul>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SearchBarProps {
    pub value: String,
    pub on_input: Callback<String>,
}

#[function_component(SearchBar)]
pub fn search_bar(props: &SearchBarProps) -> Html {
    let oninput = {
        let on_input = props.on_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                on_input.emit(input.value());
            }
        })
    };

    html! {
        <div class="search-container">
            <input
                type="text"
                placeholder="Search..."
                value={props.value.clone()}
                {oninput}
                class="search-input"
            />
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct AddItemFormProps {
    /// Existing categories, offered as suggestions
    pub categories: Vec<String>,
    pub on_submit: Callback<NewItem>,
    pub on_cancel: Callback<()>,
}

fn update_draft(draft: &UseStateHandle<NewItem>, apply: fn(&mut NewItem, String)) -> Callback<InputEvent> {
    let draft = draft.clone();
    Callback::from(move |e: InputEvent| {
        let value = if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = e.target_dyn_into::<HtmlTextAreaElement>() {
            area.value()
        } else {
            return;
        };

        let mut next = (*draft).clone();
        apply(&mut next, value);
        draft.set(next);
    })
}

#[function_component(AddItemForm)]
pub fn add_item_form(props: &AddItemFormProps) -> Html {
    let draft = use_state(NewItem::default);

    let on_category = update_draft(&draft, |d, v| d.category = v);
    let on_title = update_draft(&draft, |d, v| d.title = v);
    let on_content = update_draft(&draft, |d, v| d.content = v);

    let onsubmit = {
        let draft = draft.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_submit.emit((*draft).clone());
        })
    };

    html! {
        <div class="modal-backdrop">
            <div class="modal-card">
                <div class="modal-header">
                    <h2 class="modal-title">{"Add New Text"}</h2>
                    <Button
                        onclick={props.on_cancel.reform(|_| ())}
                        variant={ButtonVariant::Plain}
                    >
                        {"✗"}
                    </Button>
                </div>
                <form class="modal-form" {onsubmit}>
                    <label class="field-label">{"Category"}</label>
                    <input
                        type="text"
                        value={draft.category.clone()}
                        oninput={on_category}
                        placeholder="e.g., Work, Personal"
                        class="field-input"
                        list="category-suggestions"
                        required=true
                    />
                    <datalist id="category-suggestions">
                        {for props.categories.iter()
                            .filter(|c| c.as_str() != ALL_CATEGORY)
                            .map(|c| html! { <option value={c.clone()} /> })}
                    </datalist>

                    <label class="field-label">{"Title"}</label>
                    <input
                        type="text"
                        value={draft.title.clone()}
                        oninput={on_title}
                        placeholder="e.g., Office Address"
                        class="field-input"
                        required=true
                    />

                    <label class="field-label">{"Content"}</label>
                    <textarea
                        value={draft.content.clone()}
                        oninput={on_content}
                        placeholder="The text you want to copy..."
                        class="field-input field-textarea"
                        required=true
                    />

                    <button type="submit" class="pf-v5-c-button pf-m-primary pf-m-block">
                        {"Save Text"}
                    </button>
                </form>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ItemCardProps {
    pub item: TextItem,
    pub on_copy: Callback<String>,
    pub on_delete: Callback<String>,
}

#[function_component(ItemCard)]
pub fn item_card(props: &ItemCardProps) -> Html {
    let copied = use_state(|| false);
    let item = &props.item;

    let on_copy_click = {
        let copied = copied.clone();
        let on_copy = props.on_copy.clone();
        let content = item.content.clone();

        Callback::from(move |_: MouseEvent| {
            on_copy.emit(content.clone());
            copied.set(true);

            let copied = copied.clone();
            let reset = Closure::once_into_js(move || copied.set(false));
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    reset.unchecked_ref(),
                    COPIED_FEEDBACK_MS,
                );
            }
        })
    };

    html! {
        <div class="item-card">
            <div class="item-header">
                <div>
                    <span class="item-category">{&item.category}</span>
                    <h3 class="item-title">{&item.title}</h3>
                </div>
                <Button
                    onclick={props.on_delete.reform({
                        let id = item.id.clone();
                        move |_| id.clone()
                    })}
                    variant={ButtonVariant::Danger}
                >
                    {"🗑️"}
                </Button>
            </div>
            <div class="item-content">
                <p class="item-content-text">{&item.content}</p>
            </div>
            <div class="item-actions">
                <Button
                    onclick={on_copy_click}
                    variant={if *copied { ButtonVariant::Primary } else { ButtonVariant::Secondary }}
                >
                    {if *copied { "✓ Copied" } else { "📋 Copy" }}
                </Button>
            </div>
        </div>
    }
}
