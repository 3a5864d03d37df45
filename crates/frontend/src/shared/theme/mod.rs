//! Applies the theme chosen in user preferences to the document.
//!
//! `System` follows `prefers-color-scheme`, including changes made while the
//! tab is open. The resolved theme is written to `<body data-theme>` and the
//! `#theme-stylesheet` link, which is created when the page lacks it.

use crate::shared::state::use_user_preferences;
use contracts::shared::preferences::{Theme, UserPreferencesPatch};
use leptos::ev;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{window, MediaQueryList};

const STYLESHEET_ID: &str = "theme-stylesheet";
const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

fn display_name(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "Light",
        Theme::Dark => "Dark",
        Theme::System => "System",
    }
}

fn css_path(theme: Theme) -> String {
    format!("/static/themes/{0}/{0}.css", theme.as_str())
}

/// Attributes of the `<link>` element carrying the resolved theme.
fn stylesheet_attributes(resolved: Theme) -> [(&'static str, String); 3] {
    [
        ("id", STYLESHEET_ID.to_string()),
        ("rel", "stylesheet".to_string()),
        ("href", css_path(resolved)),
    ]
}

fn dark_scheme_query() -> Option<MediaQueryList> {
    window()?.match_media(DARK_SCHEME_QUERY).ok().flatten()
}

fn apply_theme(resolved: Theme) {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };

    let link = match document.get_element_by_id(STYLESHEET_ID) {
        Some(link) => Some(link),
        None => document.create_element("link").ok().and_then(|link| {
            let head = document.head()?;
            head.append_child(&link).ok()?;
            Some(link)
        }),
    };
    if let Some(link) = link {
        for (name, value) in stylesheet_attributes(resolved) {
            let _ = link.set_attribute(name, &value);
        }
    }

    if let Some(body) = document.body() {
        let _ = body.set_attribute("data-theme", resolved.as_str());
    }
}

/// Re-applies the theme whenever the preference or the OS colour scheme
/// changes.
#[component]
pub fn ThemeApplier() -> impl IntoView {
    let prefs = use_user_preferences();
    let theme = Memo::new(move |_| prefs.get().theme);
    let prefers_dark = RwSignal::new(dark_scheme_query().is_some_and(|mq| mq.matches()));

    if let Some(query) = dark_scheme_query() {
        let on_change = Closure::<dyn FnMut()>::new(move || {
            let matches = dark_scheme_query().is_some_and(|mq| mq.matches());
            prefers_dark.set(matches);
        });
        if query
            .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
            .is_ok()
        {
            let listener = StoredValue::new_local(Some((query, on_change)));
            on_cleanup(move || {
                let Some(Some((query, on_change))) = listener.try_update_value(Option::take) else {
                    return;
                };
                let _ = query
                    .remove_event_listener_with_callback("change", on_change.as_ref().unchecked_ref());
            });
        }
    }

    Effect::new(move |_| apply_theme(theme.get().resolve(prefers_dark.get())));
}

/// Theme selector dropdown component.
#[component]
pub fn ThemeSelector() -> impl IntoView {
    let prefs = use_user_preferences();
    let dropdown_open = RwSignal::new(false);
    let outside_click = StoredValue::new_local(None::<WindowListenerHandle>);

    let close_listener = move || {
        if let Some(Some(handle)) = outside_click.try_update_value(Option::take) {
            handle.remove();
        }
    };

    // One window listener while the dropdown is open, none while closed.
    Effect::new(move |_| {
        close_listener();
        if dropdown_open.get() {
            let handle = window_event_listener(ev::click, move |_| dropdown_open.set(false));
            outside_click.set_value(Some(handle));
        }
    });
    on_cleanup(close_listener);

    let choose = move |theme: Theme| {
        prefs.update(UserPreferencesPatch {
            theme: Some(theme),
            ..Default::default()
        });
        dropdown_open.set(false);
    };

    let options = move || {
        Theme::all()
            .into_iter()
            .map(|theme| {
                let class = move || {
                    if prefs.get().theme == theme {
                        "theme-dropdown-item active"
                    } else {
                        "theme-dropdown-item"
                    }
                };
                view! {
                    <button class=class on:click=move |_| choose(theme)>
                        {display_name(theme)}
                    </button>
                }
            })
            .collect_view()
    };

    view! {
        <div class="theme-selector" style="position: relative;">
            <button
                class="top-header-icon-btn"
                title="Theme"
                on:click=move |ev| {
                    ev.stop_propagation();
                    dropdown_open.update(|open| *open = !*open);
                }
            >
                {move || display_name(prefs.get().theme)}
            </button>
            <Show when=move || dropdown_open.get()>
                <div class="theme-dropdown" on:click=|ev| ev.stop_propagation()>
                    {options()}
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_path() {
        assert_eq!(css_path(Theme::Dark), "/static/themes/dark/dark.css");
        assert_eq!(css_path(Theme::Light), "/static/themes/light/light.css");
    }

    #[test]
    fn test_stylesheet_attributes_for_created_link() {
        let attrs = stylesheet_attributes(Theme::System.resolve(true));

        assert_eq!(attrs[0], ("id", "theme-stylesheet".to_string()));
        assert_eq!(attrs[1], ("rel", "stylesheet".to_string()));
        assert_eq!(attrs[2], ("href", "/static/themes/dark/dark.css".to_string()));
    }
}
