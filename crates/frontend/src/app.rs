use crate::shared::state::GlobalStateProvider;
use crate::shared::theme::{ThemeApplier, ThemeSelector};
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    // Global preference/selection store, loaded from localStorage once per tab.
    view! {
        <GlobalStateProvider>
            <ThemeApplier />
            <header class="top-header">
                <ThemeSelector />
            </header>
        </GlobalStateProvider>
    }
}
