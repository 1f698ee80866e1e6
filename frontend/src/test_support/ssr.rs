use leptos::*;

use super::helpers::with_runtime;

/// Server-renders `view` to HTML. Resources stay unloaded so components that
/// fetch on mount render their fallback.
pub fn render_to_string<F, N>(view: F) -> String
where
    F: FnOnce() -> N + 'static,
    N: IntoView + 'static,
{
    leptos_reactive::suppress_resource_load(true);
    let html = with_runtime(|| view().into_view().render_to_string().to_string());
    leptos_reactive::suppress_resource_load(false);
    html
}
