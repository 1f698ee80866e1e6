use crate::{
    api::{ApiClient, User},
    components::layout::LoadingSpinner,
    state::auth::{use_session, watch_auth_failures, SessionManager, SessionState},
    utils::{cookies::platform_cookies, locale::redirect},
};
use leptos::*;

const LOGIN_PATH: &str = "/login";
const NON_MEMBER_PATH: &str = "/studio";

/// Composition root for the session. Pass `user` when a server render already
/// resolved it; otherwise the session is fetched after mount.
#[component]
pub fn AuthProvider(#[prop(optional, into)] user: Option<User>, children: Children) -> impl IntoView {
    let api = use_context::<ApiClient>().unwrap_or_else(ApiClient::new);
    let session = SessionManager::new(api, platform_cookies());
    watch_auth_failures(&session, |expired| {
        spawn_local(async move { expired.logout().await });
    });
    provide_context(session.clone());

    match user {
        Some(user) => session.hydrate(user),
        None => spawn_local(async move {
            let _ = session.initialize(false).await;
        }),
    }

    view! { <>{children()}</> }
}

#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let state = use_session().state();
    let pending = create_memo(move |_| state.with(is_pending));
    let allowed = create_memo(move |_| state.with(|s| should_render_children(s, None)));
    create_effect(move |_| {
        if let Some(target) = state.with(|s| redirect_target(s, None)) {
            redirect(target);
        }
    });
    view! {
        <Show
            when=move || allowed.get()
            fallback=move || {
                if pending.get() {
                    view! { <LoadingSpinner /> }.into_view()
                } else {
                    ().into_view()
                }
            }
        >
            {children()}
        </Show>
    }
}

#[component]
pub fn RequireRole(#[prop(into)] role: String, children: ChildrenFn) -> impl IntoView {
    let state = use_session().state();
    let pending = create_memo(move |_| state.with(is_pending));
    let required = role.clone();
    let allowed =
        create_memo(move |_| state.with(|s| should_render_children(s, Some(required.as_str()))));
    create_effect(move |_| {
        if let Some(target) = state.with(|s| redirect_target(s, Some(role.as_str()))) {
            redirect(target);
        }
    });
    view! {
        <Show
            when=move || allowed.get()
            fallback=move || {
                if pending.get() {
                    view! { <LoadingSpinner /> }.into_view()
                } else {
                    ().into_view()
                }
            }
        >
            {children()}
        </Show>
    }
}

fn is_pending(state: &SessionState) -> bool {
    !state.is_initialized || state.is_loading
}

fn has_role(state: &SessionState, role: Option<&str>) -> bool {
    match role {
        None => true,
        Some(role) => state.user.as_ref().is_some_and(|u| u.has_role(role)),
    }
}

fn should_render_children(state: &SessionState, role: Option<&str>) -> bool {
    !is_pending(state) && state.is_authenticated && has_role(state, role)
}

fn redirect_target(state: &SessionState, role: Option<&str>) -> Option<&'static str> {
    if is_pending(state) {
        None
    } else if !state.is_authenticated {
        Some(LOGIN_PATH)
    } else if !has_role(state, role) {
        Some(NON_MEMBER_PATH)
    } else {
        None
    }
}
