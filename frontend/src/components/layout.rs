use crate::{
    api::AttendanceStatusResponse,
    state::auth::{use_logout_action, use_session},
    utils::{
        cookies::platform_cookies,
        locale::{
            current_path, locale_of, localized_path, redirect, remember_locale,
            switch_locale_path, SUPPORTED_LOCALES,
        },
    },
};
use leptos::*;

#[component]
pub fn Header() -> impl IntoView {
    let state = use_session().state();
    let display_name = move || state.with(|s| s.user.as_ref().map(|u| u.name.clone()));
    let plan = move || {
        state.with(|s| {
            s.user
                .as_ref()
                .and_then(|u| u.subscription.as_ref())
                .map(|sub| sub.plan.clone())
        })
    };
    let logout_action = use_logout_action();
    let logout_pending = logout_action.pending();
    let login_href = localized_path(&current_path(), "/login");
    create_effect(move |_| {
        if logout_action.value().get().is_some() {
            redirect("/login");
        }
    });
    let on_logout = move |_| {
        if logout_pending.get_untracked() {
            return;
        }
        logout_action.dispatch(());
    };
    view! {
        <header class="bg-surface-elevated shadow-sm border-b border-border">
            <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8">
                <div class="flex justify-between items-center h-16">
                    <h1 class="text-xl font-semibold text-fg">"Studio"</h1>
                    <LocaleSwitcher />
                    <Show
                        when=move || display_name().is_some()
                        fallback=move || view! {
                            <a href=login_href.clone() class="text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium">
                                "Sign in"
                            </a>
                        }
                    >
                        <div class="flex items-center space-x-3">
                            <span class="text-sm text-fg">{display_name}</span>
                            {move || plan().map(|plan| view! {
                                <span class="text-xs uppercase text-fg-muted">{plan}</span>
                            })}
                            <button
                                on:click=on_logout
                                class="text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium disabled:opacity-50 hover:bg-action-ghost-bg-hover"
                                disabled={move || logout_pending.get()}
                            >
                                "Sign out"
                            </button>
                        </div>
                    </Show>
                </div>
            </div>
        </header>
    }
}

/// Buttons for the supported locales. Choosing one is remembered in the
/// locale cookie and reloads the current page under the new prefix.
#[component]
pub fn LocaleSwitcher() -> impl IntoView {
    let path = current_path();
    let active = locale_of(&path);
    SUPPORTED_LOCALES
        .iter()
        .map(|&locale| {
            let target = switch_locale_path(&path, locale);
            let on_select = move |_| {
                remember_locale(platform_cookies().as_ref(), locale);
                if let Some(win) = web_sys::window() {
                    let _ = win.location().set_href(&target);
                }
            };
            view! {
                <button
                    class="text-xs uppercase px-2 py-1 rounded-md text-fg-muted hover:text-fg"
                    class:font-semibold=move || active == Some(locale)
                    on:click=on_select
                >
                    {locale}
                </button>
            }
        })
        .collect_view()
}

#[component]
pub fn Layout(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-surface">
            <Header />
            <main class="max-w-7xl mx-auto py-6 sm:px-6 lg:px-8">{children()}</main>
        </div>
    }
}

/// Today's attendance with a check-in button. Sibling cards share one status
/// request through the client's cache.
#[component]
pub fn AttendanceCard() -> impl IntoView {
    let api = use_session().api().clone();
    let api_for_status = api.clone();
    let status = create_resource(
        || (),
        move |_| {
            let api = api_for_status.clone();
            async move { api.get_attendance_status().await }
        },
    );
    let check_in = create_action(move |_: &()| {
        let api = api.clone();
        async move { api.check_in().await }
    });
    create_effect(move |_| {
        if let Some(Ok(_)) = check_in.value().get() {
            status.refetch();
        }
    });
    view! {
        <section class="rounded-lg border border-border p-4">
            <Suspense fallback=|| view! { <LoadingSpinner /> }>
                {move || status.get().map(|result| match result {
                    Ok(current) => {
                        let label = attendance_label(&current);
                        let attended = current.status == "attended";
                        view! {
                        <p class="text-sm text-fg">{label}</p>
                        <button
                            class="mt-2 px-3 py-2 rounded-md text-sm font-medium bg-action-primary-bg disabled:opacity-50"
                            on:click=move |_| check_in.dispatch(())
                            disabled=move || check_in.pending().get() || attended
                        >
                            "Check in"
                        </button>
                        }.into_view()
                    }
                    Err(err) => view! { <ErrorMessage message=err.error /> }.into_view(),
                })}
            </Suspense>
        </section>
    }
}

fn attendance_label(status: &AttendanceStatusResponse) -> String {
    match status.status.as_str() {
        "attended" => format!("Checked in today, {} day streak", status.consecutive_days),
        _ => "Not checked in yet".to_string(),
    }
}

#[component]
pub fn LoadingSpinner() -> impl IntoView {
    view! {
        <div class="flex justify-center items-center p-8">
            <div class="animate-spin rounded-full h-8 w-8 border-b-2 border-action-primary-bg"></div>
        </div>
    }
}

#[component]
pub fn ErrorMessage(message: String) -> impl IntoView {
    view! {
        <div class="bg-status-error-bg border border-status-error-border text-status-error-text px-4 py-3 rounded mb-4">
            <p class="text-sm">{message}</p>
        </div>
    }
}
