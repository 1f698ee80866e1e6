use leptos::*;
use leptos_router::*;

use crate::{
    components::{
        guard::{AuthProvider, AuthProviderProps, RequireAuth, RequireRole},
        layout::{AttendanceCard, Layout},
    },
    state::auth::server_resolved_user,
};

/// App paths without their `/<locale>` prefix.
pub const ROUTE_PATHS: &[&str] = &["/", "/login", "/studio", "/account", "/creator"];

pub const PROTECTED_ROUTE_PATHS: &[&str] = &["/account", "/creator"];

pub const PUBLIC_ROUTE_PATHS: &[&str] = &["/", "/login", "/studio"];

pub fn mount_app() {
    mount_to_body(app_root);
}

pub fn app_root() -> impl IntoView {
    provide_context(crate::api::ApiClient::new());
    let user = server_resolved_user();
    // `user` is an `Option<User>`; the `optional` prop's builder setter strips
    // the `Option`, so build the props directly to pass it through as-is.
    AuthProvider(AuthProviderProps {
        user,
        children: Box::new(move || view! {
            <Router>
                <Routes>
                    <Route path="/:locale" view=LocalizedShell>
                        <Route path="" view=HomePage/>
                        <Route path="login" view=LoginPage/>
                        <Route path="studio" view=StudioPage/>
                        <Route path="account" view=ProtectedAccount/>
                        <Route path="creator" view=ProtectedCreator/>
                    </Route>
                </Routes>
            </Router>
        }.into()),
    })
}

/// Every page sits under its locale segment.
#[component]
fn LocalizedShell() -> impl IntoView {
    view! { <Layout><Outlet/></Layout> }
}

#[component]
fn HomePage() -> impl IntoView {
    view! { <A href="account">"Go to your account"</A> }
}

/// Sign-in is served by the auth provider; this page only links out.
#[component]
fn LoginPage() -> impl IntoView {
    view! { <a href="/auth/login">"Sign in"</a> }
}

#[component]
fn StudioPage() -> impl IntoView {
    view! { <p>"Creator tools need a creator membership."</p> }
}

#[component]
fn ProtectedAccount() -> impl IntoView {
    view! { <RequireAuth><AttendanceCard/></RequireAuth> }
}

#[component]
fn ProtectedCreator() -> impl IntoView {
    view! {
        <RequireRole role="creator">
            <AttendanceCard/>
        </RequireRole>
    }
}
