use crate::{
    api::{ApiClient, ApiError, User},
    utils::cookies::{platform_cookies, CookieStore, ACCESS_COOKIE_NAME},
};
use leptos::*;
use serde::Deserialize;
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub is_initialized: bool,
    pub is_loading: bool,
    pub is_authenticated: bool,
}

/// Owns the signed-in state. Components read it through [`SessionManager::state`];
/// only the methods below write it.
#[derive(Clone)]
pub struct SessionManager {
    state: RwSignal<SessionState>,
    api: ApiClient,
    cookies: Rc<dyn CookieStore>,
}

impl SessionManager {
    pub fn new(api: ApiClient, cookies: Rc<dyn CookieStore>) -> Self {
        Self {
            state: create_rw_signal(SessionState::default()),
            api,
            cookies,
        }
    }

    pub fn state(&self) -> ReadSignal<SessionState> {
        self.state.read_only()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.get_untracked()
    }

    pub fn user(&self) -> Option<User> {
        self.state.with_untracked(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with_untracked(|s| s.is_authenticated)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.with_untracked(|s| s.is_initialized)
    }

    pub fn is_loading(&self) -> bool {
        self.state.with_untracked(|s| s.is_loading)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Reconciles with the server's view of the session. Without `force`,
    /// repeated calls after the first are no-ops. Failures only surface
    /// when forced; otherwise they mean "not signed in".
    pub async fn initialize(&self, force: bool) -> Result<(), ApiError> {
        if self.is_initialized() && !force {
            self.state.update(|s| s.is_loading = false);
            return Ok(());
        }

        self.state.update(|s| s.is_loading = true);
        let outcome = match self.api.get_me().await {
            Ok(user) => {
                log::debug!("session initialized for user {}", user.id);
                self.state.update(|s| {
                    s.user = Some(user);
                    s.is_authenticated = true;
                });
                Ok(())
            }
            Err(err) => {
                self.state.update(|s| {
                    s.user = None;
                    s.is_authenticated = false;
                });
                if force {
                    Err(err)
                } else {
                    log::debug!("no active session: {}", err);
                    Ok(())
                }
            }
        };

        self.state.update(|s| {
            s.is_initialized = true;
            s.is_loading = false;
        });
        outcome
    }

    /// Adopts a user the server already resolved, skipping the profile fetch.
    pub fn hydrate(&self, user: User) {
        self.state.set(SessionState {
            user: Some(user),
            is_initialized: true,
            is_loading: false,
            is_authenticated: true,
        });
    }

    /// Ends the session. Local state and the access cookie are cleared
    /// before the server is told; that call is best-effort and never holds
    /// the local sign-out back.
    pub async fn logout(&self) {
        self.end_local_session();
        if let Err(err) = self.api.logout().await {
            log::warn!("logout request failed: {}", err);
        }
    }

    /// Reaction to auth-failure: drops an authenticated session at once and
    /// returns true when the caller should follow up with [`Self::logout`].
    pub fn expire(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        self.end_local_session();
        true
    }

    fn end_local_session(&self) {
        self.cookies.remove(ACCESS_COOKIE_NAME);
        self.state.update(|s| {
            s.user = None;
            s.is_authenticated = false;
            s.is_loading = false;
        });
    }
}

/// Subscribes `manager` to the client's auth-failure signal. `spawn` runs
/// the follow-up server logout.
pub fn watch_auth_failures(manager: &SessionManager, spawn: impl Fn(SessionManager) + 'static) {
    let watched = manager.clone();
    manager.api().auth_failure().subscribe(move || {
        if watched.expire() {
            spawn(watched.clone());
        }
    });
}

pub fn use_logout_action() -> Action<(), ()> {
    let session = use_session();
    create_action(move |_: &()| {
        let session = session.clone();
        async move { session.logout().await }
    })
}

pub fn use_session() -> SessionManager {
    use_context::<SessionManager>().unwrap_or_else(|| {
        let api = use_context::<ApiClient>().unwrap_or_default();
        SessionManager::new(api, platform_cookies())
    })
}

/// Id of the JSON script the app server embeds in the page shell.
pub const SESSION_SCRIPT_ID: &str = "studio-session";

#[derive(Deserialize)]
struct EmbeddedSession {
    user: Option<User>,
}

/// User the app server resolved while rendering the page, if any. Feeds
/// `AuthProvider`'s hydrate path.
pub fn server_resolved_user() -> Option<User> {
    embedded::session_text().and_then(|text| parse_embedded_session(&text))
}

fn parse_embedded_session(text: &str) -> Option<User> {
    match serde_json::from_str::<EmbeddedSession>(text) {
        Ok(session) => session.user,
        Err(err) => {
            log::warn!("ignoring malformed embedded session: {}", err);
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod embedded {
    pub fn session_text() -> Option<String> {
        web_sys::window()?
            .document()?
            .get_element_by_id(super::SESSION_SCRIPT_ID)?
            .text_content()
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod embedded {
    pub fn session_text() -> Option<String> {
        None
    }
}
