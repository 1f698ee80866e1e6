#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod ssr;

#[cfg(test)]
pub mod helpers {
    use crate::api::{ApiClient, SubscriptionRef, User};
    use crate::state::auth::SessionManager;
    use crate::utils::cookies::MemoryCookies;
    use leptos::*;
    use std::rc::Rc;

    /// Runs `test` inside a fresh reactive runtime and tears it down after.
    pub fn with_runtime<T>(test: impl FnOnce() -> T) -> T {
        let runtime = create_runtime();
        let result = test();
        runtime.dispose();
        result
    }

    pub fn member_user() -> User {
        User {
            id: 11,
            email: "member@studio.test".into(),
            name: "Member".into(),
            roles: vec!["member".into()],
            subscription: None,
        }
    }

    pub fn creator_user() -> User {
        User {
            id: 12,
            email: "creator@studio.test".into(),
            name: "Creator".into(),
            roles: vec!["member".into(), "creator".into()],
            subscription: Some(SubscriptionRef {
                id: "sub_12".into(),
                plan: "pro".into(),
                status: "active".into(),
            }),
        }
    }

    /// Provides an initialized session: signed in as `user`, or anonymous.
    pub fn provide_session(user: Option<User>) -> SessionManager {
        let api = ApiClient::new_with_base_url(
            "http://127.0.0.1:9/api",
            "http://127.0.0.1:9/auth/reissue",
        );
        let session = SessionManager::new(api, Rc::new(MemoryCookies::new()));
        match user {
            Some(user) => session.hydrate(user),
            None => {
                session.hydrate(member_user());
                session.expire();
            }
        }
        provide_context(session.clone());
        session
    }
}
