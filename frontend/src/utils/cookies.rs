use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

pub const ACCESS_COOKIE_NAME: &str = "accessToken";

const COOKIE_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b',')
    .add(b';')
    .add(b'\\')
    .add(b'%');

/// Client-visible cookies. The refresh token is http-only and never shows
/// up here.
pub trait CookieStore {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str, max_age_secs: i64);
    /// Expires the cookie immediately (`max-age=-1`).
    fn remove(&self, name: &str);
}

pub fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, COOKIE_VALUE).to_string()
}

pub fn decode_value(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Formats the string assigned to `document.cookie`.
pub fn cookie_assignment(name: &str, value: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; path=/; max-age={}; samesite=lax",
        name,
        encode_value(value),
        max_age_secs
    )
}

pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name && !value.is_empty()).then(|| decode_value(value.trim()))
    })
}

/// In-memory jar used for server rendering and host tests.
#[derive(Clone, Default)]
pub struct MemoryCookies {
    jar: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(name: &str, value: &str) -> Self {
        let cookies = Self::default();
        cookies.set(name, value, 3600);
        cookies
    }
}

impl CookieStore for MemoryCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.jar.borrow().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str, max_age_secs: i64) {
        if max_age_secs <= 0 {
            self.remove(name);
        } else {
            self.jar.borrow_mut().insert(name.to_string(), value.to_string());
        }
    }

    fn remove(&self, name: &str) {
        self.jar.borrow_mut().remove(name);
    }
}

#[cfg(target_arch = "wasm32")]
pub use document::DocumentCookies;

#[cfg(target_arch = "wasm32")]
mod document {
    use super::{cookie_assignment, find_cookie, CookieStore};
    use wasm_bindgen::JsCast;
    use web_sys::HtmlDocument;

    /// Reads and writes `document.cookie`.
    #[derive(Clone, Copy, Default)]
    pub struct DocumentCookies;

    fn html_document() -> Option<HtmlDocument> {
        web_sys::window()?.document()?.dyn_into::<HtmlDocument>().ok()
    }

    fn assign(cookie: &str) {
        match html_document() {
            Some(doc) => {
                if doc.set_cookie(cookie).is_err() {
                    log::warn!("document.cookie rejected an assignment");
                }
            }
            None => log::warn!("document.cookie unavailable"),
        }
    }

    impl CookieStore for DocumentCookies {
        fn get(&self, name: &str) -> Option<String> {
            let header = html_document()?.cookie().ok()?;
            find_cookie(&header, name)
        }

        fn set(&self, name: &str, value: &str, max_age_secs: i64) {
            assign(&cookie_assignment(name, value, max_age_secs));
        }

        fn remove(&self, name: &str) {
            assign(&format!("{}=; path=/; max-age=-1", name));
        }
    }
}

/// Cookie store for the current target.
pub fn platform_cookies() -> Rc<dyn CookieStore> {
    #[cfg(target_arch = "wasm32")]
    {
        Rc::new(DocumentCookies)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Rc::new(MemoryCookies::new())
    }
}
