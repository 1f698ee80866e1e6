use std::{cell::RefCell, rc::Rc};

type Listener = Rc<dyn Fn()>;

/// Raised by the API client when a request is still unauthorized after a
/// reissue attempt. Clones share one listener list.
#[derive(Clone, Default)]
pub struct AuthFailureHook {
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl AuthFailureHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn notify(&self) {
        // Listeners may subscribe or notify again; never call them under the borrow.
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        log::debug!("auth-failure raised ({} listeners)", listeners.len());
        for listener in listeners {
            listener();
        }
    }
}
