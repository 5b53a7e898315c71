use crate::notify::{Notice, Notifier};
use dioxus::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const TOAST_TTL: Duration = Duration::from_secs(5);

static TOAST_IDS: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub notice: Notice,
}

/// Notifier that feeds the on-screen toast stack.
#[derive(Clone, Copy, PartialEq)]
pub struct ToastQueue(pub Signal<Vec<Toast>>);

impl ToastQueue {
    pub fn dismiss(&self, id: u64) {
        let mut toasts = self.0;
        toasts.write().retain(|toast| toast.id != id);
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, notice: Notice) {
        let id = TOAST_IDS.fetch_add(1, Ordering::Relaxed);
        let mut toasts = self.0;
        toasts.write().push(Toast { id, notice });

        let queue = *self;
        spawn(async move {
            tokio::time::sleep(TOAST_TTL).await;
            queue.dismiss(id);
        });
    }
}

#[component]
pub fn Toasts(queue: ToastQueue) -> Element {
    let toasts = (queue.0)();
    rsx! {
        div { class: "toasts",
            for toast in toasts {
                div {
                    key: "{toast.id}",
                    class: toast_class(&toast.notice),
                    onclick: move |_| queue.dismiss(toast.id),
                    strong { "{toast.notice.title}" }
                    p { class: "text-muted", "{toast.notice.description}" }
                }
            }
        }
    }
}

fn toast_class(notice: &Notice) -> &'static str {
    if notice.is_error() {
        "toast destructive"
    } else {
        "toast"
    }
}
