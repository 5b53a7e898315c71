use crate::app::services;
use crate::i18n::t;
use crate::schema::Database;
use crate::theme::theme_definition;
use crate::types::{Theme, UserSettings};
use crate::views::{RecommendationsPanel, SettingsView, ToastQueue, Toasts, use_recommendations};
use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OpenPanel {
    None,
    Recommendations,
    Settings,
}

#[component]
pub fn App() -> Element {
    if services().is_none() {
        return rsx! {
            p { "finsight has not been configured." }
        };
    }
    rsx! {
        Shell {}
    }
}

#[component]
fn Shell() -> Element {
    let Some(services) = services() else {
        return rsx! {};
    };
    let user_id = services
        .recommendations
        .user()
        .map(|user| user.id.clone())
        .unwrap_or_default();

    let toasts = ToastQueue(use_signal(Vec::new));
    let recs = use_recommendations(services.recommendations.clone(), toasts);
    use_context_provider(|| recs);

    let settings = use_signal(|| UserSettings::for_user(user_id.clone()));
    let mut open = use_signal(|| OpenPanel::Recommendations);
    use_stored_settings(services.db.clone(), user_id, settings);

    let current = settings();
    let language = current.language;
    let definition = theme_definition(current.theme);
    let db = services.db.clone();

    rsx! {
        style { dangerous_inner_html: "{definition.css}" }
        header { class: "panel-header",
            h1 { "finsight" }
            nav {
                button {
                    class: "btn",
                    r#type: "button",
                    onclick: move |_| open.set(OpenPanel::Recommendations),
                    {t(language, "tools.recommendations.title")}
                }
                button {
                    class: "btn",
                    r#type: "button",
                    onclick: move |_| open.set(OpenPanel::Settings),
                    {t(language, "settings.title")}
                }
            }
        }
        RecommendationsPanel {
            open: open() == OpenPanel::Recommendations,
            on_close: move |_| open.set(OpenPanel::None),
            language,
        }
        if open() == OpenPanel::Settings {
            SettingsView {
                settings,
                on_change: move |next: UserSettings| persist_settings(db.clone(), next),
            }
        }
        Toasts { queue: toasts }
    }
}

/// Replace the default settings with the stored profile once it loads.
fn use_stored_settings(db: Option<Database>, user_id: String, mut settings: Signal<UserSettings>) {
    use_future(move || {
        let db = db.clone();
        let user_id = user_id.clone();
        async move {
            let Some(db) = db else { return };
            if user_id.is_empty() {
                return;
            }
            match db.get_user(&user_id).await {
                Ok(Some(user)) => settings.set(user.settings()),
                Ok(None) => tracing::debug!(%user_id, "no stored profile; using default settings"),
                Err(err) => tracing::warn!(%user_id, error = %err, "failed to load settings"),
            }
        }
    });
}

fn persist_settings(db: Option<Database>, next: UserSettings) {
    let Some(db) = db else { return };
    if next.user_id.is_empty() {
        return;
    }
    spawn(async move {
        let dark_mode = next.theme == Theme::Dark;
        if let Err(err) = db
            .update_user_preferences(&next.user_id, dark_mode, next.language)
            .await
        {
            tracing::warn!(user_id = %next.user_id, error = %err, "failed to save settings");
        }
    });
}
