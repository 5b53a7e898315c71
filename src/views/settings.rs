use crate::i18n::t;
use crate::types::{Language, Theme, UserSettings};
use dioxus::prelude::*;

#[component]
pub fn SettingsView(
    mut settings: Signal<UserSettings>,
    on_change: EventHandler<UserSettings>,
) -> Element {
    let current = settings();
    let language = current.language;

    let mut apply = move |next: UserSettings| {
        settings.set(next.clone());
        on_change.call(next);
    };

    rsx! {
        div { class: "panel",
            h2 { {t(language, "settings.title")} }
            div { class: "section",
                h3 { {t(language, "settings.theme")} }
                for (theme, key) in [
                    (Theme::Light, "settings.theme.light"),
                    (Theme::Dark, "settings.theme.dark"),
                    (Theme::System, "settings.theme.system"),
                ] {
                    button {
                        key: "{key}",
                        class: option_class(current.theme == theme),
                        r#type: "button",
                        onclick: move |_| apply(settings().with_theme(theme)),
                        {t(language, key)}
                    }
                }
            }
            div { class: "section",
                h3 { {t(language, "settings.language")} }
                for option in [Language::En, Language::Id] {
                    button {
                        key: "{option.code()}",
                        class: option_class(language == option),
                        r#type: "button",
                        onclick: move |_| apply(settings().with_language(option)),
                        "{option.label()}"
                    }
                }
            }
        }
    }
}

fn option_class(active: bool) -> &'static str {
    if active { "btn option active" } else { "btn option" }
}
