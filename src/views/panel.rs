use super::recommendations::RecommendationsList;
use crate::i18n::t;
use crate::types::Language;
use dioxus::prelude::*;

#[component]
pub fn PanelContainer(
    title: &'static str,
    close_label: &'static str,
    on_close: EventHandler,
    children: Element,
) -> Element {
    rsx! {
        section { class: "panel",
            div { class: "panel-header",
                h2 { "{title}" }
                button {
                    class: "btn",
                    r#type: "button",
                    aria_label: close_label,
                    onclick: move |_| on_close.call(()),
                    "✕"
                }
            }
            {children}
        }
    }
}

#[component]
pub fn InfoTip(text: &'static str) -> Element {
    rsx! {
        span { class: "info", title: text, "ⓘ" }
    }
}

/// Recommendations plus explanatory copy in a dismissible panel.
/// Renders nothing while closed.
#[component]
pub fn RecommendationsPanel(open: bool, on_close: EventHandler, language: Language) -> Element {
    if !open {
        return rsx! {};
    }

    let title = t(language, "tools.recommendations.title");
    let list_title = t(language, "tools.recommendations.listTitle");
    let insights_title = t(language, "tools.recommendations.additionalInsights");
    let insights_desc = t(language, "tools.recommendations.additionalInsightsDesc");

    rsx! {
        PanelContainer {
            title,
            close_label: t(language, "common.close"),
            on_close,
            div { class: "panel-body",
                div { class: "section",
                    div { class: "panel-header",
                        h3 { "{list_title}" }
                        InfoTip { text: t(language, "tools.recommendations.listTooltip") }
                    }
                    RecommendationsList { language }
                }
                div { class: "section",
                    h4 {
                        "{insights_title}"
                        InfoTip { text: t(language, "tools.recommendations.additionalInsightsTooltip") }
                    }
                    p { class: "text-muted", "{insights_desc}" }
                }
            }
        }
    }
}
