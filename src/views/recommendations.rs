use super::toasts::ToastQueue;
use crate::i18n::t;
use crate::recommendations::{Recommendations, RecommendationsHook};
use crate::types::{GenerateParams, Language, RecommendationSet};
use dioxus::prelude::*;

/// Reactive view over [`RecommendationsHook`] for components.
#[derive(Clone, Copy, PartialEq)]
pub struct UseRecommendations {
    hook: Signal<RecommendationsHook<ToastQueue>>,
    pub sets: Signal<Vec<RecommendationSet>>,
    pub loading: Signal<bool>,
    pub generating: Signal<bool>,
}

/// Owns the recommendations state for a component tree.
///
/// Loads on mount and refetches whenever the shared cache entry is
/// invalidated; the action that invalidated it does not wait for that refetch.
pub fn use_recommendations(data: Recommendations, toasts: ToastQueue) -> UseRecommendations {
    let hook = use_signal(|| RecommendationsHook::new(data, toasts));
    let mut sets = use_signal(Vec::<RecommendationSet>::new);
    let mut loading = use_signal(|| false);
    let generating = use_signal(|| false);

    use_future(move || async move {
        let current = hook.read().clone();
        let mut changes = current.data().cache().subscribe();
        loop {
            loading.set(current.data().needs_refetch());
            let list = current.refresh_if_stale().await;
            loading.set(current.loading());
            sets.set(list);
            if changes.changed().await.is_err() {
                break;
            }
        }
    });

    UseRecommendations {
        hook,
        sets,
        loading,
        generating,
    }
}

// Actions run on the root scope: the list that triggers them unmounts with
// the panel, and closing it must not cancel a request halfway.
impl UseRecommendations {
    pub fn generate(&self, params: GenerateParams) {
        let hook = self.hook.read().clone();
        let mut sets = self.sets;
        let mut generating = self.generating;
        generating.set(true);
        spawn_forever(async move {
            if let Err(err) = hook.generate(&params).await {
                tracing::warn!(error = %err, "generate request failed");
            }
            generating.set(hook.generating());
            sets.set(hook.recommendations());
        });
    }

    pub fn delete(&self, id: String) {
        let hook = self.hook.read().clone();
        let mut sets = self.sets;
        spawn_forever(async move {
            hook.delete(&id).await;
            sets.set(hook.recommendations());
        });
    }
}

#[component]
pub fn RecommendationsList(language: Language) -> Element {
    let recs = use_context::<UseRecommendations>();
    let mut goal = use_signal(String::new);

    let sets = (recs.sets)();
    let loading = (recs.loading)();
    let generating = (recs.generating)();

    let generate_label = if generating {
        t(language, "tools.recommendations.generating")
    } else {
        t(language, "tools.recommendations.generate")
    };

    let on_generate = move |_: MouseEvent| {
        let text = goal();
        let text = text.trim();
        let params = if text.is_empty() {
            GenerateParams::default()
        } else {
            GenerateParams::with_goal(text)
        };
        recs.generate(params);
        goal.set(String::new());
    };

    rsx! {
        div { class: "rec-list",
            div { class: "rec-generate section",
                input {
                    r#type: "text",
                    value: "{goal}",
                    placeholder: t(language, "tools.recommendations.goalPlaceholder"),
                    oninput: move |evt| goal.set(evt.value()),
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: generating,
                    onclick: on_generate,
                    "{generate_label}"
                }
            }
            if loading && sets.is_empty() {
                p { class: "text-muted", {t(language, "tools.recommendations.loading")} }
            } else if sets.is_empty() {
                p { class: "text-muted", {t(language, "tools.recommendations.empty")} }
            }
            for set in sets {
                RecommendationSetCard { key: "{set.id}", set: set.clone(), language }
            }
        }
    }
}

#[component]
fn RecommendationSetCard(set: RecommendationSet, language: Language) -> Element {
    let recs = use_context::<UseRecommendations>();
    let set_id = set.id.clone();
    let confidence_label = t(language, "tools.recommendations.confidence");

    rsx! {
        div { class: "rec-set",
            div { class: "panel-header",
                p { "{set.summary}" }
                button {
                    class: "btn",
                    r#type: "button",
                    onclick: move |_| recs.delete(set_id.clone()),
                    {t(language, "tools.recommendations.delete")}
                }
            }
            ul {
                for item in set.items.iter() {
                    li { key: "{item.id}",
                        span { class: "rec-item-title", "{item.title}" }
                        if !item.description.is_empty() {
                            p { "{item.description}" }
                        }
                        span { class: "text-muted", "{confidence_label}: {item.confidence}" }
                    }
                }
            }
        }
    }
}
