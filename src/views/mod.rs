pub mod panel;
pub mod recommendations;
pub mod settings;
pub mod toasts;

pub use panel::{InfoTip, PanelContainer, RecommendationsPanel};
pub use recommendations::{RecommendationsList, UseRecommendations, use_recommendations};
pub use settings::SettingsView;
pub use toasts::{Toast, ToastQueue, Toasts};
