use crate::types::Theme;

pub struct ThemeDefinition {
    pub css: String,
}

pub fn theme_definition(theme: Theme) -> ThemeDefinition {
    let color_scheme = match theme {
        Theme::Light => "light",
        Theme::Dark => "dark",
        Theme::System => "light dark",
    };
    let vars = match theme {
        Theme::Light => format!(":root {{ {LIGHT_VARS} }}"),
        Theme::Dark => format!(":root {{ {DARK_VARS} }}"),
        Theme::System => format!(
            ":root {{ {LIGHT_VARS} }}\n@media (prefers-color-scheme: dark) {{ :root {{ {DARK_VARS} }} }}"
        ),
    };
    // native controls and scrollbars follow the same scheme
    let css = format!(":root {{ color-scheme: {color_scheme}; }}\n{vars}\n{BASE_RULES}");
    ThemeDefinition { css }
}

const LIGHT_VARS: &str = "
    --color-bg-primary: #ffffff;
    --color-bg-panel: #f7f7f8;
    --color-text-primary: #111111;
    --color-text-muted: #5f6368;
    --color-border: #d9d9de;
    --color-accent: #2563eb;
    --color-toast-bg: #ffffff;
    --color-toast-error: #b91c1c;
";

const DARK_VARS: &str = "
    --color-bg-primary: #0b0b0c;
    --color-bg-panel: #17171a;
    --color-text-primary: #f4f4f5;
    --color-text-muted: #a1a1aa;
    --color-border: #2e2e33;
    --color-accent: #60a5fa;
    --color-toast-bg: #1f1f23;
    --color-toast-error: #f87171;
";

const BASE_RULES: &str = r#"
body { background: var(--color-bg-primary); color: var(--color-text-primary); font-family: system-ui, sans-serif; }
.panel { background: var(--color-bg-panel); border: 1px solid var(--color-border); border-radius: 12px; padding: 1.25rem; max-width: 640px; }
.panel-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 1rem; }
.panel-body { font-size: 15px; line-height: 1.7; }
.section { margin-bottom: 1rem; }
.info { color: var(--color-text-muted); cursor: help; margin-left: 0.5rem; }
.text-muted { color: var(--color-text-muted); font-size: 0.875rem; }
.btn { border: 1px solid var(--color-border); background: transparent; color: inherit; border-radius: 6px; padding: 0.25rem 0.75rem; cursor: pointer; }
.btn-primary { border-color: var(--color-accent); color: var(--color-accent); }
.rec-set { border-top: 1px solid var(--color-border); padding: 0.75rem 0; }
.rec-item-title { font-weight: 600; }
.toasts { position: fixed; bottom: 1rem; right: 1rem; display: flex; flex-direction: column; gap: 0.5rem; }
.toast { background: var(--color-toast-bg); border: 1px solid var(--color-border); border-radius: 8px; padding: 0.75rem 1rem; }
.toast.destructive { border-color: var(--color-toast-error); color: var(--color-toast-error); }
.option.active { border-color: var(--color-accent); }
"#;
