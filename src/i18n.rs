use crate::types::Language;
use once_cell::sync::Lazy;
use std::collections::HashMap;

type Table = HashMap<&'static str, &'static str>;

const EN: &[(&str, &str)] = &[
    ("tools.recommendations.title", "Recommendations"),
    ("tools.recommendations.listTitle", "Your recommendations"),
    (
        "tools.recommendations.listTooltip",
        "Suggestions generated from your latest financial analysis.",
    ),
    ("tools.recommendations.additionalInsights", "Additional insights"),
    (
        "tools.recommendations.additionalInsightsTooltip",
        "Context that helps you weigh each recommendation.",
    ),
    (
        "tools.recommendations.additionalInsightsDesc",
        "Recommendations improve as you add more transactions and complete new analyses.",
    ),
    ("tools.recommendations.empty", "No recommendations yet."),
    ("tools.recommendations.loading", "Loading recommendations…"),
    ("tools.recommendations.generate", "Generate"),
    ("tools.recommendations.generating", "Generating…"),
    ("tools.recommendations.goalPlaceholder", "What do you want to achieve?"),
    ("tools.recommendations.delete", "Delete"),
    ("tools.recommendations.confidence", "Confidence"),
    ("common.close", "Close"),
    ("settings.title", "Settings"),
    ("settings.theme", "Theme"),
    ("settings.theme.light", "Light"),
    ("settings.theme.dark", "Dark"),
    ("settings.theme.system", "System"),
    ("settings.language", "Language"),
];

const ID: &[(&str, &str)] = &[
    ("tools.recommendations.title", "Rekomendasi"),
    ("tools.recommendations.listTitle", "Rekomendasi Anda"),
    (
        "tools.recommendations.listTooltip",
        "Saran yang dibuat dari analisis keuangan terbaru Anda.",
    ),
    ("tools.recommendations.additionalInsights", "Wawasan tambahan"),
    (
        "tools.recommendations.additionalInsightsTooltip",
        "Konteks yang membantu Anda menilai setiap rekomendasi.",
    ),
    (
        "tools.recommendations.additionalInsightsDesc",
        "Rekomendasi makin akurat seiring Anda menambah transaksi dan menyelesaikan analisis baru.",
    ),
    ("tools.recommendations.empty", "Belum ada rekomendasi."),
    ("tools.recommendations.loading", "Memuat rekomendasi…"),
    ("tools.recommendations.generate", "Buat"),
    ("tools.recommendations.generating", "Membuat…"),
    ("tools.recommendations.goalPlaceholder", "Apa yang ingin Anda capai?"),
    ("tools.recommendations.delete", "Hapus"),
    ("tools.recommendations.confidence", "Keyakinan"),
    ("common.close", "Tutup"),
    ("settings.title", "Pengaturan"),
    ("settings.theme", "Tema"),
    ("settings.theme.light", "Terang"),
    ("settings.theme.dark", "Gelap"),
    ("settings.theme.system", "Sistem"),
    ("settings.language", "Bahasa"),
];

static TABLES: Lazy<HashMap<Language, Table>> = Lazy::new(|| {
    HashMap::from([
        (Language::En, EN.iter().copied().collect()),
        (Language::Id, ID.iter().copied().collect()),
    ])
});

/// Look up `key` for `language`, falling back to English and then to the key itself.
pub fn t(language: Language, key: &'static str) -> &'static str {
    let lookup = |lang: Language| TABLES.get(&lang).and_then(|table| table.get(key)).copied();
    lookup(language)
        .or_else(|| lookup(Language::En))
        .unwrap_or(key)
}
