use crate::basic_models::Language;
use crate::knowledge::Bilingual;

/// Fixed interface text shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phrase {
    Language,
    Filters,
    DietaryPref,
    MaxTime,
    Any,
    ChefSecrets,
    NavShopping,
    Clear,
    ShoppingEmpty,
    ShoppingSubtitle,
    FavTitle,
    SuggestedTitle,
    ScanFridge,
    Back,
    Step,
    Listen,
    Reading,
    TimerDone,
    VisualUnavailable,
    VisualLoading,
    SelectKeyPrompt,
    BillingDoc,
    ScanFailed,
    StorageTip,
    Substitutions,
    Servings,
    NoRecipes,
}

impl Phrase {
    fn text(self) -> Bilingual {
        match self {
            Phrase::Language => Bilingual::new("Language", "Bahasa"),
            Phrase::Filters => Bilingual::new("Filters", "Filter"),
            Phrase::DietaryPref => Bilingual::new("Dietary preference", "Preferensi diet"),
            Phrase::MaxTime => Bilingual::new("Max prep time", "Waktu persiapan maks."),
            Phrase::Any => Bilingual::new("Any", "Bebas"),
            Phrase::ChefSecrets => Bilingual::new("Chef's Secrets", "Rahasia Koki"),
            Phrase::NavShopping => Bilingual::new("Shopping List", "Daftar Belanja"),
            Phrase::Clear => Bilingual::new("Clear", "Hapus"),
            Phrase::ShoppingEmpty => {
                Bilingual::new("Your shopping list is empty.", "Daftar belanja Anda kosong.")
            }
            Phrase::ShoppingSubtitle => Bilingual::new(
                "Add missing ingredients from any recipe.",
                "Tambahkan bahan yang kurang dari resep mana pun.",
            ),
            Phrase::FavTitle => Bilingual::new("Your Favorites", "Favorit Anda"),
            Phrase::SuggestedTitle => Bilingual::new("Suggested Recipes", "Resep yang Disarankan"),
            Phrase::ScanFridge => Bilingual::new("Scan your fridge", "Pindai kulkas Anda"),
            Phrase::Back => Bilingual::new("Back", "Kembali"),
            Phrase::Step => Bilingual::new("Step", "Langkah"),
            Phrase::Listen => Bilingual::new("Listen", "Dengarkan"),
            Phrase::Reading => Bilingual::new("Reading...", "Membacakan..."),
            Phrase::TimerDone => Bilingual::new("Time's up!", "Waktu habis!"),
            Phrase::VisualUnavailable => Bilingual::new(
                "Visual guide unavailable for this step.",
                "Panduan visual tidak tersedia untuk langkah ini.",
            ),
            Phrase::VisualLoading => {
                Bilingual::new("Preparing visual guide...", "Menyiapkan panduan visual...")
            }
            Phrase::SelectKeyPrompt => Bilingual::new(
                "A valid Gemini API key is required. Set GEMINI_API_KEY and try again.",
                "Diperlukan kunci API Gemini yang valid. Atur GEMINI_API_KEY lalu coba lagi.",
            ),
            Phrase::BillingDoc => Bilingual::new(
                "Billing documentation: https://ai.google.dev/gemini-api/docs/billing",
                "Dokumentasi tagihan: https://ai.google.dev/gemini-api/docs/billing",
            ),
            Phrase::ScanFailed => Bilingual::new(
                "Error analyzing fridge. Please check your connection or API Key.",
                "Gagal menganalisis kulkas. Periksa koneksi atau kunci API Anda.",
            ),
            Phrase::StorageTip => Bilingual::new("Storage Tip", "Tips Penyimpanan"),
            Phrase::Substitutions => Bilingual::new("Substitutions", "Pengganti"),
            Phrase::Servings => Bilingual::new("Servings", "Porsi"),
            Phrase::NoRecipes => Bilingual::new(
                "No recipes match your filters.",
                "Tidak ada resep yang cocok dengan filter Anda.",
            ),
        }
    }

    pub fn get(self, language: Language) -> &'static str {
        self.text().get(language)
    }
}

/// Shorthand for looking up a phrase.
pub fn t(language: Language, phrase: Phrase) -> &'static str {
    phrase.get(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrases_follow_language() {
        assert_eq!(t(Language::En, Phrase::Step), "Step");
        assert_eq!(t(Language::Id, Phrase::Step), "Langkah");
        assert_eq!(t(Language::Id, Phrase::TimerDone), "Waktu habis!");
    }
}
