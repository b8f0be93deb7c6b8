//! Static kitchen knowledge used when the generative service is not consulted.
use crate::basic_models::{Language, Tip};
use rand::seq::SliceRandom;

/// Text available in both languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bilingual {
    pub en: &'static str,
    pub id: &'static str,
}

impl Bilingual {
    pub const fn new(en: &'static str, id: &'static str) -> Self {
        Self { en, id }
    }

    pub fn get(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.en,
            Language::Id => self.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientInfo {
    pub storage: Bilingual,
    pub substitute: Option<Bilingual>,
}

const EGG: IngredientInfo = IngredientInfo {
    storage: Bilingual::new(
        "Store in the main body of the fridge.",
        "Simpan di bagian tengah kulkas.",
    ),
    substitute: Some(Bilingual::new(
        "Applesauce or silken tofu (for baking).",
        "Saus apel atau tahu sutra (untuk kue).",
    )),
};

const MILK: IngredientInfo = IngredientInfo {
    storage: Bilingual::new(
        "Keep in the coldest part of the fridge.",
        "Simpan di bagian paling dingin.",
    ),
    substitute: Some(Bilingual::new(
        "Almond or oat milk.",
        "Susu almond atau gandum.",
    )),
};

const GARLIC: IngredientInfo = IngredientInfo {
    storage: Bilingual::new(
        "Store in a cool, dark, dry place with good ventilation.",
        "Simpan di tempat sejuk, gelap, dan kering dengan ventilasi baik.",
    ),
    substitute: Some(Bilingual::new(
        "Shallots or garlic powder.",
        "Bawang merah atau bubuk bawang putih.",
    )),
};

const BUTTER: IngredientInfo = IngredientInfo {
    storage: Bilingual::new(
        "Keep refrigerated in its original wrap.",
        "Simpan di kulkas dengan pembungkus aslinya.",
    ),
    substitute: Some(Bilingual::new(
        "Margarine or coconut oil.",
        "Margarin atau minyak kelapa.",
    )),
};

const GENERIC: IngredientInfo = IngredientInfo {
    storage: Bilingual::new("Store in airtight container.", "Simpan di wadah kedap udara."),
    substitute: None,
};

/// Storage tip and substitution for an ingredient, matched on its exact lowercase name.
pub fn ingredient_info(name: &str) -> IngredientInfo {
    match name.trim().to_lowercase().as_str() {
        "egg" | "telur" => EGG,
        "milk" | "susu" => MILK,
        "garlic" | "bawang putih" => GARLIC,
        "butter" | "mentega" => BUTTER,
        _ => GENERIC,
    }
}

struct StaticTip {
    keywords_en: &'static [&'static str],
    keywords_id: &'static [&'static str],
    title: Bilingual,
    content: Bilingual,
}

impl StaticTip {
    fn matches(&self, context: &[String]) -> bool {
        self.keywords_en
            .iter()
            .chain(self.keywords_id)
            .any(|keyword| context.iter().any(|ctx| ctx.contains(keyword)))
    }

    fn render(&self, language: Language) -> Tip {
        Tip {
            title: self.title.get(language).to_string(),
            content: self.content.get(language).to_string(),
        }
    }
}

const STATIC_TIPS: &[StaticTip] = &[
    StaticTip {
        keywords_en: &["garlic"],
        keywords_id: &["bawang putih"],
        title: Bilingual::new("Garlic Hack", "Trik Bawang Putih"),
        content: Bilingual::new(
            "Crush garlic cloves with the flat side of your knife to make peeling effortless.",
            "Geprek bawang putih dengan sisi datar pisau agar lebih mudah dikupas.",
        ),
    },
    StaticTip {
        keywords_en: &["egg"],
        keywords_id: &["telur"],
        title: Bilingual::new("Egg Float Test", "Tes Kesegaran Telur"),
        content: Bilingual::new(
            "Fresh eggs sink; old eggs float. Check yours in a bowl of water before cracking!",
            "Telur segar akan tenggelam; telur lama akan mengapung. Cek dulu sebelum dimasak!",
        ),
    },
    StaticTip {
        keywords_en: &["chicken", "meat", "beef"],
        keywords_id: &["ayam", "daging", "sapi"],
        title: Bilingual::new("Perfect Sear", "Teknik Menumis"),
        content: Bilingual::new(
            "Always pat meat dry with a paper towel before cooking to get a golden-brown crust.",
            "Selalu keringkan daging dengan tisu dapur sebelum dimasak agar mendapat kerak kecokelatan yang sempurna.",
        ),
    },
    StaticTip {
        keywords_en: &["herb", "parsley", "cilantro", "basil"],
        keywords_id: &["herba", "seledri", "daun", "kemangi"],
        title: Bilingual::new("Herb Life", "Kesegaran Herba"),
        content: Bilingual::new(
            "Store fresh herbs like a bouquet of flowers in a glass of water to keep them crisp.",
            "Simpan herba segar seperti buket bunga dalam segelas air agar tetap renyah.",
        ),
    },
    StaticTip {
        keywords_en: &["onion"],
        keywords_id: &["bawang bombay"],
        title: Bilingual::new("No More Tears", "Tanpa Air Mata"),
        content: Bilingual::new(
            "Chilling onions in the fridge for 15 minutes before cutting reduces eye irritation.",
            "Dinginkan bawang di kulkas selama 15 menit sebelum dipotong untuk mengurangi iritasi mata.",
        ),
    },
    StaticTip {
        keywords_en: &["soup", "salty", "potato"],
        keywords_id: &["sup", "asin", "kentang"],
        title: Bilingual::new("Salty Soup Fix", "Solusi Sup Terlalu Asin"),
        content: Bilingual::new(
            "If a soup is too salty, drop in a raw potato; it will absorb some of the excess salt.",
            "Jika sup terlalu asin, masukkan kentang mentah; kentang akan menyerap sebagian kelebihan garam.",
        ),
    },
    StaticTip {
        keywords_en: &["knife", "cut", "slice"],
        keywords_id: &["pisau", "potong", "iris"],
        title: Bilingual::new("Knife Safety", "Keamanan Pisau"),
        content: Bilingual::new(
            "A sharp knife is safer than a dull one. It requires less pressure and is less likely to slip.",
            "Pisau tajam lebih aman daripada pisau tumpul. Memerlukan lebih sedikit tekanan dan jarang meleset.",
        ),
    },
];

/// How many tips the fallback always shows.
pub const FALLBACK_TIP_COUNT: usize = 2;

/// Pick static tips relevant to the context strings, topped up at random.
///
/// The context is lowercased here; pass ingredient names and recipe titles as-is.
pub fn fallback_tips(context: &[String], language: Language) -> Vec<Tip> {
    let context: Vec<String> = context.iter().map(|c| c.to_lowercase()).collect();
    let (matched, mut unmatched): (Vec<&StaticTip>, Vec<&StaticTip>) =
        STATIC_TIPS.iter().partition(|tip| tip.matches(&context));

    let mut chosen: Vec<&StaticTip> = matched.into_iter().take(FALLBACK_TIP_COUNT).collect();
    if chosen.len() < FALLBACK_TIP_COUNT {
        unmatched.shuffle(&mut rand::thread_rng());
        chosen.extend(unmatched.into_iter().take(FALLBACK_TIP_COUNT - chosen.len()));
    }
    chosen.into_iter().map(|tip| tip.render(language)).collect()
}
