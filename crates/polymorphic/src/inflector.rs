//! Naming inflection - Singular/plural forms used to derive default column and table names

/// Irregular (singular, plural) pairs checked before the suffix rules
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
    ("movie", "movies"),
    ("bus", "buses"),
    ("status", "statuses"),
    ("alias", "aliases"),
];

/// Stems whose `-ses` plural comes from a `-sis` singular
const SIS_STEMS: &[&str] = &["analy", "diagno", "parenthe", "progno", "synop", "the"];

/// Plurals of words that already end in `oe`
fn is_oe_plural(lower: &str) -> bool {
    matches!(lower, "does" | "foes" | "hoes" | "roes" | "toes" | "woes")
        || ["shoes", "canoes", "oboes", "floes", "tiptoes"]
            .iter()
            .any(|suffix| lower.ends_with(suffix))
}

/// Words whose singular and plural forms are identical
const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "fish",
    "information",
    "media",
    "metadata",
    "news",
    "series",
    "sheep",
    "species",
];

/// Converts names between singular and plural forms
pub trait Inflector: Send + Sync {
    /// Singular form of `word`
    fn singularize(&self, word: &str) -> String;

    /// Plural form of `word`
    fn pluralize(&self, word: &str) -> String;
}

/// English-centric inflector with a small irregular table
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

impl Inflector for EnglishInflector {
    fn singularize(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if UNCOUNTABLE.contains(&lower.as_str()) {
            return word.to_string();
        }
        if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == lower) {
            return (*singular).to_string();
        }
        if IRREGULAR.iter().any(|(singular, _)| *singular == lower) {
            return word.to_string();
        }

        if let Some(stem) = lower.strip_suffix("ses").filter(|stem| SIS_STEMS.iter().any(|s| stem.ends_with(s))) {
            format!("{}sis", &word[..stem.len()])
        } else if lower.ends_with("quizzes") {
            word[..word.len() - 3].to_string()
        } else if lower.ends_with("oes") && !is_oe_plural(&lower) {
            word[..word.len() - 2].to_string()
        } else if lower.len() > 3 && lower.ends_with("ies") && !ends_with_vowel_before(&lower, 3) {
            format!("{}y", &word[..word.len() - 3])
        } else if lower.ends_with("sses")
            || lower.ends_with("ches")
            || lower.ends_with("shes")
            || lower.ends_with("xes")
            || lower.ends_with("zes")
        {
            word[..word.len() - 2].to_string()
        } else if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
            word.to_string()
        } else if lower.ends_with('s') && lower.len() > 1 {
            word[..word.len() - 1].to_string()
        } else {
            word.to_string()
        }
    }

    fn pluralize(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if UNCOUNTABLE.contains(&lower.as_str()) {
            return word.to_string();
        }
        if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
            return (*plural).to_string();
        }

        if let Some(stem) = lower.strip_suffix("sis") {
            format!("{}ses", &word[..stem.len()])
        } else if lower.ends_with("iz") && !lower.ends_with("zz") {
            format!("{}zes", word)
        } else if lower.ends_with('y') && lower.len() > 1 && !ends_with_vowel_before(&lower, 1) {
            format!("{}ies", &word[..word.len() - 1])
        } else if lower.ends_with('s')
            || lower.ends_with("sh")
            || lower.ends_with("ch")
            || lower.ends_with('x')
            || lower.ends_with('z')
        {
            format!("{}es", word)
        } else {
            format!("{}s", word)
        }
    }
}

/// True when the character right before the last `suffix_len` bytes is a vowel
fn ends_with_vowel_before(word: &str, suffix_len: usize) -> bool {
    word[..word.len() - suffix_len]
        .chars()
        .last()
        .map(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
        .unwrap_or(false)
}

/// Last segment of a type path such as `app::models::Tag`, `app\models\Tag` or `models.Tag`
pub fn type_basename(type_path: &str) -> &str {
    type_path
        .rsplit(|c: char| c == ':' || c == '\\' || c == '.' || c == '/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(type_path)
        .trim()
}

/// Default junction column referencing a related entity: `tag_id` for `app::models::Tags`
pub fn related_key_column(inflector: &dyn Inflector, related_entity_type: &str) -> String {
    let base = type_basename(related_entity_type).to_lowercase();
    format!("{}_id", inflector.singularize(&base))
}

/// Default table name of an entity type: `tags` for `app::models::Tag`
pub fn table_name_for(inflector: &dyn Inflector, entity_type: &str) -> String {
    let base = type_basename(entity_type).to_lowercase();
    inflector.pluralize(&inflector.singularize(&base))
}
