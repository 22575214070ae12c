//! Filter/search/sort projection over the item collection
//!
//! `project` is a pure function of its inputs: same collection and parameters,
//! same output. Equal sort keys keep collection order.

use crate::item::{Category, WorkItem};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Order the analysis produced them in
    #[default]
    Appearance,
    Title,
    /// Category, then title
    Category,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewParams {
    /// Empty means no filtering
    pub filters: BTreeSet<Category>,
    pub search: String,
    pub sort: SortMode,
}

pub fn project<'a>(items: &'a [WorkItem], params: &ViewParams) -> Vec<&'a WorkItem> {
    let needle = params.search.to_lowercase();

    let mut visible: Vec<&WorkItem> = items
        .iter()
        .filter(|item| params.filters.is_empty() || params.filters.contains(&item.category))
        .filter(|item| {
            needle.is_empty()
                || item.title.to_lowercase().contains(&needle)
                || item.description.to_lowercase().contains(&needle)
        })
        .collect();

    // sort_by is stable
    match params.sort {
        SortMode::Appearance => {}
        SortMode::Title => visible.sort_by(|a, b| collate(&a.title, &b.title)),
        SortMode::Category => visible.sort_by(|a, b| {
            collate(a.category.as_str(), b.category.as_str())
                .then_with(|| collate(&a.title, &b.title))
        }),
    }

    visible
}

/// Locale-style string comparison.
///
/// Letters compare by base form first (case and Latin accents folded,
/// ligatures such as `æ` and `ß` expanded), then unaccented before accented,
/// then lowercase before uppercase.
pub fn collate(a: &str, b: &str) -> Ordering {
    let (ka, kb) = (sort_keys(a), sort_keys(b));

    ka.iter()
        .map(|k| k.0)
        .cmp(kb.iter().map(|k| k.0))
        .then_with(|| ka.iter().map(|k| k.1).cmp(kb.iter().map(|k| k.1)))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// (base letter, came from an accented or expanded letter)
fn sort_keys(s: &str) -> Vec<(char, bool)> {
    let mut keys = Vec::with_capacity(s.len());
    for c in s.chars() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        match fold(lower) {
            Folded::Plain(base) => keys.push((base, false)),
            Folded::Accented(base) => keys.push((base, true)),
            Folded::Expanded(first, second) => {
                keys.push((first, true));
                keys.push((second, true));
            }
        }
    }
    keys
}

enum Folded {
    Plain(char),
    Accented(char),
    Expanded(char, char),
}

/// Latin-1 and Latin Extended-A/B lowercase letters to their base letters
fn fold(c: char) -> Folded {
    let base = match c {
        'æ' | 'ǽ' | 'ǣ' => return Folded::Expanded('a', 'e'),
        'œ' => return Folded::Expanded('o', 'e'),
        'ß' => return Folded::Expanded('s', 's'),
        'ĳ' => return Folded::Expanded('i', 'j'),
        'þ' => return Folded::Expanded('t', 'h'),
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'ǎ' | 'ǻ' | 'ȁ' | 'ȃ' => 'a',
        'ƀ' | 'ɓ' => 'b',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' | 'ƈ' => 'c',
        'ď' | 'đ' | 'ð' | 'ɗ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' | 'ȅ' | 'ȇ' | 'ȩ' => 'e',
        'ƒ' => 'f',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' | 'ǥ' | 'ǧ' | 'ǵ' => 'g',
        'ĥ' | 'ħ' | 'ȟ' => 'h',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' | 'ǐ' | 'ȉ' | 'ȋ' => 'i',
        'ĵ' | 'ǰ' => 'j',
        'ķ' | 'ĸ' | 'ǩ' | 'ƙ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' | 'ƚ' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' | 'ŉ' | 'ŋ' | 'ǹ' | 'ƞ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' | 'ơ' | 'ǒ' | 'ǫ' | 'ǭ' | 'ǿ'
        | 'ȍ' | 'ȏ' | 'ȫ' | 'ȭ' | 'ȯ' | 'ȱ' => 'o',
        'ƥ' => 'p',
        'ŕ' | 'ŗ' | 'ř' | 'ȑ' | 'ȓ' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' | 'ſ' => 's',
        'ţ' | 'ť' | 'ŧ' | 'ț' | 'ƫ' | 'ƭ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' | 'ư' | 'ǔ' | 'ǖ' | 'ǘ'
        | 'ǚ' | 'ǜ' | 'ȕ' | 'ȗ' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' | 'ƴ' | 'ȳ' => 'y',
        'ź' | 'ż' | 'ž' | 'ƶ' | 'ȥ' => 'z',
        other => return Folded::Plain(other),
    };
    Folded::Accented(base)
}
