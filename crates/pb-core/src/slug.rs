//! Note slugs: validation predicates and title transliteration.
//!
//! Generated slugs use the Russian transliteration table common to
//! Russian-language sites (`ж` → `zh`, `щ` → `sch`, `я` → `ya`, ...), so
//! `Тестовая заметка` becomes `testovaya-zametka`.

/// Upper bound shared by explicit and generated slugs.
pub const MAX_SLUG_LEN: usize = 100;

/// Return `true` when `value` can be used verbatim as a note slug.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.chars().count() <= MAX_SLUG_LEN
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// Derives a URL-safe, lowercase slug from a title.
///
/// Deterministic: the same title always yields the same slug. May return an
/// empty string when the title has no transliterable characters. Hyphens at
/// either end of the title survive (`Заметка -` → `zametka-`).
pub fn slugify(title: &str) -> String {
    let expanded = title.replace("&amp;", " and ").replace('&', " and ");

    let mut latin = String::with_capacity(expanded.len());
    for ch in expanded.chars() {
        match transliterate(ch) {
            Some(sound) => latin.push_str(sound),
            None if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' => latin.push(ch),
            None if ch.is_whitespace() => latin.push(' '),
            None => {}
        }
    }

    let mut slug = String::with_capacity(latin.len());
    let mut in_gap = false;
    for ch in latin.trim().chars() {
        if ch == ' ' || ch == '-' {
            if !in_gap {
                slug.push('-');
                in_gap = true;
            }
        } else {
            slug.push(ch);
            in_gap = false;
        }
    }

    slug.make_ascii_lowercase();
    slug.chars().take(MAX_SLUG_LEN).collect()
}

fn transliterate(ch: char) -> Option<&'static str> {
    let latin = match ch.to_lowercase().next().unwrap_or(ch) {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' | 'ґ' => "g",
        'д' => "d",
        'е' | 'э' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' | 'і' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ы' | 'ї' => "yi",
        'ю' => "yu",
        'я' => "ya",
        'є' => "ye",
        // hard and soft signs carry no sound of their own
        'ъ' | 'ь' => "",
        _ => return None,
    };
    Some(latin)
}
