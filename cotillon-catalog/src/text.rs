//! Text folding
//!
//! Every label and query comparison in the catalog goes through [`fold`], so
//! "Piñata", "PINATA" and " piñata " all compare equal.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Trim, strip diacritics and lowercase
pub fn fold(input: &str) -> String {
    input
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Folded equality
pub fn fold_eq(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

/// URL-safe slug: folded, runs of anything outside `[a-z0-9]` become `-`
pub fn slugify(input: &str) -> String {
    let folded = fold(input);
    let mut slug = String::with_capacity(folded.len());
    let mut pending_dash = false;
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Locale-aware label ordering
///
/// Folded keys decide first so accents and case do not scatter entries;
/// the raw strings break ties to keep the order total.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_diacritics() {
        assert_eq!(fold("  Piñata GIGANTE "), "pinata gigante");
        assert_eq!(fold("Decoración Led"), "decoracion led");
        assert_eq!(fold("Tutús"), "tutus");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Globos y Piñatas"), "globos-y-pinatas");
        assert_eq!(slugify("Miniaturas-Juguetitos"), "miniaturas-juguetitos");
        assert_eq!(slugify("  9 Pulgadas!! "), "9-pulgadas");
        assert_eq!(slugify("¡Hola!"), "hola");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_compare_labels_ignores_accents_first() {
        assert_eq!(compare_labels("Árbol", "Bandeja"), Ordering::Less);
        assert_eq!(compare_labels("bandeja", "Árbol"), Ordering::Greater);
        assert_ne!(compare_labels("Vela", "vela"), Ordering::Equal);
    }
}
