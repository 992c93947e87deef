//! URL slugs.

use pricelens_core::DomainResult;

/// Lowercase ASCII slug: runs of anything non-alphanumeric collapse to `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// `[a-z0-9]+(-[a-z0-9]+)*`
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 255
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// First of `base`, `base-2`, `base-3`, ... for which `taken` says no.
pub fn unique_slug(
    base: &str,
    mut taken: impl FnMut(&str) -> DomainResult<bool>,
) -> DomainResult<String> {
    if !taken(base)? {
        return Ok(base.to_string());
    }
    let mut n: u32 = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Samsung Galaxy S24 Ultra (12/256GB) "), "samsung-galaxy-s24-ultra-12-256gb");
        assert_eq!(slugify("Kopi -- Susu"), "kopi-susu");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn validity() {
        assert!(is_valid_slug("iphone-15-pro"));
        assert!(!is_valid_slug("iPhone"));
        assert!(!is_valid_slug("-lead"));
        assert!(!is_valid_slug("double--dash"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn unique_slug_appends_counter() {
        let existing = ["laptop", "laptop-2"];
        let slug = unique_slug("laptop", |s| Ok(existing.contains(&s))).unwrap();
        assert_eq!(slug, "laptop-3");

        let slug = unique_slug("tablet", |s| Ok(existing.contains(&s))).unwrap();
        assert_eq!(slug, "tablet");
    }
}
