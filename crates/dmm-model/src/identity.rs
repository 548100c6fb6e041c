//! Column name canonicalization and matching.
//!
//! Template documents declare the same conceptual column several times as
//! leveled variants (`Charakter_L1`, `Charakter_L2`, ...). Callers refer to
//! the concept by its base name; this module reduces both sides to a
//! canonical form so they can be compared.
//!
//! A level suffix is a trailing digit run, preceded by an optional literal
//! `L`/`l`, preceded by an optional single separator character that is
//! neither a letter nor a digit. `Figur_L2`, `Figur2` and `Figur.L12` all
//! canonicalize to `Figur`.

/// Strip one trailing level suffix, if present.
fn strip_suffix_once(name: &str) -> &str {
    let digits_start = name
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .len();
    if digits_start == name.len() || digits_start == 0 {
        return name;
    }
    let mut rest = &name[..digits_start];
    if let Some(stripped) = rest.strip_suffix(['L', 'l']) {
        rest = stripped;
    }
    if let Some(last) = rest.chars().next_back()
        && !last.is_alphanumeric()
    {
        rest = &rest[..rest.len() - last.len_utf8()];
    }
    rest
}

/// Reduce a display name to its canonical form by stripping level suffixes
/// until a fixed point is reached.
///
/// A name without a trailing digit run is returned unchanged, so
/// `canonical(canonical(n)) == canonical(n)` holds for every name.
pub fn canonical(name: &str) -> String {
    let mut current = name;
    loop {
        let stripped = strip_suffix_once(current);
        if stripped == current {
            return current.to_string();
        }
        current = stripped;
    }
}

/// The level encoded in a name's trailing digit run, or 0 when absent.
///
/// When several declared columns canonically match the same reference, the
/// one with the maximum level wins (the most recent leveled variant).
pub fn level(name: &str) -> u32 {
    let digits_start = name
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .len();
    if digits_start == name.len() {
        return 0;
    }
    name[digits_start..].parse().unwrap_or(0)
}

/// Human-readable short form of a name: one suffix strip, spaces replaced
/// with `-` so the result is safe inside file names and identifiers.
pub fn shortname(name: &str) -> String {
    strip_suffix_once(name).replace(' ', "-")
}

/// Decide whether two display names denote the same column.
///
/// Strict mode accepts exact string equality only. Non-strict mode first
/// tries exact equality, then compares canonical forms.
pub fn names_match(a: &str, b: &str, strict: bool) -> bool {
    if a == b {
        return true;
    }
    if strict {
        return false;
    }
    canonical(a) == canonical(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_strips_level_variants() {
        assert_eq!(canonical("Figur_L2"), "Figur");
        assert_eq!(canonical("Figur2"), "Figur");
        assert_eq!(canonical("Figur.L12"), "Figur");
        assert_eq!(canonical("Figur"), "Figur");
    }

    #[test]
    fn canonical_strips_stacked_suffixes() {
        assert_eq!(canonical("Figur2_L3"), "Figur");
    }

    #[test]
    fn canonical_keeps_names_without_digit_run() {
        assert_eq!(canonical("Rollenrelevanz"), "Rollenrelevanz");
        assert_eq!(canonical("Dominante Charaktereigenschaft"), "Dominante Charaktereigenschaft");
    }

    #[test]
    fn canonical_leaves_all_digit_names_alone() {
        assert_eq!(canonical("123"), "123");
    }

    #[test]
    fn level_reads_trailing_digits() {
        assert_eq!(level("Figur_L2"), 2);
        assert_eq!(level("Figur12"), 12);
        assert_eq!(level("Figur"), 0);
    }

    #[test]
    fn shortname_replaces_spaces() {
        assert_eq!(shortname("Dominante Charaktereigenschaft"), "Dominante-Charaktereigenschaft");
        assert_eq!(shortname("Figur_L2"), "Figur");
    }

    #[test]
    fn strict_match_is_exact_only() {
        assert!(names_match("Figur_L2", "Figur_L2", true));
        assert!(!names_match("Figur_L2", "Figur", true));
    }

    #[test]
    fn lenient_match_crosses_levels() {
        assert!(names_match("Figur_L2", "Figur", false));
        assert!(names_match("Figur", "Figur_L3", false));
        assert!(!names_match("Figur", "Genre", false));
    }
}
