//! Deterministic output-document naming.
//!
//! The natural name of a generated document concatenates the selected input
//! and output column shortnames. Column sets can make that name arbitrarily
//! long, so past the length limit the part name is replaced by a stable
//! sha256-derived token. The token is a pure function of the part name: the
//! same selection always yields the same name, across runs and processes.

use sha2::{Digest, Sha256};

/// Maximum length of a synthesized name, in characters.
pub const DEFAULT_NAME_LIMIT: usize = 100;

/// Built-in dictionary for the word-mapped token form.
const DEFAULT_WORDS: &[&str] = &[
    "alder", "amber", "apex", "basil", "birch", "bison", "cedar", "clay",
    "cloud", "coral", "crane", "delta", "dune", "ember", "fable", "fern",
    "flint", "gale", "glade", "grove", "hazel", "heron", "iris", "ivory",
    "jade", "junco", "kite", "larch", "lark", "linen", "lotus", "lynx",
    "maple", "marsh", "mica", "moss", "north", "oak", "ochre", "onyx",
    "opal", "otter", "pearl", "pine", "quail", "quartz", "raven", "reed",
    "ridge", "river", "robin", "sage", "slate", "spruce", "stone", "swan",
    "tarn", "teal", "thorn", "tide", "umber", "vale", "wren", "yarrow",
];

/// How an overlong part name is rendered as a short token.
///
/// Selected once at construction; the synthesizer behaves correctly with
/// either style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStyle {
    /// Truncated lowercase hex of the sha256 digest.
    Digest,
    /// A fixed number of dictionary words derived from the digest.
    Words(&'static [&'static str]),
}

impl Default for TokenStyle {
    fn default() -> Self {
        Self::Words(DEFAULT_WORDS)
    }
}

/// Derives collision-resistant, length-bounded names for generated documents.
#[derive(Debug, Clone)]
pub struct NameSynthesizer {
    length_limit: usize,
    token_style: TokenStyle,
}

impl Default for NameSynthesizer {
    fn default() -> Self {
        Self {
            length_limit: DEFAULT_NAME_LIMIT,
            token_style: TokenStyle::default(),
        }
    }
}

impl NameSynthesizer {
    pub fn new(length_limit: usize, token_style: TokenStyle) -> Self {
        Self {
            length_limit,
            token_style,
        }
    }

    pub fn length_limit(&self) -> usize {
        self.length_limit
    }

    /// Synthesize the name for one generated document.
    ///
    /// `inputs` and `output` are column shortnames. An explicit name is
    /// returned verbatim; it is the escape hatch for batch generation where
    /// names are assigned externally.
    pub fn synthesize(
        &self,
        root: &str,
        inputs: &[String],
        output: Option<&str>,
        explicit: Option<&str>,
    ) -> String {
        if let Some(name) = explicit {
            return name.to_string();
        }
        let part = part_name(inputs, output);
        let natural = format!("{root}__{part}");
        if natural.chars().count() <= self.length_limit {
            return natural;
        }
        let token = self.token(&part);
        let shortened = match output {
            Some(out) => format!("{root}__{token}__{out}"),
            None => format!("{root}__{token}"),
        };
        truncate_chars(shortened, self.length_limit)
    }

    fn token(&self, part: &str) -> String {
        let digest = Sha256::digest(part.as_bytes());
        match self.token_style {
            TokenStyle::Digest => hex::encode(&digest[..6]),
            TokenStyle::Words(words) => {
                // Fold the 32 digest bytes into 4 and map each through the
                // dictionary. Pure function of the digest, no salt.
                let mut folded = [0u8; 4];
                for (i, byte) in digest.iter().enumerate() {
                    folded[i % 4] ^= byte;
                }
                folded
                    .iter()
                    .map(|b| words[usize::from(*b) % words.len()])
                    .collect::<Vec<_>>()
                    .join("-")
            }
        }
    }
}

/// The selection-derived portion of a synthesized name.
///
/// Inputs are joined with a single underscore; the output shortname is
/// appended with a double underscore. An empty selection yields the literal
/// `null_null`.
pub fn part_name(inputs: &[String], output: Option<&str>) -> String {
    match (inputs.is_empty(), output) {
        (true, None) => "null_null".to_string(),
        (true, Some(out)) => out.to_string(),
        (false, None) => inputs.join("_"),
        (false, Some(out)) => format!("{}__{out}", inputs.join("_")),
    }
}

/// Derive the document root token from a template file stem.
///
/// Strips the exact literal trailing token `_template`; a stem without it is
/// used whole. Character-class stripping would over-trim stems ending in any
/// of the token's letters.
pub fn derive_root(stem: &str) -> &str {
    stem.strip_suffix("_template").unwrap_or(stem)
}

/// Hard cap on a name's character count; overlong names are cut, never
/// rejected.
pub fn truncate_name(value: String, limit: usize) -> String {
    truncate_chars(value, limit)
}

fn truncate_chars(value: String, limit: usize) -> String {
    if value.chars().count() <= limit {
        value
    } else {
        value.chars().take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth() -> NameSynthesizer {
        NameSynthesizer::default()
    }

    #[test]
    fn empty_selection_yields_null_null() {
        assert_eq!(synth().synthesize("muse", &[], None, None), "muse__null_null");
    }

    #[test]
    fn natural_name_joins_inputs_and_output() {
        let inputs = vec!["Figur".to_string()];
        assert_eq!(
            synth().synthesize("muse", &inputs, Some("Genre"), None),
            "muse__Figur__Genre"
        );
    }

    #[test]
    fn multiple_inputs_use_single_underscores() {
        let inputs = vec!["Figur".to_string(), "Geschlecht".to_string()];
        assert_eq!(
            synth().synthesize("muse", &inputs, Some("Genre"), None),
            "muse__Figur_Geschlecht__Genre"
        );
    }

    #[test]
    fn explicit_name_wins() {
        let inputs = vec!["Figur".to_string()];
        assert_eq!(
            synth().synthesize("muse", &inputs, Some("Genre"), Some("external")),
            "external"
        );
    }

    #[test]
    fn overlong_names_are_capped_and_stable() {
        let inputs: Vec<String> = (0..30).map(|i| format!("Eigenschaft{i}")).collect();
        let a = synth().synthesize("muse", &inputs, Some("Genre"), None);
        let b = synth().synthesize("muse", &inputs, Some("Genre"), None);
        assert_eq!(a, b);
        assert!(a.chars().count() <= DEFAULT_NAME_LIMIT);
        assert!(a.starts_with("muse__"));
    }

    #[test]
    fn digest_style_is_deterministic_too() {
        let synth = NameSynthesizer::new(40, TokenStyle::Digest);
        let inputs: Vec<String> = (0..10).map(|i| format!("Spalte{i}")).collect();
        let a = synth.synthesize("muse", &inputs, Some("Genre"), None);
        let b = synth.synthesize("muse", &inputs, Some("Genre"), None);
        assert_eq!(a, b);
        assert!(a.chars().count() <= 40);
    }

    #[test]
    fn distinct_selections_get_distinct_tokens() {
        let synth = NameSynthesizer::new(40, TokenStyle::Digest);
        let long_a: Vec<String> = (0..10).map(|i| format!("Links{i}")).collect();
        let long_b: Vec<String> = (0..10).map(|i| format!("Rechts{i}")).collect();
        let a = synth.synthesize("muse", &long_a, Some("Genre"), None);
        let b = synth.synthesize("muse", &long_b, Some("Genre"), None);
        assert_ne!(a, b);
    }

    #[test]
    fn root_derivation_strips_literal_token_only() {
        assert_eq!(derive_root("muse_template"), "muse");
        assert_eq!(derive_root("muse"), "muse");
        // "late" ends in letters of the token but is not the token.
        assert_eq!(derive_root("plate"), "plate");
    }
}
