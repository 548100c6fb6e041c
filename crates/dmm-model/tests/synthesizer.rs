//! Property tests for name synthesis.

use dmm_model::{NameSynthesizer, TokenStyle};
use proptest::prelude::*;

proptest! {
    /// Synthesis is a pure function of (root, inputs, output).
    #[test]
    fn synthesis_is_deterministic(
        root in "[a-z]{1,8}",
        inputs in prop::collection::vec("[A-Za-z]{1,12}", 0..6),
        output in prop::option::of("[A-Za-z]{1,12}"),
    ) {
        let synth = NameSynthesizer::default();
        let a = synth.synthesize(&root, &inputs, output.as_deref(), None);
        let b = synth.synthesize(&root, &inputs, output.as_deref(), None);
        prop_assert_eq!(a, b);
    }

    /// Without an explicit name, the result never exceeds the limit once the
    /// fallback engages, and the fallback itself is capped.
    #[test]
    fn overlong_names_are_capped(
        root in "[a-z]{1,8}",
        inputs in prop::collection::vec("[A-Za-z]{8,16}", 8..16),
        style in prop::sample::select(vec![TokenStyle::Digest, TokenStyle::default()]),
    ) {
        let limit = 60;
        let synth = NameSynthesizer::new(limit, style);
        let name = synth.synthesize(&root, &inputs, Some("Genre"), None);
        prop_assert!(name.chars().count() <= limit);
    }
}

#[test]
fn word_tokens_differ_from_digest_tokens_but_both_are_stable() {
    let inputs: Vec<String> = (0..20).map(|i| format!("Eigenschaft{i}")).collect();
    let words = NameSynthesizer::new(64, TokenStyle::default());
    let digest = NameSynthesizer::new(64, TokenStyle::Digest);
    let w = words.synthesize("muse", &inputs, Some("Genre"), None);
    let d = digest.synthesize("muse", &inputs, Some("Genre"), None);
    assert_eq!(w, words.synthesize("muse", &inputs, Some("Genre"), None));
    assert_eq!(d, digest.synthesize("muse", &inputs, Some("Genre"), None));
    assert_ne!(w, d);
}
