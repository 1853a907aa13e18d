use unicode_normalization::UnicodeNormalization;

/// Rewrite `surface` with a character equivalence table.
///
/// The surface is decomposed (NFD) so combining marks can be matched on
/// their own, every `(pattern, replacement)` pair is applied in order to all
/// occurrences, and the result is recomposed (NFC). Later pairs see the
/// output of earlier ones.
pub fn apply_char_equivalence(surface: &str, table: &[(String, String)]) -> String {
    let mut decomposed: String = surface.nfd().collect();
    for (pattern, replacement) in table {
        if !pattern.is_empty() {
            decomposed = decomposed.replace(pattern.as_str(), replacement);
        }
    }
    decomposed.nfc().collect()
}
