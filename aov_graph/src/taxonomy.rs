//! Pass taxonomy: which output node a render pass belongs to.

use serde::{Deserialize, Serialize};

use crate::aov;

/// Passes that need full float precision and get their own output node.
pub const TECHNICAL_PASSES: [&str; 6] = ["Depth", "Normal", "UV", "Vector", "Mist", "Position"];

/// The host emits up to three ID/coverage layers per cryptomatte type.
pub const CRYPTO_INDICES: [&str; 3] = ["00", "01", "02"];

/// Synthetic aggregate pass standing for the three denoising data sockets.
pub const DENOISING_PASS: &str = "Denoising";
pub const DENOISING_SUBPASSES: [&str; 3] = ["Normal", "Albedo", "Depth"];

/// The beauty pass as the host names its socket.
pub const BEAUTY_PASS: &str = "Image";
pub const BEAUTY_SLOT: &str = "beauty";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassCategory {
    Technical,
    Cryptomatte,
    Denoising,
    Main,
}

/// Classifies a pass by its canonical name. Total: anything unknown is `Main`.
pub fn classify(canonical_name: &str) -> PassCategory {
    if is_technical(canonical_name) {
        PassCategory::Technical
    } else if is_crypto(canonical_name) {
        PassCategory::Cryptomatte
    } else if canonical_name == DENOISING_PASS {
        PassCategory::Denoising
    } else {
        PassCategory::Main
    }
}

pub fn is_technical(canonical_name: &str) -> bool {
    TECHNICAL_PASSES.contains(&canonical_name)
}

pub fn is_crypto(canonical_name: &str) -> bool {
    canonical_name.contains("Crypto")
}

/// The cryptomatte index the pass name carries, if any.
pub fn crypto_index(canonical_name: &str) -> Option<&'static str> {
    CRYPTO_INDICES
        .into_iter()
        .find(|index| canonical_name.contains(index))
}

/// Socket names of the denoising sub-passes ("Denoising Normal", ...).
pub fn denoising_sockets() -> Vec<String> {
    DENOISING_SUBPASSES
        .iter()
        .map(|sub| format!("{} {}", DENOISING_PASS, sub))
        .collect()
}

/// Whether the engine knows where to route this pass.
///
/// Unrecognised passes are never wired: sending them to a guessed node would
/// silently change the file layout downstream.
pub fn is_recognized(canonical_name: &str) -> bool {
    if canonical_name == BEAUTY_PASS || aov::find_by_canonical(canonical_name).is_some() {
        return true;
    }
    if let Some(sub) = canonical_name.strip_prefix(DENOISING_PASS) {
        return DENOISING_SUBPASSES
            .iter()
            .any(|known| sub.strip_prefix(' ') == Some(known));
    }
    if is_crypto(canonical_name) {
        if let Some(index) = crypto_index(canonical_name) {
            if let Some(base) = canonical_name.strip_suffix(index) {
                return aov::find_by_canonical(base).is_some();
            }
        }
    }
    false
}

/// Orders pass names technical first, then main, then cryptomatte, each group
/// sorted case-insensitively.
pub fn display_order<S: AsRef<str>>(names: &[S]) -> Vec<(String, PassCategory)> {
    let mut sorted: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
    sorted.sort_by_key(|n| n.to_lowercase());

    let mut technical = Vec::new();
    let mut main = Vec::new();
    let mut crypto = Vec::new();
    for name in sorted {
        let category = classify(name);
        let entry = (name.to_string(), category);
        match category {
            PassCategory::Technical => technical.push(entry),
            PassCategory::Cryptomatte => crypto.push(entry),
            PassCategory::Denoising | PassCategory::Main => main.push(entry),
        }
    }
    technical.into_iter().chain(main).chain(crypto).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURES: &[(&str, PassCategory)] = &[
        ("Depth", PassCategory::Technical),
        ("Normal", PassCategory::Technical),
        ("UV", PassCategory::Technical),
        ("Vector", PassCategory::Technical),
        ("Mist", PassCategory::Technical),
        ("Position", PassCategory::Technical),
        ("CryptoObject00", PassCategory::Cryptomatte),
        ("CryptoObject02", PassCategory::Cryptomatte),
        ("CryptoMaterial01", PassCategory::Cryptomatte),
        ("CryptoAsset00", PassCategory::Cryptomatte),
        ("Denoising", PassCategory::Denoising),
        ("Denoising Normal", PassCategory::Main),
        ("Denoising Depth", PassCategory::Main),
        ("Image", PassCategory::Main),
        ("AO", PassCategory::Main),
        ("DiffCol", PassCategory::Main),
        ("DiffDir", PassCategory::Main),
        ("DiffInd", PassCategory::Main),
        ("GlossCol", PassCategory::Main),
        ("TransInd", PassCategory::Main),
        ("Emit", PassCategory::Main),
        ("Env", PassCategory::Main),
        ("IndexOB", PassCategory::Main),
        ("IndexMA", PassCategory::Main),
        ("Shadow Catcher", PassCategory::Main),
        ("VolumeDir", PassCategory::Main),
        ("BloomCol", PassCategory::Main),
    ];

    #[test]
    fn test_classify_fixture_table() {
        for (name, expected) in FIXTURES {
            assert_eq!(classify(name), *expected, "classify({})", name);
        }
    }

    #[test]
    fn test_classify_unknown_is_main() {
        for name in ["", "depth", "Alpha", "my_custom_aov", "DEPTH", "Z"] {
            assert_eq!(classify(name), PassCategory::Main, "classify({:?})", name);
        }
    }

    #[test]
    fn test_technical_wins_over_crypto_rule() {
        // Exact technical match is checked first; names are case-sensitive.
        assert_eq!(classify("Position"), PassCategory::Technical);
        assert_eq!(classify("CryptoDepth"), PassCategory::Cryptomatte);
    }

    #[test]
    fn test_crypto_index() {
        assert_eq!(crypto_index("CryptoObject00"), Some("00"));
        assert_eq!(crypto_index("CryptoMaterial02"), Some("02"));
        assert_eq!(crypto_index("CryptoAsset03"), None);
        assert_eq!(crypto_index("CryptoObject"), None);
    }

    #[test]
    fn test_is_recognized() {
        assert!(is_recognized("Image"));
        assert!(is_recognized("Depth"));
        assert!(is_recognized("DiffCol"));
        assert!(is_recognized("CryptoObject01"));
        assert!(is_recognized("Denoising"));
        assert!(is_recognized("Denoising Albedo"));
        assert!(!is_recognized("Alpha"));
        assert!(!is_recognized("CryptoBogus00"));
        assert!(!is_recognized("Denoising Shadow"));
    }

    #[test]
    fn test_display_order_groups_categories() {
        let ordered = display_order(&["CryptoObject00", "emit", "Depth", "AO", "Normal"]);
        let names: Vec<&str> = ordered.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Depth", "Normal", "AO", "emit", "CryptoObject00"]);
    }
}
