use crate::prelude::*;

// ISO 639-1 language codes, including the legacy iw, in and ji.
const ISO_LANGUAGES: &[&str] = &[
    "aa", "ab", "ae", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", "ba", "be", "bg",
    "bh", "bi", "bm", "bn", "bo", "br", "bs", "ca", "ce", "ch", "co", "cr", "cs", "cu", "cv",
    "cy", "da", "de", "dv", "dz", "ee", "el", "en", "eo", "es", "et", "eu", "fa", "ff", "fi",
    "fj", "fo", "fr", "fy", "ga", "gd", "gl", "gn", "gu", "gv", "ha", "he", "hi", "ho", "hr",
    "ht", "hu", "hy", "hz", "ia", "id", "ie", "ig", "ii", "ik", "in", "io", "is", "it", "iu",
    "iw", "ja", "ji", "jv", "ka", "kg", "ki", "kj", "kk", "kl", "km", "kn", "ko", "kr", "ks",
    "ku", "kv", "kw", "ky", "la", "lb", "lg", "li", "ln", "lo", "lt", "lu", "lv", "mg", "mh",
    "mi", "mk", "ml", "mn", "mr", "ms", "mt", "my", "na", "nb", "nd", "ne", "ng", "nl", "nn",
    "no", "nr", "nv", "ny", "oc", "oj", "om", "or", "os", "pa", "pi", "pl", "ps", "pt", "qu",
    "rm", "rn", "ro", "ru", "rw", "sa", "sc", "sd", "se", "sg", "si", "sk", "sl", "sm", "sn",
    "so", "sq", "sr", "ss", "st", "su", "sv", "sw", "ta", "te", "tg", "th", "ti", "tk", "tl",
    "tn", "to", "tr", "ts", "tt", "tw", "ty", "ug", "uk", "ur", "uz", "ve", "vi", "vo", "wa",
    "wo", "xh", "yi", "yo", "za", "zh", "zu",
];

/// Language subtag of a locale tag such as `en`, `de_DE` or `pt-BR`.
#[must_use]
pub fn language_of(locale: &str) -> String {
    locale
        .split(['_', '-'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

#[must_use]
pub fn is_known_language(locale: &str) -> bool {
    ISO_LANGUAGES.binary_search(&language_of(locale).as_str()).is_ok()
}

/// An unknown language only warns; the target runtime may still support it.
pub fn validate_root_locale(locale: &str, origin: &Origin, errs: &mut Diagnostics) {
    if locale.is_empty() || is_known_language(locale) {
        return;
    }

    warning!(
        errs,
        origin,
        "The locale '{locale}' may be invalid. The target runtime must include this locale to ensure formatting is handled correctly."
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_table_is_sorted() {
        assert!(ISO_LANGUAGES.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn known_languages_pass_with_regions() {
        assert!(is_known_language("en"));
        assert!(is_known_language("de_DE"));
        assert!(is_known_language("pt-BR"));
        assert!(is_known_language("FR"));
        assert!(!is_known_language("xx"));
    }

    #[test]
    fn unknown_root_locale_is_a_warning() {
        let origin = Origin::interface("app::Log");
        let mut errs = Diagnostics::new();
        validate_root_locale("zz_ZZ", &origin, &mut errs);
        validate_root_locale("en_US", &origin, &mut errs);

        assert_eq!(errs.warning_count(), 1);
        assert_eq!(errs.error_count(), 0);
        assert!(errs.to_string().contains("'zz_ZZ' may be invalid"));
    }
}
