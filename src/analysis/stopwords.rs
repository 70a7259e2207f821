//! Static stopword tables, keyed by ISO 639-1 code.
//!
//! The tables double as the language identifier's vocabulary: the language
//! whose stopwords occur most often in a sample wins.

/// Languages with a stopword table, in detection tie-break order.
pub const LANGUAGES: &[&str] = &["en", "fr", "de", "es", "it", "pt", "nl"];

/// Stopwords for `language`, or an empty slice when there is no table.
pub fn stopwords(language: &str) -> &'static [&'static str] {
    match language {
        "en" => ENGLISH,
        "fr" => FRENCH,
        "de" => GERMAN,
        "es" => SPANISH,
        "it" => ITALIAN,
        "pt" => PORTUGUESE,
        "nl" => DUTCH,
        _ => &[],
    }
}

const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "either",
    "else", "even", "ever", "every", "few", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "however",
    "i", "if", "in", "into", "is", "it", "its", "itself", "just", "least", "less", "may", "me",
    "might", "more", "most", "much", "must", "my", "myself", "neither", "no", "nor", "not", "now",
    "of", "off", "often", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out",
    "over", "own", "per", "perhaps", "rather", "same", "shall", "she", "should", "since", "so",
    "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "therefore", "these", "they", "this", "those", "though", "through", "thus", "to",
    "too", "under", "until", "up", "upon", "us", "very", "was", "we", "were", "what", "when",
    "where", "whether", "which", "while", "who", "whom", "whose", "why", "will", "with", "within",
    "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

const FRENCH: &[&str] = &[
    "au", "aux", "avec", "ce", "ces", "cette", "dans", "de", "des", "du", "elle", "elles", "en",
    "est", "et", "eux", "il", "ils", "je", "la", "le", "les", "leur", "leurs", "lui", "ma", "mais",
    "me", "mes", "moi", "mon", "ne", "nos", "notre", "nous", "on", "ou", "où", "par", "pas",
    "pour", "qu", "que", "qui", "sa", "se", "ses", "son", "sont", "sur", "ta", "te", "tes", "toi",
    "ton", "tu", "un", "une", "vos", "votre", "vous", "été", "être", "avoir", "était", "comme",
    "aussi", "plus", "très", "sans", "sous",
];

const GERMAN: &[&str] = &[
    "aber", "alle", "als", "also", "am", "an", "auch", "auf", "aus", "bei", "bin", "bis", "da",
    "damit", "dann", "das", "dass", "dem", "den", "der", "des", "die", "dies", "diese", "dieser",
    "doch", "du", "durch", "ein", "eine", "einem", "einen", "einer", "er", "es", "für", "hat",
    "hatte", "ich", "ihr", "im", "in", "ist", "ja", "kann", "kein", "mit", "nach", "nicht", "noch",
    "nur", "ob", "oder", "sich", "sie", "sind", "so", "über", "um", "und", "uns", "unter", "vom",
    "von", "vor", "war", "was", "weil", "wenn", "wie", "wir", "wird", "zu", "zum", "zur",
];

const SPANISH: &[&str] = &[
    "al", "algo", "como", "con", "cuando", "de", "del", "desde", "donde", "el", "ella", "ellos",
    "en", "entre", "era", "es", "esa", "ese", "eso", "esta", "este", "esto", "está", "fue", "ha",
    "hay", "la", "las", "le", "les", "lo", "los", "me", "mi", "muy", "más", "nos", "o", "para",
    "pero", "por", "porque", "que", "qué", "se", "sin", "sobre", "su", "sus", "también", "te",
    "todo", "tu", "un", "una", "uno", "y", "ya", "yo", "él",
];

const ITALIAN: &[&str] = &[
    "a", "al", "alla", "anche", "che", "chi", "ci", "come", "con", "da", "dal", "dei", "del",
    "della", "delle", "di", "e", "è", "gli", "ha", "ho", "i", "il", "in", "io", "la", "le", "lei",
    "lo", "loro", "lui", "ma", "mi", "ne", "nel", "nella", "noi", "non", "o", "per", "più",
    "quando", "questa", "questo", "se", "si", "sono", "su", "sua", "suo", "ti", "tra", "tu", "un",
    "una", "uno", "voi",
];

const PORTUGUESE: &[&str] = &[
    "a", "ao", "aos", "as", "com", "como", "da", "das", "de", "do", "dos", "e", "ela", "ele",
    "eles", "em", "entre", "era", "essa", "esse", "esta", "este", "eu", "foi", "há", "isso",
    "já", "mais", "mas", "me", "muito", "na", "nas", "no", "nos", "não", "o", "os", "ou", "para",
    "pela", "pelo", "por", "quando", "que", "se", "sem", "seu", "sua", "são", "também", "um",
    "uma", "você", "é",
];

const DUTCH: &[&str] = &[
    "aan", "al", "als", "bij", "dan", "dat", "de", "der", "deze", "die", "dit", "doch", "door",
    "een", "en", "er", "geen", "had", "heb", "hebben", "heeft", "het", "hij", "hoe", "ik", "in",
    "is", "je", "kan", "maar", "me", "met", "mij", "na", "naar", "niet", "nog", "nu", "of", "om",
    "omdat", "ons", "ook", "op", "over", "te", "tot", "u", "uit", "van", "voor", "was", "wat",
    "we", "wel", "werd", "wie", "wij", "zal", "ze", "zich", "zij", "zijn", "zo", "zou",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_a_table() {
        for lang in LANGUAGES {
            assert!(!stopwords(lang).is_empty(), "missing table for {}", lang);
        }
        assert!(stopwords("xx").is_empty());
    }

    #[test]
    fn tables_are_language_specific() {
        assert!(stopwords("es").contains(&"de"));
        assert!(!stopwords("es").contains(&"the"));
        assert!(stopwords("en").contains(&"the"));
    }
}
