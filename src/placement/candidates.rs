/// Keyword to emoji table used to derive local decoration candidates from caption text.
///
/// Keys are matched against lowercase word tokens; a key also matches its plural (`dogs`).
static KEYWORD_EMOJIS: &[(&str, &str)] = &[
    ("beach", "🏖️"),
    ("ocean", "🌊"),
    ("sea", "🌊"),
    ("water", "💧"),
    ("sun", "☀️"),
    ("sunset", "🌅"),
    ("sunrise", "🌄"),
    ("dog", "🐶"),
    ("puppy", "🐶"),
    ("cat", "🐱"),
    ("kitten", "🐱"),
    ("bird", "🐦"),
    ("food", "🍽️"),
    ("pizza", "🍕"),
    ("cake", "🎂"),
    ("coffee", "☕"),
    ("party", "🎉"),
    ("birthday", "🎂"),
    ("love", "❤️"),
    ("heart", "❤️"),
    ("flower", "🌸"),
    ("garden", "🌷"),
    ("tree", "🌳"),
    ("forest", "🌲"),
    ("mountain", "⛰️"),
    ("snow", "❄️"),
    ("winter", "❄️"),
    ("city", "🏙️"),
    ("night", "🌙"),
    ("star", "⭐"),
    ("music", "🎵"),
    ("car", "🚗"),
    ("friend", "🤝"),
    ("smile", "😊"),
    ("happy", "😊"),
    ("baby", "👶"),
    ("travel", "✈️"),
    ("camera", "📸"),
    ("fire", "🔥"),
    ("rain", "🌧️"),
];

fn keyword_matches(token: &str, key: &str) -> bool {
    token == key
        || token
            .strip_suffix('s')
            .is_some_and(|stem| stem == key)
        || token
            .strip_suffix("es")
            .is_some_and(|stem| stem == key)
}

/// Emoji derived from keywords found in `texts`, de-duplicated in first-seen order.
pub fn keyword_emojis<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for text in texts {
        let lower = text.to_lowercase();
        for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            for (key, emoji) in KEYWORD_EMOJIS {
                if keyword_matches(token, key) && !out.iter().any(|e| e == emoji) {
                    out.push((*emoji).to_string());
                }
            }
        }
    }
    out
}

/// Union of `server` then `local`, de-duplicated, order preserving. Blank entries are dropped.
pub fn merge_candidates(server: &[String], local: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(server.len() + local.len());
    for c in server.iter().chain(local) {
        let c = c.trim();
        if !c.is_empty() && !out.iter().any(|e| e == c) {
            out.push(c.to_string());
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/placement/candidates.rs"]
mod tests;
