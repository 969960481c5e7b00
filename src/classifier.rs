//! Heuristic game/non-game classification.
//!
//! Everything here works on lower-cased names and fixed keyword tables. The
//! classifier can only say "yes", "no", or "no idea"; what "no idea" means is
//! up to the adapter that asks (see [`Verdict::Undecided`]).

/// Words marking runtimes, drivers and other non-game software.
const REJECT_WORDS: &[&str] = &[
    "runtime",
    "redistributable",
    "redist",
    "driver",
    "framework",
    "service",
    "tool",
    "utility",
    "utilities",
    "update",
    "patch",
    "launcher",
    "sdk",
    "benchmark",
    "server",
];

/// Words that only show up in game titles often enough to be trusted.
const GENRE_WORDS: &[&str] = &[
    "game",
    "games",
    "rpg",
    "shooter",
    "simulator",
    "simulation",
    "racing",
    "strategy",
    "adventure",
    "puzzle",
    "quest",
    "legends",
    "saga",
    "chronicles",
    "tactics",
    "arena",
    "warfare",
    "dungeon",
    "dungeons",
    "kingdom",
    "empire",
    "remastered",
    "remake",
    "goty",
];

/// Publishers whose catalogue is (almost) entirely games.
const KNOWN_PUBLISHERS: &[&str] = &[
    "valve",
    "electronic arts",
    "ubisoft",
    "bethesda",
    "cd projekt",
    "rockstar",
    "activision",
    "blizzard",
    "square enix",
    "bandai namco",
    "capcom",
    "sega",
    "2k",
    "paradox interactive",
    "devolver",
    "epic games",
    "gog",
    "riot games",
    "thq",
    "warner bros",
    "focus entertainment",
    "deep silver",
    "konami",
    "team17",
    "annapurna",
    "bungie",
    "mojang",
    "xbox game studios",
];

/// Substrings marking add-on content on multi-word names.
const AUXILIARY_SUBSTRINGS: &[&str] = &[
    "dlc",
    "soundtrack",
    "season pass",
    "skin pack",
    "artbook",
    "art book",
    "bonus content",
    "expansion pass",
    "upgrade pack",
    "wallpaper",
];

/// Suffixes marking add-on content on multi-word names.
const AUXILIARY_SUFFIXES: &[&str] = &[
    " demo",
    " ost",
    " pack",
    " skin",
    " skins",
    " trailer",
    " playtest",
    " dedicated server",
];

/// Launchers and store clients, matched against the whole name.
const LAUNCHER_NAMES: &[&str] = &[
    "steam",
    "steamworks common redistributables",
    "steamvr",
    "epic games launcher",
    "epic online services",
    "ea app",
    "ea desktop",
    "ea origin",
    "origin client",
    "ubisoft connect",
    "ubisoft game launcher",
    "uplay",
    "battle.net",
    "blizzard battle.net",
    "gog galaxy",
    "xbox",
    "xbox app",
    "xbox game bar",
    "rockstar games launcher",
    "rockstar games social club",
    "bethesda.net launcher",
    "amazon games",
    "itch",
    "playnite",
    "gamesave manager",
];

/// Brand words that are only a launcher when they stand (nearly) alone.
const AMBIGUOUS_LAUNCHER_WORDS: &[&str] = &[
    "origin",
    "uplay",
    "steam",
    "galaxy",
    "battlenet",
    "steamworks",
    "eadesktop",
];

/// Qualifiers that turn an ambiguous brand word into a launcher name.
const LAUNCHER_QUALIFIERS: &[&str] = &[
    "client", "launcher", "app", "desktop", "helper", "overlay", "service", "setup",
];

/// Outcome of keyword classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
    /// No keyword or publisher evidence either way.
    Undecided,
}

/// Classifies a candidate name, optionally using its publisher.
pub fn classify(name: &str, publisher: Option<&str>) -> Verdict {
    let lower = name.trim().to_lowercase();
    if lower.is_empty() {
        return Verdict::Reject;
    }

    if is_launcher_or_utility(&lower) || is_auxiliary_content(&lower) {
        return Verdict::Reject;
    }

    let words = tokenize(&lower);
    if words.iter().any(|w| contains_word(REJECT_WORDS, w)) {
        return Verdict::Reject;
    }

    if words.iter().any(|w| GENRE_WORDS.contains(&w.as_str())) || is_known_publisher(publisher) {
        return Verdict::Accept;
    }

    Verdict::Undecided
}

/// Returns true if the candidate should be kept, resolving an undecided
/// classification with `undecided`.
pub fn accept(name: &str, publisher: Option<&str>, undecided: Verdict) -> bool {
    match classify(name, publisher) {
        Verdict::Accept => true,
        Verdict::Reject => false,
        Verdict::Undecided => undecided == Verdict::Accept,
    }
}

/// DLC, skins, soundtracks, demos, season passes and similar add-ons.
///
/// Only multi-word names are checked; a one-word title is never add-on content.
pub fn is_auxiliary_content(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    if lower.split_whitespace().count() < 2 {
        return false;
    }

    AUXILIARY_SUBSTRINGS.iter().any(|p| contains_phrase(&lower, p))
        || AUXILIARY_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Store clients, launchers and their helpers.
pub fn is_launcher_or_utility(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    if LAUNCHER_NAMES.contains(&lower.as_str()) {
        return true;
    }

    let words = tokenize(&lower);
    let Some(brand_pos) = words
        .iter()
        .position(|w| AMBIGUOUS_LAUNCHER_WORDS.contains(&w.as_str()))
    else {
        return false;
    };

    match words.len() {
        1 => true,
        2 => {
            let other = &words[1 - brand_pos];
            LAUNCHER_QUALIFIERS.contains(&other.as_str())
        }
        _ => false,
    }
}

fn is_known_publisher(publisher: Option<&str>) -> bool {
    let Some(publisher) = publisher else {
        return false;
    };
    let lower = publisher.to_lowercase();
    KNOWN_PUBLISHERS.iter().any(|p| contains_phrase(&lower, p))
}

/// Splits on whitespace, hyphens, underscores, dots and other punctuation.
fn tokenize(lower: &str) -> Vec<String> {
    lower
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '.' | ':' | ',' | '(' | ')'))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whole-word membership, tolerating a plural "s".
fn contains_word(list: &[&str], word: &str) -> bool {
    list.contains(&word)
        || word
            .strip_suffix('s')
            .is_some_and(|singular| list.contains(&singular))
}

/// Substring match that must start and end on a word boundary.
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(start, matched)| {
        let end = start + matched.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_rejected() {
        assert_eq!(classify("Adobe Acrobat Runtime", None), Verdict::Reject);
        assert!(!accept("Adobe Acrobat Runtime", None, Verdict::Accept));
        assert!(!accept("Microsoft Visual C++ 2015 Redistributable", None, Verdict::Accept));
        assert!(!accept("NVIDIA Graphics Driver", None, Verdict::Accept));
        assert!(!accept("Epic Online Services", None, Verdict::Accept));
        assert!(!accept("DirectX Tools", None, Verdict::Accept));
    }

    #[test]
    fn test_half_life_accepted() {
        assert!(accept("Half-Life 2", None, Verdict::Accept));
        assert!(accept("Half-Life 2", Some("Valve"), Verdict::Reject));
        assert_eq!(classify("Half-Life 2", None), Verdict::Undecided);
    }

    #[test]
    fn test_undecided_uses_policy() {
        assert!(accept("Celeste", None, Verdict::Accept));
        assert!(!accept("Celeste", None, Verdict::Reject));
        assert!(accept("Celeste", Some("Devolver Digital"), Verdict::Reject));
    }

    #[test]
    fn test_genre_words_accept() {
        assert_eq!(classify("Mount & Blade Warband Strategy", None), Verdict::Accept);
        assert_eq!(classify("Euro Truck Simulator 2", None), Verdict::Accept);
    }

    #[test]
    fn test_skin_pack_rejected_even_when_base_accepted() {
        assert!(accept("Foo", None, Verdict::Accept));
        assert!(is_auxiliary_content("Foo Skin Pack"));
        assert!(!accept("Foo Skin Pack", None, Verdict::Accept));
        assert!(!accept("Foo Skin Pack", Some("Ubisoft"), Verdict::Accept));
    }

    #[test]
    fn test_auxiliary_patterns() {
        assert!(is_auxiliary_content("Cyberpunk 2077 Soundtrack"));
        assert!(is_auxiliary_content("Doom Eternal OST"));
        assert!(is_auxiliary_content("Hades Demo"));
        assert!(is_auxiliary_content("Rainbow Six Siege Season Pass"));
        assert!(is_auxiliary_content("Stellaris DLC Bundle"));
        assert!(!is_auxiliary_content("Demolition"));
        assert!(!is_auxiliary_content("Costume Quest"));
        assert!(!is_auxiliary_content("Packmaster"));
        assert!(!is_auxiliary_content("The Demonologist"));
    }

    #[test]
    fn test_launchers_exact_match() {
        assert!(is_launcher_or_utility("Epic Games Launcher"));
        assert!(is_launcher_or_utility("Ubisoft Connect"));
        assert!(is_launcher_or_utility("battle.net"));
        assert!(is_launcher_or_utility("GOG GALAXY"));
    }

    #[test]
    fn test_ambiguous_brand_words_need_to_stand_alone() {
        assert!(is_launcher_or_utility("Origin"));
        assert!(is_launcher_or_utility("Origin Client"));
        assert!(is_launcher_or_utility("uplay_launcher"));

        assert!(!is_launcher_or_utility("Rayman Originals"));
        assert!(!is_launcher_or_utility("Aboriginal Quest"));
        assert!(!is_launcher_or_utility("X Origin Story"));
        assert!(!is_launcher_or_utility("Galaxy on Fire 2"));
        assert!(!is_launcher_or_utility("Steamworld Dig"));
        assert!(accept("Rayman Originals", None, Verdict::Accept));
    }

    #[test]
    fn test_reject_words_are_whole_words() {
        // "tool" inside a longer word is not a utility.
        assert_eq!(classify("Toolbox Wars", None), Verdict::Undecided);
        assert_eq!(classify("Patchwork Hero", None), Verdict::Undecided);
        assert_eq!(classify("Modding Tools", None), Verdict::Reject);
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(classify("   ", None), Verdict::Reject);
    }
}
