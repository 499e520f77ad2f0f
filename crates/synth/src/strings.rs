//! String synthesis: formats, property-name hints, patterns, and the
//! generic token fallback.

use packgen_interchange::Constraints;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::dates::{self, DateWindow};
use crate::error::SchemaError;
use crate::pattern;
use crate::rng::SeedRng;

const FIRST_NAMES: &[&str] = &[
    "Ava", "Liam", "Maya", "Noah", "Zara", "Omar", "Iris", "Felix", "Nora", "Theo", "Lena",
    "Ravi", "Chloe", "Mateo", "Sofia", "Kenji", "Amara", "Jonas", "Elena", "Kofi",
];

const LAST_NAMES: &[&str] = &[
    "Patel", "Nguyen", "Garcia", "Okafor", "Schmidt", "Rossi", "Kim", "Silva", "Haddad",
    "Novak", "Larsen", "Tanaka", "Moreau", "Walsh", "Cohen", "Ibrahim", "Lopez", "Fischer",
];

const COMPANY_STEMS: &[&str] = &[
    "Northwind", "Bluepeak", "Brightline", "Ironleaf", "Sunforge", "Clearwater", "Redwood",
    "Silverline", "Oakridge", "Lumen",
];

const COMPANY_SUFFIXES: &[&str] = &["Labs", "Systems", "Group", "Works", "Analytics", "Co"];

const CITIES: &[&str] = &[
    "Lisbon", "Toronto", "Nairobi", "Osaka", "Denver", "Berlin", "Melbourne", "Austin",
    "Bogota", "Dublin", "Seoul", "Cape Town",
];

const COUNTRIES: &[&str] = &[
    "Portugal", "Canada", "Kenya", "Japan", "United States", "Germany", "Australia",
    "Colombia", "Ireland", "South Korea", "South Africa", "India",
];

const WORDS: &[&str] = &[
    "amber", "harbor", "quartz", "meadow", "signal", "vector", "cedar", "orbit", "lantern",
    "summit", "pixel", "delta", "falcon", "willow", "ember", "canyon", "nimbus", "atlas",
    "prism", "tundra",
];

const DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "mail.test"];

const TLDS: &[&str] = &["com", "io", "dev", "org"];

/// Longest `minLength` a string field may demand.
pub const MAX_STRING_LENGTH: usize = 10_000;

/// Synthesize one string honoring `c`. `hint` is the property name, if any.
pub(crate) fn synthesize(
    c: &Constraints,
    hint: Option<&str>,
    rng: &mut SeedRng,
    dates: &DateWindow,
    field: &str,
) -> Result<String, SchemaError> {
    if let Some(min) = c.min_length.filter(|&min| min > MAX_STRING_LENGTH) {
        return Err(SchemaError::conflict(
            field,
            format!("minLength ({}) exceeds the limit of {}", min, MAX_STRING_LENGTH),
        ));
    }
    if let (Some(min), Some(max)) = (c.min_length, c.max_length) {
        if min > max {
            return Err(SchemaError::conflict(
                field,
                format!("minLength ({}) exceeds maxLength ({})", min, max),
            ));
        }
    }
    let raw = base_string(c, hint, rng, dates);
    Ok(fit_length(raw, c.min_length, c.max_length, rng))
}

fn base_string(
    c: &Constraints,
    hint: Option<&str>,
    rng: &mut SeedRng,
    dates: &DateWindow,
) -> String {
    if let Some(format) = c.format.as_deref() {
        if let Some(s) = formatted(format, rng, dates) {
            return s;
        }
    }
    if let Some(p) = c.pattern.as_deref() {
        if let Some(s) = pattern::generate(p, rng) {
            return s;
        }
    }
    if let Some(h) = hint {
        if let Some(s) = hinted(h, rng) {
            return s;
        }
    }
    token(rng)
}

fn formatted(format: &str, rng: &mut SeedRng, window: &DateWindow) -> Option<String> {
    let s = match format {
        "email" => email(rng),
        "uuid" => uuid(rng),
        "date" => window.date_string(rng),
        "date-time" => window.date_time_string(rng),
        "time" => dates::time_string(rng),
        "uri" | "url" => url(rng),
        "hostname" => format!("{}-{}.{}", word(rng), word(rng), choose(DOMAINS, rng)),
        "ipv4" => format!(
            "{}.{}.{}.{}",
            rng.gen_range(1..=223u8),
            rng.gen_range(0..=255u8),
            rng.gen_range(0..=255u8),
            rng.gen_range(1..=254u8)
        ),
        "phone" => phone(rng),
        _ => return None,
    };
    Some(s)
}

fn hinted(property: &str, rng: &mut SeedRng) -> Option<String> {
    let p = property.to_ascii_lowercase();
    let s = if p.contains("email") {
        email(rng)
    } else if p == "firstname" || p == "first_name" {
        choose(FIRST_NAMES, rng).to_string()
    } else if p == "lastname" || p == "last_name" || p == "surname" {
        choose(LAST_NAMES, rng).to_string()
    } else if p.contains("phone") {
        phone(rng)
    } else if p == "url" || p == "website" || p.ends_with("url") {
        url(rng)
    } else if p.contains("company") || p.contains("organization") {
        format!("{} {}", choose(COMPANY_STEMS, rng), choose(COMPANY_SUFFIXES, rng))
    } else if p == "city" {
        choose(CITIES, rng).to_string()
    } else if p == "country" {
        choose(COUNTRIES, rng).to_string()
    } else if p == "id" || property.ends_with("Id") || p.ends_with("_id") {
        uuid(rng)
    } else if p == "name" || p.ends_with("name") {
        format!("{} {}", choose(FIRST_NAMES, rng), choose(LAST_NAMES, rng))
    } else {
        return None;
    };
    Some(s)
}

fn token(rng: &mut SeedRng) -> String {
    let count = rng.gen_range(1..=3);
    (0..count).map(|_| word(rng)).collect::<Vec<_>>().join(" ")
}

fn fit_length(mut s: String, min: Option<usize>, max: Option<usize>, rng: &mut SeedRng) -> String {
    if let Some(max) = max {
        if s.chars().count() > max {
            s = s.chars().take(max).collect();
        }
    }
    if let Some(min) = min {
        let len = s.chars().count();
        for _ in len..min {
            s.push(rng.gen_range(b'a'..=b'z') as char);
        }
    }
    s
}

// ── Building blocks ─────────────────────────────────────────────────

fn choose<'a>(options: &[&'a str], rng: &mut SeedRng) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

fn word(rng: &mut SeedRng) -> &'static str {
    choose(WORDS, rng)
}

fn email(rng: &mut SeedRng) -> String {
    format!(
        "{}.{}{}@{}",
        choose(FIRST_NAMES, rng).to_ascii_lowercase(),
        choose(LAST_NAMES, rng).to_ascii_lowercase(),
        rng.gen_range(1..100),
        choose(DOMAINS, rng)
    )
}

fn uuid(rng: &mut SeedRng) -> String {
    let mut b = [0u8; 16];
    rng.fill(&mut b);
    b[6] = (b[6] & 0x0f) | 0x40;
    b[8] = (b[8] & 0x3f) | 0x80;
    let hex: String = b.iter().map(|x| format!("{:02x}", x)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

fn url(rng: &mut SeedRng) -> String {
    format!("https://{}.{}/{}", word(rng), choose(TLDS, rng), word(rng))
}

fn phone(rng: &mut SeedRng) -> String {
    format!(
        "+1-555-{:03}-{:04}",
        rng.gen_range(100..1000),
        rng.gen_range(0..10_000)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    fn with_format(format: &str) -> Constraints {
        Constraints {
            format: Some(format.to_string()),
            ..Constraints::default()
        }
    }

    fn synth(c: &Constraints, hint: Option<&str>, seed: u64) -> String {
        synthesize(c, hint, &mut seeded(seed), &DateWindow::default(), "f").unwrap()
    }

    #[test]
    fn uuid_is_version_four() {
        let s = synth(&with_format("uuid"), None, 5);
        assert_eq!(s.len(), 36);
        assert_eq!(&s[14..15], "4");
        assert!(matches!(&s[19..20], "8" | "9" | "a" | "b"));
    }

    #[test]
    fn email_format_and_hint_agree_on_shape() {
        let a = synth(&with_format("email"), None, 1);
        let b = synth(&Constraints::default(), Some("contactEmail"), 1);
        for s in [a, b] {
            let (local, domain) = s.split_once('@').unwrap();
            assert!(local.contains('.'));
            assert!(DOMAINS.contains(&domain));
        }
    }

    #[test]
    fn dates_are_relative_to_base() {
        let s = synth(&with_format("date"), None, 8);
        assert!(s.starts_with("2024-") || s.starts_with("2025-"), "{}", s);
    }

    #[test]
    fn ipv4_has_four_octets() {
        let s = synth(&with_format("ipv4"), None, 2);
        assert_eq!(s.split('.').count(), 4);
        assert!(s.split('.').all(|o| o.parse::<u8>().is_ok()));
    }

    #[test]
    fn length_constraints_are_respected() {
        let c = Constraints {
            min_length: Some(30),
            max_length: Some(32),
            ..Constraints::default()
        };
        for seed in 0..20 {
            let n = synth(&c, None, seed).chars().count();
            assert!((30..=32).contains(&n));
        }
        let short = Constraints {
            max_length: Some(3),
            ..with_format("email")
        };
        assert_eq!(synth(&short, None, 0).chars().count(), 3);
    }

    #[test]
    fn oversized_min_length_is_a_conflict() {
        let c = Constraints {
            min_length: Some(MAX_STRING_LENGTH + 1),
            ..Constraints::default()
        };
        let err = synthesize(&c, None, &mut seeded(1), &DateWindow::default(), "note").unwrap_err();
        assert!(matches!(err, SchemaError::Conflict { ref field, .. } if field == "note"));
    }

    #[test]
    fn inverted_length_bounds_conflict() {
        let c = Constraints {
            min_length: Some(5),
            max_length: Some(2),
            ..Constraints::default()
        };
        let err = synthesize(&c, None, &mut seeded(0), &DateWindow::default(), "user.code")
            .unwrap_err();
        assert!(matches!(err, SchemaError::Conflict { ref field, .. } if field == "user.code"));
    }

    #[test]
    fn unknown_format_uses_pattern_then_token() {
        let c = Constraints {
            format: Some("color".to_string()),
            pattern: Some(r"#[0-9a-f]{6}".to_string()),
            ..Constraints::default()
        };
        let s = synth(&c, None, 4);
        assert_eq!(s.len(), 7);
        assert!(s.starts_with('#'));

        let plain = synth(&Constraints::default(), Some("notes"), 4);
        assert!(plain.split(' ').all(|w| WORDS.contains(&w)));
    }

    #[test]
    fn name_hints() {
        let first = synth(&Constraints::default(), Some("firstName"), 3);
        assert!(FIRST_NAMES.contains(&first.as_str()));
        let full = synth(&Constraints::default(), Some("name"), 3);
        assert_eq!(full.split(' ').count(), 2);
    }
}
