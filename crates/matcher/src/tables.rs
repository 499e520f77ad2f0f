//! Fixed lookup tables used by the scorer.

use packgen_interchange::Stage;

/// Analysis business type (normalized) -> pack business type.
const BUSINESS_TYPES: &[(&str, &str)] = &[
    ("saas", "productivity"),
    ("b2b-saas", "productivity"),
    ("productivity", "productivity"),
    ("project-management", "productivity"),
    ("collaboration", "productivity"),
    ("workspace", "productivity"),
    ("ecommerce", "ecommerce"),
    ("e-commerce", "ecommerce"),
    ("retail", "ecommerce"),
    ("online-store", "ecommerce"),
    ("d2c", "ecommerce"),
    ("marketplace", "ecommerce"),
    ("crm", "crm"),
    ("sales", "crm"),
    ("fintech", "finance"),
    ("banking", "finance"),
    ("finance", "finance"),
    ("insurance", "finance"),
    ("healthcare", "healthcare"),
    ("healthtech", "healthcare"),
    ("medical", "healthcare"),
    ("education", "education"),
    ("edtech", "education"),
    ("social", "social"),
    ("community", "social"),
];

/// Analysis maturity term (normalized) -> stage.
const STAGES: &[(&str, Stage)] = &[
    ("idea", Stage::Early),
    ("prototype", Stage::Early),
    ("mvp", Stage::Early),
    ("pre-seed", Stage::Early),
    ("seed", Stage::Early),
    ("startup", Stage::Early),
    ("launch", Stage::Early),
    ("early", Stage::Early),
    ("growth", Stage::Growth),
    ("growing", Stage::Growth),
    ("scaling", Stage::Growth),
    ("scale-up", Stage::Growth),
    ("series-a", Stage::Growth),
    ("expansion", Stage::Growth),
    ("mature", Stage::Enterprise),
    ("established", Stage::Enterprise),
    ("enterprise", Stage::Enterprise),
    ("public", Stage::Enterprise),
    ("corporate", Stage::Enterprise),
];

/// Pack business type -> features such a product typically has.
const FEATURES: &[(&str, &[&str])] = &[
    (
        "productivity",
        &[
            "task management",
            "project tracking",
            "team collaboration",
            "time tracking",
            "file sharing",
            "notifications",
            "reporting",
            "calendar",
        ],
    ),
    (
        "ecommerce",
        &[
            "product catalog",
            "shopping cart",
            "checkout",
            "payments",
            "order management",
            "inventory",
            "customer accounts",
            "shipping",
        ],
    ),
    (
        "crm",
        &[
            "contact management",
            "lead tracking",
            "sales pipeline",
            "email campaigns",
            "reporting",
        ],
    ),
    (
        "finance",
        &[
            "transactions",
            "accounts",
            "payments",
            "statements",
            "fraud detection",
            "compliance",
        ],
    ),
    (
        "healthcare",
        &[
            "patient records",
            "appointments",
            "prescriptions",
            "billing",
            "compliance",
        ],
    ),
    (
        "education",
        &["courses", "enrollment", "assignments", "grading", "progress tracking"],
    ),
    (
        "social",
        &["profiles", "feeds", "messaging", "comments", "notifications"],
    ),
];

/// Business types that usually need a multi-sided custom scenario.
pub const MARKETPLACE_TYPES: &[&str] = &["marketplace"];

/// Business types whose data usually carries compliance requirements.
pub const REGULATED_TYPES: &[&str] = &["fintech", "banking", "insurance", "healthcare", "healthtech", "medical"];

/// Lowercase, trim, and join words with hyphens: "B2B SaaS" -> "b2b-saas".
pub fn normalize(term: &str) -> String {
    term.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Map an analysis business type onto a pack business type. Terms
/// missing from the table map to themselves.
pub fn business_type(term: &str) -> String {
    let term = normalize(term);
    BUSINESS_TYPES
        .iter()
        .find(|(from, _)| *from == term)
        .map(|(_, to)| to.to_string())
        .unwrap_or(term)
}

pub fn stage(term: &str) -> Option<Stage> {
    let term = normalize(term);
    STAGES
        .iter()
        .find(|(from, _)| *from == term)
        .map(|(_, stage)| *stage)
        .or_else(|| term.parse().ok())
}

pub fn features(business_type: &str) -> &'static [&'static str] {
    FEATURES
        .iter()
        .find(|(ty, _)| *ty == business_type)
        .map(|(_, features)| *features)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spacing_and_case() {
        assert_eq!(normalize("  B2B SaaS "), "b2b-saas");
        assert_eq!(normalize("scale_up"), "scale-up");
    }

    #[test]
    fn maps_many_types_to_one() {
        assert_eq!(business_type("SaaS"), "productivity");
        assert_eq!(business_type("project management"), "productivity");
        assert_eq!(business_type("Retail"), "ecommerce");
        assert_eq!(business_type("gaming"), "gaming");
    }

    #[test]
    fn maps_stage_terms() {
        assert_eq!(stage("MVP"), Some(Stage::Early));
        assert_eq!(stage("scaling"), Some(Stage::Growth));
        assert_eq!(stage("Mature"), Some(Stage::Enterprise));
        assert_eq!(stage("unknown"), None);
    }

    #[test]
    fn every_mapped_type_has_features() {
        for (_, target) in BUSINESS_TYPES {
            assert!(!features(target).is_empty(), "no features for {}", target);
        }
    }
}
