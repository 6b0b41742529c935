use regex::Regex;

use crate::shared::errors::{EngineError, EngineResult};

/// One classification rule: a venue type and the text pattern implying it.
struct ClassificationRule {
    type_name: &'static str,
    pattern: Regex,
}

/// Static, ordered table inferring venue types from name + description text.
///
/// Order is part of the contract: inferred types come back in table order so
/// repeated runs write identical link sets.
pub struct ClassificationTable {
    rules: Vec<ClassificationRule>,
}

impl ClassificationTable {
    pub fn standard() -> EngineResult<Self> {
        let table: &[(&'static str, &'static str)] = &[
            ("barn", r"(?i)\b(barn|farmhouse|hayloft)\b"),
            ("winery", r"(?i)\b(winery|vineyard|wine\s*estate|cellars?)\b"),
            ("brewery", r"(?i)\b(brewery|distillery|taproom)\b"),
            ("garden", r"(?i)\b(gardens?|botanical|arboretum|courtyard)\b"),
            ("estate", r"(?i)\b(estate|mansion|manor|villa|chateau|château)\b"),
            ("beach", r"(?i)\b(beach|beachfront|oceanfront|seaside|waterfront)\b"),
            ("ranch", r"(?i)\b(ranch|farm|homestead|orchard)\b"),
            ("hotel", r"(?i)\b(hotel|resort|inn|lodge)\b"),
            ("ballroom", r"(?i)\b(ballroom|banquet\s*hall|grand\s*hall)\b"),
            ("rooftop", r"(?i)\b(rooftop|roof\s*deck|skyline\s*terrace)\b"),
            ("historic", r"(?i)\b(historic|heritage|landmark|museum|castle)\b"),
            ("golf_club", r"(?i)\b(golf|country\s*club|fairway)\b"),
            ("restaurant", r"(?i)\b(restaurant|bistro|trattoria|supper\s*club)\b"),
            ("mountain", r"(?i)\b(mountain|alpine|summit|ski)\b"),
        ];

        let rules = table
            .iter()
            .map(|(type_name, pattern)| {
                Regex::new(pattern)
                    .map(|pattern| ClassificationRule { type_name, pattern })
                    .map_err(|e| {
                        EngineError::Configuration(format!(
                            "classification pattern for '{}': {}",
                            type_name, e
                        ))
                    })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// All venue types whose pattern matches the text, in table order.
    pub fn infer(&self, text: &str) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| rule.pattern.is_match(text))
            .map(|rule| rule.type_name.to_string())
            .collect()
    }

    #[cfg(test)]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
