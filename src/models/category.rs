//! Display categories

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Carousel a publication is shown in. `General` means none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    ChemistryAndEnergy,
    PhysicsAndCondensedMatter,
    Bioscience,
    GeoscienceAndEnvironment,
    General,
}

impl Category {
    /// The four carousel categories, in display order.
    pub const DISPLAYED: [Category; 4] = [
        Category::ChemistryAndEnergy,
        Category::PhysicsAndCondensedMatter,
        Category::Bioscience,
        Category::GeoscienceAndEnvironment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::ChemistryAndEnergy => "chemistry and energy",
            Category::PhysicsAndCondensedMatter => "physics and condensed matter",
            Category::Bioscience => "bioscience",
            Category::GeoscienceAndEnvironment => "geoscience and environment",
            Category::General => "General",
        }
    }

    pub fn is_displayed(self) -> bool {
        self != Category::General
    }

    /// Category of a stored value; missing or unknown values are `General`.
    pub fn from_stored(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(Category::General)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::DISPLAYED
            .into_iter()
            .chain([Category::General])
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::Validation(format!("Unknown category: {}", s)))
    }
}

impl TryFrom<String> for Category {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Bioscience".parse::<Category>().unwrap(), Category::Bioscience);
        assert_eq!(
            "  Physics and Condensed Matter ".parse::<Category>().unwrap(),
            Category::PhysicsAndCondensedMatter
        );
        assert_eq!("general".parse::<Category>().unwrap(), Category::General);
        assert!("astronomy".parse::<Category>().is_err());
    }

    #[test]
    fn test_from_stored_defaults_to_general() {
        assert_eq!(Category::from_stored(None), Category::General);
        assert_eq!(Category::from_stored(Some("tags")), Category::General);
        assert_eq!(
            Category::from_stored(Some("geoscience and environment")),
            Category::GeoscienceAndEnvironment
        );
        assert!(!Category::General.is_displayed());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Category::ChemistryAndEnergy).unwrap();
        assert_eq!(json, "\"chemistry and energy\"");
        let parsed: Category = serde_json::from_str("\"BIOSCIENCE\"").unwrap();
        assert_eq!(parsed, Category::Bioscience);
    }
}
