use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_RATING: f64 = 4.5;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Laboratory,
    Industrial,
    Portable,
    Accessories,
    Retail,
}

impl Category {
    pub const ALL: [Self; 5] = [
        Self::Laboratory,
        Self::Industrial,
        Self::Portable,
        Self::Accessories,
        Self::Retail,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Laboratory => "laboratory",
            Self::Industrial => "industrial",
            Self::Portable => "portable",
            Self::Accessories => "accessories",
            Self::Retail => "retail",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown category '{}'. Expected one of: laboratory, industrial, portable, accessories, retail",
            self.0
        )
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A catalog entry as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub description: String,
    pub image: String,
    pub cloudinary_id: Option<String>,
    pub indiamart_url: String,
    pub whatsapp_message: String,
    pub rating: f64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fully validated column values for an insert or an update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub name: String,
    pub category: Category,
    pub description: String,
    pub image: String,
    pub cloudinary_id: Option<String>,
    pub indiamart_url: String,
    pub whatsapp_message: String,
    pub rating: f64,
    pub is_active: bool,
}

/// Caller-supplied product fields. Everything is optional so that the same
/// shape serves creates (where most fields are required) and partial updates.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductFields {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub indiamart_url: Option<String>,
    pub whatsapp_message: Option<String>,
    pub rating: Option<f64>,
    pub is_active: Option<bool>,
}

/// Clamps a rating into `[0, MAX_RATING]`. Non-finite values fall back to the default.
#[must_use]
pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_finite() {
        rating.clamp(0.0, MAX_RATING)
    } else {
        DEFAULT_RATING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!("Laboratory".parse::<Category>(), Ok(Category::Laboratory));
        assert_eq!(" retail ".parse::<Category>(), Ok(Category::Retail));
        assert!("kitchen".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_lowercase() {
        let json = serde_json::to_string(&Category::Accessories).unwrap();
        assert_eq!(json, "\"accessories\"");
    }

    #[test]
    fn test_clamp_rating() {
        assert!((clamp_rating(7.2) - 5.0).abs() < f64::EPSILON);
        assert!(clamp_rating(-1.0).abs() < f64::EPSILON);
        assert!((clamp_rating(3.7) - 3.7).abs() < f64::EPSILON);
        assert!((clamp_rating(f64::NAN) - DEFAULT_RATING).abs() < f64::EPSILON);
    }
}
