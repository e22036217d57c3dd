use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use super::error::IllustrationError;
use super::payload::validate_image_url;

/// A named image the assistant can put on screen.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Illustration {
    #[serde(skip)]
    pub key: String,
    pub url: String,
    pub description: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Illustrations known to the assistant, keyed by the name the model uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllustrationCatalog {
    entries: BTreeMap<String, Illustration>,
}

impl Default for IllustrationCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(Illustration {
            key: "pythagoras".to_string(),
            url: "https://upload.wikimedia.org/wikipedia/commons/thumb/d/d2/Pythagorean.svg/512px-Pythagorean.svg.png".to_string(),
            description: "Pythagorean theorem diagram showing a² + b² = c²".to_string(),
            topics: ["mathematics", "geometry", "pythagoras", "triangle", "theorem"]
                .map(String::from)
                .to_vec(),
        });
        catalog.insert(Illustration {
            key: "trigonometry".to_string(),
            url: "https://upload.wikimedia.org/wikipedia/commons/thumb/7/7e/Trigonometry_triangle.svg/800px-Trigonometry_triangle.svg.png".to_string(),
            description: "A right-angled triangle used to define sine, cosine, and tangent".to_string(),
            topics: ["mathematics", "geometry", "trigonometry", "triangle"]
                .map(String::from)
                .to_vec(),
        });
        catalog
    }
}

impl IllustrationCatalog {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, illustration: Illustration) {
        debug!(key = %illustration.key, "Registering illustration");
        self.entries.insert(illustration.key.clone(), illustration);
    }

    /// Merge configured entries over the current ones. Every URL must be a
    /// valid http(s) URL.
    pub fn extend(
        &mut self,
        entries: impl IntoIterator<Item = (String, Illustration)>,
    ) -> Result<(), IllustrationError> {
        for (key, mut illustration) in entries {
            validate_image_url(&illustration.url)?;
            illustration.key = key;
            self.insert(illustration);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&Illustration, IllustrationError> {
        self.entries
            .get(key.trim())
            .ok_or_else(|| IllustrationError::UnknownIllustration(key.to_string()))
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Illustration> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose topics include `topic` (case-insensitive).
    pub fn find_by_topic<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a Illustration> + 'a {
        self.entries
            .values()
            .filter(move |i| i.topics.iter().any(|t| t.eq_ignore_ascii_case(topic)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_entries() {
        let catalog = IllustrationCatalog::default();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.keys().collect::<Vec<_>>(),
            vec!["pythagoras", "trigonometry"]
        );
        for illustration in catalog.iter() {
            assert!(validate_image_url(&illustration.url).is_ok());
        }
    }

    #[test]
    fn test_get_unknown_key() {
        let catalog = IllustrationCatalog::default();
        let err = catalog.get("calculus").unwrap_err();
        assert!(matches!(err, IllustrationError::UnknownIllustration(ref k) if k == "calculus"));
    }

    #[test]
    fn test_get_trims_key() {
        let catalog = IllustrationCatalog::default();
        assert_eq!(catalog.get(" pythagoras ").unwrap().key, "pythagoras");
    }

    #[test]
    fn test_find_by_topic() {
        let catalog = IllustrationCatalog::default();
        let triangles: Vec<_> = catalog.find_by_topic("Triangle").map(|i| i.key.as_str()).collect();
        assert_eq!(triangles, vec!["pythagoras", "trigonometry"]);
        assert_eq!(catalog.find_by_topic("theorem").count(), 1);
    }

    #[test]
    fn test_extend_sets_key_and_validates() {
        let mut catalog = IllustrationCatalog::empty();
        let entry = Illustration {
            key: String::new(),
            url: "https://example.com/circle.png".to_string(),
            description: "Unit circle".to_string(),
            topics: vec!["trigonometry".to_string()],
        };
        catalog.extend([("unit_circle".to_string(), entry.clone())]).unwrap();
        assert_eq!(catalog.get("unit_circle").unwrap().key, "unit_circle");

        let bad = Illustration {
            url: "ftp://example.com/circle.png".to_string(),
            ..entry
        };
        assert!(catalog.extend([("bad".to_string(), bad)]).is_err());
        assert!(catalog.get("bad").is_err());
    }
}
