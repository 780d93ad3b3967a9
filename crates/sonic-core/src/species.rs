//! Species catalog: fixed markers in normalized space that shape the field
//! and carry the audio identity of each zone.

use fnv::FnvHashSet;
use glam::Vec2;
use serde::Deserialize;

static BUILTIN_CATALOG_JSON: &str = include_str!("../data/species.json");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum Category {
    #[default]
    Mammal,
    Cephalopod,
    Plant,
    Crustacean,
    Fish,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Mammal,
        Category::Cephalopod,
        Category::Plant,
        Category::Crustacean,
        Category::Fish,
    ];

    /// Unrecognized names fall back to [`Category::Mammal`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "mammal" => Category::Mammal,
            "cephalopod" => Category::Cephalopod,
            "plant" => Category::Plant,
            "crustacean" => Category::Crustacean,
            "fish" => Category::Fish,
            other => {
                log::warn!("[catalog] unknown category {:?}, using mammal", other);
                Category::Mammal
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Mammal => "mammal",
            Category::Cephalopod => "cephalopod",
            Category::Plant => "plant",
            Category::Crustacean => "crustacean",
            Category::Fish => "fish",
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category::parse(&s)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Species {
    pub id: String,
    pub name: String,
    #[serde(rename = "latin", alias = "latinName")]
    pub latin_name: String,
    pub category: Category,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub depth: f32,
    pub color: [u8; 3],
    #[serde(rename = "depthRange", alias = "depthRangeLabel", default)]
    pub depth_range: String,
}

impl Species {
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Screen-space position for a viewport of `width` x `height` pixels.
    #[inline]
    pub fn screen_position(&self, width: f32, height: f32) -> Vec2 {
        Vec2::new(self.x * width, self.y * height)
    }

    pub fn tooltip_text(&self) -> String {
        format!("{} — {} — {}", self.name, self.latin_name, self.depth_range)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog contains no species")]
    Empty,
    #[error("species {id:?} is invalid: {reason}")]
    InvalidSpecies { id: String, reason: &'static str },
}

#[derive(Deserialize)]
struct CatalogDoc {
    species: Vec<Species>,
}

/// Read-only set of species for a session.
#[derive(Clone, Debug)]
pub struct Catalog {
    species: Vec<Species>,
}

impl Catalog {
    pub fn new(species: Vec<Species>) -> Result<Self, CatalogError> {
        if species.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = FnvHashSet::default();
        for sp in &species {
            let invalid = |reason| CatalogError::InvalidSpecies {
                id: sp.id.clone(),
                reason,
            };
            if !seen.insert(sp.id.as_str()) {
                return Err(invalid("duplicate id"));
            }
            if !(0.0..=1.0).contains(&sp.x) || !(0.0..=1.0).contains(&sp.y) {
                return Err(invalid("position outside [0,1]"));
            }
            if sp.radius.is_nan() || sp.radius <= 0.0 {
                return Err(invalid("radius must be positive"));
            }
            if !(0.0..=1.0).contains(&sp.depth) {
                return Err(invalid("depth outside [0,1]"));
            }
        }
        Ok(Self { species })
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDoc = serde_json::from_str(text)?;
        Self::new(doc.species)
    }

    /// The bundled Puget Sound catalog.
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN_CATALOG_JSON) {
            Ok(c) => c,
            Err(e) => panic!("bundled species catalog is invalid: {e}"),
        }
    }

    #[inline]
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn get(&self, id: &str) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}
