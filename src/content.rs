//! Content payload supplied by the page.
//!
//! The host page embeds a JSON document in `<script id="portfolio-data">`:
//!
//! ```json
//! {
//!   "owner": "Ada Lovelace",
//!   "items": [
//!     { "kind": "hobby", "id": 1, "name": "Climbing", "images": ["/img/climb.jpg"] },
//!     {
//!       "kind": "travel", "id": 2, "name": "Kyoto", "images": [],
//!       "position": { "x": 0.8, "y": 0.4 }
//!     }
//!   ],
//!   "settings": { "bubbles": { "radius": 3.0 } }
//! }
//! ```

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::components::bubbles::{BubbleConfig, ExplosionConfig};
use crate::components::particle_field::{FieldConfig, FieldStyle, LiquidConfig, ScrollConfig};

/// Stable numeric id of a content item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Position in [0, 1] x [0, 1], e.g. on a map.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct NormalizedPosition {
	pub x: f64,
	pub y: f64,
}

/// Fields every content kind carries.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ItemDetails {
	pub id: ItemId,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub images: Vec<String>,
}

/// One displayable item, tagged by kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentItem {
	Project {
		#[serde(flatten)]
		details: ItemDetails,
		#[serde(default)]
		link: Option<String>,
	},
	/// Hobbies become bubbles.
	Hobby {
		#[serde(flatten)]
		details: ItemDetails,
	},
	Travel {
		#[serde(flatten)]
		details: ItemDetails,
		#[serde(default)]
		position: Option<NormalizedPosition>,
	},
}

/// Something with a browsable set of images.
pub trait Gallery {
	/// Key identifying the gallery, unique across content kinds.
	fn gallery_key(&self) -> String;
	fn image_list(&self) -> &[String];
}

impl ContentItem {
	pub fn details(&self) -> &ItemDetails {
		match self {
			ContentItem::Project { details, .. }
			| ContentItem::Hobby { details }
			| ContentItem::Travel { details, .. } => details,
		}
	}

	pub fn id(&self) -> ItemId {
		self.details().id
	}

	pub fn name(&self) -> &str {
		&self.details().name
	}

	pub fn kind(&self) -> &'static str {
		match self {
			ContentItem::Project { .. } => "project",
			ContentItem::Hobby { .. } => "hobby",
			ContentItem::Travel { .. } => "travel",
		}
	}

	pub fn is_hobby(&self) -> bool {
		matches!(self, ContentItem::Hobby { .. })
	}
}

impl Gallery for ContentItem {
	fn gallery_key(&self) -> String {
		format!("{}-{}", self.kind(), self.id().0)
	}

	fn image_list(&self) -> &[String] {
		&self.details().images
	}
}

/// Effect tuning overrides; anything omitted keeps its default.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
	pub background: FieldConfig,
	#[serde(deserialize_with = "text_field_overrides")]
	pub name_text: FieldConfig,
	pub style: FieldStyle,
	pub scroll: ScrollConfig,
	pub liquid: LiquidConfig,
	pub bubbles: BubbleConfig,
	pub explosion: ExplosionConfig,
}

impl Default for EffectSettings {
	fn default() -> Self {
		Self {
			background: FieldConfig::ambient(),
			name_text: FieldConfig::text(),
			style: FieldStyle::default(),
			scroll: ScrollConfig::default(),
			liquid: LiquidConfig::default(),
			bubbles: BubbleConfig::default(),
			explosion: ExplosionConfig::default(),
		}
	}
}

/// Lay a partial `name_text` object over the text preset instead of the
/// ambient one `FieldConfig::default()` would fill in.
fn text_field_overrides<'de, D>(deserializer: D) -> Result<FieldConfig, D::Error>
where
	D: Deserializer<'de>,
{
	let overrides = Map::<String, Value>::deserialize(deserializer)?;
	let mut merged = match serde_json::to_value(FieldConfig::text()) {
		Ok(Value::Object(preset)) => preset,
		_ => Map::new(),
	};
	merged.extend(overrides);
	serde_json::from_value(Value::Object(merged)).map_err(D::Error::custom)
}

/// Complete page payload.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PortfolioData {
	pub owner: String,
	pub items: Vec<ContentItem>,
	pub settings: EffectSettings,
}

impl PortfolioData {
	/// Items shown as bubbles, in payload order.
	pub fn hobbies(&self) -> impl Iterator<Item = &ContentItem> {
		self.items.iter().filter(|item| item.is_hobby())
	}

	pub fn item(&self, id: ItemId) -> Option<&ContentItem> {
		self.items.iter().find(|item| item.id() == id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const PAYLOAD: &str = r#"{
		"owner": "Ada",
		"items": [
			{
				"kind": "project", "id": 7, "name": "Engine",
				"images": ["a.png", "b.png"], "link": "https://example.org"
			},
			{ "kind": "hobby", "id": 1, "name": "Climbing", "images": ["climb.jpg"] },
			{ "kind": "travel", "id": 2, "name": "Kyoto", "position": { "x": 0.8, "y": 0.4 } }
		],
		"settings": { "bubbles": { "radius": 3.0 }, "background": { "count": 50 } }
	}"#;

	#[test]
	fn parses_tagged_items() {
		let data: PortfolioData = serde_json::from_str(PAYLOAD).unwrap();
		assert_eq!(data.owner, "Ada");
		assert_eq!(data.items.len(), 3);
		assert_eq!(data.items[0].kind(), "project");
		assert_eq!(data.items[2].image_list().len(), 0);
		match &data.items[2] {
			ContentItem::Travel { position, .. } => {
				assert_eq!(*position, Some(NormalizedPosition { x: 0.8, y: 0.4 }));
			}
			other => panic!("expected travel, got {:?}", other),
		}
	}

	#[test]
	fn gallery_keys_are_unique_per_kind() {
		let data: PortfolioData = serde_json::from_str(PAYLOAD).unwrap();
		let keys: Vec<String> = data.items.iter().map(|i| i.gallery_key()).collect();
		assert_eq!(keys, vec!["project-7", "hobby-1", "travel-2"]);
		assert_eq!(data.items[0].image_list(), ["a.png", "b.png"]);
	}

	#[test]
	fn settings_override_only_given_fields() {
		let data: PortfolioData = serde_json::from_str(PAYLOAD).unwrap();
		assert_eq!(data.settings.bubbles.radius, 3.0);
		assert_eq!(data.settings.bubbles.packing, BubbleConfig::default().packing);
		assert_eq!(data.settings.background.count, 50);
		assert_eq!(data.settings.background.friction, FieldConfig::ambient().friction);
		assert_eq!(data.settings.name_text.spring, FieldConfig::text().spring);
	}

	#[test]
	fn partial_name_text_keeps_text_preset() {
		let json = r#"{ "settings": { "name_text": { "pointer_radius": 50 } } }"#;
		let data: PortfolioData = serde_json::from_str(json).unwrap();
		let config = &data.settings.name_text;
		let text = FieldConfig::text();
		assert_eq!(config.pointer_radius, 50.0);
		assert_eq!(config.spring, text.spring);
		assert_eq!(config.edge, text.edge);
		assert_eq!(config.max_speed, None);
		assert_eq!(config.count, text.count);
		assert_eq!(config.friction, text.friction);
	}

	#[test]
	fn name_text_rejects_bad_values() {
		let json = r#"{ "settings": { "name_text": { "spring": "stiff" } } }"#;
		assert!(serde_json::from_str::<PortfolioData>(json).is_err());
	}

	#[test]
	fn hobbies_filter_and_lookup() {
		let data: PortfolioData = serde_json::from_str(PAYLOAD).unwrap();
		let hobbies: Vec<ItemId> = data.hobbies().map(|h| h.id()).collect();
		assert_eq!(hobbies, vec![ItemId(1)]);
		assert_eq!(data.item(ItemId(2)).map(|i| i.name()), Some("Kyoto"));
		assert!(data.item(ItemId(99)).is_none());
	}

	#[test]
	fn empty_payload_uses_defaults() {
		let data: PortfolioData = serde_json::from_str("{}").unwrap();
		assert!(data.items.is_empty());
		assert_eq!(data.settings.background.count, FieldConfig::ambient().count);
	}
}
