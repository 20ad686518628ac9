use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::geo::GeoPoint;

pub const PROCESSING_EMOTION_TAG: &str = "Processing...";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioRecord {
	pub record_id: Uuid,
	pub user_id: Option<Uuid>,
	pub latitude: f64,
	pub longitude: f64,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	pub transcript: String,
	pub generated_story: String,
	pub emotion_tag: Option<String>,
	pub scene_tags: Vec<String>,
	pub city: Option<String>,
	pub district: Option<String>,
	pub like_count: i64,
	pub question_count: i64,
	#[serde(default, skip_serializing)]
	pub embedding: Option<Vec<f32>>,
	#[serde(default, with = "crate::time_serde::option")]
	pub processed_at: Option<OffsetDateTime>,
}
impl AudioRecord {
	pub fn point(&self) -> GeoPoint {
		GeoPoint { latitude: self.latitude, longitude: self.longitude }
	}

	/// Hour of day of `created_at` in UTC, the clock every temporal window is expressed in.
	pub fn utc_hour(&self) -> u8 {
		self.created_at.to_offset(UtcOffset::UTC).hour()
	}

	/// Scene tags in the serialized form the keyword filter searches, matching Postgres'
	/// `jsonb::text` rendering (`["a", "b"]`).
	pub fn serialized_scene_tags(&self) -> String {
		let items: Vec<String> = self
			.scene_tags
			.iter()
			.map(|tag| serde_json::to_string(tag).unwrap_or_default())
			.collect();

		format!("[{}]", items.join(", "))
	}
}

/// Upload-time placeholder. Content fields are filled later by [`Enrichment`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewAudioRecord {
	pub user_id: Option<Uuid>,
	pub latitude: f64,
	pub longitude: f64,
	pub city: Option<String>,
	pub district: Option<String>,
}
impl NewAudioRecord {
	pub fn into_record(self, record_id: Uuid, created_at: OffsetDateTime) -> AudioRecord {
		AudioRecord {
			record_id,
			user_id: self.user_id,
			latitude: self.latitude,
			longitude: self.longitude,
			created_at,
			transcript: String::new(),
			generated_story: String::new(),
			emotion_tag: Some(PROCESSING_EMOTION_TAG.to_string()),
			scene_tags: Vec::new(),
			city: self.city,
			district: self.district,
			like_count: 0,
			question_count: 0,
			embedding: None,
			processed_at: None,
		}
	}
}

/// Output of the asynchronous AI pipeline, applied to a record exactly once.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Enrichment {
	pub transcript: String,
	pub emotion_tag: Option<String>,
	pub generated_story: String,
	pub scene_tags: Vec<String>,
}
impl Enrichment {
	/// The richest text available for embedding: the story, else the transcript.
	pub fn embedding_source(&self) -> Option<&str> {
		[self.generated_story.as_str(), self.transcript.as_str()]
			.into_iter()
			.map(str::trim)
			.find(|text| !text.is_empty())
	}
}

/// Listener reaction counters kept on each record.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
	Like,
	Question,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterChange {
	Increment,
	Decrement,
}
impl CounterChange {
	pub fn delta(&self) -> i64 {
		match self {
			Self::Increment => 1,
			Self::Decrement => -1,
		}
	}
}

impl AudioRecord {
	/// Applies one reaction change. Counters never drop below zero.
	pub fn adjust_counter(&mut self, counter: Counter, change: CounterChange) {
		let value = match counter {
			Counter::Like => &mut self.like_count,
			Counter::Question => &mut self.question_count,
		};

		*value = value.saturating_add(change.delta()).max(0);
	}
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn utc_hour_ignores_stored_offset() {
		let record = NewAudioRecord {
			user_id: None,
			latitude: 30.66,
			longitude: 104.06,
			city: Some("Chengdu".to_string()),
			district: None,
		}
		.into_record(Uuid::new_v4(), datetime!(2026-03-01 09:30 +08:00));

		assert_eq!(record.utc_hour(), 1);
	}

	#[test]
	fn tags_serialize_like_jsonb_text() {
		let mut record = NewAudioRecord {
			user_id: None,
			latitude: 0.0,
			longitude: 0.0,
			city: None,
			district: None,
		}
		.into_record(Uuid::new_v4(), datetime!(2026-03-01 09:30 UTC));

		assert_eq!(record.serialized_scene_tags(), "[]");

		record.scene_tags = vec!["old street".to_string(), "say \"hi\"".to_string()];

		assert_eq!(record.serialized_scene_tags(), r#"["old street", "say \"hi\""]"#);
	}

	#[test]
	fn embedding_source_prefers_story() {
		let enrichment = Enrichment {
			transcript: "vendor calling out prices".to_string(),
			generated_story: "A morning market wakes up.".to_string(),
			..Enrichment::default()
		};

		assert_eq!(enrichment.embedding_source(), Some("A morning market wakes up."));

		let enrichment = Enrichment {
			transcript: "vendor calling out prices".to_string(),
			generated_story: "  ".to_string(),
			..Enrichment::default()
		};

		assert_eq!(enrichment.embedding_source(), Some("vendor calling out prices"));
		assert_eq!(Enrichment::default().embedding_source(), None);
	}

	#[test]
	fn counters_stop_at_zero() {
		let mut record = NewAudioRecord {
			user_id: None,
			latitude: 0.0,
			longitude: 0.0,
			city: None,
			district: None,
		}
		.into_record(Uuid::new_v4(), datetime!(2026-03-01 09:30 UTC));

		record.adjust_counter(Counter::Like, CounterChange::Increment);
		record.adjust_counter(Counter::Like, CounterChange::Increment);
		record.adjust_counter(Counter::Question, CounterChange::Decrement);

		assert_eq!((record.like_count, record.question_count), (2, 0));

		record.adjust_counter(Counter::Like, CounterChange::Decrement);
		record.adjust_counter(Counter::Like, CounterChange::Decrement);
		record.adjust_counter(Counter::Like, CounterChange::Decrement);

		assert_eq!(record.like_count, 0);
	}
}
