use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use murmur_domain::AudioRecord;

use crate::{Error, Result};

/// Column list every record query selects, in [`AudioRecordRow`] order.
pub const RECORD_COLUMNS: &str = "\
record_id,
	user_id,
	latitude,
	longitude,
	created_at,
	transcript,
	generated_story,
	emotion_tag,
	scene_tags,
	city,
	district,
	like_count,
	question_count,
	embedding::text AS embedding,
	processed_at";

#[derive(Debug, sqlx::FromRow)]
pub struct AudioRecordRow {
	pub record_id: Uuid,
	pub user_id: Option<Uuid>,
	pub latitude: f64,
	pub longitude: f64,
	pub created_at: OffsetDateTime,
	pub transcript: String,
	pub generated_story: String,
	pub emotion_tag: Option<String>,
	pub scene_tags: Json<Vec<String>>,
	pub city: Option<String>,
	pub district: Option<String>,
	pub like_count: i64,
	pub question_count: i64,
	pub embedding: Option<String>,
	pub processed_at: Option<OffsetDateTime>,
}
impl AudioRecordRow {
	pub fn into_record(self) -> Result<AudioRecord> {
		let embedding = self.embedding.as_deref().map(parse_pg_vector).transpose()?;

		Ok(AudioRecord {
			record_id: self.record_id,
			user_id: self.user_id,
			latitude: self.latitude,
			longitude: self.longitude,
			created_at: self.created_at,
			transcript: self.transcript,
			generated_story: self.generated_story,
			emotion_tag: self.emotion_tag,
			scene_tags: self.scene_tags.0,
			city: self.city,
			district: self.district,
			like_count: self.like_count,
			question_count: self.question_count,
			embedding,
			processed_at: self.processed_at,
		})
	}
}

/// Renders a vector in pgvector's text input format, e.g. `[0.1,0.2]`.
pub fn vector_to_pg(vec: &[f32]) -> String {
	let parts: Vec<String> = vec.iter().map(|value| value.to_string()).collect();

	format!("[{}]", parts.join(","))
}

pub fn parse_pg_vector(text: &str) -> Result<Vec<f32>> {
	let inner = text
		.trim()
		.strip_prefix('[')
		.and_then(|s| s.strip_suffix(']'))
		.ok_or_else(|| Error::Decode("Vector text is not bracketed.".to_string()))?;

	if inner.trim().is_empty() {
		return Ok(Vec::new());
	}

	inner
		.split(',')
		.map(|part| {
			part.trim()
				.parse::<f32>()
				.map_err(|_| Error::Decode(format!("Vector component {part:?} is not numeric.")))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pg_vector_text_parses_back() {
		let text = vector_to_pg(&[0.5, -1.25, 3.0]);

		assert_eq!(text, "[0.5,-1.25,3]");
		assert_eq!(parse_pg_vector(&text).expect("parse"), vec![0.5, -1.25, 3.0]);
		assert_eq!(parse_pg_vector(" [] ").expect("parse"), Vec::<f32>::new());
	}

	#[test]
	fn malformed_vector_text_is_a_decode_error() {
		assert!(matches!(parse_pg_vector("0.5,1"), Err(Error::Decode(_))));
		assert!(matches!(parse_pg_vector("[0.5,x]"), Err(Error::Decode(_))));
	}
}
