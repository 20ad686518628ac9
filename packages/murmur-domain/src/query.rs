use std::cmp::Ordering;

use serde::Serialize;

use crate::{
	predicate::{Predicate, TextField},
	record::AudioRecord,
};

/// Integer-valued expression a store evaluates per record for ordering.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreExpr {
	KeywordHits { keywords: Vec<String>, fields: Vec<TextField> },
}
impl ScoreExpr {
	pub fn evaluate(&self, record: &AudioRecord) -> i64 {
		match self {
			Self::KeywordHits { keywords, fields } => keywords
				.iter()
				.filter(|keyword| fields.iter().any(|field| field.contains(record, keyword)))
				.count() as i64,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "key", rename_all = "snake_case")]
pub enum OrderKey {
	/// Records without a usable embedding sort last.
	CosineDistanceAsc {
		#[serde(skip)]
		vector: Vec<f32>,
	},
	LikeCountDesc,
	ScoreDesc { expr: ScoreExpr },
}

/// A filtered, ordered, limited retrieval. Stores append `created_at DESC, record_id ASC` as
/// final tie-breakers so every ordering is total.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordQuery {
	pub filter: Predicate,
	pub order: Vec<OrderKey>,
	pub limit: u32,
}

/// Cosine distance `1 - cos(a, b)`, undefined for mismatched lengths or zero vectors.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Option<f64> {
	if a.len() != b.len() || a.is_empty() {
		return None;
	}

	let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);

	for (x, y) in a.iter().zip(b) {
		let (x, y) = (f64::from(*x), f64::from(*y));

		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	if norm_a == 0.0 || norm_b == 0.0 {
		return None;
	}

	Some(1.0 - dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Compares two records under `order`, then the shared tie-breakers.
pub fn compare_records(a: &AudioRecord, b: &AudioRecord, order: &[OrderKey]) -> Ordering {
	for key in order {
		let ordering = match key {
			OrderKey::CosineDistanceAsc { vector } => {
				proximity_rank(a, vector).cmp_asc(&proximity_rank(b, vector))
			},
			OrderKey::LikeCountDesc => b.like_count.cmp(&a.like_count),
			OrderKey::ScoreDesc { expr } => expr.evaluate(b).cmp(&expr.evaluate(a)),
		};

		if ordering != Ordering::Equal {
			return ordering;
		}
	}

	b.created_at.cmp(&a.created_at).then_with(|| a.record_id.cmp(&b.record_id))
}

/// Applies `query` to an in-memory record set.
pub fn execute<'a, I>(records: I, query: &RecordQuery) -> Vec<AudioRecord>
where
	I: IntoIterator<Item = &'a AudioRecord>,
{
	let mut matched: Vec<AudioRecord> =
		records.into_iter().filter(|record| query.filter.matches(record)).cloned().collect();

	matched.sort_by(|a, b| compare_records(a, b, &query.order));
	matched.truncate(query.limit as usize);

	matched
}

/// Position of a record under cosine ordering, mirroring pgvector under `ASC NULLS LAST`: real
/// distances first, then undefined ones (NaN in Postgres), then records without an embedding.
enum Proximity {
	Distance(f64),
	Undefined,
	Missing,
}
impl Proximity {
	fn cmp_asc(&self, other: &Self) -> Ordering {
		match (self, other) {
			(Self::Distance(a), Self::Distance(b)) => a.total_cmp(b),
			_ => self.tier().cmp(&other.tier()),
		}
	}

	fn tier(&self) -> u8 {
		match self {
			Self::Distance(_) => 0,
			Self::Undefined => 1,
			Self::Missing => 2,
		}
	}
}

fn proximity_rank(record: &AudioRecord, vector: &[f32]) -> Proximity {
	match record.embedding.as_deref() {
		None => Proximity::Missing,
		Some(embedding) =>
			cosine_distance(embedding, vector).map_or(Proximity::Undefined, Proximity::Distance),
	}
}

#[cfg(test)]
mod tests {
	use time::{Duration, macros::datetime};
	use uuid::Uuid;

	use super::*;
	use crate::record::NewAudioRecord;

	fn record(like_count: i64, embedding: Option<Vec<f32>>, minutes: i64) -> AudioRecord {
		let mut record = NewAudioRecord {
			user_id: None,
			latitude: 0.0,
			longitude: 0.0,
			city: Some("Chengdu".to_string()),
			district: None,
		}
		.into_record(Uuid::new_v4(), datetime!(2026-01-01 00:00 UTC) + Duration::minutes(minutes));

		record.like_count = like_count;
		record.embedding = embedding;

		record
	}

	#[test]
	fn cosine_distance_is_undefined_for_zero_or_mismatched_vectors() {
		assert_eq!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]), Some(0.0));
		assert_eq!(cosine_distance(&[1.0, 0.0], &[0.0, 1.0]), Some(1.0));
		assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), None);
		assert_eq!(cosine_distance(&[1.0], &[1.0, 0.0]), None);
	}

	#[test]
	fn similarity_then_likes() {
		let near_few = record(1, Some(vec![1.0, 0.0]), 0);
		let near_many = record(9, Some(vec![2.0, 0.0]), 1);
		let far = record(50, Some(vec![0.0, 1.0]), 2);
		let missing = record(99, None, 3);
		let query = RecordQuery {
			filter: Predicate::All,
			order: vec![
				OrderKey::CosineDistanceAsc { vector: vec![1.0, 0.0] },
				OrderKey::LikeCountDesc,
			],
			limit: 10,
		};
		let out = execute([&missing, &far, &near_few, &near_many], &query);
		let ids: Vec<Uuid> = out.iter().map(|r| r.record_id).collect();

		assert_eq!(
			ids,
			vec![near_many.record_id, near_few.record_id, far.record_id, missing.record_id]
		);
	}

	#[test]
	fn zero_vectors_sort_between_distances_and_missing_embeddings() {
		let missing = record(99, None, 0);
		let zero = record(0, Some(vec![0.0, 0.0]), 1);
		let far = record(0, Some(vec![0.0, 1.0]), 2);
		let query = RecordQuery {
			filter: Predicate::All,
			order: vec![
				OrderKey::CosineDistanceAsc { vector: vec![1.0, 0.0] },
				OrderKey::LikeCountDesc,
			],
			limit: 10,
		};
		let ids: Vec<Uuid> =
			execute([&missing, &zero, &far], &query).iter().map(|r| r.record_id).collect();

		assert_eq!(ids, vec![far.record_id, zero.record_id, missing.record_id]);
	}

	#[test]
	fn ties_fall_back_to_newest_then_id() {
		let older = record(3, None, 0);
		let newer = record(3, None, 5);
		let query = RecordQuery { filter: Predicate::All, order: vec![OrderKey::LikeCountDesc], limit: 1 };

		assert_eq!(execute([&older, &newer], &query)[0].record_id, newer.record_id);
	}

	#[test]
	fn filter_and_limit_apply() {
		let records: Vec<AudioRecord> = (0..5).map(|i| record(i, None, i)).collect();
		let query = RecordQuery {
			filter: Predicate::contains(TextField::City, "chengdu"),
			order: vec![OrderKey::LikeCountDesc],
			limit: 2,
		};
		let out = execute(&records, &query);

		assert_eq!(out.iter().map(|r| r.like_count).collect::<Vec<_>>(), vec![4, 3]);
	}
}
