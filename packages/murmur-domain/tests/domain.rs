use time::{OffsetDateTime, macros::datetime};
use uuid::Uuid;

use murmur_domain::{
	AudioRecord, GeoPoint, Locality, NewAudioRecord, OrderKey, Predicate, RecordQuery, geo, keyword,
	query, temporal, vocabulary,
};

fn record(city: &str, created_at: OffsetDateTime, tags: &[&str], likes: i64) -> AudioRecord {
	let mut record = NewAudioRecord {
		user_id: None,
		latitude: 30.66,
		longitude: 104.06,
		city: Some(city.to_string()),
		district: None,
	}
	.into_record(Uuid::new_v4(), created_at);

	record.scene_tags = tags.iter().map(|tag| tag.to_string()).collect();
	record.like_count = likes;

	record
}

#[test]
fn keyword_and_evening_window_select_matching_records() {
	// 17:00 local at UTC+8 is 09:00 UTC; the window spans 07:00-11:00.
	let evening = record("Chengdu", datetime!(2026-05-01 09:30 UTC), &["teahouse"], 1);
	let busy = record("Chengdu", datetime!(2026-05-01 10:00 UTC), &[], 9);
	let night = record("Chengdu", datetime!(2026-05-01 20:00 UTC), &[], 50);
	let elsewhere = record("Lhasa", datetime!(2026-05-01 09:00 UTC), &[], 100);
	let records = vec![evening.clone(), busy.clone(), night, elsewhere];
	let filter = Predicate::and(vec![
		keyword::build_keyword_filter("chengdu"),
		temporal::build_time_window(17, 8, 2),
	]);
	let rows = query::execute(
		&records,
		&RecordQuery { filter, order: vec![OrderKey::LikeCountDesc], limit: 10 },
	);

	assert_eq!(rows, vec![busy, evening]);
}

#[test]
fn vocabulary_score_outranks_likes() {
	let words = vocabulary::owned(vocabulary::CULTURAL);
	let rich = record("Xi'an", datetime!(2026-05-01 09:00 UTC), &["opera", "temple"], 0);
	let plain = record("Xi'an", datetime!(2026-05-01 09:00 UTC), &["traffic"], 500);
	let records = vec![plain.clone(), rich.clone()];
	let order = vec![
		OrderKey::ScoreDesc { expr: vocabulary::score_expr(&words) },
		OrderKey::LikeCountDesc,
	];
	let rows = query::execute(
		&records,
		&RecordQuery { filter: Predicate::All, order, limit: 10 },
	);

	assert_eq!(vocabulary::score(&rich, &words), 2);
	assert_eq!(rows, vec![rich, plain]);
}

#[test]
fn sydney_is_far_from_a_chengdu_centroid() {
	let chengdu = geo::centroid([GeoPoint::new(30.66, 104.06), GeoPoint::new(30.58, 104.07)])
		.expect("non-empty centroid");
	let sydney = GeoPoint::new(-33.86, 151.21);
	let distance = geo::haversine_meters(sydney, chengdu);
	let locality = geo::classify(Some(distance), geo::DEFAULT_ROAMING_THRESHOLD_METERS);

	assert_eq!(locality, Locality::Roaming);
}

#[test]
fn record_json_omits_the_embedding() {
	let mut record = record("Chengdu", datetime!(2026-05-01 09:00 UTC), &["rain"], 0);

	record.embedding = Some(vec![0.1, 0.2]);

	let json = serde_json::to_value(&record).expect("serialize");

	assert!(json.get("embedding").is_none());
	assert_eq!(json["created_at"], "2026-05-01T09:00:00Z");

	let back: AudioRecord = serde_json::from_value(json).expect("deserialize");

	assert_eq!(back.embedding, None);
	assert_eq!(back.scene_tags, vec!["rain".to_string()]);
}
