use crate::predicate::{Predicate, TextField};

pub fn tokenize(query: &str) -> Vec<String> {
	query.split_whitespace().map(str::to_string).collect()
}

/// Every keyword must appear in at least one searchable field; different keywords may match
/// different fields. A blank query matches everything.
pub fn build_keyword_filter(query: &str) -> Predicate {
	let clauses = tokenize(query)
		.into_iter()
		.map(|keyword| {
			Predicate::or(
				TextField::SEARCHABLE
					.iter()
					.map(|field| Predicate::contains(*field, keyword.as_str()))
					.collect(),
			)
		})
		.collect();

	Predicate::and(clauses)
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;
	use uuid::Uuid;

	use super::*;
	use crate::record::{AudioRecord, NewAudioRecord};

	fn record(city: &str, district: &str, transcript: &str, story: &str) -> AudioRecord {
		let mut record = NewAudioRecord {
			user_id: None,
			latitude: 30.0,
			longitude: 104.0,
			city: Some(city.to_string()),
			district: Some(district.to_string()),
		}
		.into_record(Uuid::new_v4(), datetime!(2026-05-01 12:00 UTC));

		record.transcript = transcript.to_string();
		record.generated_story = story.to_string();

		record
	}

	#[test]
	fn blank_query_matches_everything() {
		assert_eq!(build_keyword_filter(""), Predicate::All);
		assert_eq!(build_keyword_filter(" \t\n "), Predicate::All);
	}

	#[test]
	fn single_keyword_builds_one_disjunction_over_all_fields() {
		let Predicate::Or { args } = build_keyword_filter("Chengdu") else {
			panic!("expected a disjunction");
		};

		assert_eq!(args.len(), TextField::SEARCHABLE.len());
	}

	#[test]
	fn keywords_are_conjunctive_across_fields() {
		let filter = build_keyword_filter("chengdu Jinjiang");

		assert!(filter.matches(&record("Chengdu", "Jinjiang", "", "")));
		// Second keyword found in the story rather than the district.
		assert!(filter.matches(&record("Chengdu", "", "", "Walking along the JINJIANG river.")));
		assert!(!filter.matches(&record("Chengdu", "Wuhou", "", "")));
	}

	#[test]
	fn matching_ignores_case() {
		let filter = build_keyword_filter("CHENGDU");

		assert!(filter.matches(&record("chengdu", "", "", "")));
		assert!(filter.matches(&record("", "", "heard in chEngDu", "")));
	}

	#[test]
	fn scene_tags_participate() {
		let mut tagged = record("Shanghai", "", "", "");

		tagged.scene_tags = vec!["night market".to_string()];

		assert!(build_keyword_filter("market").matches(&tagged));
		assert!(!build_keyword_filter("market Chengdu").matches(&tagged));
	}
}
