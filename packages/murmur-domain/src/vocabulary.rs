use crate::{predicate::TextField, query::ScoreExpr, record::AudioRecord};

pub const CULTURAL: &[&str] = &[
	"dialect",
	"street vendor calls",
	"bell sounds",
	"opera",
	"market",
	"night market",
	"subway announcements",
	"temple",
	"old street",
	"teahouse",
];

/// Everyday sounds of home, offered to requesters far from the locality.
pub const NOSTALGIC: &[&str] = &[
	"life",
	"dialect",
	"rain sound",
	"cooking",
	"cat",
	"dog",
	"alley",
	"childhood",
	"elderly",
	"hometown",
	"simmering",
];

/// Sights worth visiting, offered to requesters inside the locality.
pub const LANDMARK: &[&str] = &[
	"scenic spot",
	"landmark",
	"plaza",
	"event",
	"check-in spot",
	"center",
	"night view",
	"amusement park",
	"museum",
];

pub fn owned(words: &[&str]) -> Vec<String> {
	words.iter().map(|word| word.to_string()).collect()
}

/// Score expression counting vocabulary hits in scene tags and transcript.
pub fn score_expr(words: &[String]) -> ScoreExpr {
	ScoreExpr::KeywordHits { keywords: words.to_vec(), fields: TextField::SCORED.to_vec() }
}

/// One point per keyword found in any scored field.
pub fn score(record: &AudioRecord, words: &[String]) -> i64 {
	score_expr(words).evaluate(record)
}
