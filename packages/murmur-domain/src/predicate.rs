use serde::Serialize;

use crate::record::AudioRecord;

/// Text-bearing record fields a predicate can match against.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
	City,
	District,
	/// The JSON-serialized tag list, so a needle may span tag boundaries.
	SceneTags,
	Transcript,
	Story,
}
impl TextField {
	/// Fields searched by locality keywords.
	pub const SEARCHABLE: [Self; 5] =
		[Self::City, Self::District, Self::SceneTags, Self::Transcript, Self::Story];
	/// Fields scanned when scoring a record against a vocabulary.
	pub const SCORED: [Self; 2] = [Self::SceneTags, Self::Transcript];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::City => "city",
			Self::District => "district",
			Self::SceneTags => "scene_tags",
			Self::Transcript => "transcript",
			Self::Story => "generated_story",
		}
	}

	pub fn extract(&self, record: &AudioRecord) -> String {
		match self {
			Self::City => record.city.clone().unwrap_or_default(),
			Self::District => record.district.clone().unwrap_or_default(),
			Self::SceneTags => record.serialized_scene_tags(),
			Self::Transcript => record.transcript.clone(),
			Self::Story => record.generated_story.clone(),
		}
	}

	/// Case-insensitive substring test. An empty needle matches everything.
	pub fn contains(&self, record: &AudioRecord, needle: &str) -> bool {
		self.extract(record).to_lowercase().contains(&needle.to_lowercase())
	}
}

/// Boolean filter tree handed to a record store for translation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
	All,
	And { args: Vec<Predicate> },
	Or { args: Vec<Predicate> },
	Contains { field: TextField, needle: String },
	/// Inclusive range over the record's UTC hour of day.
	HourIn { start: u8, end: u8 },
}
impl Predicate {
	pub fn and(args: Vec<Self>) -> Self {
		let mut args: Vec<Self> = args.into_iter().filter(|arg| !arg.is_all()).collect();

		match args.len() {
			0 => Self::All,
			1 => args.remove(0),
			_ => Self::And { args },
		}
	}

	pub fn or(args: Vec<Self>) -> Self {
		Self::Or { args }
	}

	pub fn contains(field: TextField, needle: impl Into<String>) -> Self {
		Self::Contains { field, needle: needle.into() }
	}

	pub fn is_all(&self) -> bool {
		matches!(self, Self::All)
	}

	pub fn matches(&self, record: &AudioRecord) -> bool {
		match self {
			Self::All => true,
			Self::And { args } => args.iter().all(|arg| arg.matches(record)),
			Self::Or { args } => args.iter().any(|arg| arg.matches(record)),
			Self::Contains { field, needle } => field.contains(record, needle),
			Self::HourIn { start, end } => (*start..=*end).contains(&record.utc_hour()),
		}
	}
}
