use murmur_domain::{AudioRecord, RecordQuery};
use murmur_storage::RecordStore;

use crate::Result;

/// A strict query and, optionally, the relaxed query issued once when the strict one is empty.
#[derive(Clone, Debug, PartialEq)]
pub struct AttemptPlan {
	pub strict: RecordQuery,
	pub relaxed: Option<RecordQuery>,
}
impl AttemptPlan {
	pub fn new(strict: RecordQuery, relaxed: Option<RecordQuery>) -> Self {
		// Retrying an identical query cannot change the outcome.
		let relaxed = relaxed.filter(|relaxed| relaxed != &strict);

		Self { strict, relaxed }
	}

	/// Runs the plan. The flag reports whether the rows came from the relaxed query. An empty
	/// result after both attempts is a successful, empty answer.
	pub async fn run(self, store: &dyn RecordStore) -> Result<(Vec<AudioRecord>, bool)> {
		let rows = store.fetch(&self.strict).await?;

		if !rows.is_empty() {
			return Ok((rows, false));
		}

		let Some(relaxed) = self.relaxed else {
			return Ok((rows, false));
		};

		tracing::debug!("Primary query returned no rows; retrying with relaxed constraints.");

		let rows = store.fetch(&relaxed).await?;

		Ok((rows, true))
	}
}
