use murmur_domain::{OrderKey, Predicate, RecordQuery, keyword, temporal};

use crate::{
	Error, MurmurService, Result,
	search::{ResonanceRequest, RetrievalMode, SearchResponse, Strategy, fallback::AttemptPlan},
};

/// Vector mode filters by time only and orders by similarity; keyword mode filters by keyword
/// and time. Either way the relaxed retry drops the time window.
pub fn plan(
	keyword_filter: Predicate,
	time_window: Predicate,
	vector: Option<Vec<f32>>,
	limit: u32,
) -> (RetrievalMode, AttemptPlan) {
	match vector {
		Some(vector) => {
			let order = vec![OrderKey::CosineDistanceAsc { vector }, OrderKey::LikeCountDesc];
			let strict = RecordQuery { filter: time_window, order: order.clone(), limit };
			let relaxed = RecordQuery { filter: Predicate::All, order, limit };

			(RetrievalMode::Vector, AttemptPlan::new(strict, Some(relaxed)))
		},
		None => {
			let order = vec![OrderKey::LikeCountDesc];
			let strict = RecordQuery {
				filter: Predicate::and(vec![keyword_filter.clone(), time_window]),
				order: order.clone(),
				limit,
			};
			let relaxed = RecordQuery { filter: keyword_filter, order, limit };

			(RetrievalMode::Keyword, AttemptPlan::new(strict, Some(relaxed)))
		},
	}
}

impl MurmurService {
	/// Records from the same locality captured around the requester's time of day.
	pub async fn resonance(&self, req: ResonanceRequest) -> Result<SearchResponse> {
		if req.local_hour > 23 {
			return Err(Error::invalid(format!(
				"local_hour must be in the range 0-23, got {}.",
				req.local_hour
			)));
		}

		let limit = self.resolve_limit(req.limit)?;
		let search = &self.cfg.search;
		let radius = u8::try_from(search.window_radius_hours)
			.map_err(|_| Error::invalid("search.window_radius_hours is out of range."))?;
		let time_window =
			temporal::build_time_window(req.local_hour, search.utc_offset_hours, radius);
		let keyword_filter = keyword::build_keyword_filter(&req.query);
		let vector = self.query_vector(&req.query).await;
		let (mode, plan) = plan(keyword_filter, time_window, vector, limit);
		let (items, relaxed) = plan.run(self.store.as_ref()).await?;

		tracing::info!(
			strategy = "resonance",
			?mode,
			relaxed,
			local_hour = req.local_hour,
			results = items.len(),
			"Search completed."
		);

		Ok(SearchResponse { strategy: Strategy::Resonance, mode, relaxed, locality: None, items })
	}
}

#[cfg(test)]
mod tests {
	use murmur_domain::TextField;

	use super::*;

	#[test]
	fn keyword_mode_combines_then_drops_the_window() {
		let keyword_filter = Predicate::contains(TextField::City, "Chengdu");
		let window = Predicate::HourIn { start: 15, end: 19 };
		let (mode, plan) = plan(keyword_filter.clone(), window.clone(), None, 20);

		assert_eq!(mode, RetrievalMode::Keyword);
		assert_eq!(plan.strict.filter, Predicate::and(vec![keyword_filter.clone(), window]));
		assert_eq!(plan.strict.order, vec![OrderKey::LikeCountDesc]);

		let relaxed = plan.relaxed.expect("keyword mode always has a relaxed query");

		assert_eq!(relaxed.filter, keyword_filter);
	}

	#[test]
	fn vector_mode_ignores_keywords() {
		let window = Predicate::HourIn { start: 0, end: 4 };
		let (mode, plan) = plan(
			Predicate::contains(TextField::City, "Chengdu"),
			window.clone(),
			Some(vec![1.0, 0.0]),
			5,
		);

		assert_eq!(mode, RetrievalMode::Vector);
		assert_eq!(plan.strict.filter, window);
		assert_eq!(plan.strict.limit, 5);
		assert!(matches!(plan.strict.order[0], OrderKey::CosineDistanceAsc { .. }));
		assert_eq!(plan.strict.order[1], OrderKey::LikeCountDesc);
		assert_eq!(plan.relaxed.map(|relaxed| relaxed.filter), Some(Predicate::All));
	}
}
