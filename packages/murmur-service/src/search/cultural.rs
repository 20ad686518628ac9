use murmur_domain::{OrderKey, Predicate, RecordQuery, keyword, vocabulary};

use crate::{
	MurmurService, Result,
	search::{
		CulturalRequest, RetrievalMode, SearchResponse, Strategy, VocabularyKind,
		fallback::AttemptPlan,
	},
};

/// Vocabulary-scored ranking shared by the cultural and roaming strategies.
///
/// Score always leads. With a query vector, semantic closeness breaks score ties across the
/// whole store. Without one, results are restricted to the keyword filter and likes break ties;
/// the relaxed retry drops the keyword filter.
pub fn plan(
	words: &[String],
	keyword_filter: Predicate,
	vector: Option<Vec<f32>>,
	limit: u32,
) -> (RetrievalMode, AttemptPlan) {
	let score = OrderKey::ScoreDesc { expr: vocabulary::score_expr(words) };

	match vector {
		Some(vector) => {
			let strict = RecordQuery {
				filter: Predicate::All,
				order: vec![score, OrderKey::CosineDistanceAsc { vector }],
				limit,
			};

			(RetrievalMode::Vector, AttemptPlan::new(strict, None))
		},
		None => {
			let order = vec![score, OrderKey::LikeCountDesc];
			let strict = RecordQuery { filter: keyword_filter, order: order.clone(), limit };
			let relaxed = RecordQuery { filter: Predicate::All, order, limit };

			(RetrievalMode::Keyword, AttemptPlan::new(strict, Some(relaxed)))
		},
	}
}

impl MurmurService {
	/// Records rich in culturally distinctive sounds.
	pub async fn cultural(&self, req: CulturalRequest) -> Result<SearchResponse> {
		let limit = self.resolve_limit(req.limit)?;
		let words = self.vocabulary(VocabularyKind::Cultural);
		let keyword_filter = keyword::build_keyword_filter(&req.query);
		let vector = self.query_vector(&req.query).await;
		let (mode, plan) = plan(&words, keyword_filter, vector, limit);
		let (items, relaxed) = plan.run(self.store.as_ref()).await?;

		tracing::info!(
			strategy = "cultural",
			?mode,
			relaxed,
			results = items.len(),
			"Search completed."
		);

		Ok(SearchResponse { strategy: Strategy::Cultural, mode, relaxed, locality: None, items })
	}
}
