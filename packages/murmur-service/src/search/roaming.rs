use murmur_domain::{GeoPoint, Locality, Predicate, geo, keyword};

use crate::{
	Error, MurmurService, Result,
	search::{RoamingRequest, SearchResponse, Strategy, VocabularyKind, cultural},
};

impl MurmurService {
	/// Classifies the requester against the locality's centroid, then ranks with the nostalgic
	/// vocabulary for visitors far from home or the landmark vocabulary for locals.
	pub async fn roaming(&self, req: RoamingRequest) -> Result<SearchResponse> {
		let requester = GeoPoint::new(req.latitude, req.longitude);

		if !requester.is_valid() {
			return Err(Error::invalid(format!(
				"Coordinates ({}, {}) are out of range.",
				req.latitude, req.longitude
			)));
		}

		let limit = self.resolve_limit(req.limit)?;
		let keyword_filter = keyword::build_keyword_filter(&req.query);
		let locality = self.classify_requester(&keyword_filter, requester).await?;
		let words = self.vocabulary(VocabularyKind::for_locality(locality));
		let vector = self.query_vector(&req.query).await;
		let (mode, plan) = cultural::plan(&words, keyword_filter, vector, limit);
		let (items, relaxed) = plan.run(self.store.as_ref()).await?;

		tracing::info!(
			strategy = "roaming",
			?mode,
			?locality,
			relaxed,
			results = items.len(),
			"Search completed."
		);

		Ok(SearchResponse {
			strategy: Strategy::Roaming,
			mode,
			relaxed,
			locality: Some(locality),
			items,
		})
	}

	async fn classify_requester(
		&self,
		keyword_filter: &Predicate,
		requester: GeoPoint,
	) -> Result<Locality> {
		let distance = match self.store.centroid(keyword_filter).await? {
			Some(center) => Some(self.store.distance_meters(requester, center).await?),
			None => None,
		};
		let threshold = self.cfg.search.roaming.threshold_meters;
		let locality = geo::classify(distance, threshold);

		tracing::debug!(?distance, threshold, ?locality, "Requester classified.");

		Ok(locality)
	}
}
