use serde::{Deserialize, Serialize};

/// Mean Earth radius (IUGG), in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;
pub const DEFAULT_ROAMING_THRESHOLD_METERS: f64 = 100_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
	pub latitude: f64,
	pub longitude: f64,
}
impl GeoPoint {
	pub fn new(latitude: f64, longitude: f64) -> Self {
		Self { latitude, longitude }
	}

	pub fn is_valid(&self) -> bool {
		self.latitude.is_finite()
			&& self.longitude.is_finite()
			&& (-90.0..=90.0).contains(&self.latitude)
			&& (-180.0..=180.0).contains(&self.longitude)
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locality {
	Local,
	Roaming,
}

/// Arithmetic mean of the points, or `None` for an empty set.
pub fn centroid<I>(points: I) -> Option<GeoPoint>
where
	I: IntoIterator<Item = GeoPoint>,
{
	let (count, lat_sum, lon_sum) = points
		.into_iter()
		.fold((0_usize, 0.0_f64, 0.0_f64), |(n, lat, lon), point| {
			(n + 1, lat + point.latitude, lon + point.longitude)
		});

	(count > 0).then(|| GeoPoint::new(lat_sum / count as f64, lon_sum / count as f64))
}

/// Great-circle distance on a sphere (haversine).
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
	let lat_a = a.latitude.to_radians();
	let lat_b = b.latitude.to_radians();
	let d_lat = (b.latitude - a.latitude).to_radians();
	let d_lon = (b.longitude - a.longitude).to_radians();
	let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

	2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Roaming only when strictly farther than the threshold.
pub fn classify_distance(distance_meters: f64, threshold_meters: f64) -> Locality {
	if distance_meters > threshold_meters { Locality::Roaming } else { Locality::Local }
}

/// Classifies a requester by their distance to a locality's centroid. Without a centroid (no
/// matching records) there is no distance and the requester is treated as local.
pub fn classify(distance_meters: Option<f64>, threshold_meters: f64) -> Locality {
	distance_meters.map_or(Locality::Local, |distance| classify_distance(distance, threshold_meters))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn centroid_is_the_mean_point() {
		let center = centroid([GeoPoint::new(30.0, 104.0), GeoPoint::new(32.0, 106.0)])
			.expect("non-empty set has a centroid");

		assert_eq!(center, GeoPoint::new(31.0, 105.0));
		assert_eq!(centroid(Vec::new()), None);
	}

	#[test]
	fn haversine_matches_known_distances() {
		let one_degree = haversine_meters(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));

		assert!((one_degree - 111_195.08).abs() < 1.0, "got {one_degree}");

		// Chengdu to Shanghai is roughly 1 660 km.
		let cd_sh =
			haversine_meters(GeoPoint::new(30.5728, 104.0668), GeoPoint::new(31.2304, 121.4737));

		assert!((1_600_000.0..1_720_000.0).contains(&cd_sh), "got {cd_sh}");
		assert_eq!(haversine_meters(GeoPoint::new(12.0, 34.0), GeoPoint::new(12.0, 34.0)), 0.0);
	}

	#[test]
	fn threshold_boundary_is_local() {
		assert_eq!(classify_distance(100_000.0, DEFAULT_ROAMING_THRESHOLD_METERS), Locality::Local);
		assert_eq!(
			classify_distance(100_000.000_1, DEFAULT_ROAMING_THRESHOLD_METERS),
			Locality::Roaming
		);
		assert_eq!(classify_distance(0.0, DEFAULT_ROAMING_THRESHOLD_METERS), Locality::Local);
	}

	#[test]
	fn missing_centroid_defaults_to_local() {
		assert_eq!(classify(None, 1.0), Locality::Local);
		assert_eq!(classify(Some(2.0), 1.0), Locality::Roaming);
	}

	#[test]
	fn coordinate_validation() {
		assert!(GeoPoint::new(90.0, -180.0).is_valid());
		assert!(!GeoPoint::new(90.5, 0.0).is_valid());
		assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
	}
}
