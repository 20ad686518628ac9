use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use murmur_domain::{
	AudioRecord, Counter, CounterChange, Enrichment, GeoPoint, NewAudioRecord, Predicate,
	RecordQuery,
};

use crate::{
	BoxFuture, Error, RecordStore, Result,
	db::Db,
	models::{AudioRecordRow, RECORD_COLUMNS, vector_to_pg},
	sql,
};

pub async fn fetch_records(db: &Db, query: &RecordQuery) -> Result<Vec<AudioRecord>> {
	let mut builder = sql::build_fetch(query);
	let rows = builder.build_query_as::<AudioRecordRow>().fetch_all(&db.pool).await?;

	tracing::debug!(rows = rows.len(), limit = query.limit, "Fetched audio records.");

	rows.into_iter().map(AudioRecordRow::into_record).collect()
}

pub async fn centroid(db: &Db, filter: &Predicate) -> Result<Option<GeoPoint>> {
	let mut builder = sql::build_centroid(filter);
	let row = builder.build().fetch_one(&db.pool).await?;
	let latitude: Option<f64> = row.try_get("latitude")?;
	let longitude: Option<f64> = row.try_get("longitude")?;

	Ok(latitude.zip(longitude).map(|(latitude, longitude)| GeoPoint { latitude, longitude }))
}

pub async fn distance_meters(db: &Db, a: GeoPoint, b: GeoPoint) -> Result<f64> {
	let distance: f64 = sqlx::query_scalar(
		"SELECT ST_DistanceSphere(ST_MakePoint($1, $2), ST_MakePoint($3, $4))",
	)
	.bind(a.longitude)
	.bind(a.latitude)
	.bind(b.longitude)
	.bind(b.latitude)
	.fetch_one(&db.pool)
	.await?;

	Ok(distance)
}

pub async fn get_record(db: &Db, record_id: Uuid) -> Result<Option<AudioRecord>> {
	let sql = format!("SELECT {RECORD_COLUMNS}\nFROM audio_records\nWHERE record_id = $1");
	let row = sqlx::query_as::<_, AudioRecordRow>(&sql)
		.bind(record_id)
		.fetch_optional(&db.pool)
		.await?;

	row.map(AudioRecordRow::into_record).transpose()
}

pub async fn insert_record(db: &Db, record: NewAudioRecord) -> Result<AudioRecord> {
	let point = GeoPoint { latitude: record.latitude, longitude: record.longitude };

	if !point.is_valid() {
		return Err(Error::InvalidArgument(format!(
			"Coordinates ({}, {}) are out of range.",
			record.latitude, record.longitude
		)));
	}

	let record = record.into_record(Uuid::new_v4(), OffsetDateTime::now_utc());
	let sql = format!(
		"\
INSERT INTO audio_records (
	record_id,
	user_id,
	latitude,
	longitude,
	created_at,
	emotion_tag,
	city,
	district
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
RETURNING {RECORD_COLUMNS}"
	);
	let row = sqlx::query_as::<_, AudioRecordRow>(&sql)
		.bind(record.record_id)
		.bind(record.user_id)
		.bind(record.latitude)
		.bind(record.longitude)
		.bind(record.created_at)
		.bind(record.emotion_tag.as_deref())
		.bind(record.city.as_deref())
		.bind(record.district.as_deref())
		.fetch_one(&db.pool)
		.await?;

	tracing::info!(record_id = %record.record_id, "Audio record created.");

	row.into_record()
}

pub async fn complete_processing(
	db: &Db,
	record_id: Uuid,
	enrichment: &Enrichment,
	embedding: Option<&[f32]>,
) -> Result<AudioRecord> {
	let sql = format!(
		"\
UPDATE audio_records
SET
	transcript = $2,
	emotion_tag = $3,
	generated_story = $4,
	scene_tags = $5,
	embedding = $6::text::vector,
	processed_at = $7
WHERE record_id = $1 AND processed_at IS NULL
RETURNING {RECORD_COLUMNS}"
	);
	let row = sqlx::query_as::<_, AudioRecordRow>(&sql)
		.bind(record_id)
		.bind(enrichment.transcript.as_str())
		.bind(enrichment.emotion_tag.as_deref())
		.bind(enrichment.generated_story.as_str())
		.bind(sqlx::types::Json(&enrichment.scene_tags))
		.bind(embedding.map(vector_to_pg))
		.bind(OffsetDateTime::now_utc())
		.fetch_optional(&db.pool)
		.await?;

	match row {
		Some(row) => {
			tracing::info!(%record_id, embedded = embedding.is_some(), "Audio record processed.");

			row.into_record()
		},
		None => {
			let exists: bool =
				sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM audio_records WHERE record_id = $1)")
					.bind(record_id)
					.fetch_one(&db.pool)
					.await?;

			if exists {
				Err(Error::Conflict(format!("Record {record_id} was already processed.")))
			} else {
				Err(Error::NotFound(format!("Record {record_id} does not exist.")))
			}
		},
	}
}

pub async fn adjust_counter(
	db: &Db,
	record_id: Uuid,
	counter: Counter,
	change: CounterChange,
) -> Result<AudioRecord> {
	let column = match counter {
		Counter::Like => "like_count",
		Counter::Question => "question_count",
	};
	// Single-statement update so concurrent reactions never lose a change.
	let sql = format!(
		"\
UPDATE audio_records
SET {column} = GREATEST({column} + $2, 0)
WHERE record_id = $1
RETURNING {RECORD_COLUMNS}"
	);
	let row = sqlx::query_as::<_, AudioRecordRow>(&sql)
		.bind(record_id)
		.bind(change.delta())
		.fetch_optional(&db.pool)
		.await?
		.ok_or_else(|| Error::NotFound(format!("Record {record_id} does not exist.")))?;

	tracing::debug!(%record_id, ?counter, ?change, "Reaction counter adjusted.");

	row.into_record()
}

impl RecordStore for Db {
	fn fetch<'a>(&'a self, query: &'a RecordQuery) -> BoxFuture<'a, Result<Vec<AudioRecord>>> {
		Box::pin(fetch_records(self, query))
	}

	fn centroid<'a>(&'a self, filter: &'a Predicate) -> BoxFuture<'a, Result<Option<GeoPoint>>> {
		Box::pin(centroid(self, filter))
	}

	fn distance_meters(&self, a: GeoPoint, b: GeoPoint) -> BoxFuture<'_, Result<f64>> {
		Box::pin(distance_meters(self, a, b))
	}

	fn get_record(&self, record_id: Uuid) -> BoxFuture<'_, Result<Option<AudioRecord>>> {
		Box::pin(get_record(self, record_id))
	}

	fn insert_record(&self, record: NewAudioRecord) -> BoxFuture<'_, Result<AudioRecord>> {
		Box::pin(insert_record(self, record))
	}

	fn complete_processing<'a>(
		&'a self,
		record_id: Uuid,
		enrichment: &'a Enrichment,
		embedding: Option<&'a [f32]>,
	) -> BoxFuture<'a, Result<AudioRecord>> {
		Box::pin(complete_processing(self, record_id, enrichment, embedding))
	}

	fn adjust_counter(
		&self,
		record_id: Uuid,
		counter: Counter,
		change: CounterChange,
	) -> BoxFuture<'_, Result<AudioRecord>> {
		Box::pin(adjust_counter(self, record_id, counter, change))
	}
}
