use uuid::Uuid;

use murmur_domain::{AudioRecord, Counter, CounterChange, Enrichment, GeoPoint, NewAudioRecord};

use crate::{Error, MurmurService, Result};

impl MurmurService {
	/// Stores the upload-time placeholder. Content fields stay empty until
	/// [`MurmurService::complete_processing`] runs.
	pub async fn create_record(&self, record: NewAudioRecord) -> Result<AudioRecord> {
		if !GeoPoint::new(record.latitude, record.longitude).is_valid() {
			return Err(Error::invalid(format!(
				"Coordinates ({}, {}) are out of range.",
				record.latitude, record.longitude
			)));
		}

		Ok(self.store.insert_record(record).await?)
	}

	/// Applies the pipeline's enrichment once, embedding the story (else the transcript). A
	/// failed embedding leaves the record without one; it still becomes keyword-searchable.
	pub async fn complete_processing(
		&self,
		record_id: Uuid,
		enrichment: Enrichment,
	) -> Result<AudioRecord> {
		match self.store.get_record(record_id).await? {
			None => {
				return Err(Error::NotFound {
					message: format!("Record {record_id} does not exist."),
				});
			},
			Some(record) if record.processed_at.is_some() => {
				return Err(Error::Conflict {
					message: format!("Record {record_id} was already processed."),
				});
			},
			Some(_) => {},
		}

		let embedding = match enrichment.embedding_source() {
			Some(text) => self.query_vector(text).await,
			None => None,
		};

		if embedding.is_none() {
			tracing::info!(%record_id, "Record stored without an embedding.");
		}

		Ok(self.store.complete_processing(record_id, &enrichment, embedding.as_deref()).await?)
	}

	pub async fn get_record(&self, record_id: Uuid) -> Result<Option<AudioRecord>> {
		Ok(self.store.get_record(record_id).await?)
	}

	pub async fn like(&self, record_id: Uuid) -> Result<AudioRecord> {
		self.react(record_id, Counter::Like, CounterChange::Increment).await
	}

	pub async fn unlike(&self, record_id: Uuid) -> Result<AudioRecord> {
		self.react(record_id, Counter::Like, CounterChange::Decrement).await
	}

	pub async fn question(&self, record_id: Uuid) -> Result<AudioRecord> {
		self.react(record_id, Counter::Question, CounterChange::Increment).await
	}

	pub async fn unquestion(&self, record_id: Uuid) -> Result<AudioRecord> {
		self.react(record_id, Counter::Question, CounterChange::Decrement).await
	}

	async fn react(
		&self,
		record_id: Uuid,
		counter: Counter,
		change: CounterChange,
	) -> Result<AudioRecord> {
		let record = self.store.adjust_counter(record_id, counter, change).await?;

		tracing::info!(
			%record_id,
			?counter,
			?change,
			like_count = record.like_count,
			question_count = record.question_count,
			"Reaction recorded."
		);

		Ok(record)
	}
}
