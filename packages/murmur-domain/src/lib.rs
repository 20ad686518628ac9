pub mod geo;
pub mod keyword;
pub mod predicate;
pub mod query;
pub mod record;
pub mod temporal;
pub mod time_serde;
pub mod vocabulary;

pub use geo::{GeoPoint, Locality};
pub use predicate::{Predicate, TextField};
pub use query::{OrderKey, RecordQuery, ScoreExpr};
pub use record::{AudioRecord, Counter, CounterChange, Enrichment, NewAudioRecord};
