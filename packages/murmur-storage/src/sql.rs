//! Translation of domain predicates and ordering keys into Postgres SQL.
//!
//! Every user-supplied value is bound as a parameter. Text matching uses `ILIKE` with the needle
//! escaped, which mirrors the case-insensitive substring test the in-memory store applies.

use sqlx::{Postgres, QueryBuilder};

use murmur_domain::{OrderKey, Predicate, RecordQuery, ScoreExpr, TextField};

use crate::models::{RECORD_COLUMNS, vector_to_pg};

/// Builds the full `SELECT` for a [`RecordQuery`].
pub fn build_fetch(query: &RecordQuery) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new("SELECT\n\t");

	builder.push(RECORD_COLUMNS);
	builder.push("\nFROM audio_records\nWHERE ");
	push_predicate(&mut builder, &query.filter);
	builder.push("\nORDER BY ");
	push_order(&mut builder, &query.order);
	builder.push("\nLIMIT ");
	builder.push_bind(i64::from(query.limit));

	builder
}

/// Builds the centroid aggregate over every record that matches `filter`.
pub fn build_centroid(filter: &Predicate) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new(
		"\
SELECT ST_Y(c) AS latitude, ST_X(c) AS longitude
FROM (
	SELECT ST_Centroid(ST_Collect(location)) AS c
	FROM audio_records
	WHERE ",
	);

	push_predicate(&mut builder, filter);
	builder.push("\n) centroid");

	builder
}

pub fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
	match predicate {
		Predicate::All => {
			builder.push("TRUE");
		},
		Predicate::And { args } => push_junction(builder, args, " AND ", "TRUE"),
		Predicate::Or { args } => push_junction(builder, args, " OR ", "FALSE"),
		Predicate::Contains { field, needle } => {
			builder.push(field_expr(*field));
			builder.push(" ILIKE ");
			builder.push_bind(like_pattern(needle));
		},
		Predicate::HourIn { start, end } => {
			builder.push("EXTRACT(HOUR FROM created_at AT TIME ZONE 'UTC')::int BETWEEN ");
			builder.push_bind(i32::from(*start));
			builder.push(" AND ");
			builder.push_bind(i32::from(*end));
		},
	}
}

/// Pushes the caller's keys followed by the tie-breakers that make every ordering total.
pub fn push_order(builder: &mut QueryBuilder<'static, Postgres>, order: &[OrderKey]) {
	for key in order {
		match key {
			// Kept as the bare operator so the HNSW index stays usable. Zero vectors yield NaN,
			// which sorts after every distance and before NULL.
			OrderKey::CosineDistanceAsc { vector } => {
				builder.push("embedding <=> ");
				builder.push_bind(vector_to_pg(vector));
				builder.push("::text::vector ASC NULLS LAST");
			},
			OrderKey::LikeCountDesc => {
				builder.push("like_count DESC");
			},
			OrderKey::ScoreDesc { expr } => {
				push_score(builder, expr);
				builder.push(" DESC");
			},
		}

		builder.push(", ");
	}

	builder.push("created_at DESC, record_id ASC");
}

fn push_junction(
	builder: &mut QueryBuilder<'static, Postgres>,
	args: &[Predicate],
	separator: &str,
	identity: &str,
) {
	if args.is_empty() {
		builder.push(identity);

		return;
	}

	builder.push("(");

	for (i, arg) in args.iter().enumerate() {
		if i > 0 {
			builder.push(separator);
		}

		push_predicate(builder, arg);
	}

	builder.push(")");
}

fn push_score(builder: &mut QueryBuilder<'static, Postgres>, expr: &ScoreExpr) {
	match expr {
		ScoreExpr::KeywordHits { keywords, fields } => {
			if keywords.is_empty() || fields.is_empty() {
				builder.push("0");

				return;
			}

			builder.push("(");

			for (i, keyword) in keywords.iter().enumerate() {
				if i > 0 {
					builder.push(" + ");
				}

				builder.push("CASE WHEN ");

				let any_field = Predicate::or(
					fields.iter().map(|field| Predicate::contains(*field, keyword.as_str())).collect(),
				);

				push_predicate(builder, &any_field);
				builder.push(" THEN 1 ELSE 0 END");
			}

			builder.push(")");
		},
	}
}

fn field_expr(field: TextField) -> &'static str {
	match field {
		TextField::City => "COALESCE(city, '')",
		TextField::District => "COALESCE(district, '')",
		TextField::SceneTags => "scene_tags::text",
		TextField::Transcript => "transcript",
		TextField::Story => "generated_story",
	}
}

/// Wraps `needle` for a substring `ILIKE`, escaping the pattern metacharacters.
pub fn like_pattern(needle: &str) -> String {
	let mut out = String::with_capacity(needle.len() + 2);

	out.push('%');

	for ch in needle.chars() {
		if matches!(ch, '\\' | '%' | '_') {
			out.push('\\');
		}

		out.push(ch);
	}

	out.push('%');

	out
}
