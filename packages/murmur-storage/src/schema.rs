pub fn render_schema(vector_dim: u32) -> String {
	let init = include_str!("../../../sql/init.sql");
	let expanded = expand_includes(init);

	expanded.replace("<VECTOR_DIM>", &vector_dim.to_string())
}

/// Splits rendered SQL into executable statements, skipping blanks.
pub fn statements(sql: &str) -> impl Iterator<Item = &str> {
	sql.split(';').map(str::trim).filter(|statement| !statement.is_empty())
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		match line.trim().strip_prefix("\\ir ").map(str::trim) {
			Some("00_extensions.sql") => out.push_str(include_str!("../../../sql/00_extensions.sql")),
			Some("tables/001_audio_records.sql") =>
				out.push_str(include_str!("../../../sql/tables/001_audio_records.sql")),
			_ => out.push_str(line),
		}

		out.push('\n');
	}

	out
}
