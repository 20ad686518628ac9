//! Disposable Postgres databases for integration tests.
//!
//! Tests opt in by setting `MURMUR_PG_DSN` to a server where the connecting role may create
//! databases. Each [`TestDatabase`] lives under a unique `murmur_test_*` name and is dropped on
//! cleanup, or from a helper thread if the test panics first.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

pub const DSN_ENV: &str = "MURMUR_PG_DSN";

const ADMIN_DATABASES: [&str; 2] = ["postgres", "template1"];
const NAME_PREFIX: &str = "murmur_test_";

pub struct TestDatabase {
	name: String,
	dsn: String,
	admin: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Setup(format!("Failed to parse {DSN_ENV}: {err}.")))?;
		let (admin, mut conn) = connect_admin(&base).await?;
		let name = format!("{NAME_PREFIX}{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
			.await
			.map_err(|err| Error::Setup(format!("Failed to create {name}: {err}.")))?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.drop_now().await
	}

	async fn drop_now(&mut self) -> Result<()> {
		if self.dropped {
			return Ok(());
		}

		drop_database(&self.name, &self.admin).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let admin = self.admin.clone();
		// The test's own runtime may be gone or mid-shutdown, so run the drop on a fresh one.
		let handle = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Test database {name} was not dropped: {err}.");

					return;
				},
			};

			if let Err(err) = runtime.block_on(drop_database(&name, &admin)) {
				eprintln!("Test database {name} was not dropped: {err}.");
			}
		});
		let _ = handle.join();
	}
}

/// The base DSN, or `None` when Postgres-backed tests should be skipped.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

async fn connect_admin(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut last_err = None;

	for database in ADMIN_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => last_err = Some(err),
		}
	}

	Err(Error::Setup(format!("Failed to connect to an admin database: {last_err:?}.")))
}

async fn drop_database(name: &str, admin: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(admin)
		.await
		.map_err(|err| Error::Setup(format!("Failed to connect for cleanup: {err}.")))?;
	// Pooled connections from the test may still be open.
	let _ = sqlx::query(
		"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.fetch_all(&mut conn)
	.await;

	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str())
		.await
		.map_err(|err| Error::Setup(format!("Failed to drop {name}: {err}.")))?;

	Ok(())
}
