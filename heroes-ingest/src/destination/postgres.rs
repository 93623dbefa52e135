use heroes_config::shared::PgConnectionConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use tracing::info;

use crate::destination::base::Destination;
use crate::error::IngestResult;
use crate::types::HeroRecord;

/// Upper bound on pooled connections. Insert transactions run concurrently and hold one
/// connection each.
const MAX_POOL_CONNECTIONS: u32 = 8;

/// DDL for the target table, safe to run on every startup.
const CREATE_HEROES_TABLE: &str = "\
create table if not exists heroes (
    id integer primary key,
    birth_year varchar(255),
    eye_color varchar(255),
    films varchar(255),
    gender varchar(255),
    hair_color varchar(255),
    height varchar(255),
    homeworld varchar(255),
    mass varchar(255),
    name varchar(255),
    skin_color varchar(255),
    species varchar(255),
    starships varchar(255),
    vehicles text[]
)";

/// Persists record batches into the `heroes` table of a Postgres database.
///
/// Each batch is inserted inside its own transaction checked out from the pool, so a
/// failed batch rolls back when the transaction is dropped while batches committed before
/// it stay committed.
#[derive(Debug, Clone)]
pub struct PostgresDestination {
    pool: PgPool,
}

impl PostgresDestination {
    /// Connects to the database described by `config`.
    pub async fn connect(config: &PgConnectionConfig) -> IngestResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_POOL_CONNECTIONS)
            .connect_with(config.with_db())
            .await?;

        Ok(Self { pool })
    }
}

impl Destination for PostgresDestination {
    fn name() -> &'static str {
        "postgres"
    }

    async fn ensure_schema(&self) -> IngestResult<()> {
        sqlx::query(CREATE_HEROES_TABLE).execute(&self.pool).await?;

        info!("heroes table is ready");

        Ok(())
    }

    async fn write_records(&self, records: Vec<HeroRecord>) -> IngestResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "insert into heroes (id, birth_year, eye_color, films, gender, hair_color, \
             height, homeworld, mass, name, skin_color, species, starships, vehicles) ",
        );
        query.push_values(&records, |mut row, record| {
            row.push_bind(record.id)
                .push_bind(&record.birth_year)
                .push_bind(&record.eye_color)
                .push_bind(&record.films)
                .push_bind(&record.gender)
                .push_bind(&record.hair_color)
                .push_bind(&record.height)
                .push_bind(&record.homeworld)
                .push_bind(&record.mass)
                .push_bind(&record.name)
                .push_bind(&record.skin_color)
                .push_bind(&record.species)
                .push_bind(&record.starships)
                .push_bind(&record.vehicles);
        });
        query.build().execute(&mut *tx).await?;

        tx.commit().await?;

        info!(rows = records.len(), "committed batch of heroes");

        Ok(())
    }
}
