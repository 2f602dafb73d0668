// Schema bootstrap. Statements are idempotent so startup can run them
// unconditionally. The partial unique indexes enforce the uniqueness rules
// among active rows only, letting soft-deleted rows keep their old values.

use person_registry_domain::{DomainError, Result};
use sqlx::PgPool;
use tracing::info;

async fn run(pool: &PgPool, context: &str, sql: &str) -> Result<()> {
    sqlx::query(sql)
        .execute(pool)
        .await
        .map_err(|e| DomainError::infrastructure(format!("failed to {context}: {e}")))?;
    Ok(())
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    run(
        pool,
        "create cities table",
        r#"
        CREATE TABLE IF NOT EXISTS cities (
            id SERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE
        );
        "#,
    )
    .await?;

    run(
        pool,
        "create cities name index",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_cities_active_name
         ON cities (lower(name)) WHERE is_deleted = FALSE;",
    )
    .await?;

    run(
        pool,
        "create persons table",
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            id SERIAL PRIMARY KEY,
            name VARCHAR(50) NOT NULL CHECK (char_length(name) >= 2),
            last_name VARCHAR(50) NOT NULL CHECK (char_length(last_name) >= 2),
            personal_number VARCHAR(11) NOT NULL,
            birth_date DATE NOT NULL CHECK (birth_date <= CURRENT_DATE - INTERVAL '18 years'),
            gender SMALLINT NOT NULL CHECK (gender IN (1, 2)),
            photo TEXT NOT NULL DEFAULT '',
            city_id INTEGER NOT NULL REFERENCES cities(id),
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE
        );
        "#,
    )
    .await?;

    run(
        pool,
        "create persons personal number index",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_persons_active_personal_number
         ON persons (personal_number) WHERE is_deleted = FALSE;",
    )
    .await?;

    run(
        pool,
        "create persons city index",
        "CREATE INDEX IF NOT EXISTS idx_persons_city_id ON persons (city_id);",
    )
    .await?;

    run(
        pool,
        "create phone number types table",
        r#"
        CREATE TABLE IF NOT EXISTS phone_number_types (
            id SERIAL PRIMARY KEY,
            name VARCHAR(50) NOT NULL,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE
        );
        "#,
    )
    .await?;

    run(
        pool,
        "create person phone numbers table",
        r#"
        CREATE TABLE IF NOT EXISTS person_phone_numbers (
            id SERIAL PRIMARY KEY,
            person_id INTEGER NOT NULL REFERENCES persons(id),
            phone_number_type_id INTEGER NOT NULL REFERENCES phone_number_types(id),
            phone_number VARCHAR(50) NOT NULL,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE
        );
        "#,
    )
    .await?;

    run(
        pool,
        "create phone numbers person index",
        "CREATE INDEX IF NOT EXISTS idx_phone_numbers_person_id
         ON person_phone_numbers (person_id);",
    )
    .await?;

    run(
        pool,
        "create person relation types table",
        r#"
        CREATE TABLE IF NOT EXISTS person_relation_types (
            id SERIAL PRIMARY KEY,
            name VARCHAR(50) NOT NULL,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE
        );
        "#,
    )
    .await?;

    run(
        pool,
        "create person relations table",
        r#"
        CREATE TABLE IF NOT EXISTS person_relations (
            id SERIAL PRIMARY KEY,
            person_id INTEGER NOT NULL REFERENCES persons(id),
            related_person_id INTEGER NOT NULL REFERENCES persons(id),
            relation_type_id INTEGER NOT NULL REFERENCES person_relation_types(id),
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE
        );
        "#,
    )
    .await?;

    run(
        pool,
        "create person relations triple index",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_relations_active_triple
         ON person_relations (person_id, related_person_id, relation_type_id)
         WHERE is_deleted = FALSE;",
    )
    .await?;

    run(
        pool,
        "seed phone number types",
        r#"
        INSERT INTO phone_number_types (name)
        SELECT v.name FROM (VALUES ('Mobile'), ('Home'), ('Work')) AS v(name)
        WHERE NOT EXISTS (SELECT 1 FROM phone_number_types);
        "#,
    )
    .await?;

    run(
        pool,
        "seed person relation types",
        r#"
        INSERT INTO person_relation_types (name)
        SELECT v.name
        FROM (VALUES ('Colleague'), ('Acquaintance'), ('Relative'), ('Other')) AS v(name)
        WHERE NOT EXISTS (SELECT 1 FROM person_relation_types);
        "#,
    )
    .await?;

    info!("database schema is up to date");
    Ok(())
}
