use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/app.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    create_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Minimal schema bootstrap (also used by service tests against sqlite::memory:)
pub async fn create_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS a001_project (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            floors INTEGER,
            basements INTEGER,
            tentative_start TEXT,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS a002_product_association (
            id TEXT PRIMARY KEY NOT NULL,
            project_ref TEXT NOT NULL,
            product_ref TEXT NOT NULL,
            quantity REAL NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS a003_projection (
            id TEXT PRIMARY KEY NOT NULL,
            association_ref TEXT NOT NULL,
            product_ref TEXT NOT NULL,
            projection_type TEXT NOT NULL,
            status TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            floors INTEGER NOT NULL DEFAULT 0,
            basements INTEGER NOT NULL DEFAULT 0,
            velocity REAL NOT NULL,
            total_quantity REAL NOT NULL DEFAULT 0,
            per_week_quantity REAL NOT NULL DEFAULT 0,
            unit TEXT NOT NULL DEFAULT '',
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
        // One REAL and one PROSPECT projection per association, enforced by
        // the storage engine so racing creates cannot slip past the pre-check
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS ux_a003_association_type
        ON a003_projection (association_ref, projection_type);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS a004_projection_week (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            projection_ref TEXT NOT NULL,
            week_number INTEGER NOT NULL,
            date TEXT NOT NULL,
            quantity REAL NOT NULL DEFAULT 0,
            unit TEXT NOT NULL DEFAULT ''
        );
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS ix_a004_projection_ref
        ON a004_projection_week (projection_ref);
        "#,
    ];

    for sql in statements {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await?;
    }
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}
