use crate::types::{
    AppError, Project, ProjectDetailsUpdate, Result, Role, User, UserSnapshot,
};
use chrono::Utc;
use libsql::{Builder, Connection, Database, Value};

/// libsql-backed row store for users, projects and the cylinder catalog.
///
/// Emails are normalized to lowercase on every write and lookup, making the
/// matching semantics an explicit choice instead of inheriting the store's
/// collation. All mutations are single-row and atomic; last write wins.
///
/// One connection is opened at construction and cloned per operation. For a
/// `:memory:` database each `connect()` call would yield an independent
/// private database, so everything must go through this shared handle.
pub struct Store {
    /// Keeps the underlying database open for the cloned connections.
    _db: Database,
    conn: Connection,
}

/// Fields for a user insert. The hash is computed by the caller; the store
/// never sees plaintext passwords.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

/// Partial user update with already-validated fields.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.is_active.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
    }
}

/// Fields for a project insert. The owner id comes from the verified token.
#[derive(Debug)]
pub struct NewProject {
    pub name: String,
    pub kind: String,
    pub creation_date: String,
    pub security_level: String,
}

/// Cylinder ranges seeded into an empty catalog, mirroring the product lines
/// the security-level dropdown is built from.
const DEFAULT_CYLINDER_RANGES: &[&str] = &[
    "OCTAL",
    "SERIAL",
    "SERIAL S",
    "TERTIAL",
    "SERIAL XP",
    "DUAL XP S2",
];

impl Store {
    /// Opens (or creates) a local database file and initializes the schema.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let store = Self { _db: db, conn };
        store.initialize_schema().await?;

        Ok(store)
    }

    /// In-memory database for tests.
    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    /// A cheap clone of the shared connection.
    pub fn connection(&self) -> Connection {
        self.conn.clone()
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'client',
                is_active INTEGER NOT NULL DEFAULT 1,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                creation_date TEXT NOT NULL,
                security_level TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                logement_doors INTEGER,
                has_private_cellars INTEGER,
                common_doors INTEGER,
                extra_common_keys INTEGER,
                pg_keys INTEGER,
                total_doors_pg INTEGER,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create projects table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS cylinders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                gamme TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create cylinders table: {}", e)))?;

        Ok(())
    }

    /// Seeds the cylinder catalog when empty so the security-level dropdown
    /// has data on a fresh install.
    pub async fn seed_catalog(&self) -> Result<()> {
        let conn = self.connection();

        let mut rows = conn
            .query("SELECT COUNT(*) FROM cylinders", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count cylinders: {}", e)))?;
        let count: i64 = match rows.next().await.map_err(db_err)? {
            Some(row) => row.get(0).map_err(db_err)?,
            None => 0,
        };

        if count == 0 {
            for gamme in DEFAULT_CYLINDER_RANGES {
                conn.execute("INSERT INTO cylinders (gamme) VALUES (?)", [*gamme])
                    .await
                    .map_err(|e| {
                        AppError::Database(format!("Failed to seed cylinders: {}", e))
                    })?;
            }
        }

        Ok(())
    }

    // ============= User operations =============

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let conn = self.connection();
        let now = Utc::now().timestamp();
        let email = normalize_email(&new_user.email);

        conn.execute(
            "INSERT INTO users (email, password_hash, role, is_active, first_name, last_name, created_at, updated_at)
             VALUES (?, ?, ?, 1, ?, ?, ?, ?)",
            (
                email.as_str(),
                new_user.password_hash.as_str(),
                new_user.role.as_str(),
                new_user.first_name.trim(),
                new_user.last_name.trim(),
                now,
                now,
            ),
        )
        .await
        .map_err(map_unique_email_violation)?;

        let id = conn.last_insert_rowid();
        self.get_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("user vanished after insert".to_string()))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.connection();
        let email = normalize_email(email);

        let mut rows = conn
            .query(
                "SELECT id, email, password_hash, role, is_active, first_name, last_name
                 FROM users WHERE email = ?",
                [email],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let conn = self.connection();

        let mut rows = conn
            .query(
                "SELECT id, email, password_hash, role, is_active, first_name, last_name
                 FROM users WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserSnapshot>> {
        let conn = self.connection();

        let mut rows = conn
            .query(
                "SELECT id, email, password_hash, role, is_active, first_name, last_name
                 FROM users ORDER BY last_name, first_name",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to list users: {}", e)))?;

        let mut users = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            users.push(UserSnapshot::from(user_from_row(&row)?));
        }

        Ok(users)
    }

    pub async fn count_users(&self) -> Result<i64> {
        let conn = self.connection();

        let mut rows = conn
            .query("SELECT COUNT(*) FROM users", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count users: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => row.get(0).map_err(db_err),
            None => Ok(0),
        }
    }

    /// Applies a partial update. Returns `false` when no row has this id.
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<bool> {
        if update.is_empty() {
            return Err(AppError::InvalidInput(
                "No valid field to update.".to_string(),
            ));
        }

        let conn = self.connection();
        let mut fields: Vec<&str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(role) = update.role {
            fields.push("role = ?");
            params.push(Value::Text(role.as_str().to_string()));
        }
        if let Some(is_active) = update.is_active {
            fields.push("is_active = ?");
            params.push(Value::Integer(is_active as i64));
        }
        if let Some(first_name) = &update.first_name {
            fields.push("first_name = ?");
            params.push(Value::Text(first_name.trim().to_string()));
        }
        if let Some(last_name) = &update.last_name {
            fields.push("last_name = ?");
            params.push(Value::Text(last_name.trim().to_string()));
        }
        if let Some(email) = &update.email {
            fields.push("email = ?");
            params.push(Value::Text(normalize_email(email)));
        }

        fields.push("updated_at = ?");
        params.push(Value::Integer(Utc::now().timestamp()));
        params.push(Value::Integer(id));

        let sql = format!("UPDATE users SET {} WHERE id = ?", fields.join(", "));
        let changed = conn
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(map_unique_email_violation)?;

        Ok(changed > 0)
    }

    /// Hard row removal. Returns `false` when no row has this id.
    pub async fn delete_user(&self, id: i64) -> Result<bool> {
        let conn = self.connection();

        let changed = conn
            .execute("DELETE FROM users WHERE id = ?", [id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete user: {}", e)))?;

        Ok(changed > 0)
    }

    // ============= Project operations =============

    pub async fn create_project(&self, owner_id: i64, project: NewProject) -> Result<i64> {
        let conn = self.connection();

        conn.execute(
            "INSERT INTO projects (name, kind, creation_date, security_level, user_id)
             VALUES (?, ?, ?, ?, ?)",
            (
                project.name.as_str(),
                project.kind.as_str(),
                project.creation_date.as_str(),
                project.security_level.as_str(),
                owner_id,
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create project: {}", e)))?;

        Ok(conn.last_insert_rowid())
    }

    pub async fn list_projects(&self, owner_id: i64) -> Result<Vec<Project>> {
        let conn = self.connection();

        let mut rows = conn
            .query(
                "SELECT id, name, kind, creation_date, security_level, user_id,
                        logement_doors, has_private_cellars, common_doors,
                        extra_common_keys, pg_keys, total_doors_pg
                 FROM projects WHERE user_id = ? ORDER BY creation_date DESC",
                [owner_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query projects: {}", e)))?;

        let mut projects = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            projects.push(project_from_row(&row)?);
        }

        Ok(projects)
    }

    /// Updates the step-two detail fields of a project the caller owns. The
    /// owner id is part of the WHERE clause, so a foreign project behaves
    /// exactly like a missing one. Returns `false` when nothing matched.
    pub async fn update_project_details(
        &self,
        project_id: i64,
        owner_id: i64,
        details: &ProjectDetailsUpdate,
    ) -> Result<bool> {
        if details.is_empty() {
            return Err(AppError::InvalidInput(
                "No valid detail field provided.".to_string(),
            ));
        }

        let conn = self.connection();
        let mut fields: Vec<&str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(v) = details.logement_doors {
            fields.push("logement_doors = ?");
            params.push(Value::Integer(v));
        }
        if let Some(v) = details.has_private_cellars {
            fields.push("has_private_cellars = ?");
            params.push(Value::Integer(v as i64));
        }
        if let Some(v) = details.common_doors {
            fields.push("common_doors = ?");
            params.push(Value::Integer(v));
        }
        if let Some(v) = details.extra_common_keys {
            fields.push("extra_common_keys = ?");
            params.push(Value::Integer(v));
        }
        if let Some(v) = details.pg_keys {
            fields.push("pg_keys = ?");
            params.push(Value::Integer(v));
        }
        if let Some(v) = details.total_doors_pg {
            fields.push("total_doors_pg = ?");
            params.push(Value::Integer(v));
        }

        params.push(Value::Integer(project_id));
        params.push(Value::Integer(owner_id));

        let sql = format!(
            "UPDATE projects SET {} WHERE id = ? AND user_id = ?",
            fields.join(", ")
        );
        let changed = conn
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| AppError::Database(format!("Failed to update project: {}", e)))?;

        Ok(changed > 0)
    }

    // ============= Catalog operations =============

    /// Distinct cylinder ranges, the raw material for the security-level
    /// dropdown.
    pub async fn distinct_cylinder_ranges(&self) -> Result<Vec<String>> {
        let conn = self.connection();

        let mut rows = conn
            .query("SELECT DISTINCT gamme FROM cylinders ORDER BY gamme", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query cylinders: {}", e)))?;

        let mut ranges = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            ranges.push(row.get::<String>(0).map_err(db_err)?);
        }

        Ok(ranges)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn db_err(e: libsql::Error) -> AppError {
    AppError::Database(e.to_string())
}

fn map_unique_email_violation(e: libsql::Error) -> AppError {
    if e.to_string().contains("UNIQUE constraint failed: users.email") {
        AppError::Conflict
    } else {
        AppError::Database(format!("Query failed: {}", e))
    }
}

fn user_from_row(row: &libsql::Row) -> Result<User> {
    let role_str: String = row.get(3).map_err(db_err)?;
    let role = Role::parse(&role_str)
        .ok_or_else(|| AppError::Database(format!("unknown role in users table: {role_str}")))?;

    Ok(User {
        id: row.get(0).map_err(db_err)?,
        email: row.get(1).map_err(db_err)?,
        password_hash: row.get(2).map_err(db_err)?,
        role,
        is_active: row.get::<i64>(4).map_err(db_err)? != 0,
        first_name: row.get(5).map_err(db_err)?,
        last_name: row.get(6).map_err(db_err)?,
    })
}

fn project_from_row(row: &libsql::Row) -> Result<Project> {
    Ok(Project {
        id: row.get(0).map_err(db_err)?,
        name: row.get(1).map_err(db_err)?,
        kind: row.get(2).map_err(db_err)?,
        creation_date: row.get(3).map_err(db_err)?,
        security_level: row.get(4).map_err(db_err)?,
        user_id: row.get(5).map_err(db_err)?,
        logement_doors: opt_i64(row, 6)?,
        has_private_cellars: opt_i64(row, 7)?.map(|v| v != 0),
        common_doors: opt_i64(row, 8)?,
        extra_common_keys: opt_i64(row, 9)?,
        pg_keys: opt_i64(row, 10)?,
        total_doors_pg: opt_i64(row, 11)?,
    })
}

fn opt_i64(row: &libsql::Row, idx: i32) -> Result<Option<i64>> {
    match row.get_value(idx).map_err(db_err)? {
        Value::Null => Ok(None),
        Value::Integer(v) => Ok(Some(v)),
        other => Err(AppError::Database(format!(
            "unexpected column value at index {idx}: {other:?}"
        ))),
    }
}
