use super::{PersistenceResult, PlanStore};
use crate::document::PlanDocument;
use crate::error::PlanError;
use crate::plan::PlanModel;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

/// Keeps the current plan as a single JSON document row.
pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS plan (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                birth_date TEXT NOT NULL,
                plan_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| super::PersistenceError::InvalidData("sqlite mutex poisoned".into()))
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, plan: &PlanModel) -> PersistenceResult<()> {
        let json = serde_json::to_string(&plan.to_serializable())?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM plan", [])?;
        tx.execute(
            "INSERT INTO plan (id, birth_date, plan_json) VALUES (1, ?1, ?2)",
            params![plan.birth_date().to_string(), json],
        )?;
        tx.commit()?;
        tracing::info!("plan saved to sqlite");
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<PlanModel>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT plan_json FROM plan WHERE id = 1")?;
        let json: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(json) = json else {
            return Ok(None);
        };

        let document: PlanDocument = serde_json::from_str(&json)
            .map_err(|err| PlanError::Deserialization(err.to_string()))?;
        Ok(Some(PlanModel::from_serializable(document)?))
    }
}
