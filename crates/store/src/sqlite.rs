//! SQLite backend.
//!
//! One database file holding the nine tables of the facility model.
//! Foreign keys are enforced by SQLite (`foreign_keys = ON`) as a backstop
//! to the checks done in the domain layer.

use async_trait::async_trait;
use isenior_core::error::StoreError;
use isenior_core::model::*;
use isenior_core::store::{
    AppointmentStore, MedicationStore, ReferenceStore, ResidentStore, RoomStore, Store, UserStore,
};
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Table definitions, parents before children.
const SCHEMA: &[(&str, &str)] = &[
    (
        "mutuelles",
        r#"
        CREATE TABLE IF NOT EXISTS mutuelles (
            id       INTEGER PRIMARY KEY,
            name     TEXT NOT NULL UNIQUE,
            code     INTEGER NOT NULL,
            address  TEXT NOT NULL,
            email    TEXT NOT NULL,
            phone    TEXT NOT NULL
        )
        "#,
    ),
    (
        "physicians",
        r#"
        CREATE TABLE IF NOT EXISTS physicians (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL UNIQUE,
            specialty  TEXT,
            address    TEXT,
            phone      TEXT,
            email      TEXT
        )
        "#,
    ),
    (
        "rooms",
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            room_number  INTEGER PRIMARY KEY,
            capacity     INTEGER NOT NULL CHECK (capacity > 0)
        )
        "#,
    ),
    (
        "residents",
        r#"
        CREATE TABLE IF NOT EXISTS residents (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            last_name        TEXT NOT NULL,
            first_name       TEXT NOT NULL,
            birth_date       TEXT NOT NULL,
            mutuelle_id      INTEGER REFERENCES mutuelles(id),
            national_id      TEXT,
            physician_id     INTEGER REFERENCES physicians(id),
            medication_note  TEXT,
            room_number      INTEGER REFERENCES rooms(room_number)
        )
        "#,
    ),
    (
        "medications",
        r#"
        CREATE TABLE IF NOT EXISTS medications (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            name               TEXT NOT NULL,
            active_ingredient  TEXT,
            reference_link     TEXT
        )
        "#,
    ),
    (
        "patient_medications",
        r#"
        CREATE TABLE IF NOT EXISTS patient_medications (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            resident_id    INTEGER NOT NULL REFERENCES residents(id),
            medication_id  INTEGER NOT NULL REFERENCES medications(id),
            dosage         TEXT NOT NULL,
            time_of_day    TEXT NOT NULL DEFAULT '',
            frequency      TEXT NOT NULL DEFAULT '',
            status         INTEGER NOT NULL DEFAULT 0
        )
        "#,
    ),
    (
        "motifs",
        r#"
        CREATE TABLE IF NOT EXISTS motifs (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            name  TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            role            TEXT NOT NULL,
            status          TEXT NOT NULL,
            email           TEXT NOT NULL UNIQUE,
            phone           TEXT,
            email_verified  INTEGER NOT NULL DEFAULT 0
        )
        "#,
    ),
    (
        "appointments",
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            resident_id     INTEGER NOT NULL REFERENCES residents(id),
            date            TEXT NOT NULL,
            time            TEXT NOT NULL,
            reason          TEXT NOT NULL DEFAULT '',
            transporter     TEXT,
            transport_time  TEXT
        )
        "#,
    ),
    (
        "appointments resident index",
        "CREATE INDEX IF NOT EXISTS idx_appointments_resident ON appointments(resident_id)",
    ),
    (
        "patient_medications resident index",
        "CREATE INDEX IF NOT EXISTS idx_patient_medications_resident \
         ON patient_medications(resident_id)",
    ),
];

/// Children before parents, so foreign keys never block the drop.
const DROP_ORDER: &[&str] = &[
    "appointments",
    "patient_medications",
    "residents",
    "rooms",
    "medications",
    "motifs",
    "physicians",
    "mutuelles",
    "users",
];

/// A SQLite-backed [`Store`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and make sure every table exists.
    ///
    /// Accepts a plain file path, a `sqlite:` URL, or `:memory:` /
    /// `sqlite::memory:` for an ephemeral database. In-memory databases are
    /// pinned to a single long-lived connection so every query sees the same data.
    pub async fn new(path: &str, max_connections: u32) -> Result<Self, StoreError> {
        let in_memory = path.contains(":memory:");
        let options = connect_options(path)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let mut pool_options = SqlitePoolOptions::new();
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            pool_options.max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {path}");
        Ok(store)
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        for (what, sql) in SCHEMA {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::MigrationFailed(format!("{what}: {e}")))?;
        }
        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Drop every table and recreate the empty schema.
    pub async fn reset(&self) -> Result<(), StoreError> {
        for table in DROP_ORDER {
            sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::MigrationFailed(format!("drop {table}: {e}")))?;
        }
        info!("Dropped all tables");
        self.run_migrations().await
    }
}

fn connect_options(path: &str) -> Result<SqliteConnectOptions, StoreError> {
    if path == ":memory:" {
        return SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")));
    }
    if path.starts_with("sqlite:") {
        return SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")));
    }
    Ok(SqliteConnectOptions::new().filename(path))
}

/// `LIMIT -1` means unbounded in SQLite.
fn sql_limit(limit: Option<usize>) -> i64 {
    limit.map(|n| n as i64).unwrap_or(-1)
}

/// Classify a sqlx error, keeping constraint violations distinguishable.
fn query_error(context: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::UniqueViolation(constraint_target(db.message()));
        }
        if db.is_foreign_key_violation() {
            return StoreError::ForeignKeyViolation(context.to_string());
        }
    }
    StoreError::QueryFailed(format!("{context}: {err}"))
}

/// "UNIQUE constraint failed: users.username" → "username".
fn constraint_target(message: &str) -> String {
    message
        .rsplit_once(": ")
        .map(|(_, cols)| cols)
        .unwrap_or(message)
        .split(", ")
        .map(|col| col.rsplit_once('.').map(|(_, c)| c).unwrap_or(col))
        .collect::<Vec<_>>()
        .join(", ")
}

fn col<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| StoreError::QueryFailed(format!("{name} column: {e}")))
}

fn resident_from_row(row: &SqliteRow) -> Result<Resident, StoreError> {
    Ok(Resident {
        id: col(row, "id")?,
        last_name: col(row, "last_name")?,
        first_name: col(row, "first_name")?,
        birth_date: col(row, "birth_date")?,
        mutuelle_id: col(row, "mutuelle_id")?,
        national_id: col(row, "national_id")?,
        physician_id: col(row, "physician_id")?,
        medication_note: col(row, "medication_note")?,
        room_number: col(row, "room_number")?,
    })
}

fn room_from_row(row: &SqliteRow) -> Result<Room, StoreError> {
    Ok(Room {
        room_number: col(row, "room_number")?,
        capacity: col(row, "capacity")?,
    })
}

fn appointment_from_row(row: &SqliteRow) -> Result<Appointment, StoreError> {
    Ok(Appointment {
        id: col(row, "id")?,
        resident_id: col(row, "resident_id")?,
        date: col(row, "date")?,
        time: col(row, "time")?,
        reason: col(row, "reason")?,
        transporter: col(row, "transporter")?,
        transport_time: col(row, "transport_time")?,
    })
}

fn medication_from_row(row: &SqliteRow) -> Result<Medication, StoreError> {
    Ok(Medication {
        id: col(row, "id")?,
        name: col(row, "name")?,
        active_ingredient: col(row, "active_ingredient")?,
        reference_link: col(row, "reference_link")?,
    })
}

fn patient_medication_from_row(row: &SqliteRow) -> Result<PatientMedication, StoreError> {
    Ok(PatientMedication {
        id: col(row, "id")?,
        resident_id: col(row, "resident_id")?,
        medication_id: col(row, "medication_id")?,
        dosage: col(row, "dosage")?,
        time_of_day: col(row, "time_of_day")?,
        frequency: col(row, "frequency")?,
        status: col(row, "status")?,
    })
}

fn mutuelle_from_row(row: &SqliteRow) -> Result<Mutuelle, StoreError> {
    Ok(Mutuelle {
        id: col(row, "id")?,
        name: col(row, "name")?,
        code: col(row, "code")?,
        address: col(row, "address")?,
        email: col(row, "email")?,
        phone: col(row, "phone")?,
    })
}

fn physician_from_row(row: &SqliteRow) -> Result<Physician, StoreError> {
    Ok(Physician {
        id: col(row, "id")?,
        name: col(row, "name")?,
        specialty: col(row, "specialty")?,
        address: col(row, "address")?,
        phone: col(row, "phone")?,
        email: col(row, "email")?,
    })
}

fn motif_from_row(row: &SqliteRow) -> Result<Motif, StoreError> {
    Ok(Motif {
        id: col(row, "id")?,
        name: col(row, "name")?,
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User, StoreError> {
    Ok(User {
        id: col(row, "id")?,
        username: col(row, "username")?,
        password_hash: col(row, "password_hash")?,
        role: col(row, "role")?,
        status: col(row, "status")?,
        email: col(row, "email")?,
        phone: col(row, "phone")?,
        email_verified: col(row, "email_verified")?,
    })
}

fn collect<T>(
    rows: &[SqliteRow],
    parse: fn(&SqliteRow) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    rows.iter().map(parse).collect()
}

#[async_trait]
impl ResidentStore for SqliteStore {
    async fn list_residents(&self, limit: Option<usize>) -> Result<Vec<Resident>, StoreError> {
        let rows = sqlx::query("SELECT * FROM residents ORDER BY id LIMIT ?1")
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("list residents", e))?;
        collect(&rows, resident_from_row)
    }

    async fn get_resident(&self, id: i64) -> Result<Option<Resident>, StoreError> {
        let row = sqlx::query("SELECT * FROM residents WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("get resident", e))?;
        row.as_ref().map(resident_from_row).transpose()
    }

    async fn insert_resident(&self, input: &ResidentInput) -> Result<Resident, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO residents (last_name, first_name, birth_date, mutuelle_id, national_id,
                                   physician_id, medication_note, room_number)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING *
            "#,
        )
        .bind(&input.last_name)
        .bind(&input.first_name)
        .bind(&input.birth_date)
        .bind(input.mutuelle_id)
        .bind(&input.national_id)
        .bind(input.physician_id)
        .bind(&input.medication_note)
        .bind(input.room_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("resident", e))?;

        let resident = resident_from_row(&row)?;
        debug!("Inserted resident {}", resident.id);
        Ok(resident)
    }

    async fn update_resident(
        &self,
        id: i64,
        input: &ResidentInput,
    ) -> Result<Option<Resident>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE residents
            SET last_name = ?2, first_name = ?3, birth_date = ?4, mutuelle_id = ?5,
                national_id = ?6, physician_id = ?7, medication_note = ?8, room_number = ?9
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.last_name)
        .bind(&input.first_name)
        .bind(&input.birth_date)
        .bind(input.mutuelle_id)
        .bind(&input.national_id)
        .bind(input.physician_id)
        .bind(&input.medication_note)
        .bind(input.room_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("resident", e))?;
        row.as_ref().map(resident_from_row).transpose()
    }

    async fn delete_resident(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM residents WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("resident", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_resident_dependents(&self, id: i64) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM appointments WHERE resident_id = ?1)
                 + (SELECT COUNT(*) FROM patient_medications WHERE resident_id = ?1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("count resident dependents", e))
    }
}

#[async_trait]
impl RoomStore for SqliteStore {
    async fn list_rooms(&self, limit: Option<usize>) -> Result<Vec<Room>, StoreError> {
        let rows = sqlx::query("SELECT * FROM rooms ORDER BY room_number LIMIT ?1")
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("list rooms", e))?;
        collect(&rows, room_from_row)
    }

    async fn get_room(&self, room_number: i64) -> Result<Option<Room>, StoreError> {
        let row = sqlx::query("SELECT * FROM rooms WHERE room_number = ?1")
            .bind(room_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("get room", e))?;
        row.as_ref().map(room_from_row).transpose()
    }

    async fn insert_room(&self, input: &RoomInput) -> Result<Room, StoreError> {
        let row = sqlx::query(
            "INSERT INTO rooms (room_number, capacity) VALUES (?1, ?2) RETURNING *",
        )
        .bind(input.room_number)
        .bind(input.capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("room", e))?;
        room_from_row(&row)
    }

    async fn update_room_capacity(
        &self,
        room_number: i64,
        capacity: i64,
    ) -> Result<Option<Room>, StoreError> {
        let row =
            sqlx::query("UPDATE rooms SET capacity = ?2 WHERE room_number = ?1 RETURNING *")
                .bind(room_number)
                .bind(capacity)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| query_error("room", e))?;
        row.as_ref().map(room_from_row).transpose()
    }

    async fn delete_room(&self, room_number: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM rooms WHERE room_number = ?1")
            .bind(room_number)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("room", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_room_occupants(
        &self,
        room_number: i64,
        excluding_resident: Option<i64>,
    ) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM residents WHERE room_number = ?1 AND (?2 IS NULL OR id != ?2)",
        )
        .bind(room_number)
        .bind(excluding_resident)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("count room occupants", e))
    }
}

#[async_trait]
impl AppointmentStore for SqliteStore {
    async fn list_appointments(
        &self,
        resident_id: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM appointments WHERE (?1 IS NULL OR resident_id = ?1) ORDER BY id LIMIT ?2",
        )
        .bind(resident_id)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("list appointments", e))?;
        collect(&rows, appointment_from_row)
    }

    async fn get_appointment(&self, id: i64) -> Result<Option<Appointment>, StoreError> {
        let row = sqlx::query("SELECT * FROM appointments WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("get appointment", e))?;
        row.as_ref().map(appointment_from_row).transpose()
    }

    async fn insert_appointment(&self, input: &AppointmentInput) -> Result<Appointment, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO appointments (resident_id, date, time, reason, transporter, transport_time)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(input.resident_id)
        .bind(&input.date)
        .bind(&input.time)
        .bind(&input.reason)
        .bind(&input.transporter)
        .bind(&input.transport_time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("appointment", e))?;

        let appointment = appointment_from_row(&row)?;
        debug!("Inserted appointment {}", appointment.id);
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: i64,
        input: &AppointmentInput,
    ) -> Result<Option<Appointment>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE appointments
            SET resident_id = ?2, date = ?3, time = ?4, reason = ?5,
                transporter = ?6, transport_time = ?7
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.resident_id)
        .bind(&input.date)
        .bind(&input.time)
        .bind(&input.reason)
        .bind(&input.transporter)
        .bind(&input.transport_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("appointment", e))?;
        row.as_ref().map(appointment_from_row).transpose()
    }

    async fn delete_appointment(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("appointment", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MedicationStore for SqliteStore {
    async fn list_medications(&self, limit: Option<usize>) -> Result<Vec<Medication>, StoreError> {
        let rows = sqlx::query("SELECT * FROM medications ORDER BY id LIMIT ?1")
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("list medications", e))?;
        collect(&rows, medication_from_row)
    }

    async fn get_medication(&self, id: i64) -> Result<Option<Medication>, StoreError> {
        let row = sqlx::query("SELECT * FROM medications WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("get medication", e))?;
        row.as_ref().map(medication_from_row).transpose()
    }

    async fn list_patient_medications(
        &self,
        resident_id: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<PatientMedication>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM patient_medications
            WHERE (?1 IS NULL OR resident_id = ?1)
            ORDER BY id
            LIMIT ?2
            "#,
        )
        .bind(resident_id)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("list patient medications", e))?;
        collect(&rows, patient_medication_from_row)
    }

    async fn get_patient_medication(
        &self,
        id: i64,
    ) -> Result<Option<PatientMedication>, StoreError> {
        let row = sqlx::query("SELECT * FROM patient_medications WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("get patient medication", e))?;
        row.as_ref().map(patient_medication_from_row).transpose()
    }

    async fn insert_patient_medication(
        &self,
        input: &PatientMedicationInput,
    ) -> Result<PatientMedication, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO patient_medications
                (resident_id, medication_id, dosage, time_of_day, frequency, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(input.resident_id)
        .bind(input.medication_id)
        .bind(&input.dosage)
        .bind(&input.time_of_day)
        .bind(&input.frequency)
        .bind(input.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("patient medication", e))?;

        let assignment = patient_medication_from_row(&row)?;
        debug!("Inserted patient medication {}", assignment.id);
        Ok(assignment)
    }

    async fn update_patient_medication(
        &self,
        id: i64,
        input: &PatientMedicationInput,
    ) -> Result<Option<PatientMedication>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE patient_medications
            SET resident_id = ?2, medication_id = ?3, dosage = ?4,
                time_of_day = ?5, frequency = ?6, status = ?7
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.resident_id)
        .bind(input.medication_id)
        .bind(&input.dosage)
        .bind(&input.time_of_day)
        .bind(&input.frequency)
        .bind(input.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("patient medication", e))?;
        row.as_ref().map(patient_medication_from_row).transpose()
    }

    async fn delete_patient_medication(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM patient_medications WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("patient medication", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReferenceStore for SqliteStore {
    async fn list_mutuelles(&self, limit: Option<usize>) -> Result<Vec<Mutuelle>, StoreError> {
        let rows = sqlx::query("SELECT * FROM mutuelles ORDER BY id LIMIT ?1")
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("list mutuelles", e))?;
        collect(&rows, mutuelle_from_row)
    }

    async fn get_mutuelle(&self, id: i64) -> Result<Option<Mutuelle>, StoreError> {
        let row = sqlx::query("SELECT * FROM mutuelles WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("get mutuelle", e))?;
        row.as_ref().map(mutuelle_from_row).transpose()
    }

    async fn list_physicians(&self, limit: Option<usize>) -> Result<Vec<Physician>, StoreError> {
        let rows = sqlx::query("SELECT * FROM physicians ORDER BY id LIMIT ?1")
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("list physicians", e))?;
        collect(&rows, physician_from_row)
    }

    async fn get_physician(&self, id: i64) -> Result<Option<Physician>, StoreError> {
        let row = sqlx::query("SELECT * FROM physicians WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("get physician", e))?;
        row.as_ref().map(physician_from_row).transpose()
    }

    async fn list_motifs(&self, limit: Option<usize>) -> Result<Vec<Motif>, StoreError> {
        let rows = sqlx::query("SELECT * FROM motifs ORDER BY id LIMIT ?1")
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("list motifs", e))?;
        collect(&rows, motif_from_row)
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("list users", e))?;
        collect(&rows, user_from_row)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("get user", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find user", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, status, email, phone, email_verified)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(&user.status)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.email_verified)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("user", e))?;
        user_from_row(&row)
    }

    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET username = ?2, role = ?3, status = ?4, email = ?5, phone = ?6
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.username)
        .bind(&update.role)
        .bind(&update.status)
        .bind(&update.email)
        .bind(&update.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("user", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("user", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("ping: {e}")))?;
        Ok(())
    }
}
