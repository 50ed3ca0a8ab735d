use rusqlite::{Connection, OptionalExtension, Result as SqlResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use crate::services::chat::ChatEntities;
use crate::services::doctors::{Doctor, DoctorSeed};

pub struct Database {
    conn: Connection,
}

const RECENT_LIMIT: i64 = 10;

/// Scan row to persist
#[derive(Debug, Clone)]
pub struct NewScan {
    pub injury_type: String,
    pub confidence_score: f64,
    pub risk_level: String,
    pub image_path: Option<String>,
    pub visual_notes: Option<String>,
    pub created_at: String,
}

/// Appointment row to persist
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub doctor_id: i64,
    pub patient_name: String,
    pub patient_phone: String,
    pub appointment_slot: String,
    pub injury_type: Option<String>,
    pub token_number: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecentScan {
    pub id: i64,
    pub injury_type: String,
    pub risk_level: String,
    pub confidence: f64,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecentAppointment {
    pub id: i64,
    pub patient_name: String,
    pub patient_phone: String,
    pub appointment_slot: String,
    pub injury_type: Option<String>,
    pub token_number: String,
    pub status: String,
    pub created_at: String,
    pub doctor_name: String,
    pub hospital: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AdminStats {
    pub total_scans: i64,
    pub total_appointments: i64,
    pub risk_distribution: BTreeMap<String, i64>,
    pub injury_distribution: BTreeMap<String, i64>,
    pub recent_scans: Vec<RecentScan>,
    pub recent_appointments: Vec<RecentAppointment>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatLogEntry {
    pub timestamp: String,
    pub user_message: String,
    pub detected_intent: String,
    pub ai_response: String,
    pub entities: ChatEntities,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct EntitiesMentioned {
    pub body_parts: Vec<String>,
    pub symptoms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatHistory {
    pub total_messages: i64,
    pub intents_discussed: Vec<String>,
    pub entities_mentioned: EntitiesMentioned,
    pub conversation_history: Vec<ChatLogEntry>,
}

const NOT_AVAILABLE: &str = "Not Available";

impl Database {
    pub fn new(path: &Path) -> SqlResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> SqlResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    pub fn run_migrations(&self) -> SqlResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT DEFAULT (datetime('now'))
            );"
        )?;

        let current_version: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM _migrations",
            [],
            |row| row.get(0),
        )?;

        if current_version < 1 {
            self.apply_v1()?;
        }

        // Chat history is only kept for 30 days
        if let Err(e) = self.conn.execute(
            "DELETE FROM chat_messages WHERE created_at < ?1",
            [(chrono::Utc::now() - chrono::Duration::days(30)).to_rfc3339()],
        ) {
            log::warn!("Failed to prune old chat messages: {}", e);
        }

        Ok(())
    }

    fn apply_v1(&self) -> SqlResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS scan_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                injury_type TEXT NOT NULL,
                confidence_score REAL NOT NULL,
                risk_level TEXT NOT NULL,
                image_path TEXT,
                visual_notes TEXT,
                created_at TEXT NOT NULL
            );

            -- Static seed data; slots are a JSON array, expertise is comma-separated
            CREATE TABLE IF NOT EXISTS doctors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                specialization TEXT NOT NULL,
                hospital TEXT NOT NULL,
                distance_km REAL NOT NULL,
                rating REAL NOT NULL,
                available_slots TEXT,
                expertise TEXT,
                created_at TEXT DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                doctor_id INTEGER NOT NULL,
                patient_name TEXT NOT NULL,
                patient_phone TEXT NOT NULL,
                appointment_slot TEXT NOT NULL,
                injury_type TEXT,
                token_number TEXT NOT NULL UNIQUE,
                status TEXT NOT NULL DEFAULT 'confirmed',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_message TEXT NOT NULL,
                intent TEXT NOT NULL,
                response TEXT NOT NULL,
                entities TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_scan_results_created_at ON scan_results(created_at);
            CREATE INDEX IF NOT EXISTS idx_appointments_created_at ON appointments(created_at);
            CREATE INDEX IF NOT EXISTS idx_chat_messages_created_at ON chat_messages(created_at);

            INSERT INTO _migrations (version) VALUES (1);
            "
        )?;
        Ok(())
    }

    /// Insert the static doctor table if no doctors exist yet. Returns rows inserted.
    pub fn seed_doctors(&self, seeds: &[DoctorSeed]) -> SqlResult<usize> {
        let existing: i64 = self.conn.query_row("SELECT COUNT(*) FROM doctors", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO doctors (name, specialization, hospital, distance_km, rating, available_slots, expertise)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            )?;
            for seed in seeds {
                let slots = serde_json::to_string(seed.available_slots)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                stmt.execute(rusqlite::params![
                    seed.name,
                    seed.specialization,
                    seed.hospital,
                    seed.distance_km,
                    seed.rating,
                    slots,
                    seed.expertise.join(","),
                ])?;
            }
        }
        tx.commit()?;
        Ok(seeds.len())
    }

    fn doctor_from_row(row: &rusqlite::Row) -> SqlResult<Doctor> {
        let slots: Option<String> = row.get(6)?;
        let expertise: Option<String> = row.get(7)?;
        let available_slots = match slots {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
            })?,
            None => Vec::new(),
        };

        Ok(Doctor {
            id: row.get(0)?,
            name: row.get(1)?,
            specialization: row.get(2)?,
            hospital: row.get(3)?,
            distance_km: row.get(4)?,
            rating: row.get(5)?,
            available_slots,
            expertise: expertise
                .map(|e| e.split(',').map(|s| s.to_string()).filter(|s| !s.is_empty()).collect())
                .unwrap_or_default(),
        })
    }

    pub fn list_doctors(&self) -> SqlResult<Vec<Doctor>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, specialization, hospital, distance_km, rating, available_slots, expertise
             FROM doctors ORDER BY id"
        )?;
        let doctors = stmt
            .query_map([], Self::doctor_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(doctors)
    }

    pub fn get_doctor(&self, id: i64) -> SqlResult<Option<Doctor>> {
        self.conn
            .query_row(
                "SELECT id, name, specialization, hospital, distance_km, rating, available_slots, expertise
                 FROM doctors WHERE id = ?1",
                [id],
                Self::doctor_from_row,
            )
            .optional()
    }

    pub fn insert_scan(&self, scan: &NewScan) -> SqlResult<i64> {
        self.conn.execute(
            "INSERT INTO scan_results (injury_type, confidence_score, risk_level, image_path, visual_notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                scan.injury_type,
                scan.confidence_score,
                scan.risk_level,
                scan.image_path,
                scan.visual_notes,
                scan.created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn token_exists(&self, token: &str) -> SqlResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM appointments WHERE token_number = ?1",
            [token],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn insert_appointment(&self, apt: &NewAppointment) -> SqlResult<i64> {
        self.conn.execute(
            "INSERT INTO appointments (doctor_id, patient_name, patient_phone, appointment_slot, injury_type, token_number, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                apt.doctor_id,
                apt.patient_name,
                apt.patient_phone,
                apt.appointment_slot,
                apt.injury_type,
                apt.token_number,
                apt.status,
                apt.created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn count(&self, table: &str) -> SqlResult<i64> {
        self.conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
    }

    fn distribution(&self, column: &str) -> SqlResult<BTreeMap<String, i64>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {col}, COUNT(*) FROM scan_results GROUP BY {col}",
            col = column
        ))?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(pairs)
    }

    /// Dashboard aggregates over scans and appointments
    pub fn admin_stats(&self) -> SqlResult<AdminStats> {
        let mut stmt = self.conn.prepare(
            "SELECT id, injury_type, risk_level, confidence_score, created_at
             FROM scan_results ORDER BY created_at DESC, id DESC LIMIT ?1"
        )?;
        let recent_scans = stmt
            .query_map([RECENT_LIMIT], |row| {
                Ok(RecentScan {
                    id: row.get(0)?,
                    injury_type: row.get(1)?,
                    risk_level: row.get(2)?,
                    confidence: row.get(3)?,
                    timestamp: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.patient_name, a.patient_phone, a.appointment_slot, a.injury_type,
                    a.token_number, a.status, a.created_at, d.name, d.hospital
             FROM appointments a LEFT JOIN doctors d ON d.id = a.doctor_id
             ORDER BY a.created_at DESC, a.id DESC LIMIT ?1"
        )?;
        let recent_appointments = stmt
            .query_map([RECENT_LIMIT], |row| {
                Ok(RecentAppointment {
                    id: row.get(0)?,
                    patient_name: row.get(1)?,
                    patient_phone: row.get(2)?,
                    appointment_slot: row.get(3)?,
                    injury_type: row.get(4)?,
                    token_number: row.get(5)?,
                    status: row.get(6)?,
                    created_at: row.get(7)?,
                    doctor_name: row.get::<_, Option<String>>(8)?.unwrap_or_else(|| NOT_AVAILABLE.into()),
                    hospital: row.get::<_, Option<String>>(9)?.unwrap_or_else(|| NOT_AVAILABLE.into()),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AdminStats {
            total_scans: self.count("scan_results")?,
            total_appointments: self.count("appointments")?,
            risk_distribution: self.distribution("risk_level")?,
            injury_distribution: self.distribution("injury_type")?,
            recent_scans,
            recent_appointments,
        })
    }

    /// Append one chat exchange; returns the number of stored messages
    pub fn insert_chat_message(&self, entry: &ChatLogEntry) -> SqlResult<i64> {
        let entities = serde_json::to_string(&entry.entities)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        self.conn.execute(
            "INSERT INTO chat_messages (user_message, intent, response, entities, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![entry.user_message, entry.detected_intent, entry.ai_response, entities, entry.timestamp],
        )?;
        self.count("chat_messages")
    }

    pub fn chat_summary(&self) -> SqlResult<ChatHistory> {
        let mut stmt = self.conn.prepare(
            "SELECT created_at, user_message, intent, response, entities FROM chat_messages ORDER BY id ASC"
        )?;
        let history = stmt
            .query_map([], |row| {
                let entities: String = row.get(4)?;
                Ok(ChatLogEntry {
                    timestamp: row.get(0)?,
                    user_message: row.get(1)?,
                    detected_intent: row.get(2)?,
                    ai_response: row.get(3)?,
                    entities: serde_json::from_str(&entities).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
                    })?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let intents: BTreeSet<&str> = history.iter().map(|e| e.detected_intent.as_str()).collect();
        let mut body_parts = BTreeSet::new();
        let mut symptoms = BTreeSet::new();
        for entry in &history {
            body_parts.extend(entry.entities.body_parts.iter().cloned());
            symptoms.extend(entry.entities.symptoms.iter().cloned());
        }

        Ok(ChatHistory {
            total_messages: history.len() as i64,
            intents_discussed: intents.into_iter().map(String::from).collect(),
            entities_mentioned: EntitiesMentioned {
                body_parts: body_parts.into_iter().collect(),
                symptoms: symptoms.into_iter().collect(),
            },
            conversation_history: history,
        })
    }
}
