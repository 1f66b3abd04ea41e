//! SQLite schema definition.

/// Complete database schema for NeuroKeep.
///
/// Timestamps are local civil time stored as `YYYY-MM-DD HH:MM:SS` text, so
/// `date(timestamp)` yields the civil calendar day.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients (and doctors)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    phone TEXT,
    email TEXT,
    role TEXT NOT NULL DEFAULT 'patient' CHECK (role IN ('patient', 'doctor')),
    streak INTEGER NOT NULL DEFAULT 0,           -- cache, recomputed from events
    bp_target_systolic INTEGER NOT NULL DEFAULT 140,
    bp_target_diastolic INTEGER NOT NULL DEFAULT 90,
    doctor_code TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_patients_role ON patients(role, name);
CREATE INDEX IF NOT EXISTS idx_patients_doctor_code ON patients(doctor_code);

-- ============================================================================
-- Medications
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    drug_name TEXT NOT NULL,
    dosage TEXT NOT NULL DEFAULT '',
    window_start TEXT NOT NULL,                  -- HH:MM
    window_end TEXT NOT NULL,                    -- HH:MM
    created_at TEXT NOT NULL,
    CHECK (window_start <= window_end)
);

CREATE INDEX IF NOT EXISTS idx_medications_patient ON medications(patient_id);

-- ============================================================================
-- Events (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    patient_id TEXT REFERENCES patients(id),     -- NULL for system events
    medication_id TEXT REFERENCES medications(id),
    event_type TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}'          -- JSON object
);

CREATE INDEX IF NOT EXISTS idx_events_patient_type_day
    ON events(patient_id, event_type, timestamp);
CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);

CREATE TRIGGER IF NOT EXISTS events_no_update BEFORE UPDATE ON events
BEGIN
    SELECT RAISE(ABORT, 'Events are append-only');
END;

CREATE TRIGGER IF NOT EXISTS events_no_delete BEFORE DELETE ON events
BEGIN
    SELECT RAISE(ABORT, 'Events are append-only');
END;

-- ============================================================================
-- Blood-Pressure Logs (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS bp_logs (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    systolic INTEGER NOT NULL,
    diastolic INTEGER NOT NULL,
    context TEXT NOT NULL DEFAULT 'normal',
    notes TEXT,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_bp_logs_patient_time ON bp_logs(patient_id, timestamp);

CREATE TRIGGER IF NOT EXISTS bp_logs_no_update BEFORE UPDATE ON bp_logs
BEGIN
    SELECT RAISE(ABORT, 'Blood-pressure logs are append-only');
END;

CREATE TRIGGER IF NOT EXISTS bp_logs_no_delete BEFORE DELETE ON bp_logs
BEGIN
    SELECT RAISE(ABORT, 'Blood-pressure logs are append-only');
END;

-- ============================================================================
-- Demo Requests (landing-page leads)
-- ============================================================================

CREATE TABLE IF NOT EXISTS demo_requests (
    id TEXT PRIMARY KEY,
    name TEXT,
    phone TEXT,
    email TEXT,
    role TEXT,
    created_at TEXT NOT NULL
);
"#;
