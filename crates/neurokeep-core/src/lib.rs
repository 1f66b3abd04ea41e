//! NeuroKeep Core Library
//!
//! Medication adherence and blood-pressure trend analytics over an
//! append-only event log.
//!
//! # Architecture
//!
//! ```text
//!  write paths (care)                         doctor / patient views
//!  onboarding, confirm, skip, BP ─┐      ┌──▶ report::ReportAssembler
//!                                 ▼      │
//!                    ┌──────────────────────────┐
//!                    │  SQLite: events, bp_logs │  append-only
//!                    └────────────┬─────────────┘
//!                                 │ EventStore (one snapshot per call)
//!                                 ▼
//!           analytics: adherence · streak · BP trend · risk · window
//!                                 │
//!                                 ▼
//!                    export: CSV, patient report, feed
//! ```
//!
//! # Core Principle
//!
//! **Adherence and streak are derived.** They are recomputed from the event
//! history on every read; the cached `Patient::streak` is only a copy.
//!
//! # Modules
//!
//! - [`clock`]: civil wall clock with a fixed UTC offset
//! - [`config`]: environment configuration
//! - [`db`]: SQLite database layer and the [`db::EventStore`] read contract
//! - [`models`]: domain types (Patient, Medication, Event, BpLog)
//! - [`analytics`]: adherence, streak, BP trend, risk and window checks
//! - [`report`]: assembled dashboard and detail records
//! - [`care`]: write paths
//! - [`export`]: event CSV, patient report and latest-events feed
//! - [`seed`]: demo data

pub mod analytics;
pub mod care;
pub mod clock;
pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod report;
pub mod seed;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use analytics::{
    is_within_window, risk_level, Analytics, AnalyticsError, BpDay, BpTrend, BpTrendStats,
    DayAdherence, RiskLevel,
};
pub use clock::{CivilClock, Clock, FixedClock};
pub use config::CoreConfig;
pub use db::{Database, EventStore};
pub use models::{
    BpLog, BpReadingInput, DemoRequest, DosingWindow, Event, EventType, Medication, Patient,
    Role, WindowPreset,
};
pub use report::{PatientDashboard, PatientDetail, PatientSummary, ReportAssembler};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum NeuroKeepError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for NeuroKeepError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => NeuroKeepError::NotFound(what),
            other => NeuroKeepError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for NeuroKeepError {
    fn from(e: serde_json::Error) -> Self {
        NeuroKeepError::SerializationError(e.to_string())
    }
}

impl From<models::ModelError> for NeuroKeepError {
    fn from(e: models::ModelError) -> Self {
        NeuroKeepError::InvalidInput(e.to_string())
    }
}

impl From<AnalyticsError> for NeuroKeepError {
    fn from(e: AnalyticsError) -> Self {
        match e {
            AnalyticsError::StoreUnavailable(db) => db.into(),
            AnalyticsError::PatientNotFound(id) => NeuroKeepError::NotFound(id),
            AnalyticsError::InvalidArgument(msg) => NeuroKeepError::InvalidInput(msg),
        }
    }
}

impl From<care::CareError> for NeuroKeepError {
    fn from(e: care::CareError) -> Self {
        use care::CareError;
        match e {
            CareError::InvalidInput(model) => model.into(),
            CareError::Db(db) => db.into(),
            CareError::Analytics(analytics) => analytics.into(),
            not_found @ (CareError::UnknownDoctorCode(_)
            | CareError::PatientNotFound(_)
            | CareError::MedicationNotFound { .. }) => NeuroKeepError::NotFound(not_found.to_string()),
        }
    }
}

impl From<export::ExportError> for NeuroKeepError {
    fn from(e: export::ExportError) -> Self {
        match e {
            export::ExportError::Analytics(analytics) => analytics.into(),
            export::ExportError::Db(db) => db.into(),
            export::ExportError::Json(json) => json.into(),
        }
    }
}

impl From<config::ConfigError> for NeuroKeepError {
    fn from(e: config::ConfigError) -> Self {
        NeuroKeepError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for NeuroKeepError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        NeuroKeepError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path, using the UTC+3 civil clock.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<NeuroKeepCore>, NeuroKeepError> {
    let db = Database::open(&path)?;
    Ok(NeuroKeepCore::with_clock(db, Arc::new(CivilClock::default())))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<NeuroKeepCore>, NeuroKeepError> {
    let db = Database::open_in_memory()?;
    Ok(NeuroKeepCore::with_clock(db, Arc::new(CivilClock::default())))
}

/// Open the database named by the `NEUROKEEP_*` environment variables,
/// seeding demo data when configured to.
#[uniffi::export]
pub fn open_database_from_env() -> Result<Arc<NeuroKeepCore>, NeuroKeepError> {
    let config = CoreConfig::from_env()?;
    if let Some(dir) = config.db_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .map_err(|e| NeuroKeepError::DatabaseError(e.to_string()))?;
        }
    }
    let db = Database::open(&config.db_path)?;
    let core = NeuroKeepCore::with_clock(db, Arc::new(config.clock()));
    if config.seed_demo {
        core.seed_demo()?;
    }
    Ok(core)
}

/// Whether `now_time` falls inside `[start, end]` (`HH:MM`, inclusive).
#[uniffi::export]
pub fn time_in_window(start: String, end: String, now_time: String) -> bool {
    is_within_window(&start, &end, &now_time)
}

/// Risk tier (`low`, `medium`, `high`) for an adherence percentage and the
/// latest systolic reading.
#[uniffi::export]
pub fn classify_risk(adherence_pct: u32, latest_systolic: Option<i32>) -> String {
    risk_level(adherence_pct, latest_systolic).to_string()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct NeuroKeepCore {
    db: Arc<Mutex<Database>>,
    clock: Arc<dyn Clock>,
}

impl NeuroKeepCore {
    /// Wrap an open database with a specific clock.
    pub fn with_clock(db: Database, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            clock,
        })
    }
}

#[uniffi::export]
impl NeuroKeepCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Onboard a patient with their medications.
    pub fn onboard_patient(&self, form: FfiOnboarding) -> Result<FfiPatient, NeuroKeepError> {
        let db = self.db.lock()?;
        let (patient, _) = care::onboard_patient(&db, self.clock.as_ref(), form.into())?;
        Ok(patient.into())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, patient_id: String) -> Result<Option<FfiPatient>, NeuroKeepError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&patient_id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// List a patient's medications.
    pub fn list_medications(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiMedication>, NeuroKeepError> {
        let db = self.db.lock()?;
        let meds = db.list_medications(&patient_id)?;
        Ok(meds.into_iter().map(|m| m.into()).collect())
    }

    // =========================================================================
    // Dose and BP Logging
    // =========================================================================

    /// Confirm a dose. Returns the recomputed streak.
    pub fn confirm_dose(
        &self,
        patient_id: String,
        medication_id: Option<String>,
    ) -> Result<u32, NeuroKeepError> {
        let db = self.db.lock()?;
        Ok(care::confirm_dose(
            &db,
            self.clock.as_ref(),
            &patient_id,
            medication_id.as_deref(),
        )?)
    }

    /// Skip a dose.
    pub fn skip_dose(
        &self,
        patient_id: String,
        medication_id: Option<String>,
    ) -> Result<(), NeuroKeepError> {
        let db = self.db.lock()?;
        care::skip_dose(&db, self.clock.as_ref(), &patient_id, medication_id.as_deref())?;
        Ok(())
    }

    /// Log a blood-pressure reading from raw form fields.
    pub fn log_bp(
        &self,
        patient_id: String,
        systolic: String,
        diastolic: String,
        context: Option<String>,
        notes: Option<String>,
    ) -> Result<FfiBpLog, NeuroKeepError> {
        let db = self.db.lock()?;
        let log = care::log_bp_form(
            &db,
            self.clock.as_ref(),
            &patient_id,
            &systolic,
            &diastolic,
            context.as_deref(),
            notes.as_deref(),
        )?;
        Ok(log.into())
    }

    /// Store a landing-page demo request.
    pub fn request_demo(
        &self,
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
        role: Option<String>,
    ) -> Result<FfiDemoRequest, NeuroKeepError> {
        let db = self.db.lock()?;
        let request = care::request_demo(&db, self.clock.as_ref(), name, phone, email, role)?;
        Ok(request.into())
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Assemble the patient dashboard and record `dashboard_opened`.
    pub fn open_dashboard(
        &self,
        patient_id: String,
    ) -> Result<FfiPatientDashboard, NeuroKeepError> {
        let db = self.db.lock()?;
        let dashboard =
            ReportAssembler::new(&*db, self.clock.as_ref()).patient_dashboard(&patient_id)?;
        care::record_dashboard_open(&db, self.clock.as_ref(), &patient_id)?;
        Ok(dashboard.into())
    }

    /// Seven-day BP trend with recent readings and targets.
    pub fn bp_overview(&self, patient_id: String) -> Result<FfiBpOverview, NeuroKeepError> {
        let db = self.db.lock()?;
        let overview = ReportAssembler::new(&*db, self.clock.as_ref()).bp_overview(&patient_id)?;
        Ok(overview.into())
    }

    /// Record a portal visit and return the doctor dashboard.
    pub fn open_doctor_portal(&self) -> Result<Vec<FfiPatientSummary>, NeuroKeepError> {
        let db = self.db.lock()?;
        care::record_portal_view(&db, self.clock.as_ref())?;
        let rows = ReportAssembler::new(&*db, self.clock.as_ref()).doctor_dashboard()?;
        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Doctor dashboard without recording a visit.
    pub fn doctor_dashboard(&self) -> Result<Vec<FfiPatientSummary>, NeuroKeepError> {
        let db = self.db.lock()?;
        let rows = ReportAssembler::new(&*db, self.clock.as_ref()).doctor_dashboard()?;
        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Doctor-facing patient detail as JSON.
    pub fn patient_detail_json(&self, patient_id: String) -> Result<String, NeuroKeepError> {
        let db = self.db.lock()?;
        let detail = ReportAssembler::new(&*db, self.clock.as_ref()).patient_detail(&patient_id)?;
        Ok(serde_json::to_string_pretty(&detail)?)
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export a patient's event log as CSV.
    pub fn export_events_csv(&self, patient_id: String) -> Result<FfiExport, NeuroKeepError> {
        let db = self.db.lock()?;
        let export = export::Exporter::new(&db, self.clock.as_ref()).export_events_csv(&patient_id)?;
        Ok(FfiExport {
            file_name: export.file_name(),
            content: export.csv,
            format_version: export.metadata.format_version,
            exported_at: export.metadata.exported_at,
            content_sha256: export.metadata.content_sha256,
        })
    }

    /// Export a patient report as JSON and record `pdf_exported`.
    pub fn export_patient_report_json(
        &self,
        patient_id: String,
    ) -> Result<FfiExport, NeuroKeepError> {
        let db = self.db.lock()?;
        let export =
            export::Exporter::new(&db, self.clock.as_ref()).export_patient_report(&patient_id)?;
        Ok(FfiExport {
            file_name: export.file_name(),
            content: export.to_json()?,
            format_version: export.metadata.format_version.clone(),
            exported_at: export.metadata.exported_at.clone(),
            content_sha256: export.metadata.content_sha256.clone(),
        })
    }

    /// Most recent events across all patients as JSON.
    pub fn latest_events_json(&self, limit: u32) -> Result<String, NeuroKeepError> {
        let db = self.db.lock()?;
        let feed = export::Exporter::new(&db, self.clock.as_ref()).latest_events(limit as usize)?;
        Ok(feed.to_json()?)
    }

    // =========================================================================
    // Demo Data
    // =========================================================================

    /// Seed demo data. Returns false when the database already has a doctor.
    pub fn seed_demo(&self) -> Result<bool, NeuroKeepError> {
        let db = self.db.lock()?;
        let mut rng = rand::thread_rng();
        let summary = seed::seed_demo(&db, self.clock.as_ref(), &mut rng)?;
        Ok(summary.is_some())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub streak: u32,
    pub bp_target_systolic: i32,
    pub bp_target_diastolic: i32,
    pub doctor_code: Option<String>,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            phone: patient.phone,
            email: patient.email,
            role: patient.role.to_string(),
            streak: patient.streak,
            bp_target_systolic: patient.bp_target_systolic,
            bp_target_diastolic: patient.bp_target_diastolic,
            doctor_code: patient.doctor_code,
        }
    }
}

/// FFI-safe demo request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDemoRequest {
    pub id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub created_at: String,
}

impl From<DemoRequest> for FfiDemoRequest {
    fn from(request: DemoRequest) -> Self {
        Self {
            id: request.id,
            name: request.name,
            phone: request.phone,
            email: request.email,
            role: request.role,
            created_at: format_timestamp(request.created_at),
        }
    }
}

/// FFI-safe medication.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub id: String,
    pub drug_name: String,
    pub dosage: String,
    pub window_start: String,
    pub window_end: String,
}

impl From<Medication> for FfiMedication {
    fn from(med: Medication) -> Self {
        Self {
            id: med.id,
            drug_name: med.drug_name,
            dosage: med.dosage,
            window_start: med.window.start,
            window_end: med.window.end,
        }
    }
}

/// Medication entered during onboarding. Unknown presets mean `morning`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicationInput {
    pub drug_name: String,
    pub dosage: String,
    pub window_preset: String,
}

/// FFI-safe onboarding form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOnboarding {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub doctor_code: Option<String>,
    pub target_systolic: Option<i32>,
    pub target_diastolic: Option<i32>,
    pub medications: Vec<FfiMedicationInput>,
}

impl From<FfiOnboarding> for care::Onboarding {
    fn from(form: FfiOnboarding) -> Self {
        let mut onboarding = care::Onboarding::new(&form.name);
        onboarding.phone = form.phone;
        onboarding.email = form.email;
        onboarding.doctor_code = form.doctor_code;
        if let Some(systolic) = form.target_systolic {
            onboarding.target_systolic = systolic;
        }
        if let Some(diastolic) = form.target_diastolic {
            onboarding.target_diastolic = diastolic;
        }
        for med in form.medications {
            onboarding = onboarding.with_medication(
                &med.drug_name,
                &med.dosage,
                WindowPreset::from_name(&med.window_preset).window(),
            );
        }
        onboarding
    }
}

/// FFI-safe adherence day.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDayAdherence {
    pub date: String,
    pub taken: u32,
    pub total: u32,
}

impl From<DayAdherence> for FfiDayAdherence {
    fn from(day: DayAdherence) -> Self {
        Self {
            date: format_date(day.date),
            taken: day.taken,
            total: day.total,
        }
    }
}

/// FFI-safe medication status on the patient dashboard.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicationStatus {
    pub medication: FfiMedication,
    pub in_window: bool,
    pub confirmed_today: bool,
}

/// FFI-safe patient dashboard.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientDashboard {
    pub patient: FfiPatient,
    pub date: String,
    pub medications: Vec<FfiMedicationStatus>,
    pub streak: u32,
    pub adherence: Vec<FfiDayAdherence>,
    pub adherence_pct: u32,
}

impl From<PatientDashboard> for FfiPatientDashboard {
    fn from(dashboard: PatientDashboard) -> Self {
        Self {
            patient: dashboard.patient.into(),
            date: format_date(dashboard.date),
            medications: dashboard
                .medications
                .into_iter()
                .map(|status| FfiMedicationStatus {
                    medication: status.medication.into(),
                    in_window: status.in_window,
                    confirmed_today: status.confirmed_today,
                })
                .collect(),
            streak: dashboard.streak,
            adherence: dashboard.adherence.into_iter().map(|d| d.into()).collect(),
            adherence_pct: dashboard.adherence_pct,
        }
    }
}

/// FFI-safe blood-pressure day.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBpDay {
    pub date: String,
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
}

impl From<BpDay> for FfiBpDay {
    fn from(day: BpDay) -> Self {
        Self {
            date: format_date(day.date),
            systolic: day.systolic,
            diastolic: day.diastolic,
        }
    }
}

/// FFI-safe blood-pressure reading.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBpLog {
    pub id: String,
    pub systolic: i32,
    pub diastolic: i32,
    pub context: String,
    pub notes: Option<String>,
    pub timestamp: String,
}

impl From<BpLog> for FfiBpLog {
    fn from(log: BpLog) -> Self {
        Self {
            id: log.id,
            systolic: log.systolic,
            diastolic: log.diastolic,
            context: log.context,
            notes: log.notes,
            timestamp: format_timestamp(log.timestamp),
        }
    }
}

/// FFI-safe BP overview.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBpOverview {
    pub series: Vec<FfiBpDay>,
    pub valid_days: u32,
    pub avg_systolic: Option<i32>,
    pub avg_diastolic: Option<i32>,
    pub in_target_pct: u32,
    pub improvement: Option<f64>,
    pub recent_readings: Vec<FfiBpLog>,
    pub target_systolic: i32,
    pub target_diastolic: i32,
}

impl From<report::BpOverview> for FfiBpOverview {
    fn from(overview: report::BpOverview) -> Self {
        let stats = overview.trend.stats;
        Self {
            series: overview.trend.series.into_iter().map(|d| d.into()).collect(),
            valid_days: stats.valid_days as u32,
            avg_systolic: stats.avg_systolic,
            avg_diastolic: stats.avg_diastolic,
            in_target_pct: stats.in_target_pct,
            improvement: stats.improvement,
            recent_readings: overview.recent_readings.into_iter().map(|l| l.into()).collect(),
            target_systolic: overview.target_systolic,
            target_diastolic: overview.target_diastolic,
        }
    }
}

/// FFI-safe doctor-dashboard row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientSummary {
    pub patient: FfiPatient,
    pub medications: Vec<FfiMedication>,
    pub adherence_pct: u32,
    pub bp_display: String,
    pub risk: String,
}

impl From<PatientSummary> for FfiPatientSummary {
    fn from(summary: PatientSummary) -> Self {
        Self {
            patient: summary.patient.into(),
            medications: summary.medications.into_iter().map(|m| m.into()).collect(),
            adherence_pct: summary.adherence_pct,
            bp_display: summary.bp_display,
            risk: summary.risk.to_string(),
        }
    }
}

/// FFI-safe export file.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExport {
    pub file_name: String,
    pub content: String,
    pub format_version: String,
    pub exported_at: String,
    pub content_sha256: String,
}
