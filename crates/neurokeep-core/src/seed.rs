//! Demo data: one doctor and three patients with a month of history.

use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use tracing::info;

use crate::clock::Clock;
use crate::db::{Database, DbError, DbResult};
use crate::models::{
    BpLog, BpReadingInput, Event, EventType, Medication, Patient, Role, WindowPreset,
};

/// Doctor code shared by the demo doctor and their patients.
pub const DEMO_DOCTOR_CODE: &str = "123456";
pub const DEMO_DOCTOR_NAME: &str = "Dr. Karpov";
/// Days of history generated per patient.
pub const SEED_HISTORY_DAYS: i64 = 30;

struct DemoPatient {
    name: &'static str,
    drug_name: &'static str,
    dosage: &'static str,
    window: WindowPreset,
    adherence_rate: f64,
    bp_base: (i32, i32),
}

const DEMO_PATIENTS: [DemoPatient; 3] = [
    DemoPatient {
        name: "Ivan Ivanov",
        drug_name: "Enalapril",
        dosage: "10mg",
        window: WindowPreset::Morning,
        adherence_rate: 0.78,
        bp_base: (142, 89),
    },
    DemoPatient {
        name: "Maria Petrova",
        drug_name: "Losartan",
        dosage: "50mg",
        window: WindowPreset::Morning,
        adherence_rate: 0.92,
        bp_base: (135, 82),
    },
    DemoPatient {
        name: "Alexey Sidorov",
        drug_name: "Amlodipine",
        dosage: "5mg",
        window: WindowPreset::Evening,
        adherence_rate: 0.45,
        bp_base: (160, 98),
    },
];

/// What a seeding run created.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedSummary {
    pub doctor_id: String,
    pub patient_ids: Vec<String>,
    pub events: usize,
    pub bp_logs: usize,
}

/// Seed the demo data set.
///
/// Returns `None` without writing when a doctor already exists. Otherwise all
/// rows are written in one transaction. History covers the
/// [`SEED_HISTORY_DAYS`] days before today; today itself is left empty.
pub fn seed_demo<C, R>(db: &Database, clock: &C, rng: &mut R) -> DbResult<Option<SeedSummary>>
where
    C: Clock + ?Sized,
    R: Rng,
{
    let now = clock.now();
    let today = now.date();

    db.in_transaction(|db| {
        if !db.list_patients(Role::Doctor)?.is_empty() {
            info!("demo data already present, skipping seed");
            return Ok(None);
        }

        let doctor = Patient::new_doctor(DEMO_DOCTOR_NAME.into(), DEMO_DOCTOR_CODE.into(), now);
        db.insert_patient(&doctor)?;

        let mut summary = SeedSummary {
            doctor_id: doctor.id.clone(),
            patient_ids: Vec::new(),
            events: 0,
            bp_logs: 0,
        };

        for demo in &DEMO_PATIENTS {
            let mut patient = Patient::new(demo.name.into(), now);
            patient.doctor_code = Some(DEMO_DOCTOR_CODE.into());
            db.insert_patient(&patient)?;

            let med = Medication::new(
                patient.id.clone(),
                demo.drug_name.into(),
                demo.dosage.into(),
                demo.window.window(),
                now,
            );
            db.insert_medication(&med)?;

            for days_ago in (1..=SEED_HISTORY_DAYS).rev() {
                let day = today - Duration::days(days_ago);
                let at = |hour: u32, minute: u32| -> DbResult<NaiveDateTime> {
                    day.and_hms_opt(hour, minute, 0).ok_or_else(|| {
                        DbError::Constraint(format!("invalid seed time {:02}:{:02}", hour, minute))
                    })
                };
                let reminder_at = at(8, 0)?;

                db.append_event(
                    &Event::new(&patient.id, EventType::ReminderSent, reminder_at)
                        .with_medication(&med.id),
                )?;

                let outcome = if rng.gen::<f64>() < demo.adherence_rate {
                    let delay: u32 = rng.gen_range(60..=600);
                    Event::new(
                        &patient.id,
                        EventType::DoseConfirmed,
                        reminder_at + Duration::seconds(i64::from(delay)),
                    )
                    .with_meta("time_to_confirm_seconds", delay)
                } else {
                    Event::new(&patient.id, EventType::DoseSkipped, at(9, 0)?)
                };
                db.append_event(&outcome.with_medication(&med.id))?;
                summary.events += 2;

                if days_ago % 2 == 0 {
                    let systolic = demo.bp_base.0 + rng.gen_range(-8..=8);
                    let diastolic = demo.bp_base.1 + rng.gen_range(-5..=5);
                    let log = BpLog::new(
                        &patient.id,
                        BpReadingInput::new(systolic, diastolic),
                        at(8, 30)?,
                    );
                    db.insert_bp_log(&log)?;
                    summary.bp_logs += 1;
                }
            }

            summary.patient_ids.push(patient.id);
        }

        info!(
            patients = summary.patient_ids.len(),
            events = summary.events,
            bp_logs = summary.bp_logs,
            "seeded demo data"
        );
        Ok(Some(summary))
    })
}
