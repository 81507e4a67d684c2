//! Reference and demo data.
//!
//! Reference tables (mutuelles, physicians, motifs, catalog medications) are
//! filled only while empty, so seeding at every startup is harmless. Demo
//! records are inserted on request by `isenior init-db --demo`.

use crate::sqlite::SqliteStore;
use isenior_core::error::StoreError;
use sqlx::{Sqlite, Transaction};
use tracing::info;

/// (id, name, code, address, emails, phones)
const MUTUELLES: &[(i64, &str, i64, &str, &str, &str)] = &[
    (
        1,
        "Mutualités Chrétiennes (SMR MC)",
        100,
        "Chaussée de Haecht 579/41, 1031 Schaerbeek",
        "accord.mr@mc.be;tierspayant.mr@mc.be;accord.bandagiste@mc.be;tierspayant.bandagiste@mc.be;accord.revalidation.smr@mc.be;tierspayant.revalidation.smr@mc.be;srh@mc.be",
        "071548484;042217394;025015544",
    ),
    (
        2,
        "Mutualités Neutres (SMR Neutre Wallonie)",
        200,
        "Chaussée de Charleroi 147, 1060 Bruxelles",
        "wallonie200SDS@unmn.be;goedkeuringen@vnz.be;mrs-mrpa@lamn.be;maisonrepos-rustoord@mutualia.be;verstrekkingen@nzvl.be;DL200_Medical-Medisch@union-neutre.be",
        "023001103;025330604",
    ),
    (
        3,
        "Mutualités Socialistes - Solidaris",
        300,
        "Rue Saint-Jean 32-38, 1000 Bruxelles",
        "Factuur.300@socmut.be;tarification.317@solidaris.be;prestataires315@solidaris.be;305.6RFSSA@solidaris.be;Ssa.Liege@solidaris.be;cl-325-adm-acc@solidaris.be;DL-323-AccordMC@mutsoc.be",
        "025150321;071507310;068848431;023910955",
    ),
    (
        4,
        "Mutualités Libérales - Wallomut",
        400,
        "Rue de Livourne 25, 1050 Bruxelles",
        "wallomut@ml.be;Mc409@ml.be",
        "025428835;025428724;064236190",
    ),
    (
        5,
        "Mutualités Libres - SMR Wal",
        500,
        "Route de Lennik 788A, 1070 Bruxelles",
        "smrwal@mloz.be;medsmrwal@mloz.be",
        "027789555;027789610;027789295",
    ),
    (
        6,
        "CAAMI - Caisse Auxiliaire d’Assurance Maladie-Invalidité",
        600,
        "Rue du Trône 30A, 1000 Bruxelles",
        "elecfac@caami.be;medadmin@caami.be;tarif_ostbelgien@hkiv.be;tarif_vlaanderen@hziv.be;medzorgen@caami-hziv.fgov.be",
        "022293433;022276244;080330896;032207555;022276275",
    ),
    (
        7,
        "HR Rail - Caisse des soins de santé",
        900,
        "Rue de France 85, 1060 Bruxelles",
        "900-factura@hr-rail.be;cmrbruxelles@hr-rail.be;ggcbrugge@hr-rail.be;ggchasselt@hr-rail.be;cmrnamur@hr-rail.be;cmrmons@hr-rail.be",
        "025253556",
    ),
];

/// (name, specialty, address, phone, email)
const PHYSICIANS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "Dr. Smith",
        "Généraliste",
        "Adresse exemple 1, Bruxelles",
        "02/1234567",
        "dr.smith@example.com",
    ),
    (
        "Dr. Jones",
        "Généraliste",
        "Adresse exemple 2, Bruxelles",
        "02/7654321",
        "dr.jones@example.com",
    ),
];

const MOTIFS: &[&str] = &[
    "Consultation médicale",
    "Famille",
    "Notaire - Avocat",
    "Sortie culturelle",
    "Shopping",
    "Visite médicale",
    "Rendez-vous administratif",
    "Réunion familiale",
    "Thérapie",
    "Autre",
];

/// (name, active ingredient, reference link)
const CATALOG: &[(&str, &str, &str)] = &[
    ("Paracétamol", "Paracétamol", "https://cbip.be/fr/drugs/123"),
    ("Ibuprofène", "Ibuprofène", "https://cbip.be/fr/drugs/456"),
];

/// Rows inserted per table by one seeding pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub mutuelles: u64,
    pub physicians: u64,
    pub motifs: u64,
    pub medications: u64,
    pub rooms: u64,
    pub residents: u64,
    pub patient_medications: u64,
    pub appointments: u64,
}

impl SeedReport {
    pub fn total(&self) -> u64 {
        self.mutuelles
            + self.physicians
            + self.motifs
            + self.medications
            + self.rooms
            + self.residents
            + self.patient_medications
            + self.appointments
    }
}

async fn is_empty(tx: &mut Transaction<'_, Sqlite>, table: &str) -> Result<bool, StoreError> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("count {table}: {e}")))?;
    Ok(count == 0)
}

fn seed_error(what: &str) -> impl Fn(sqlx::Error) -> StoreError + '_ {
    move |e| StoreError::Storage(format!("seed {what}: {e}"))
}

/// Insert the reference tables that are still empty.
pub async fn seed_reference_data(store: &SqliteStore) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();
    let mut tx = store.pool().begin().await.map_err(seed_error("begin"))?;

    if is_empty(&mut tx, "mutuelles").await? {
        for &(id, name, code, address, email, phone) in MUTUELLES {
            sqlx::query(
                "INSERT INTO mutuelles (id, name, code, address, email, phone) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(id)
            .bind(name)
            .bind(code)
            .bind(address)
            .bind(email)
            .bind(phone)
            .execute(&mut *tx)
            .await
            .map_err(seed_error("mutuelles"))?;
            report.mutuelles += 1;
        }
    }

    if is_empty(&mut tx, "physicians").await? {
        for &(name, specialty, address, phone, email) in PHYSICIANS {
            sqlx::query(
                "INSERT INTO physicians (name, specialty, address, phone, email) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(name)
            .bind(specialty)
            .bind(address)
            .bind(phone)
            .bind(email)
            .execute(&mut *tx)
            .await
            .map_err(seed_error("physicians"))?;
            report.physicians += 1;
        }
    }

    if is_empty(&mut tx, "motifs").await? {
        for &name in MOTIFS {
            sqlx::query("INSERT INTO motifs (name) VALUES (?1)")
                .bind(name)
                .execute(&mut *tx)
                .await
                .map_err(seed_error("motifs"))?;
            report.motifs += 1;
        }
    }

    if is_empty(&mut tx, "medications").await? {
        for &(name, ingredient, link) in CATALOG {
            sqlx::query(
                "INSERT INTO medications (name, active_ingredient, reference_link) \
                 VALUES (?1, ?2, ?3)",
            )
            .bind(name)
            .bind(ingredient)
            .bind(link)
            .execute(&mut *tx)
            .await
            .map_err(seed_error("medications"))?;
            report.medications += 1;
        }
    }

    tx.commit().await.map_err(seed_error("commit"))?;

    if report.total() > 0 {
        info!(
            mutuelles = report.mutuelles,
            physicians = report.physicians,
            motifs = report.motifs,
            medications = report.medications,
            "Seeded reference data"
        );
    }
    Ok(report)
}

/// Insert two rooms, two residents, their medication assignments and one
/// appointment each. Skipped entirely when residents already exist.
///
/// Expects reference data to be present (mutuelles 1–2, physicians 1–2,
/// catalog medications 1–2).
pub async fn seed_demo_records(store: &SqliteStore) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();
    let mut tx = store.pool().begin().await.map_err(seed_error("begin"))?;

    if !is_empty(&mut tx, "residents").await? {
        info!("Residents already present, skipping demo records");
        return Ok(report);
    }

    for room_number in [101_i64, 102] {
        sqlx::query("INSERT OR IGNORE INTO rooms (room_number, capacity) VALUES (?1, 2)")
            .bind(room_number)
            .execute(&mut *tx)
            .await
            .map_err(seed_error("rooms"))?;
        report.rooms += 1;
    }

    let residents = [
        ("Dupont", "Marie", "1940-05-15", 1_i64, "12345678901", 1_i64, 101_i64),
        ("Martin", "Pierre", "1935-08-22", 2, "98765432109", 2, 102),
    ];
    let mut resident_ids = Vec::with_capacity(residents.len());
    for (last, first, birth, mutuelle, national_id, physician, room) in residents {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO residents (last_name, first_name, birth_date, mutuelle_id,
                                   national_id, physician_id, room_number)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id
            "#,
        )
        .bind(last)
        .bind(first)
        .bind(birth)
        .bind(mutuelle)
        .bind(national_id)
        .bind(physician)
        .bind(room)
        .fetch_one(&mut *tx)
        .await
        .map_err(seed_error("residents"))?;
        resident_ids.push(id);
        report.residents += 1;
    }

    let assignments = [
        (resident_ids[0], 1_i64, "500mg", "Matin", "3x/jour"),
        (resident_ids[1], 2, "200mg", "Soir", "2x/jour"),
    ];
    for (resident_id, medication_id, dosage, time_of_day, frequency) in assignments {
        sqlx::query(
            r#"
            INSERT INTO patient_medications
                (resident_id, medication_id, dosage, time_of_day, frequency, status)
            VALUES (?1, ?2, ?3, ?4, ?5, 0)
            "#,
        )
        .bind(resident_id)
        .bind(medication_id)
        .bind(dosage)
        .bind(time_of_day)
        .bind(frequency)
        .execute(&mut *tx)
        .await
        .map_err(seed_error("patient medications"))?;
        report.patient_medications += 1;
    }

    let appointments = [
        (resident_ids[0], "2025-09-01", "10:00", "Consultation médicale", "Transport A", "09:30"),
        (resident_ids[1], "2025-09-02", "14:00", "Examen dentaire", "Transport B", "13:30"),
    ];
    for (resident_id, date, time, reason, transporter, transport_time) in appointments {
        sqlx::query(
            r#"
            INSERT INTO appointments (resident_id, date, time, reason, transporter, transport_time)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(resident_id)
        .bind(date)
        .bind(time)
        .bind(reason)
        .bind(transporter)
        .bind(transport_time)
        .execute(&mut *tx)
        .await
        .map_err(seed_error("appointments"))?;
        report.appointments += 1;
    }

    tx.commit().await.map_err(seed_error("commit"))?;
    info!(
        residents = report.residents,
        appointments = report.appointments,
        "Seeded demo records"
    );
    Ok(report)
}
