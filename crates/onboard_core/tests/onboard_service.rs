use onboard_core::db::open_db_in_memory;
use onboard_core::{
    Bir, BiometricDto, BiometricRecord, BiometricType, BiometricsDto, FaceDetailsDto,
    FingerprintDetailsDto, FixedClock, IrisDetailsDto, MachineMappingRepository, OnboardConfig,
    OnboardContext, OnboardErrorCode, OperatorBiometricDto, SessionContext,
    SqliteMachineMappingRepository, SqliteOnboardService,
};
use rusqlite::Connection;
use std::sync::Arc;

const T0: i64 = 1_700_000_000_000;

#[test]
fn reinserting_biometrics_leaves_exactly_the_new_set() {
    let conn = open_db_in_memory().unwrap();
    let (service, _clock) = service_for(&conn, "op_110011");

    service
        .insert_biometrics(&[
            capture("leftIndex", 90.0),
            capture("rightIndex", 91.0),
            capture("face", 70.0),
        ])
        .unwrap();
    let stored = service
        .insert_biometrics(&[capture("leftThumb", 88.0), capture("rightEye", 77.0)])
        .unwrap();
    assert_eq!(stored, 2);

    let rows = service.user_biometrics("op_110011").unwrap();
    let keys: Vec<(&str, BiometricType)> = rows
        .iter()
        .map(|row| (row.id.attribute_code.as_str(), row.id.type_code))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("leftThumb", BiometricType::Finger),
            ("rightEye", BiometricType::Iris)
        ]
    );
    assert!(rows.iter().all(|row| row.is_active));
}

#[test]
fn quality_score_is_truncated_when_persisted() {
    let conn = open_db_in_memory().unwrap();
    let (service, _clock) = service_for(&conn, "op_110011");

    service.insert_biometrics(&[capture("leftIndex", 87.9)]).unwrap();

    let rows = service.user_biometrics("op_110011").unwrap();
    assert_eq!(rows[0].quality_score, 87);
}

#[test]
fn structured_capture_is_stored_with_audit_fields() {
    let conn = open_db_in_memory().unwrap();
    let (service, _clock) = service_for(&conn, "op_110011");

    let dto = BiometricDto {
        operator: OperatorBiometricDto {
            fingerprints: vec![FingerprintDetailsDto {
                image_name: "rightSlap".to_string(),
                iso_image: Vec::new(),
                quality_score: 95.0,
                num_retry: 1,
                segmented: vec![FingerprintDetailsDto {
                    image_name: "rightRing".to_string(),
                    iso_image: vec![0x46, 0x49, 0x52],
                    quality_score: 66.6,
                    num_retry: 2,
                    segmented: Vec::new(),
                }],
            }],
            irises: vec![IrisDetailsDto {
                image_name: "rightEye".to_string(),
                iso_image: vec![0x49, 0x49, 0x52],
                quality_score: 81.2,
                num_retry: 1,
            }],
            face: Some(FaceDetailsDto {
                iso_image: vec![0x46, 0x41, 0x43],
                quality_score: 73.0,
                num_retry: 0,
            }),
        },
    };

    assert_eq!(service.insert_biometric_dto(&dto).unwrap(), 3);

    let rows = service.user_biometrics("op_110011").unwrap();
    assert_eq!(rows.len(), 3);
    let ring = rows
        .iter()
        .find(|row| row.id.attribute_code == "rightRing")
        .expect("segmented print should be stored");
    assert_eq!(ring.id.type_code, BiometricType::Finger);
    assert_eq!(ring.quality_score, 66);
    assert_eq!(ring.retry_count, Some(2));
    assert_eq!(ring.created_by, "op_110011");
    assert_eq!(ring.created_at, T0);
    assert!(rows.iter().all(|row| row.id.attribute_code != "rightSlap"));
}

#[test]
fn template_without_subtype_is_stored_as_face() {
    let conn = open_db_in_memory().unwrap();
    let (service, _clock) = service_for(&conn, "op_110011");

    let templates = vec![
        Bir::new(vec![1, 2, 3], Vec::new(), 82),
        Bir::new(vec![4, 5], vec!["Left".into(), "IndexFinger".into()], 64),
    ];
    service.insert_extracted_templates(&templates).unwrap();

    let rows = service.user_biometrics("op_110011").unwrap();
    let face = rows
        .iter()
        .find(|row| row.id.type_code == BiometricType::Face)
        .expect("face template should be stored");
    assert_eq!(face.id.attribute_code, "face");
    assert_eq!(face.iso_image, vec![1, 2, 3]);
    assert_eq!(face.retry_count, None);

    let raw = face.raw_record.as_deref().expect("raw record should be set");
    let record: BiometricRecord = serde_json::from_slice(raw).unwrap();
    assert_eq!(record.segments, vec![templates[0].clone()]);
    assert!(record.others.is_empty());

    assert!(rows
        .iter()
        .any(|row| row.id.attribute_code == "leftIndex" && row.quality_score == 64));
}

#[test]
fn captures_naming_one_attribute_twice_keep_the_last() {
    let conn = open_db_in_memory().unwrap();
    let (service, _clock) = service_for(&conn, "op_110011");

    let stored = service
        .insert_biometrics(&[capture("leftIndex", 90.0), capture("LEFTINDEX", 61.5)])
        .unwrap();
    assert_eq!(stored, 1);

    let rows = service.user_biometrics("op_110011").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id.attribute_code, "leftIndex");
    assert_eq!(rows[0].quality_score, 61);
    assert_eq!(rows[0].iso_image, b"LEFTINDEX".to_vec());
}

#[test]
fn store_failure_surfaces_onboarding_error_with_original_message() {
    let conn = open_db_in_memory().unwrap();
    let (service, _clock) = service_for(&conn, "op_110011");
    service.insert_biometrics(&[capture("face", 70.0)]).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER reject_biometric_insert
         BEFORE INSERT ON user_biometric
         BEGIN
             SELECT RAISE(ABORT, 'biometric store offline');
         END;",
    )
    .unwrap();

    let err = service
        .insert_biometrics(&[capture("leftIndex", 90.0)])
        .unwrap_err();
    assert_eq!(err.code(), OnboardErrorCode::UserOnboarding);
    assert_eq!(err.message(), "biometric store offline");

    let rows = service.user_biometrics("op_110011").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id.attribute_code, "face");
}

#[test]
fn read_back_failure_surfaces_onboarding_error() {
    let conn = open_db_in_memory().unwrap();
    let (service, _clock) = service_for(&conn, "op_110011");
    service.insert_biometrics(&[capture("face", 70.0)]).unwrap();

    conn.execute_batch("DROP TABLE user_biometric;").unwrap();

    let err = service.user_biometrics("op_110011").unwrap_err();
    assert_eq!(err.code(), OnboardErrorCode::UserOnboarding);
    assert!(err.message().contains("user_biometric"));
}

#[test]
fn unknown_attribute_fails_without_touching_stored_set() {
    let conn = open_db_in_memory().unwrap();
    let (service, _clock) = service_for(&conn, "op_110011");
    service.insert_biometrics(&[capture("face", 70.0)]).unwrap();

    let err = service
        .insert_biometrics(&[capture("leftIndex", 90.0), capture("leftToe", 10.0)])
        .unwrap_err();
    assert_eq!(err.code(), OnboardErrorCode::UserOnboarding);
    assert!(err.message().contains("leftToe"));
    assert_eq!(service.user_biometrics("op_110011").unwrap().len(), 1);
}

#[test]
fn mapping_lookup_for_unknown_user_is_none() {
    let conn = open_db_in_memory().unwrap();
    let (service, _clock) = service_for(&conn, "op_110011");

    assert_eq!(service.last_updated_time("nobody").unwrap(), None);
}

#[test]
fn mapping_lookup_ignores_case() {
    let conn = open_db_in_memory().unwrap();
    let (service, _clock) = service_for(&conn, "Op_110011");

    service.save_machine_mapping().unwrap();

    assert_eq!(service.last_updated_time("OP_110011").unwrap(), Some(T0));
    assert_eq!(service.last_updated_time("op_110011").unwrap(), Some(T0));
}

#[test]
fn repeated_mapping_save_restamps_onboarding_time() {
    let conn = open_db_in_memory().unwrap();
    let (service, clock) = service_for(&conn, "op_110011");

    service.save_machine_mapping().unwrap();
    clock.advance(86_400_000);
    service.save_machine_mapping().unwrap();

    let repo = SqliteMachineMappingRepository::try_new(&conn).unwrap();
    let mapping = repo.find_by_user("op_110011").unwrap().unwrap();
    assert_eq!(mapping.id.center_id, "10011");
    assert_eq!(mapping.id.machine_id, "10002");
    assert_eq!(mapping.language_code, "eng");
    assert!(mapping.is_active);
    assert_eq!(mapping.created_at, T0 + 86_400_000);
    assert_eq!(mapping.updated_at, Some(T0 + 86_400_000));
    assert_eq!(mapping.updated_by.as_deref(), Some("op_110011"));
    assert_eq!(
        service.last_updated_time("op_110011").unwrap(),
        Some(T0 + 86_400_000)
    );
    assert_eq!(mapping_count(&conn), 1);
}

#[test]
fn mapping_store_failure_uses_machine_mapping_code() {
    let conn = open_db_in_memory().unwrap();
    let (service, _clock) = service_for(&conn, "op_110011");
    conn.execute_batch(
        "CREATE TRIGGER reject_mapping_insert
         BEFORE INSERT ON user_machine_mapping
         BEGIN
             SELECT RAISE(ABORT, 'mapping store offline');
         END;",
    )
    .unwrap();

    let err = service.save_machine_mapping().unwrap_err();
    assert_eq!(err.code(), OnboardErrorCode::MachineMapping);
    assert_eq!(err.message(), "mapping store offline");
    assert_eq!(mapping_count(&conn), 0);
}

#[test]
fn switching_session_user_writes_under_new_user() {
    let conn = open_db_in_memory().unwrap();
    let (mut service, _clock) = service_for(&conn, "op_a");
    service.insert_biometrics(&[capture("face", 70.0)]).unwrap();

    service
        .context_mut()
        .switch_user(SessionContext::new("op_b"));
    service.insert_biometrics(&[capture("leftEye", 75.0)]).unwrap();

    assert_eq!(service.user_biometrics("op_a").unwrap().len(), 1);
    let rows_b = service.user_biometrics("op_b").unwrap();
    assert_eq!(rows_b.len(), 1);
    assert_eq!(rows_b[0].created_by, "op_b");
}

fn service_for<'conn>(
    conn: &'conn Connection,
    user_id: &str,
) -> (SqliteOnboardService<'conn>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(T0));
    let config = OnboardConfig::new("10011", "10002", "eng").unwrap();
    let context = OnboardContext::with_clock(SessionContext::new(user_id), config, clock.clone());
    let service = SqliteOnboardService::from_connection(conn, context).unwrap();
    (service, clock)
}

fn capture(attribute: &str, quality_score: f64) -> BiometricsDto {
    BiometricsDto {
        attribute: attribute.to_string(),
        attribute_iso: attribute.as_bytes().to_vec(),
        quality_score,
        num_retries: 1,
    }
}

fn mapping_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM user_machine_mapping;", [], |row| {
        row.get(0)
    })
    .unwrap()
}
