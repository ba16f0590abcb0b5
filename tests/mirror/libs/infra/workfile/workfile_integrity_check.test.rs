// [tests/mirror/libs/infra/workfile/workfile_integrity_check.test.rs]
/**
 * =================================================================
 * APARATO: WORK FILE INTEGRITY CHECK TEST (V6.0 - CRC EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: RECHAZO DE BYTES CORRUPTOS Y AUDITORÍA -wcheck
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use kangaroo_core_trapstore::TrapTable;
use kangaroo_domain_models::dp::{DistinguishedPoint, HerdKind};
use kangaroo_domain_models::scope::SearchScope;
use kangaroo_infra_workfile::{
    check_work_file, create_empty_partitioned, inspect_work_file, load_work_file, save_work_file,
    WorkFileKind,
};
use std::path::Path;

fn demo_scope() -> SearchScope {
    let mut secret_bytes = [0u8; 32];
    secret_bytes[31] = 0x2A;
    let secret_key = SafePrivateKey::from_bytes(&secret_bytes).unwrap();
    let target_point = SafePublicKey::from_private(&secret_key).to_affine();

    let mut range_end = [0u8; 32];
    range_end[27] = 0x01;

    SearchScope::new(
        [0u8; 32],
        range_end,
        target_point.x.to_bytes_be(),
        target_point.y.to_bytes_be(),
        4,
        None,
    )
    .expect("SCOPE_PANIC")
}

fn sealed_campaign_file(directory: &Path) -> std::path::PathBuf {
    let scope = demo_scope();
    let table = TrapTable::with_bucket_bits(8);
    for seed in 1u16..128 {
        let mut x = [0u8; 32];
        x[0..2].copy_from_slice(&seed.to_be_bytes());
        x[31] = (seed % 16) as u8 * 16;
        let _ = table.insert(&DistinguishedPoint {
            x,
            distance: seed as i128,
            kind: if seed % 2 == 0 { HerdKind::Tame } else { HerdKind::Wild },
        });
    }

    let file_path = directory.join("sealed.kng");
    save_work_file(&file_path, WorkFileKind::Solo, &scope, &table, &[], 40, false)
        .expect("SAVE_PANIC");
    file_path
}

#[test]
fn certify_intact_file_passes() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let file_path = sealed_campaign_file(working_directory.path());

    let report = check_work_file(&file_path).expect("CHECK_PANIC");
    assert_eq!(report.files_checked, 1);
    assert!(report.entries_checked > 0);

    let summary = inspect_work_file(&file_path).expect("INSPECT_PANIC");
    assert_eq!(summary.entry_count, report.entries_checked);
    assert!(summary.largest_bucket >= 1);
}

#[test]
fn certify_truncation_rejection() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let file_path = sealed_campaign_file(working_directory.path());

    // Amputación de un solo byte: el CRC del archivo debe delatar el corte
    let mut file_bytes = std::fs::read(&file_path).expect("READ_PANIC");
    file_bytes.pop();
    std::fs::write(&file_path, &file_bytes).expect("WRITE_PANIC");

    assert!(check_work_file(&file_path).is_err(), "TRUNCATION_MISS: -wcheck must fail");
    assert!(load_work_file(&file_path).is_err(), "TRUNCATION_MISS: load must refuse");
}

#[test]
fn certify_bit_flip_rejection() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let file_path = sealed_campaign_file(working_directory.path());

    let mut file_bytes = std::fs::read(&file_path).expect("READ_PANIC");
    let poison_offset = file_bytes.len() / 2;
    file_bytes[poison_offset] ^= 0xFF;
    std::fs::write(&file_path, &file_bytes).expect("WRITE_PANIC");

    assert!(check_work_file(&file_path).is_err(), "CRC_MISS: flipped byte undetected");
}

#[test]
fn certify_bad_magic_rejection() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let file_path = sealed_campaign_file(working_directory.path());

    let mut file_bytes = std::fs::read(&file_path).expect("READ_PANIC");
    file_bytes[0] = 0x00; // magia envenenada
    std::fs::write(&file_path, &file_bytes).expect("WRITE_PANIC");

    assert!(load_work_file(&file_path).is_err(), "MAGIC_MISS: poisoned magic accepted");
}

#[test]
fn certify_empty_partition_audit() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let partition_directory = working_directory.path().join("genesis");

    create_empty_partitioned(&partition_directory, 8).expect("PARTCREATE_PANIC");

    let report = check_work_file(&partition_directory).expect("CHECK_PANIC");
    assert_eq!(report.files_checked, 256, "PARTITION_FAULT: 256 shards expected");
    assert_eq!(report.entries_checked, 0);
}
