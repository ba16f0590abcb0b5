// [tests/mirror/apps/solver/tiny_puzzle_resolution.test.rs]
/**
 * =================================================================
 * APARATO: TINY PUZZLE CLI RESOLUTION TEST (V5.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4-MIRROR
 * RESPONSABILIDAD: CAMPAÑA COMPLETA VÍA SUPERFICIE DE COMANDO,
 *                  ARCHIVO DE RESULTADOS Y REANUDACIÓN (-w / -i)
 * =================================================================
 */

use clap::Parser;
use kangaroo_core_math::prelude::*;
use kangaroo_solver::cli::CommandSurface;
use kangaroo_solver::config::parse_target_config;
use kangaroo_solver::solo::{run_from_config, run_from_work_file};
use kangaroo_infra_workfile::load_work_file;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

const SECRET_HEX: &str = "00000000000000000000000000000000000000000000000000000000DEADBEEF";

fn write_puzzle_config(directory: &std::path::Path) -> std::path::PathBuf {
    let secret_key = SafePrivateKey::from_bytes(&hex::decode(SECRET_HEX).unwrap()).unwrap();
    let compressed_hex = hex::encode(SafePublicKey::from_private(&secret_key).to_bytes(true));

    let config_path = directory.join("puzzle.conf");
    let mut config_file = std::fs::File::create(&config_path).expect("CONFIG_PANIC");
    writeln!(config_file, "4").expect("WRITE_PANIC");
    writeln!(config_file, "0").expect("WRITE_PANIC");
    writeln!(config_file, "FFFFFFFF").expect("WRITE_PANIC");
    writeln!(config_file, "{}", compressed_hex).expect("WRITE_PANIC");
    config_path
}

#[test]
fn certify_cli_campaign_and_output_sink() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let config_path = write_puzzle_config(working_directory.path());
    let output_path = working_directory.path().join("found.txt");

    let surface = CommandSurface::parse_from([
        "kangaroo-solver",
        "-t",
        "2",
        "--seed",
        "3405691582",
        "-o",
        output_path.to_str().unwrap(),
        config_path.to_str().unwrap(),
    ]);

    let parsed_config = parse_target_config(&config_path).expect("PARSE_PANIC");
    let exit_code = run_from_config(&parsed_config, &surface, Arc::new(AtomicBool::new(false)))
        .expect("CAMPAIGN_PANIC");
    assert_eq!(exit_code, 0, "EXIT_FAULT: resolved campaigns exit 0");

    let output_content = std::fs::read_to_string(&output_path).expect("OUTPUT_PANIC");
    assert!(
        output_content.contains(&format!("Priv: 0x{}", SECRET_HEX)),
        "SINK_FAULT: output line must carry the recovered key"
    );
    assert!(output_content.starts_with("Key#1 [Count 2^"), "SINK_FAULT: line shape");
}

#[test]
fn certify_save_and_resume_cycle() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let config_path = write_puzzle_config(working_directory.path());
    let output_path = working_directory.path().join("found.txt");
    let work_path = working_directory.path().join("campaign.kng");

    // Fase 1: presupuesto diminuto (-m) fuerza el abandono y el guardado final
    let interrupted_surface = CommandSurface::parse_from([
        "kangaroo-solver",
        "-t",
        "2",
        "--seed",
        "99",
        "-m",
        "0.05",
        "-w",
        work_path.to_str().unwrap(),
        "--ws",
        "-o",
        output_path.to_str().unwrap(),
        config_path.to_str().unwrap(),
    ]);
    let parsed_config = parse_target_config(&config_path).expect("PARSE_PANIC");
    let first_exit = run_from_config(
        &parsed_config,
        &interrupted_surface,
        Arc::new(AtomicBool::new(false)),
    )
    .expect("CAMPAIGN_PANIC");
    assert_eq!(first_exit, 0);
    assert!(work_path.exists(), "SAVE_FAULT: aborted campaign must leave a work file");

    let saved_work = load_work_file(&work_path).expect("LOAD_PANIC");
    assert!(saved_work.header.herd_count > 0, "SAVE_FAULT: --ws must persist the herd");

    // Fase 2: reanudación hasta la resolución
    let resume_surface = CommandSurface::parse_from([
        "kangaroo-solver",
        "-t",
        "2",
        "--seed",
        "100",
        "-i",
        work_path.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
    ]);
    let resumed_work = load_work_file(&work_path).expect("LOAD_PANIC");
    let resume_exit = run_from_work_file(
        resumed_work,
        &resume_surface,
        Arc::new(AtomicBool::new(false)),
    )
    .expect("CAMPAIGN_PANIC");
    assert_eq!(resume_exit, 0);

    let output_content = std::fs::read_to_string(&output_path).expect("OUTPUT_PANIC");
    assert!(
        output_content.contains(&format!("Priv: 0x{}", SECRET_HEX)),
        "RESUME_FAULT: resumed campaign must recover the key"
    );
}
