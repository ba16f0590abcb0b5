// [tests/mirror/apps/solver/config_parsing.test.rs]
/**
 * =================================================================
 * APARATO: TARGET CONFIG PARSING TEST (V4.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4-MIRROR
 * RESPONSABILIDAD: DECODIFICACIÓN DEL ARCHIVO DE OBJETIVO
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use kangaroo_solver::config::parse_target_config;
use std::io::Write;

fn demo_public_key() -> SafePublicKey {
    let mut secret_bytes = [0u8; 32];
    secret_bytes[28..32].copy_from_slice(&0xDEADBEEFu32.to_be_bytes());
    SafePublicKey::from_private(&SafePrivateKey::from_bytes(&secret_bytes).unwrap())
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut config_file = tempfile::NamedTempFile::new().expect("TMP_PANIC");
    config_file.write_all(content.as_bytes()).expect("WRITE_PANIC");
    config_file
}

#[test]
fn certify_four_line_config_with_raw_coordinates() {
    let public_key = demo_public_key();
    let uncompressed_hex = hex::encode(public_key.to_bytes(false));
    let raw_coordinates = &uncompressed_hex[2..]; // sin el prefijo 04

    let config_file = write_config(&format!(
        "12\n0\nFFFFFFFF\n{}\n",
        raw_coordinates
    ));

    let parsed = parse_target_config(config_file.path()).expect("PARSE_PANIC");
    assert_eq!(parsed.dp_bits_override, Some(12));
    assert_eq!(parsed.range_start[31], 0);
    assert_eq!(&parsed.range_end[28..32], &[0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(parsed.target_public_key, public_key, "PUBKEY_FAULT: raw x||y decode");
}

#[test]
fn certify_three_line_config_with_compressed_key() {
    let public_key = demo_public_key();
    let compressed_hex = hex::encode(public_key.to_bytes(true));

    let config_file = write_config(&format!("1000\n200000\n{}\n", compressed_hex));

    let parsed = parse_target_config(config_file.path()).expect("PARSE_PANIC");
    assert_eq!(parsed.dp_bits_override, None, "DP_FAULT: three-line form has no override");
    assert_eq!(parsed.target_public_key, public_key, "PUBKEY_FAULT: compressed decode");
}

#[test]
fn certify_auto_dp_sentinel() {
    let public_key = demo_public_key();
    let compressed_hex = hex::encode(public_key.to_bytes(true));

    let config_file = write_config(&format!("-1\n0\nFFFF\n{}\n", compressed_hex));
    let parsed = parse_target_config(config_file.path()).expect("PARSE_PANIC");
    assert_eq!(parsed.dp_bits_override, None, "DP_FAULT: -1 must mean auto");
}

#[test]
fn certify_malformed_configs_rejected() {
    let public_key = demo_public_key();
    let compressed_hex = hex::encode(public_key.to_bytes(true));

    // Forma ilegal: 2 líneas
    assert!(parse_target_config(write_config("0\nFFFF\n").path()).is_err());

    // dp no numérico
    assert!(parse_target_config(
        write_config(&format!("auto\n0\nFFFF\n{}\n", compressed_hex)).path()
    )
    .is_err());

    // Clave pública de longitud ilegal
    assert!(parse_target_config(write_config("0\nFFFF\nABCDEF\n").path()).is_err());

    // Punto fuera de la curva (x||y fabricado)
    let fabricated = format!("0\nFFFF\n{}\n", "11".repeat(64));
    assert!(parse_target_config(write_config(&fabricated).path()).is_err());
}
