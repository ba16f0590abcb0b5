// [apps/solver/src/config.rs]
/*!
 * =================================================================
 * APARATO: TARGET CONFIG PARSER (V7.0 - SEC1 AWARE)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: DECODIFICACIÓN DEL ARCHIVO DE OBJETIVO
 *
 * # Formato (texto, líneas no vacías):
 * [dpBitsOverride]   entero, -1 = auto (línea opcional)
 * kmin               hexadecimal
 * kmax               hexadecimal
 * P                  x||y (128 hex) o SEC1 (66 / 130 hex)
 * =================================================================
 */

use anyhow::{anyhow, bail, Context, Result};
use kangaroo_core_math::prelude::*;
use std::path::Path;

/// Objetivo decodificado desde el archivo de configuración.
#[derive(Debug, Clone)]
pub struct ParsedTargetConfig {
    /// Override manual de dp (None = calibración automática).
    pub dp_bits_override: Option<u8>,
    /// Cota inferior del rango (Big-Endian).
    pub range_start: [u8; 32],
    /// Cota superior del rango (Big-Endian).
    pub range_end: [u8; 32],
    /// Clave pública objetivo certificada.
    pub target_public_key: SafePublicKey,
}

impl ParsedTargetConfig {
    /// Coordenadas afines (x, y) del objetivo en Big-Endian.
    #[must_use]
    pub fn target_coordinates(&self) -> ([u8; 32], [u8; 32]) {
        let affine_point = self.target_public_key.to_affine();
        (affine_point.x.to_bytes_be(), affine_point.y.to_bytes_be())
    }
}

/**
 * Decodifica y certifica un archivo de configuración de objetivo.
 *
 * # Errors:
 * Retorna un diagnóstico nominal ante cualquier línea ilegal; el
 * llamador traduce el fallo al código de salida -1.
 */
pub fn parse_target_config(config_path: &Path) -> Result<ParsedTargetConfig> {
    let raw_content = std::fs::read_to_string(config_path)
        .with_context(|| format!("CONFIG_UNREADABLE: {}", config_path.display()))?;

    let meaningful_lines: Vec<&str> = raw_content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let (dp_line, key_lines): (Option<&str>, &[&str]) = match meaningful_lines.len() {
        3 => (None, &meaningful_lines[..]),
        4 => (Some(meaningful_lines[0]), &meaningful_lines[1..]),
        illegal => bail!(
            "CONFIG_SHAPE_VIOLATION: expected 3 or 4 meaningful lines, found {}",
            illegal
        ),
    };

    let dp_bits_override = match dp_line {
        None => None,
        Some(dp_text) => {
            let dp_value: i32 = dp_text
                .parse()
                .map_err(|_| anyhow!("CONFIG_DP_VIOLATION: '{}' is not an integer", dp_text))?;
            if dp_value < 0 {
                None
            } else if dp_value > 32 {
                bail!("CONFIG_DP_VIOLATION: dp {} above the 32 bit bound", dp_value);
            } else {
                Some(dp_value as u8)
            }
        }
    };

    let range_start = limbs_to_be_bytes(
        &limbs_from_hex(key_lines[0])
            .map_err(|fault| anyhow!("CONFIG_KMIN_VIOLATION: {}", fault))?,
    );
    let range_end = limbs_to_be_bytes(
        &limbs_from_hex(key_lines[1])
            .map_err(|fault| anyhow!("CONFIG_KMAX_VIOLATION: {}", fault))?,
    );

    let target_public_key = parse_public_key_line(key_lines[2])?;

    Ok(ParsedTargetConfig {
        dp_bits_override,
        range_start,
        range_end,
        target_public_key,
    })
}

/**
 * Decodifica la línea de clave pública: x||y crudo (128 hex) o SEC1
 * comprimido/no-comprimido (66 / 130 hex).
 */
fn parse_public_key_line(public_key_text: &str) -> Result<SafePublicKey> {
    let normalized_text = public_key_text
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");

    let decoded_bytes = match normalized_text.len() {
        128 => {
            // x||y crudo: se antepone el prefijo SEC1 no comprimido
            let mut sec1_buffer = Vec::with_capacity(65);
            sec1_buffer.push(0x04);
            sec1_buffer.extend_from_slice(
                &hex::decode(normalized_text)
                    .map_err(|fault| anyhow!("CONFIG_PUBKEY_VIOLATION: {}", fault))?,
            );
            sec1_buffer
        }
        66 | 130 => hex::decode(normalized_text)
            .map_err(|fault| anyhow!("CONFIG_PUBKEY_VIOLATION: {}", fault))?,
        illegal => bail!(
            "CONFIG_PUBKEY_VIOLATION: {} hex digits (expected 66, 128 or 130)",
            illegal
        ),
    };

    SafePublicKey::from_bytes(&decoded_bytes)
        .map_err(|fault| anyhow!("CONFIG_PUBKEY_VIOLATION: {}", fault))
}
