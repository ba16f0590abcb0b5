// [libs/infra/workfile/src/inspect.rs]
/*!
 * =================================================================
 * APARATO: WORK FILE INSPECTOR (V10.0 - FORENSIC READOUT)
 * CLASIFICACIÓN: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: REPORTE DE CABECERA, ESTADÍSTICAS Y AUDITORÍA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DERIVED STATS: El inspector proyecta el avance de campaña desde el
 *    volumen de DPs: ops ~ entry_count * 2^dp contra 2*sqrt(W).
 * 2. RECOVERABLE DP AUDIT: Solo los min(dp, h) bits bajos de x son
 *    reconstruibles desde el índice de cubeta; la auditoría certifica
 *    exactamente esos bits.
 * 3. DIRECTORY AWARENESS: Un directorio particionado se inspecciona y
 *    audita agregando sus 256 miembros.
 * =================================================================
 */

use crate::codec::load_work_file;
use crate::errors::WorkFileError;
use crate::header::WorkFileKind;
use crate::merge::parse_shard_byte;
use kangaroo_core_math::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resumen serializable de un work file (o directorio particionado).
#[derive(Debug, Clone, Serialize)]
pub struct WorkFileSummary {
    /// Ruta inspeccionada.
    pub path: String,
    /// Clasificación del origen.
    pub kind_label: String,
    /// Bits de Punto Distinguido.
    pub dp_bits: u8,
    /// Cota inferior del rango (hex).
    pub range_start_hex: String,
    /// Cota superior del rango (hex).
    pub range_end_hex: String,
    /// Coordenada X del objetivo (hex).
    pub public_key_x_hex: String,
    /// Semilla de la tabla de saltos.
    pub jump_seed: u64,
    /// Cubetas totales.
    pub bucket_count: u64,
    /// Huellas registradas.
    pub entry_count: u64,
    /// Canguros serializados.
    pub herd_count: u64,
    /// Segundos de cómputo acumulados.
    pub elapsed_seconds: u64,
    /// Ocupación de la cubeta más poblada.
    pub largest_bucket: u64,
    /// Avance estimado de la campaña (por uno).
    pub completion_ratio: f64,
    /// Operaciones de grupo restantes esperadas.
    pub expected_remaining_operations: f64,
}

impl std::fmt::Display for WorkFileSummary {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(formatter, "Work file     : {}", self.path)?;
        writeln!(formatter, "Kind          : {}", self.kind_label)?;
        writeln!(formatter, "DP bits       : {}", self.dp_bits)?;
        writeln!(formatter, "Range start   : 0x{}", self.range_start_hex)?;
        writeln!(formatter, "Range end     : 0x{}", self.range_end_hex)?;
        writeln!(formatter, "Target X      : 0x{}", self.public_key_x_hex)?;
        writeln!(formatter, "Jump seed     : 0x{:016X}", self.jump_seed)?;
        writeln!(formatter, "Buckets       : {}", self.bucket_count)?;
        writeln!(formatter, "Entries       : {}", self.entry_count)?;
        writeln!(formatter, "Herd          : {}", self.herd_count)?;
        writeln!(formatter, "Elapsed       : {}s", self.elapsed_seconds)?;
        writeln!(formatter, "Largest bucket: {}", self.largest_bucket)?;
        writeln!(formatter, "Completion    : {:.2}%", self.completion_ratio * 100.0)?;
        write!(
            formatter,
            "Remaining ops : 2^{:.1}",
            self.expected_remaining_operations.max(1.0).log2()
        )
    }
}

/// Reporte de una auditoría de integridad satisfactoria.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Archivos auditados (1, o 256 para un directorio particionado).
    pub files_checked: u64,
    /// Huellas certificadas.
    pub entries_checked: u64,
    /// Cubetas no vacías recorridas.
    pub populated_buckets: u64,
}

/**
 * Inspecciona un work file o un directorio particionado completo.
 *
 * # Errors:
 * Propaga fallos de carga e integridad.
 */
pub fn inspect_work_file(target_path: &Path) -> Result<WorkFileSummary, WorkFileError> {
    let member_paths = resolve_member_paths(target_path)?;

    let mut aggregate: Option<WorkFileSummary> = None;
    for member_path in &member_paths {
        let loaded = load_work_file(member_path)?;

        let mut largest_bucket = 0u64;
        for bucket_index in 0..loaded.table.bucket_count() {
            largest_bucket = largest_bucket.max(loaded.table.snapshot_bucket(bucket_index).len() as u64);
        }

        match aggregate.as_mut() {
            None => {
                let (completion_ratio, remaining_operations) = if loaded.header.is_scope_unbound() {
                    (0.0, 0.0)
                } else {
                    completion_estimate(
                        &loaded.header.range_start,
                        &loaded.header.range_end,
                        loaded.header.dp_bits,
                        loaded.header.entry_count,
                    )
                };

                aggregate = Some(WorkFileSummary {
                    path: target_path.display().to_string(),
                    kind_label: kind_label(loaded.header.kind),
                    dp_bits: loaded.header.dp_bits,
                    range_start_hex: hex::encode_upper(loaded.header.range_start),
                    range_end_hex: hex::encode_upper(loaded.header.range_end),
                    public_key_x_hex: hex::encode_upper(loaded.header.public_key_x),
                    jump_seed: loaded.header.jump_seed,
                    bucket_count: loaded.header.bucket_count as u64,
                    entry_count: loaded.header.entry_count,
                    herd_count: loaded.header.herd_count as u64,
                    elapsed_seconds: loaded.header.elapsed_seconds,
                    largest_bucket,
                    completion_ratio,
                    expected_remaining_operations: remaining_operations,
                });
            }
            Some(summary) => {
                summary.bucket_count += loaded.header.bucket_count as u64;
                summary.entry_count += loaded.header.entry_count;
                summary.herd_count += loaded.header.herd_count as u64;
                summary.elapsed_seconds = summary.elapsed_seconds.max(loaded.header.elapsed_seconds);
                summary.largest_bucket = summary.largest_bucket.max(largest_bucket);
                if summary.dp_bits == 0 && !loaded.header.is_scope_unbound() {
                    summary.dp_bits = loaded.header.dp_bits;
                    summary.range_start_hex = hex::encode_upper(loaded.header.range_start);
                    summary.range_end_hex = hex::encode_upper(loaded.header.range_end);
                    summary.public_key_x_hex = hex::encode_upper(loaded.header.public_key_x);
                    summary.jump_seed = loaded.header.jump_seed;
                }
            }
        }
    }

    let mut summary = aggregate.ok_or_else(|| {
        WorkFileError::UnsupportedShape(format!("EMPTY_TARGET: {}", target_path.display()))
    })?;

    // Recalculo del avance con el agregado final (directorios)
    if member_paths.len() > 1 && summary.dp_bits > 0 {
        let mut range_start = [0u8; 32];
        let mut range_end = [0u8; 32];
        if hex::decode_to_slice(&summary.range_start_hex, &mut range_start).is_ok()
            && hex::decode_to_slice(&summary.range_end_hex, &mut range_end).is_ok()
        {
            let (completion_ratio, remaining_operations) = completion_estimate(
                &range_start,
                &range_end,
                summary.dp_bits,
                summary.entry_count,
            );
            summary.completion_ratio = completion_ratio;
            summary.expected_remaining_operations = remaining_operations;
        }
    }

    Ok(summary)
}

/**
 * Audita la integridad completa de un work file o directorio particionado:
 * magia, CRCs, conteos por cubeta, orden canónico, duplicados y la
 * consistencia DP reconstruible desde el índice de cubeta.
 *
 * # Errors:
 * `IntegrityViolation` ante la primera violación encontrada.
 */
pub fn check_work_file(target_path: &Path) -> Result<CheckReport, WorkFileError> {
    let member_paths = resolve_member_paths(target_path)?;

    let mut report = CheckReport { files_checked: 0, entries_checked: 0, populated_buckets: 0 };

    for member_path in &member_paths {
        // La carga certifica magia, CRCs, offsets, orden y etiquetas
        let loaded = load_work_file(member_path)?;

        let local_bucket_bits = loaded.header.bucket_count.trailing_zeros();
        let shard_offset = if loaded.header.is_partition_member() {
            (parse_shard_byte(member_path)? as u64) << local_bucket_bits
        } else {
            0
        };
        let global_bucket_bits = if loaded.header.is_partition_member() {
            local_bucket_bits + 8
        } else {
            local_bucket_bits
        };
        let recoverable_dp_bits = (loaded.header.dp_bits as u32).min(global_bucket_bits);

        for bucket_index in 0..loaded.table.bucket_count() {
            let bucket_entries = loaded.table.snapshot_bucket(bucket_index);
            if bucket_entries.is_empty() {
                continue;
            }

            let global_bucket_index = shard_offset | bucket_index as u64;
            if global_bucket_index.trailing_zeros().min(64) < recoverable_dp_bits {
                return Err(WorkFileError::IntegrityViolation(format!(
                    "DP_PROPERTY_VIOLATION: bucket {:#x} populated despite dp={}",
                    global_bucket_index, loaded.header.dp_bits
                )));
            }

            report.populated_buckets += 1;
            report.entries_checked += bucket_entries.len() as u64;
        }

        report.files_checked += 1;
    }

    info!(
        "🩺 [CHECK_PASSED]: {} files, {} entries, {} populated buckets.",
        report.files_checked, report.entries_checked, report.populated_buckets
    );

    Ok(report)
}

/// Resuelve las rutas a auditar (archivo único o miembros de partición).
fn resolve_member_paths(target_path: &Path) -> Result<Vec<PathBuf>, WorkFileError> {
    if target_path.is_dir() {
        let mut member_paths: Vec<PathBuf> = std::fs::read_dir(target_path)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().map(|ext| ext == "kng").unwrap_or(false))
            .collect();
        member_paths.sort();
        if member_paths.is_empty() {
            return Err(WorkFileError::UnsupportedShape(format!(
                "EMPTY_PARTITION_DIRECTORY: {}",
                target_path.display()
            )));
        }
        Ok(member_paths)
    } else {
        Ok(vec![target_path.to_path_buf()])
    }
}

fn kind_label(kind: WorkFileKind) -> String {
    match kind {
        WorkFileKind::Solo => "solo".to_string(),
        WorkFileKind::Client => "client".to_string(),
        WorkFileKind::ServerMonolithic => "server-monolithic".to_string(),
        WorkFileKind::ServerPartitionMember => "server-partition-member".to_string(),
    }
}

/// Estima (avance, operaciones restantes) desde el volumen de DPs.
fn completion_estimate(
    range_start: &[u8; 32],
    range_end: &[u8; 32],
    dp_bits: u8,
    entry_count: u64,
) -> (f64, f64) {
    let start_limbs = limbs_from_be_bytes(range_start);
    let end_limbs = limbs_from_be_bytes(range_end);
    let (width_limbs, _) = subtract_limbs(&end_limbs, &start_limbs);

    let expected_operations = 2.0 * approximate_f64(&width_limbs).sqrt();
    if expected_operations <= 0.0 {
        return (0.0, 0.0);
    }

    let estimated_operations = (entry_count as f64) * (2.0f64).powi(dp_bits as i32);
    let completion_ratio = (estimated_operations / expected_operations).min(1.0);
    (completion_ratio, (expected_operations - estimated_operations).max(0.0))
}
