// [libs/infra/workfile/src/merge.rs]
/*!
 * =================================================================
 * APARATO: WORK FILE MERGE ALGEBRA (V15.0 - COMMUTATIVE SEALED)
 * CLASIFICACIÓN: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: INTERCALADO CANÓNICO DE TABLAS DE TRAMPAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. COMMUTATIVE CANON: Ante huellas iguales con cargas distintas se
 *    conserva la carga menor; el resultado es idéntico byte a byte sin
 *    importar el orden de los operandos.
 * 2. COLLISION YIELD: Toda colisión cruzada Tame/Wild descubierta en el
 *    intercalado se cede al resolutor ANTES de escribir el destino.
 * 3. IDENTITY GUARD: Los operandos deben compartir la identidad
 *    (P, kmin, kmax, dp, jump_seed); cualquier asimetría se rechaza.
 * =================================================================
 */

use crate::codec::{load_work_file, write_file, LoadedWork};
use crate::errors::WorkFileError;
use crate::header::{WorkFileHeader, WorkFileKind, FLAG_PARTITIONED};
use kangaroo_core_trapstore::{TrapEntry, TrapTable};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Resultado agregado de una operación de merge.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Huellas en el destino tras el intercalado.
    pub output_entries: u64,
    /// Entradas idénticas descartadas.
    pub duplicate_entries: u64,
    /// Fusiones de trayectoria intra-manada (carga menor conservada).
    pub same_herd_fusions: u64,
    /// Colisiones cruzadas Tame/Wild descubiertas: (d_tame, d_wild).
    pub cross_collisions: Vec<(i128, i128)>,
}

/**
 * Intercala dos listas de cubeta canónicamente ordenadas.
 *
 * Ante huellas iguales: cargas idénticas deduplican; cargas distintas de
 * la misma manada conservan la menor (canon conmutativo); etiquetas
 * opuestas ceden la colisión y conservan la carga menor.
 */
pub fn merge_sorted_entries(
    alpha_entries: &[TrapEntry],
    beta_entries: &[TrapEntry],
    outcome: &mut MergeOutcome,
) -> Vec<TrapEntry> {
    let mut merged = Vec::with_capacity(alpha_entries.len() + beta_entries.len());
    let mut alpha_index = 0;
    let mut beta_index = 0;

    while alpha_index < alpha_entries.len() && beta_index < beta_entries.len() {
        let alpha_entry = alpha_entries[alpha_index];
        let beta_entry = beta_entries[beta_index];

        match alpha_entry.x_fingerprint.cmp(&beta_entry.x_fingerprint) {
            std::cmp::Ordering::Less => {
                merged.push(alpha_entry);
                alpha_index += 1;
            }
            std::cmp::Ordering::Greater => {
                merged.push(beta_entry);
                beta_index += 1;
            }
            std::cmp::Ordering::Equal => {
                if alpha_entry.packed_distance == beta_entry.packed_distance {
                    outcome.duplicate_entries += 1;
                } else if alpha_entry.tag_bits() != beta_entry.tag_bits() {
                    let (tame_distance, wild_distance) = if alpha_entry.tag_bits() == 0 {
                        (alpha_entry.signed_distance(), beta_entry.signed_distance())
                    } else {
                        (beta_entry.signed_distance(), alpha_entry.signed_distance())
                    };
                    outcome.cross_collisions.push((tame_distance, wild_distance));
                } else {
                    outcome.same_herd_fusions += 1;
                }

                // Canon conmutativo: se conserva la carga menor
                merged.push(if alpha_entry.packed_distance <= beta_entry.packed_distance {
                    alpha_entry
                } else {
                    beta_entry
                });
                alpha_index += 1;
                beta_index += 1;
            }
        }
    }

    merged.extend_from_slice(&alpha_entries[alpha_index..]);
    merged.extend_from_slice(&beta_entries[beta_index..]);
    merged
}

/**
 * Fusiona dos work files hacia un destino explícito.
 *
 * La forma de dos argumentos (merge in-place del original) se rechaza en
 * la frontera de CLI: el destino es obligatorio.
 *
 * # Errors:
 * `ScopeMismatch` si los operandos no comparten identidad; fallos de E/S
 * e integridad se propagan.
 */
#[instrument(skip_all)]
pub fn merge_work_files(
    alpha_path: &Path,
    beta_path: &Path,
    destination_path: &Path,
) -> Result<MergeOutcome, WorkFileError> {
    let alpha_work = load_work_file(alpha_path)?;
    let beta_work = load_work_file(beta_path)?;

    if !alpha_work.header.is_merge_compatible(&beta_work.header) {
        return Err(WorkFileError::ScopeMismatch(format!(
            "MERGE_IDENTITY_VIOLATION: {} and {} target different scopes",
            alpha_path.display(),
            beta_path.display()
        )));
    }

    let mut outcome = MergeOutcome::default();
    let bucket_count = alpha_work.table.bucket_count();
    let mut merged_buckets: Vec<Vec<TrapEntry>> = Vec::with_capacity(bucket_count);

    for bucket_index in 0..bucket_count {
        let alpha_bucket = alpha_work.table.snapshot_bucket(bucket_index);
        let beta_bucket = beta_work.table.snapshot_bucket(bucket_index);
        let merged_bucket = merge_sorted_entries(&alpha_bucket, &beta_bucket, &mut outcome);
        outcome.output_entries += merged_bucket.len() as u64;
        merged_buckets.push(merged_bucket);
    }

    if !outcome.cross_collisions.is_empty() {
        warn!(
            "🎯 [MERGE_COLLISION]: {} cross-herd collisions surfaced during merge.",
            outcome.cross_collisions.len()
        );
    }

    let destination_header = WorkFileHeader {
        kind: WorkFileKind::Solo,
        flags: alpha_work.header.flags & !crate::header::FLAG_HAS_HERD_SNAPSHOT & !FLAG_PARTITIONED,
        dp_bits: alpha_work.header.dp_bits,
        range_start: alpha_work.header.range_start,
        range_end: alpha_work.header.range_end,
        public_key_x: alpha_work.header.public_key_x,
        public_key_y: alpha_work.header.public_key_y,
        jump_seed: alpha_work.header.jump_seed,
        bucket_count: bucket_count as u32,
        entry_count: outcome.output_entries,
        herd_count: 0,
        elapsed_seconds: alpha_work
            .header
            .elapsed_seconds
            .max(beta_work.header.elapsed_seconds),
    };

    write_file(destination_path, &destination_header, &merged_buckets, &[])?;

    info!(
        "🧬 [MERGE_SEALED]: {} + {} -> {} ({} entries, {} duplicates, {} fusions).",
        alpha_path.display(),
        beta_path.display(),
        destination_path.display(),
        outcome.output_entries,
        outcome.duplicate_entries,
        outcome.same_herd_fusions
    );

    Ok(outcome)
}

/**
 * Fusiona todos los work files de un directorio hacia un destino.
 * Acepta tanto archivos completos como miembros de partición (cuyas
 * cubetas locales se reubican en el espacio global por el byte de shard
 * del nombre de archivo).
 *
 * # Errors:
 * `UnsupportedShape` si el directorio no aporta ningún archivo válido.
 */
pub fn merge_directory(
    directory_path: &Path,
    destination_path: &Path,
) -> Result<MergeOutcome, WorkFileError> {
    let mut work_file_paths: Vec<std::path::PathBuf> = std::fs::read_dir(directory_path)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().map(|ext| ext == "kng").unwrap_or(false))
        .collect();
    work_file_paths.sort();

    if work_file_paths.is_empty() {
        return Err(WorkFileError::UnsupportedShape(format!(
            "EMPTY_MERGE_DIRECTORY: {}",
            directory_path.display()
        )));
    }

    let mut accumulator: Option<(WorkFileHeader, Vec<Vec<TrapEntry>>)> = None;
    let mut outcome = MergeOutcome::default();

    for work_file_path in &work_file_paths {
        let loaded = load_work_file(work_file_path)?;

        // Particiones vacías sin identidad estampada no aportan nada
        if loaded.header.is_scope_unbound() {
            if loaded.header.entry_count > 0 {
                return Err(WorkFileError::IntegrityViolation(format!(
                    "UNBOUND_SCOPE_WITH_ENTRIES: {}",
                    work_file_path.display()
                )));
            }
            continue;
        }

        let (incoming_header, incoming_buckets) = normalize_to_global(work_file_path, loaded)?;

        match accumulator.as_mut() {
            None => {
                accumulator = Some((incoming_header, incoming_buckets));
            }
            Some((accumulated_header, accumulated_buckets)) => {
                if !accumulated_header.is_merge_compatible(&incoming_header) {
                    return Err(WorkFileError::ScopeMismatch(format!(
                        "MERGE_IDENTITY_VIOLATION: {}",
                        work_file_path.display()
                    )));
                }
                for (bucket_index, incoming_bucket) in incoming_buckets.into_iter().enumerate() {
                    if incoming_bucket.is_empty() {
                        continue;
                    }
                    let merged_bucket = merge_sorted_entries(
                        &accumulated_buckets[bucket_index],
                        &incoming_bucket,
                        &mut outcome,
                    );
                    accumulated_buckets[bucket_index] = merged_bucket;
                }
                accumulated_header.elapsed_seconds = accumulated_header
                    .elapsed_seconds
                    .max(incoming_header.elapsed_seconds);
            }
        }
    }

    let (mut final_header, final_buckets) = accumulator.ok_or_else(|| {
        WorkFileError::UnsupportedShape(format!(
            "NO_BOUND_WORK_FILES: {}",
            directory_path.display()
        ))
    })?;

    outcome.output_entries = final_buckets.iter().map(|bucket| bucket.len() as u64).sum();
    final_header.kind = WorkFileKind::Solo;
    final_header.flags &= !(crate::header::FLAG_HAS_HERD_SNAPSHOT | FLAG_PARTITIONED);
    final_header.entry_count = outcome.output_entries;
    final_header.herd_count = 0;

    write_file(destination_path, &final_header, &final_buckets, &[])?;

    info!(
        "🧬 [MERGE_DIR_SEALED]: {} files -> {} ({} entries).",
        work_file_paths.len(),
        destination_path.display(),
        outcome.output_entries
    );

    Ok(outcome)
}

/**
 * Normaliza un work file al espacio global de cubetas. Los miembros de
 * partición reubican sus cubetas locales según el byte de shard del
 * nombre de archivo (part_XX.kng).
 */
fn normalize_to_global(
    work_file_path: &Path,
    loaded: LoadedWork,
) -> Result<(WorkFileHeader, Vec<Vec<TrapEntry>>), WorkFileError> {
    let local_bucket_count = loaded.table.bucket_count();

    if !loaded.header.is_partition_member() {
        let buckets = snapshot_all_buckets(&loaded.table);
        return Ok((loaded.header, buckets));
    }

    let shard_byte = parse_shard_byte(work_file_path)?;
    let global_bucket_count = local_bucket_count * crate::partition::PARTITION_SHARD_COUNT;
    let mut global_buckets: Vec<Vec<TrapEntry>> = vec![Vec::new(); global_bucket_count];
    for local_index in 0..local_bucket_count {
        let global_index = (shard_byte as usize) * local_bucket_count + local_index;
        global_buckets[global_index] = loaded.table.snapshot_bucket(local_index);
    }

    let mut global_header = loaded.header;
    global_header.bucket_count = global_bucket_count as u32;
    global_header.flags &= !FLAG_PARTITIONED;

    Ok((global_header, global_buckets))
}

/// Extrae el byte de shard del nombre canónico part_XX.kng.
pub(crate) fn parse_shard_byte(work_file_path: &Path) -> Result<u8, WorkFileError> {
    let file_stem = work_file_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let shard_hex = file_stem.strip_prefix("part_").ok_or_else(|| {
        WorkFileError::UnsupportedShape(format!(
            "PARTITION_NAME_VIOLATION: {}",
            work_file_path.display()
        ))
    })?;
    u8::from_str_radix(shard_hex, 16).map_err(|_| {
        WorkFileError::UnsupportedShape(format!(
            "PARTITION_NAME_VIOLATION: {}",
            work_file_path.display()
        ))
    })
}

/// Copia canónica de todas las cubetas de una tabla.
pub(crate) fn snapshot_all_buckets(table: &TrapTable) -> Vec<Vec<TrapEntry>> {
    (0..table.bucket_count())
        .map(|bucket_index| table.snapshot_bucket(bucket_index))
        .collect()
}
