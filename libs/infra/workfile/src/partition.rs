// [libs/infra/workfile/src/partition.rs]
/*!
 * =================================================================
 * APARATO: PARTITIONED WORK FILE ENGINE (V17.0 - SPLIT SOVEREIGN)
 * CLASIFICACIÓN: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: DIRECTORIO DE 256 SHARDS Y PROTOCOLO DE DIVISIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SHARD BY BUCKET BYTE: Cada part_XX.kng posee el rango de cubetas
 *    cuyo byte alto de índice coincide con XX; los shards son disjuntos
 *    y un merge de directorio reconstruye la tabla global bit-perfecta.
 * 2. UNBOUND GENESIS: Una partición recién creada viaja sin identidad
 *    estampada; el primer volcado de servidor sella el scope.
 * 3. BOUNDED MEMORY: El protocolo de división pliega la tabla viva en
 *    los shards y la vacía, habilitando campañas largas con RAM acotada.
 * =================================================================
 */

use crate::codec::{load_work_file, write_file};
use crate::errors::WorkFileError;
use crate::header::{WorkFileHeader, WorkFileKind, FLAG_PARTITIONED};
use crate::merge::{merge_sorted_entries, MergeOutcome};
use kangaroo_core_trapstore::{TrapEntry, TrapTable};
use kangaroo_domain_models::scope::SearchScope;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Cantidad de shards de un directorio particionado.
pub const PARTITION_SHARD_COUNT: usize = 256;

/// Nombre canónico del archivo de un shard.
#[must_use]
pub fn partition_member_path(directory_path: &Path, shard_byte: u8) -> PathBuf {
    directory_path.join(format!("part_{:02x}.kng", shard_byte))
}

/**
 * Crea un directorio particionado vacío: 256 shards sin identidad
 * estampada, cada uno con su rango de cubetas locales vacío.
 *
 * # Errors:
 * Propaga fallos de E/S; rechaza particionamientos menores a 256 cubetas.
 */
pub fn create_empty_partitioned(
    directory_path: &Path,
    global_bucket_bits: u32,
) -> Result<(), WorkFileError> {
    if global_bucket_bits < 8 {
        return Err(WorkFileError::UnsupportedShape(format!(
            "PARTITION_BUCKET_UNDERFLOW: {} bits",
            global_bucket_bits
        )));
    }

    std::fs::create_dir_all(directory_path)?;
    let local_bucket_count = 1usize << (global_bucket_bits - 8);
    let empty_buckets: Vec<Vec<TrapEntry>> = vec![Vec::new(); local_bucket_count];

    (0u16..PARTITION_SHARD_COUNT as u16)
        .into_par_iter()
        .try_for_each(|shard_index| {
            let unbound_header = WorkFileHeader {
                kind: WorkFileKind::ServerPartitionMember,
                flags: FLAG_PARTITIONED,
                dp_bits: 0,
                range_start: [0u8; 32],
                range_end: [0u8; 32],
                public_key_x: [0u8; 32],
                public_key_y: [0u8; 32],
                jump_seed: 0,
                bucket_count: local_bucket_count as u32,
                entry_count: 0,
                herd_count: 0,
                elapsed_seconds: 0,
            };
            write_file(
                &partition_member_path(directory_path, shard_index as u8),
                &unbound_header,
                &empty_buckets,
                &[],
            )
        })?;

    info!(
        "🗂️ [PARTITION_GENESIS]: {} shards created at {}.",
        PARTITION_SHARD_COUNT,
        directory_path.display()
    );

    Ok(())
}

/**
 * PROTOCOLO DE DIVISIÓN (-wsplit): pliega la tabla viva del servidor en
 * el directorio particionado y retorna las colisiones cruzadas surgidas
 * contra el contenido previamente sellado. El llamador vacía la tabla
 * tras el retorno exitoso.
 *
 * # Errors:
 * `ScopeMismatch` si un shard existente pertenece a otra campaña;
 * fallos de E/S e integridad se propagan.
 */
#[instrument(skip_all, fields(directory = %directory_path.display()))]
pub fn split_into_partition(
    directory_path: &Path,
    scope: &SearchScope,
    table: &TrapTable,
    elapsed_seconds: u64,
) -> Result<MergeOutcome, WorkFileError> {
    let global_bucket_count = table.bucket_count();
    if global_bucket_count < PARTITION_SHARD_COUNT {
        return Err(WorkFileError::UnsupportedShape(format!(
            "PARTITION_BUCKET_UNDERFLOW: {} buckets",
            global_bucket_count
        )));
    }
    let local_bucket_count = global_bucket_count / PARTITION_SHARD_COUNT;

    std::fs::create_dir_all(directory_path)?;

    let shard_outcomes: Result<Vec<MergeOutcome>, WorkFileError> = (0u16
        ..PARTITION_SHARD_COUNT as u16)
        .into_par_iter()
        .map(|shard_index| {
            let shard_byte = shard_index as u8;
            let member_path = partition_member_path(directory_path, shard_byte);

            // Cubetas locales entrantes desde la tabla viva
            let mut incoming_buckets: Vec<Vec<TrapEntry>> =
                Vec::with_capacity(local_bucket_count);
            for local_index in 0..local_bucket_count {
                let global_index = (shard_byte as usize) * local_bucket_count + local_index;
                incoming_buckets.push(table.snapshot_bucket(global_index));
            }

            let mut shard_outcome = MergeOutcome::default();
            let merged_buckets = if member_path.exists() {
                let existing_member = load_work_file(&member_path)?;
                validate_member_shape(&existing_member.header, scope, local_bucket_count)?;

                let mut merged = Vec::with_capacity(local_bucket_count);
                for (local_index, incoming_bucket) in incoming_buckets.iter().enumerate() {
                    let existing_bucket = existing_member.table.snapshot_bucket(local_index);
                    merged.push(merge_sorted_entries(
                        &existing_bucket,
                        incoming_bucket,
                        &mut shard_outcome,
                    ));
                }
                merged
            } else {
                incoming_buckets
            };

            let shard_entry_count: u64 =
                merged_buckets.iter().map(|bucket| bucket.len() as u64).sum();
            shard_outcome.output_entries = shard_entry_count;

            let member_header = WorkFileHeader {
                kind: WorkFileKind::ServerPartitionMember,
                flags: FLAG_PARTITIONED,
                dp_bits: scope.dp_bits,
                range_start: scope.range_start,
                range_end: scope.range_end,
                public_key_x: scope.public_key_x,
                public_key_y: scope.public_key_y,
                jump_seed: scope.jump_seed,
                bucket_count: local_bucket_count as u32,
                entry_count: shard_entry_count,
                herd_count: 0,
                elapsed_seconds,
            };

            write_file(&member_path, &member_header, &merged_buckets, &[])?;
            Ok(shard_outcome)
        })
        .collect();

    let mut aggregated_outcome = MergeOutcome::default();
    for shard_outcome in shard_outcomes? {
        aggregated_outcome.output_entries += shard_outcome.output_entries;
        aggregated_outcome.duplicate_entries += shard_outcome.duplicate_entries;
        aggregated_outcome.same_herd_fusions += shard_outcome.same_herd_fusions;
        aggregated_outcome
            .cross_collisions
            .extend(shard_outcome.cross_collisions);
    }

    info!(
        "✂️ [SPLIT_SEALED]: {} entries folded into {} ({} cross collisions).",
        aggregated_outcome.output_entries,
        directory_path.display(),
        aggregated_outcome.cross_collisions.len()
    );

    Ok(aggregated_outcome)
}

/// Certifica que un shard existente pertenezca a la campaña vigente.
fn validate_member_shape(
    member_header: &WorkFileHeader,
    scope: &SearchScope,
    expected_local_buckets: usize,
) -> Result<(), WorkFileError> {
    if member_header.bucket_count as usize != expected_local_buckets {
        return Err(WorkFileError::UnsupportedShape(format!(
            "PARTITION_BUCKET_MISMATCH: member {}, expected {}",
            member_header.bucket_count, expected_local_buckets
        )));
    }
    if member_header.is_scope_unbound() {
        return Ok(());
    }
    let scope_matches = member_header.range_start == scope.range_start
        && member_header.range_end == scope.range_end
        && member_header.public_key_x == scope.public_key_x
        && member_header.public_key_y == scope.public_key_y
        && member_header.dp_bits == scope.dp_bits
        && member_header.jump_seed == scope.jump_seed;
    if !scope_matches {
        return Err(WorkFileError::ScopeMismatch(
            "PARTITION_SCOPE_VIOLATION: member belongs to another campaign".to_string(),
        ));
    }
    Ok(())
}
