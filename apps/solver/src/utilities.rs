// [apps/solver/src/utilities.rs]
/*!
 * =================================================================
 * APARATO: WORK FILE UTILITY DISPATCH (V8.0)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: UTILIDADES DE PERSISTENCIA (-wm, -wmdir, -winfo,
 *                  -wcheck, -wpartcreate) Y RESOLUCIÓN POST-MERGE
 * =================================================================
 */

use crate::cli::CommandSurface;
use anyhow::Result;
use kangaroo_core_trapstore::DEFAULT_BUCKET_BITS;
use kangaroo_domain_engine::CollisionResolver;
use kangaroo_infra_workfile::{
    check_work_file, create_empty_partitioned, inspect_work_file, load_work_file, merge_directory,
    merge_work_files, MergeOutcome,
};
use std::path::Path;
use tracing::{error, info, warn};

/**
 * Despacha las utilidades de work file de la superficie de comando.
 * Retorna `Some(exit_code)` si una utilidad fue ejecutada.
 */
pub fn dispatch_utilities(surface: &CommandSurface) -> Option<i32> {
    if let Some(partition_directory) = &surface.partition_create {
        return Some(run_partition_create(partition_directory));
    }

    if let Some(check_target) = &surface.check_target {
        return Some(run_check(check_target));
    }

    if let Some(info_target) = &surface.info_target {
        return Some(run_info(info_target));
    }

    if surface.merge_directory.len() == 2 {
        return Some(run_merge_directory(
            &surface.merge_directory[0],
            &surface.merge_directory[1],
            surface,
        ));
    }

    if surface.merge_files.len() == 3 {
        return Some(run_merge(
            &surface.merge_files[0],
            &surface.merge_files[1],
            &surface.merge_files[2],
            surface,
        ));
    }

    None
}

fn run_partition_create(partition_directory: &Path) -> i32 {
    match create_empty_partitioned(partition_directory, DEFAULT_BUCKET_BITS) {
        Ok(()) => {
            info!("🗂️ [PARTCREATE]: {} ready.", partition_directory.display());
            0
        }
        Err(fault) => {
            error!("❌ [PARTCREATE_FAULT]: {}", fault);
            1
        }
    }
}

fn run_check(check_target: &Path) -> i32 {
    match check_work_file(check_target) {
        Ok(report) => {
            info!(
                "🩺 [WCHECK_PASSED]: {} files, {} entries certified.",
                report.files_checked, report.entries_checked
            );
            0
        }
        Err(fault) => {
            error!("❌ [WCHECK_FAILED]: {}", fault);
            1
        }
    }
}

fn run_info(info_target: &Path) -> i32 {
    match inspect_work_file(info_target) {
        Ok(summary) => {
            println!("{}", summary);
            0
        }
        Err(fault) => {
            error!("❌ [WINFO_FAULT]: {}", fault);
            1
        }
    }
}

fn run_merge(
    alpha_path: &Path,
    beta_path: &Path,
    destination_path: &Path,
    surface: &CommandSurface,
) -> i32 {
    match merge_work_files(alpha_path, beta_path, destination_path) {
        Ok(outcome) => {
            resolve_merge_collisions(destination_path, &outcome, surface);
            0
        }
        Err(fault) => {
            error!("❌ [MERGE_FAULT]: {}", fault);
            1
        }
    }
}

fn run_merge_directory(
    source_directory: &Path,
    destination_path: &Path,
    surface: &CommandSurface,
) -> i32 {
    match merge_directory(source_directory, destination_path) {
        Ok(outcome) => {
            resolve_merge_collisions(destination_path, &outcome, surface);
            0
        }
        Err(fault) => {
            error!("❌ [MERGE_DIR_FAULT]: {}", fault);
            1
        }
    }
}

/**
 * Cede al resolutor las colisiones cruzadas surgidas durante un merge:
 * la clave puede emerger de la fusión de campañas parciales.
 */
fn resolve_merge_collisions(
    destination_path: &Path,
    outcome: &MergeOutcome,
    surface: &CommandSurface,
) {
    if outcome.cross_collisions.is_empty() {
        return;
    }

    let resolution_verdict: Result<()> = (|| {
        let merged_work = load_work_file(destination_path)?;
        let scope = merged_work.header.to_scope()?;
        let resolver = CollisionResolver::new(scope, Some(surface.output_file.clone()))?;
        let operations_estimate =
            (merged_work.header.entry_count as f64) * (2.0f64).powi(scope.dp_bits as i32);

        for &(tame_distance, wild_distance) in &outcome.cross_collisions {
            match resolver.resolve(
                tame_distance,
                wild_distance,
                operations_estimate.max(1.0),
                merged_work.header.elapsed_seconds,
            ) {
                Ok(Some(finding)) => {
                    info!(
                        "🎯 [MERGE_KEY]: Priv 0x{} recovered from merged campaigns.",
                        finding.private_key_hex
                    );
                }
                Ok(None) => {}
                Err(resolution_fault) => {
                    warn!("🩻 [MERGE_COLLISION_FAULT]: {}", resolution_fault);
                    break;
                }
            }
        }
        Ok(())
    })();

    if let Err(fault) = resolution_verdict {
        warn!("⚠️ [MERGE_RESOLUTION_SKIPPED]: {}", fault);
    }
}
