// [apps/solver/src/solo.rs]
/*!
 * =================================================================
 * APARATO: SOLO CAMPAIGN MODE (V10.0 - RESUME AWARE)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: CABLEADO DE CAMPAÑAS LOCALES Y PERSISTENCIA
 * =================================================================
 */

use crate::cli::CommandSurface;
use crate::config::ParsedTargetConfig;
use anyhow::{Context, Result};
use kangaroo_core_trapstore::{DistinguishedFilter, TrapTable};
use kangaroo_domain_engine::runner::{run_solo, SaveRequest, SoloRunnerOptions};
use kangaroo_domain_engine::KANGAROOS_PER_CPU_CORE;
use kangaroo_domain_models::herd::KangarooSnapshot;
use kangaroo_domain_models::scope::SearchScope;
use kangaroo_infra_workfile::{save_work_file, LoadedWork, WorkFileKind};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

/// Resuelve los hilos de CPU efectivos de la superficie de comando.
#[must_use]
pub fn effective_cpu_threads(surface: &CommandSurface) -> usize {
    surface.cpu_threads.unwrap_or_else(num_cpus::get).max(1)
}

/// Resuelve la semilla del runtime (explícita o entropía del sistema).
#[must_use]
pub fn effective_runtime_seed(surface: &CommandSurface) -> u64 {
    surface.runtime_seed.unwrap_or_else(rand::random)
}

/**
 * Construye el scope definitivo desde la configuración: el dp se fija
 * una única vez, aquí, a partir del tamaño final de la manada.
 */
pub fn resolve_scope_from_config(
    parsed_config: &ParsedTargetConfig,
    surface: &CommandSurface,
) -> Result<SearchScope> {
    let (target_x, target_y) = parsed_config.target_coordinates();

    // Scope preliminar solo para derivar el ancho certificado
    let preliminary_scope = SearchScope::new(
        parsed_config.range_start,
        parsed_config.range_end,
        target_x,
        target_y,
        0,
        None,
    )
    .context("CONFIG_SCOPE_VIOLATION")?;

    let herd_size = effective_cpu_threads(surface) * KANGAROOS_PER_CPU_CORE;
    let cli_override = match surface.dp_bits_override {
        Some(dp_value) if dp_value >= 0 => Some(dp_value.min(32) as u8),
        _ => None,
    };
    let resolved_dp_bits = cli_override
        .or(parsed_config.dp_bits_override)
        .unwrap_or_else(|| {
            DistinguishedFilter::auto_calibrated(&preliminary_scope.width_limbs(), herd_size).dp_bits
        });

    Ok(SearchScope::new(
        parsed_config.range_start,
        parsed_config.range_end,
        target_x,
        target_y,
        resolved_dp_bits,
        None,
    )
    .context("CONFIG_SCOPE_VIOLATION")?)
}

/**
 * Ejecuta una campaña local desde una configuración fresca.
 *
 * # Errors:
 * Propaga colapsos del motor y de persistencia.
 */
pub fn run_from_config(
    parsed_config: &ParsedTargetConfig,
    surface: &CommandSurface,
    stop_flag: Arc<AtomicBool>,
) -> Result<i32> {
    let scope = resolve_scope_from_config(parsed_config, surface)?;
    execute_campaign(scope, Arc::new(TrapTable::new()), None, 0, surface, stop_flag)
}

/**
 * Reanuda una campaña local desde un work file cargado.
 *
 * # Errors:
 * Propaga violaciones de scope del archivo y colapsos del motor.
 */
pub fn run_from_work_file(
    loaded_work: LoadedWork,
    surface: &CommandSurface,
    stop_flag: Arc<AtomicBool>,
) -> Result<i32> {
    let scope = loaded_work.header.to_scope().context("WORK_FILE_SCOPE")?;
    let initial_elapsed = loaded_work.header.elapsed_seconds;
    let initial_herd = if loaded_work.herd.is_empty() {
        None
    } else {
        Some(loaded_work.herd)
    };

    info!(
        "🌊 [RESUME]: {} entries, {} kangaroos, {}s of prior effort.",
        loaded_work.header.entry_count,
        initial_herd.as_ref().map(Vec::len).unwrap_or(0),
        initial_elapsed
    );

    execute_campaign(
        scope,
        Arc::new(loaded_work.table),
        initial_herd,
        initial_elapsed,
        surface,
        stop_flag,
    )
}

fn execute_campaign(
    scope: SearchScope,
    table: Arc<TrapTable>,
    initial_herd: Option<Vec<KangarooSnapshot>>,
    initial_elapsed_seconds: u64,
    surface: &CommandSurface,
    stop_flag: Arc<AtomicBool>,
) -> Result<i32> {
    let runner_options = SoloRunnerOptions {
        cpu_threads: effective_cpu_threads(surface),
        save_period_seconds: if surface.work_file.is_some() {
            surface.save_period_seconds
        } else {
            0
        },
        save_barrier_timeout_millis: surface.work_timeout_millis,
        save_herd: surface.save_kangaroos,
        max_step_multiplier: surface.max_step_multiplier,
        runtime_seed: effective_runtime_seed(surface),
        initial_elapsed_seconds,
        initial_herd,
        output_path: Some(surface.output_file.clone()),
    };

    // Gancho de persistencia: cristaliza el estado bajo la barrera
    let work_file_target = surface.work_file.clone();
    let mut save_hook = move |request: &SaveRequest<'_>| -> std::result::Result<(), String> {
        let Some(destination) = work_file_target.as_ref() else {
            return Ok(());
        };
        save_work_file(
            destination,
            WorkFileKind::Solo,
            request.scope,
            request.table,
            &request.herd_snapshots,
            request.elapsed_seconds,
            false,
        )
        .map_err(|fault| fault.to_string())
    };

    let campaign_verdict = run_solo(
        scope,
        table,
        runner_options,
        stop_flag,
        Some(&mut save_hook),
    )?;

    match campaign_verdict {
        Some(finding) => {
            info!(
                "🏁 [CAMPAIGN_SEALED]: Priv 0x{} recovered after {}s.",
                finding.private_key_hex, finding.elapsed_seconds
            );
            Ok(0)
        }
        None => {
            warn!("🛑 [CAMPAIGN_HALTED]: No key recovered (interrupted or budget exhausted).");
            Ok(0)
        }
    }
}
