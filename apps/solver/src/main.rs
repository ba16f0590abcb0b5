// [apps/solver/src/main.rs]
/*!
 * =================================================================
 * APARATO: SOLVER MAIN ENTRY POINT (V16.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: BOOTSTRAP, SEÑALES E IGNICIÓN DE MODOS
 *
 * # Exit Codes:
 * 0 = éxito (clave hallada o utilidad completada)
 * -1 (255) = error de configuración o argumentos
 * 1 = error de E/S o integridad
 * =================================================================
 */

use clap::error::ErrorKind;
use clap::Parser;
use kangaroo_shared_heimdall::init_tracing;
use kangaroo_solver::cli::CommandSurface;
use kangaroo_solver::client::{run_client, ClientOptions};
use kangaroo_solver::config::parse_target_config;
use kangaroo_solver::server::{run_server, ServerOptions};
use kangaroo_solver::solo::{
    effective_cpu_threads, effective_runtime_seed, resolve_scope_from_config, run_from_config,
    run_from_work_file,
};
use kangaroo_solver::{diagnostics, utilities};
use kangaroo_core_trapstore::TrapTable;
use kangaroo_infra_workfile::load_work_file;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

fn main() {
    std::process::exit(real_main());
}

fn real_main() -> i32 {
    // 1. SUPERFICIE DE COMANDO
    let surface = match CommandSurface::try_parse() {
        Ok(parsed_surface) => parsed_surface,
        Err(parse_fault) => match parse_fault.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{}", parse_fault);
                return 0;
            }
            _ => {
                eprintln!("{}", parse_fault);
                return -1;
            }
        },
    };

    // 2. OBSERVABILIDAD NEURAL (HEIMDALL)
    init_tracing("kangaroo_solver");
    info!(
        "🦘 [KANGAROO_SOLVER]: v{} ignition at {}.",
        env!("CARGO_PKG_VERSION"),
        chrono::Utc::now().to_rfc3339()
    );

    // 3. SEÑAL DE DETENCIÓN (SIGINT): el handler solo alza la bandera
    let stop_flag = Arc::new(AtomicBool::new(false));
    let handler_stop_flag = Arc::clone(&stop_flag);
    if let Err(handler_fault) = ctrlc::set_handler(move || {
        handler_stop_flag.store(true, Ordering::SeqCst);
    }) {
        warn!("⚠️ [SIGNAL_HOOK_FAULT]: {}", handler_fault);
    }

    // 4. DIAGNÓSTICO DE DISPOSITIVOS (-l)
    if surface.list_devices {
        return diagnostics::list_devices();
    }

    // 5. UTILIDADES DE WORK FILE
    if let Some(utility_exit_code) = utilities::dispatch_utilities(&surface) {
        return utility_exit_code;
    }

    // 6. VALIDACIÓN DE GEOMETRÍA GPU (coherencia con -gpu-id)
    if !surface.grid_dimensions.is_empty()
        && surface.grid_dimensions.len() != surface.gpu_identifiers.len().max(1) * 2
    {
        error!("❌ [ARG_FAULT]: grid dimensions must pair each gpu id (2 per device).");
        return -1;
    }
    if surface.gpu_enable {
        warn!("🐢 [GPU_UNAVAILABLE]: No accelerator runtime compiled; CPU workers only.");
    }

    // 7. OBJETIVO: archivo de configuración y/o work file de entrada
    let parsed_config = match &surface.config_file {
        Some(config_path) => match parse_target_config(config_path) {
            Ok(parsed) => Some(parsed),
            Err(config_fault) => {
                error!("❌ [CONFIG_FAULT]: {:#}", config_fault);
                return -1;
            }
        },
        None => None,
    };

    // 8. PARIDAD DE KERNEL (--check)
    if surface.check_kernel_parity {
        return match diagnostics::certify_kernel(parsed_config.as_ref()) {
            Ok(exit_code) => exit_code,
            Err(check_fault) => {
                error!("❌ [CHECK_FAULT]: {:#}", check_fault);
                1
            }
        };
    }

    let loaded_work = match &surface.input_work_file {
        Some(work_path) => match load_work_file(work_path) {
            Ok(loaded) => Some(loaded),
            Err(load_fault) => {
                error!("❌ [WORK_LOAD_FAULT]: {}", load_fault);
                return 1;
            }
        },
        None => None,
    };

    // 9. IGNICIÓN DE MODOS
    if surface.server_mode {
        return ignite_server_mode(surface, parsed_config, loaded_work, stop_flag);
    }

    if surface.client_server_address.is_some() {
        return ignite_client_mode(surface, stop_flag);
    }

    match (loaded_work, parsed_config) {
        (Some(loaded), _) => match run_from_work_file(loaded, &surface, stop_flag) {
            Ok(exit_code) => exit_code,
            Err(campaign_fault) => {
                error!("❌ [CAMPAIGN_FAULT]: {:#}", campaign_fault);
                1
            }
        },
        (None, Some(config)) => match run_from_config(&config, &surface, stop_flag) {
            Ok(exit_code) => exit_code,
            Err(campaign_fault) => {
                error!("❌ [CAMPAIGN_FAULT]: {:#}", campaign_fault);
                1
            }
        },
        (None, None) => {
            error!("❌ [ARG_FAULT]: No input file to process.");
            -1
        }
    }
}

/// Ignición del servidor de coordinación (runtime Tokio dedicado).
fn ignite_server_mode(
    surface: CommandSurface,
    parsed_config: Option<kangaroo_solver::config::ParsedTargetConfig>,
    loaded_work: Option<kangaroo_infra_workfile::LoadedWork>,
    stop_flag: Arc<AtomicBool>,
) -> i32 {
    let (scope, table, initial_elapsed) = match (loaded_work, parsed_config.as_ref()) {
        (Some(loaded), _) => match loaded.header.to_scope() {
            Ok(scope) => (scope, Arc::new(loaded.table), loaded.header.elapsed_seconds),
            Err(scope_fault) => {
                error!("❌ [WORK_SCOPE_FAULT]: {}", scope_fault);
                return 1;
            }
        },
        (None, Some(config)) => match resolve_scope_from_config(config, &surface) {
            Ok(scope) => (scope, Arc::new(TrapTable::new()), 0),
            Err(config_fault) => {
                error!("❌ [CONFIG_FAULT]: {:#}", config_fault);
                return -1;
            }
        },
        (None, None) => {
            error!("❌ [ARG_FAULT]: Server mode requires a config file or an input work file.");
            return -1;
        }
    };

    let server_options = ServerOptions {
        port: surface.server_port,
        network_timeout: Duration::from_millis(surface.network_timeout_millis),
        save_period_seconds: surface.save_period_seconds,
        work_target: surface.work_file.clone(),
        split_mode: surface.split_work_file,
        output_path: surface.output_file.clone(),
        initial_elapsed_seconds: initial_elapsed,
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(runtime_fault) => {
            error!("❌ [RUNTIME_FAULT]: {}", runtime_fault);
            return 1;
        }
    };

    match runtime.block_on(run_server(scope, table, server_options, stop_flag)) {
        Ok(Some(finding)) => {
            info!("🏁 [SERVER_SEALED]: Priv 0x{} recovered.", finding.private_key_hex);
            0
        }
        Ok(None) => 0,
        Err(server_fault) => {
            error!("❌ [SERVER_FAULT]: {:#}", server_fault);
            1
        }
    }
}

/// Ignición del cliente de enjambre (runtime Tokio dedicado).
fn ignite_client_mode(surface: CommandSurface, stop_flag: Arc<AtomicBool>) -> i32 {
    let client_options = ClientOptions {
        server_address: surface
            .client_server_address
            .clone()
            .expect("guarded by caller"),
        port: surface.server_port,
        cpu_threads: effective_cpu_threads(&surface),
        network_timeout: Duration::from_millis(surface.network_timeout_millis),
        runtime_seed: effective_runtime_seed(&surface),
        ship_herd: surface.save_kangaroos_via_server,
        save_period_seconds: surface.save_period_seconds,
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(runtime_fault) => {
            error!("❌ [RUNTIME_FAULT]: {}", runtime_fault);
            return 1;
        }
    };

    match runtime.block_on(run_client(client_options, stop_flag)) {
        Ok(exit_code) => exit_code,
        Err(client_fault) => {
            error!("❌ [CLIENT_FAULT]: {:#}", client_fault);
            1
        }
    }
}
