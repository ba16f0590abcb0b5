// [apps/solver/src/diagnostics.rs]
/*!
 * =================================================================
 * APARATO: DIAGNOSTICS MODE (V5.0 - PARITY CERTIFIED)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: INVENTARIO DE DISPOSITIVOS Y PARIDAD DE KERNELS
 * =================================================================
 */

use crate::config::ParsedTargetConfig;
use anyhow::{Context, Result};
use kangaroo_core_trapstore::DistinguishedFilter;
use kangaroo_domain_engine::gpu::{certify_kernel_parity, enumerate_devices, ReferenceKernel};
use kangaroo_domain_engine::{spawn_herd, JumpTable};
use kangaroo_domain_models::scope::SearchScope;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{info, warn};

/// Canguros del lote de certificación de paridad.
const PARITY_HERD_SIZE: usize = 16;
/// Saltos del lote de certificación de paridad.
const PARITY_BATCH_STEPS: u32 = 256;

/// Lista el inventario de dispositivos aceleradores del host.
#[must_use]
pub fn list_devices() -> i32 {
    let device_inventory = enumerate_devices();
    if device_inventory.is_empty() {
        info!("🔍 [DEVICE_INVENTORY]: No accelerator runtime compiled into this build.");
    } else {
        for device in &device_inventory {
            info!(
                "🔍 [DEVICE_{}]: {} (grid {}x{})",
                device.device_index, device.label, device.grid_width, device.grid_height
            );
        }
    }
    0
}

/**
 * Certifica la paridad del kernel acelerador contra la trayectoria CPU:
 * misma regla de salto, mismas posiciones, mismos Puntos Distinguidos.
 *
 * # Errors:
 * Propaga colapsos del motor durante la certificación.
 */
pub fn certify_kernel(parsed_config: Option<&ParsedTargetConfig>) -> Result<i32> {
    let scope = match parsed_config {
        Some(config) => {
            let (target_x, target_y) = config.target_coordinates();
            SearchScope::new(
                config.range_start,
                config.range_end,
                target_x,
                target_y,
                8,
                None,
            )
            .context("CHECK_SCOPE_VIOLATION")?
        }
        None => synthetic_check_scope()?,
    };

    let jump_table = Arc::new(JumpTable::derive(&scope)?);
    let filter = DistinguishedFilter::new(scope.dp_bits);
    let mut seeding_entropy = StdRng::seed_from_u64(0x4C414D424441);
    let seed_herd = spawn_herd(&scope, PARITY_HERD_SIZE, 0, &mut seeding_entropy)?;

    let mut reference_kernel = ReferenceKernel::new(
        scope,
        Arc::clone(&jump_table),
        filter,
        PARITY_HERD_SIZE,
        0,
    );

    let parity_verdict = certify_kernel_parity(
        &mut reference_kernel,
        &scope,
        &jump_table,
        filter,
        &seed_herd,
        PARITY_BATCH_STEPS,
    )?;

    if parity_verdict {
        info!("✅ [CHECK_PASSED]: Kernel applies the canonical jump rule bit-perfectly.");
        Ok(0)
    } else {
        warn!("❌ [CHECK_FAILED]: Kernel diverged from the CPU trajectory.");
        Ok(1)
    }
}

/// Objetivo sintético de certificación: k = 0xC0FFEE en [0, 2^32).
fn synthetic_check_scope() -> Result<SearchScope> {
    use kangaroo_core_math::prelude::*;

    let mut secret_bytes = [0u8; 32];
    secret_bytes[29] = 0xC0;
    secret_bytes[30] = 0xFF;
    secret_bytes[31] = 0xEE;
    let secret_key = SafePrivateKey::from_bytes(&secret_bytes).context("CHECK_SYNTHETIC_KEY")?;
    let target_point = SafePublicKey::from_private(&secret_key).to_affine();

    let mut range_end = [0u8; 32];
    range_end[27] = 0x01;

    Ok(SearchScope::new(
        [0u8; 32],
        range_end,
        target_point.x.to_bytes_be(),
        target_point.y.to_bytes_be(),
        8,
        None,
    )
    .context("CHECK_SYNTHETIC_SCOPE")?)
}
