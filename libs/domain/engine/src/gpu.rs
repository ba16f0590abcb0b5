// [libs/domain/engine/src/gpu.rs]
/*!
 * =================================================================
 * APARATO: GPU KERNEL BOUNDARY (V9.0 - ABSTRACT CONTRACT)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: FRONTERA ABSTRACTA DE KERNELS EXTERNOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CONTRACT FIRST: Un kernel externo recibe un segmento de manada y
 *    retorna los Puntos Distinguidos emitidos; el contrato exige la
 *    MISMA regla de salto que los workers de CPU.
 * 2. REFERENCE PARITY: El kernel de referencia (CPU) respalda la
 *    certificación '-check' y el proving grounds sin silicio dedicado.
 * 3. INVENTORY HONESTY: Sin runtime de dispositivo compilado, el
 *    inventario reporta vacío en lugar de fabricar hardware.
 * =================================================================
 */

use crate::errors::EngineError;
use crate::herd::Kangaroo;
use crate::jump::JumpTable;
use crate::stepper::{HerdStepper, StepStatistics};
use kangaroo_core_trapstore::DistinguishedFilter;
use kangaroo_domain_models::dp::DistinguishedPoint;
use kangaroo_domain_models::scope::SearchScope;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::info;

/// Descriptor de un dispositivo acelerador disponible.
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    /// Índice lógico del dispositivo.
    pub device_index: u32,
    /// Etiqueta nominal reportada por el runtime.
    pub label: String,
    /// Geometría de grid por defecto (x).
    pub grid_width: u32,
    /// Geometría de grid por defecto (y).
    pub grid_height: u32,
}

/**
 * Enumera los dispositivos aceleradores del host.
 * Sin un runtime de dispositivo compilado el inventario es vacío.
 */
#[must_use]
pub fn enumerate_devices() -> Vec<DeviceDescriptor> {
    Vec::new()
}

/**
 * Contrato de un kernel acelerador: aplicar la regla de salto canónica
 * sobre un segmento de manada residente y emitir los DPs alcanzados.
 */
pub trait GpuKernel: Send {
    /// Etiqueta del dispositivo que respalda el kernel.
    fn device_label(&self) -> String;

    /**
     * Ejecuta `batch_steps` saltos sobre el segmento de manada.
     *
     * # Errors:
     * Propaga fallos del dispositivo o de la aritmética subyacente.
     */
    fn launch_batch(
        &mut self,
        herd_segment: &mut [Kangaroo],
        batch_steps: u32,
        emitted_points: &mut Vec<DistinguishedPoint>,
    ) -> Result<StepStatistics, EngineError>;
}

/// Kernel de referencia: la trayectoria CPU detrás del contrato GPU.
pub struct ReferenceKernel {
    scope: SearchScope,
    jump_table: Arc<JumpTable>,
    stepper: HerdStepper,
    entropy_source: StdRng,
}

impl ReferenceKernel {
    /// Construye el kernel de referencia para el objetivo dado.
    #[must_use]
    pub fn new(
        scope: SearchScope,
        jump_table: Arc<JumpTable>,
        filter: DistinguishedFilter,
        herd_capacity: usize,
        runtime_seed: u64,
    ) -> Self {
        Self {
            scope,
            jump_table,
            stepper: HerdStepper::new(filter, herd_capacity),
            entropy_source: StdRng::seed_from_u64(runtime_seed),
        }
    }
}

impl GpuKernel for ReferenceKernel {
    fn device_label(&self) -> String {
        "reference-cpu-kernel".to_string()
    }

    fn launch_batch(
        &mut self,
        herd_segment: &mut [Kangaroo],
        batch_steps: u32,
        emitted_points: &mut Vec<DistinguishedPoint>,
    ) -> Result<StepStatistics, EngineError> {
        let mut statistics = StepStatistics::default();
        for _ in 0..batch_steps {
            self.stepper.advance(
                herd_segment,
                &self.jump_table,
                &self.scope,
                &mut self.entropy_source,
                &mut |distinguished_point| emitted_points.push(distinguished_point),
                &mut statistics,
            )?;
        }
        Ok(statistics)
    }
}

/**
 * Certifica la paridad de un kernel contra la trayectoria CPU canónica:
 * mismas posiciones, mismas distancias y mismos DPs tras N saltos.
 *
 * # Errors:
 * Propaga fallos del kernel o del stepper de referencia.
 */
pub fn certify_kernel_parity(
    kernel: &mut dyn GpuKernel,
    scope: &SearchScope,
    jump_table: &Arc<JumpTable>,
    filter: DistinguishedFilter,
    seed_herd: &[Kangaroo],
    batch_steps: u32,
) -> Result<bool, EngineError> {
    let mut kernel_herd: Vec<Kangaroo> = seed_herd.to_vec();
    let mut cpu_herd: Vec<Kangaroo> = seed_herd.to_vec();

    let mut kernel_points = Vec::new();
    kernel.launch_batch(&mut kernel_herd, batch_steps, &mut kernel_points)?;

    let mut cpu_stepper = HerdStepper::new(filter, cpu_herd.len());
    let mut cpu_entropy = StdRng::seed_from_u64(0);
    let mut cpu_points = Vec::new();
    let mut cpu_statistics = StepStatistics::default();
    for _ in 0..batch_steps {
        cpu_stepper.advance(
            &mut cpu_herd,
            jump_table,
            scope,
            &mut cpu_entropy,
            &mut |distinguished_point| cpu_points.push(distinguished_point),
            &mut cpu_statistics,
        )?;
    }

    let herd_parity = kernel_herd
        .iter()
        .zip(cpu_herd.iter())
        .all(|(kernel_unit, cpu_unit)| {
            kernel_unit.position == cpu_unit.position && kernel_unit.distance == cpu_unit.distance
        });
    let point_parity = kernel_points == cpu_points;

    info!(
        "🧪 [KERNEL_PARITY]: device={} herd={} points={} ({} DPs)",
        kernel.device_label(),
        herd_parity,
        point_parity,
        cpu_points.len()
    );

    Ok(herd_parity && point_parity)
}
