// [libs/domain/engine/src/resolver.rs]
/*!
 * =================================================================
 * APARATO: COLLISION RESOLVER (V13.0 - VERIFICATION SEALED)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: RECONSTRUCCIÓN Y CERTIFICACIÓN DEL LOGARITMO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CANDIDATE ALGEBRA: k = (kmin + d_tame - d_wild) mod n; los offsets
 *    de sub-enjambre llegan plegados en d_wild.
 * 2. CURVE VERDICT: Toda colisión candidata se certifica contra la
 *    curva (k * G == P) antes de emitirse al sumidero de resultados.
 * 3. STORM SHIELD: Las colisiones no verificables se contabilizan; una
 *    tormenta (>= 4) delata corrupción aritmética o de work file y
 *    aborta la campaña.
 * =================================================================
 */

use crate::errors::EngineError;
use kangaroo_core_math::prelude::*;
use kangaroo_domain_models::finding::Finding;
use kangaroo_domain_models::scope::SearchScope;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Colisiones no verificables toleradas antes de abortar la campaña.
pub const MAXIMUM_BAD_COLLISIONS: u64 = 4;

/// Resolutor soberano de colisiones cruzadas Tame/Wild.
pub struct CollisionResolver {
    scope: SearchScope,
    target_compressed_hex: String,
    output_path: Option<PathBuf>,
    output_sink_mutex: Mutex<()>,
    bad_collision_count: AtomicU64,
    finding_counter: AtomicU64,
}

impl CollisionResolver {
    /**
     * Construye el resolutor para el objetivo dado.
     *
     * # Errors:
     * Propaga fallos de decodificación del objetivo (imposibles para un
     * scope certificado).
     */
    pub fn new(scope: SearchScope, output_path: Option<PathBuf>) -> Result<Self, EngineError> {
        let target_compressed_hex = hex::encode(scope.target_public_key()?.to_bytes(true));
        Ok(Self {
            scope,
            target_compressed_hex,
            output_path,
            output_sink_mutex: Mutex::new(()),
            bad_collision_count: AtomicU64::new(0),
            finding_counter: AtomicU64::new(0),
        })
    }

    /**
     * Resuelve una colisión cruzada y certifica el candidato.
     *
     * # Returns:
     * - `Ok(Some(finding))` para un logaritmo verificado (ya persistido).
     * - `Ok(None)` para una colisión espuria dentro de la tolerancia.
     *
     * # Errors:
     * `BadCollisionStorm` al exceder la tolerancia de colisiones malas.
     */
    pub fn resolve(
        &self,
        tame_distance: i128,
        wild_distance: i128,
        operations_estimate: f64,
        elapsed_seconds: u64,
    ) -> Result<Option<Finding>, EngineError> {
        let candidate_scalar = self
            .scope
            .range_start_scalar()
            .add_signed_mod_n(tame_distance - wild_distance);

        if self.verify_candidate(&candidate_scalar) {
            let finding = self.seal_finding(&candidate_scalar, operations_estimate, elapsed_seconds)?;
            return Ok(Some(finding));
        }

        let observed_bad = self.bad_collision_count.fetch_add(1, Ordering::SeqCst) + 1;
        warn!(
            "🩻 [BAD_COLLISION]: Candidate verification failed ({}/{}). Same-herd slip or x-mirror artifact.",
            observed_bad, MAXIMUM_BAD_COLLISIONS
        );

        if observed_bad >= MAXIMUM_BAD_COLLISIONS {
            error!("💀 [COLLISION_STORM]: Aborting campaign; arithmetic bug or corrupt work file suspected.");
            return Err(EngineError::BadCollisionStorm { observed: observed_bad });
        }

        Ok(None)
    }

    /// Certificación bit-perfecta: k * G == P.
    fn verify_candidate(&self, candidate_scalar: &Scalar) -> bool {
        if candidate_scalar.is_zero() {
            return false;
        }
        let candidate_key = match SafePrivateKey::from_scalar(candidate_scalar) {
            Ok(key) => key,
            Err(_) => return false,
        };
        let derived_point = SafePublicKey::from_private(&candidate_key);
        hex::encode(derived_point.to_bytes(true)) == self.target_compressed_hex
    }

    /// Sella el hallazgo, lo persiste y lo reporta al rastro.
    fn seal_finding(
        &self,
        candidate_scalar: &Scalar,
        operations_estimate: f64,
        elapsed_seconds: u64,
    ) -> Result<Finding, EngineError> {
        let finding = Finding {
            private_key_hex: candidate_scalar.to_hex(),
            public_key_hex: self.target_compressed_hex.clone(),
            candidate_index: self.finding_counter.fetch_add(1, Ordering::SeqCst) + 1,
            operations_log2: operations_estimate.max(1.0).log2(),
            elapsed_seconds,
            detected_at: chrono::Utc::now().to_rfc3339(),
        };

        if let Some(output_path) = &self.output_path {
            // El sumidero es append-only y está serializado por mutex;
            // ningún otro cerrojo se mantiene durante la E/S.
            let _sink_guard = self
                .output_sink_mutex
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let mut output_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(output_path)?;
            output_file.write_all(finding.format_output_line().as_bytes())?;
        }

        info!(
            "🎯 [KEY_RECOVERED]: Priv 0x{} certified against target (candidate #{}).",
            finding.private_key_hex, finding.candidate_index
        );

        Ok(finding)
    }

    /// Colisiones espurias observadas.
    #[must_use]
    pub fn bad_collision_count(&self) -> u64 {
        self.bad_collision_count.load(Ordering::Relaxed)
    }
}
