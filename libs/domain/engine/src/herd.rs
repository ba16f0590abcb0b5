// [libs/domain/engine/src/herd.rs]
/*!
 * =================================================================
 * APARATO: TAME/WILD HERD ENGINE (V20.0 - RESILIENT GOLD)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: SIEMBRA, INVARIANTE Y RESURRECCIÓN DE CANGUROS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. INVARIANT SOVEREIGNTY: Todo canguro satisface en todo paso
 *    pos = (kmin + d) * G (Tame) o pos = P + (o + d) * G (Wild).
 * 2. OFFSET STRATA: Los sub-enjambres salvajes reciben offsets
 *    deterministas por ranura; el offset se pliega en la distancia al
 *    emitir un DP, manteniendo la etiqueta en 2 bits.
 * 3. PHOENIX RESURRECTION: Un canguro atrapado en un ciclo infructuoso
 *    se reemplaza por una siembra fresca de la misma manada; el trabajo
 *    parcial se descarta sin afectar la corrección de la búsqueda.
 * =================================================================
 */

use crate::errors::EngineError;
use kangaroo_core_math::prelude::*;
use kangaroo_domain_models::dp::HerdKind;
use kangaroo_domain_models::herd::KangarooSnapshot;
use kangaroo_domain_models::scope::SearchScope;
use rand::RngCore;

/// Ranuras de offset salvaje disponibles para sub-enjambres en red.
pub const WILD_OFFSET_SLOT_COUNT: u32 = 64;
/// Intentos de siembra antes de declarar colapso (escalares nulos, etc.).
const MAXIMUM_SPAWN_ATTEMPTS: u32 = 16;

/// Caminante del método lambda: posición, distancia y manada.
#[derive(Debug, Clone)]
pub struct Kangaroo {
    /// Posición actual en el plano afín.
    pub position: AffinePoint,
    /// Distancia acumulada con signo desde el origen de la trayectoria.
    pub distance: i128,
    /// Manada de pertenencia.
    pub kind: HerdKind,
    /// Offset determinista del sub-enjambre (0 para Tame y el enjambre local).
    pub wild_offset: i128,
    /// Pasos desde el último Punto Distinguido emitido (detección de ciclos).
    pub steps_since_last_dp: u64,
}

impl Kangaroo {
    /**
     * Siembra un canguro Tame: d aleatoria en [0, W), pos = (kmin + d) * G.
     *
     * # Errors:
     * `HerdSpawnFault` si la siembra colapsa repetidamente (escalar nulo).
     */
    pub fn spawn_tame(
        scope: &SearchScope,
        entropy_source: &mut impl RngCore,
    ) -> Result<Self, EngineError> {
        let width_limbs = scope.width_limbs();

        for _ in 0..MAXIMUM_SPAWN_ATTEMPTS {
            let distance_draw = limbs_to_u128(&random_limbs_below(&width_limbs, entropy_source))
                .expect("width certified below 2^125") as i128;

            let start_scalar = scope.range_start_scalar().add_signed_mod_n(distance_draw);
            if start_scalar.is_zero() {
                continue;
            }

            let seed_key = SafePrivateKey::from_scalar(&start_scalar)?;
            return Ok(Self {
                position: SafePublicKey::from_private(&seed_key).to_affine(),
                distance: distance_draw,
                kind: HerdKind::Tame,
                wild_offset: 0,
                steps_since_last_dp: 0,
            });
        }

        Err(EngineError::HerdSpawnFault("TAME_SEED_EXHAUSTED".to_string()))
    }

    /**
     * Siembra un canguro Wild: d aleatoria en [-W/2, W/2), pos = P + (o + d) * G.
     *
     * # Errors:
     * `HerdSpawnFault` si el tweak colapsa repetidamente (punto identidad).
     */
    pub fn spawn_wild(
        scope: &SearchScope,
        wild_offset: i128,
        entropy_source: &mut impl RngCore,
    ) -> Result<Self, EngineError> {
        let width_limbs = scope.width_limbs();
        let half_width = (limbs_to_u128(&width_limbs).expect("width certified below 2^125") / 2) as i128;
        let target_key = scope.target_public_key()?;

        for _ in 0..MAXIMUM_SPAWN_ATTEMPTS {
            let unsigned_draw = limbs_to_u128(&random_limbs_below(&width_limbs, entropy_source))
                .expect("width certified below 2^125") as i128;
            let distance_draw = unsigned_draw - half_width;

            let tweak_scalar = Scalar::ZERO.add_signed_mod_n(wild_offset + distance_draw);
            let seeded_point = match target_key.add_scalar(&tweak_scalar.to_u256_be()) {
                Ok(point) => point,
                Err(_) => continue,
            };

            return Ok(Self {
                position: seeded_point.to_affine(),
                distance: distance_draw,
                kind: HerdKind::Wild,
                wild_offset,
                steps_since_last_dp: 0,
            });
        }

        Err(EngineError::HerdSpawnFault("WILD_SEED_EXHAUSTED".to_string()))
    }

    /// Resiembra el canguro conservando manada y offset (resurrección Phoenix).
    pub fn respawn(
        &mut self,
        scope: &SearchScope,
        entropy_source: &mut impl RngCore,
    ) -> Result<(), EngineError> {
        *self = match self.kind {
            HerdKind::Tame => Self::spawn_tame(scope, entropy_source)?,
            HerdKind::Wild => Self::spawn_wild(scope, self.wild_offset, entropy_source)?,
        };
        Ok(())
    }

    /// Distancia de envío con el offset de sub-enjambre plegado.
    #[inline(always)]
    #[must_use]
    pub fn shipped_distance(&self) -> i128 {
        match self.kind {
            HerdKind::Tame => self.distance,
            HerdKind::Wild => self.distance + self.wild_offset,
        }
    }

    /**
     * Certifica el invariante de posición contra la librería de curva:
     * Tame: pos == (kmin + d) * G; Wild: pos == P + (o + d) * G.
     */
    #[must_use]
    pub fn verify_position(&self, scope: &SearchScope) -> bool {
        let expected_point = match self.kind {
            HerdKind::Tame => {
                let start_scalar = scope.range_start_scalar().add_signed_mod_n(self.distance);
                if start_scalar.is_zero() {
                    return false;
                }
                match SafePrivateKey::from_scalar(&start_scalar) {
                    Ok(seed_key) => SafePublicKey::from_private(&seed_key).to_affine(),
                    Err(_) => return false,
                }
            }
            HerdKind::Wild => {
                let tweak_scalar = Scalar::ZERO.add_signed_mod_n(self.wild_offset + self.distance);
                let target_key = match scope.target_public_key() {
                    Ok(key) => key,
                    Err(_) => return false,
                };
                match target_key.add_scalar(&tweak_scalar.to_u256_be()) {
                    Ok(point) => point.to_affine(),
                    Err(_) => return false,
                }
            }
        };
        expected_point == self.position
    }

    /// Proyección al registro serializable de la barrera de guardado.
    #[must_use]
    pub fn to_snapshot(&self) -> KangarooSnapshot {
        KangarooSnapshot {
            position_x: self.position.x.to_bytes_be(),
            position_y: self.position.y.to_bytes_be(),
            distance: self.distance,
            kind: self.kind,
            wild_offset: self.wild_offset,
        }
    }

    /// Reconstrucción desde un registro de guardado (trayectoria de resume).
    #[must_use]
    pub fn from_snapshot(snapshot: &KangarooSnapshot) -> Self {
        Self {
            position: AffinePoint::from_coordinates(
                FieldElement::from_bytes_be(&snapshot.position_x),
                FieldElement::from_bytes_be(&snapshot.position_y),
            ),
            distance: snapshot.distance,
            kind: snapshot.kind,
            wild_offset: snapshot.wild_offset,
            steps_since_last_dp: 0,
        }
    }
}

/**
 * Offset determinista de la ranura de sub-enjambre salvaje.
 * Ranuras distintas desplazan el centro de la manada en fracciones del rango.
 */
#[must_use]
pub fn wild_offset_for_slot(slot: u32, width_limbs: &U256Limbs) -> i128 {
    let width_value = limbs_to_u128(width_limbs).unwrap_or(u128::MAX >> 3) as i128;
    (slot % WILD_OFFSET_SLOT_COUNT) as i128 * (width_value / WILD_OFFSET_SLOT_COUNT as i128)
}

/**
 * Siembra la manada completa: mitad Tame, mitad Wild, ranura única.
 *
 * # Errors:
 * Propaga fallos de siembra individuales.
 */
pub fn spawn_herd(
    scope: &SearchScope,
    herd_size: usize,
    wild_offset: i128,
    entropy_source: &mut impl RngCore,
) -> Result<Vec<Kangaroo>, EngineError> {
    let mut herd = Vec::with_capacity(herd_size);
    for herd_index in 0..herd_size {
        if herd_index % 2 == 0 {
            herd.push(Kangaroo::spawn_tame(scope, entropy_source)?);
        } else {
            herd.push(Kangaroo::spawn_wild(scope, wild_offset, entropy_source)?);
        }
    }
    Ok(herd)
}
