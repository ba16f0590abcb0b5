// [libs/core/trapstore/src/table.rs]
/*!
 * =================================================================
 * APARATO: SHARDED TRAP TABLE (V44.0 - COLLISION SOVEREIGN)
 * CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
 * RESPONSABILIDAD: TABLA CONCURRENTE DE HUELLAS TAME/WILD
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PER-BUCKET SERIALIZATION: 2^h cubetas independientes bajo cerrojo
 *    de giro propio; ningún cerrojo global en el camino de inserción.
 * 2. SORTED FINGERPRINTS: Cada cubeta mantiene sus huellas ordenadas
 *    para búsqueda binaria O(log k) e intercalado canónico en merges.
 * 3. SOFT CAPACITY: Superar la capacidad blanda de cubeta registra la
 *    presión de memoria; el derrame se materializa en el siguiente
 *    guardado particionado.
 *
 * # Mathematical Proof (Cross-Herd Collision):
 * Dos huellas iguales con etiquetas opuestas implican que ambas
 * trayectorias visitaron el mismo punto x, cediendo el logaritmo
 * discreto k = kmin + d_tame - d_wild al resolutor.
 * =================================================================
 */

use crate::spinlock::SpinMutex;
use kangaroo_core_math::prelude::*;
use kangaroo_domain_models::dp::{
    pack_distance_tag, unpack_signed_distance, DistinguishedPoint, HerdKind,
};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Bits de particionamiento por defecto (2^18 = 262.144 cubetas).
pub const DEFAULT_BUCKET_BITS: u32 = 18;
/// Capacidad blanda de una cubeta antes de registrar presión de memoria.
pub const BUCKET_SOFT_CAPACITY: usize = 16;

/// Entrada compacta del almacén: huella alta de x + distancia empaquetada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapEntry {
    /// 128 bits altos de la coordenada X (el índice de cubeta aporta los bajos).
    pub x_fingerprint: u128,
    /// Etiqueta de manada (2 bits bajos) + distancia c-a-dos de 126 bits.
    pub packed_distance: u128,
}

impl TrapEntry {
    /// Proyección de huella: limbs altos de la coordenada X.
    #[inline(always)]
    #[must_use]
    pub fn fingerprint_of(x_limbs: &U256Limbs) -> u128 {
        ((x_limbs[3] as u128) << 64) | (x_limbs[2] as u128)
    }

    /// Construye la entrada compacta desde un Punto Distinguido completo.
    #[inline(always)]
    #[must_use]
    pub fn from_distinguished(point: &DistinguishedPoint) -> Self {
        let x_limbs = limbs_from_be_bytes(&point.x);
        Self {
            x_fingerprint: Self::fingerprint_of(&x_limbs),
            packed_distance: pack_distance_tag(point.distance, point.kind),
        }
    }

    /// Bits de etiqueta de manada (0 = Tame, 1 = Wild).
    #[inline(always)]
    #[must_use]
    pub fn tag_bits(&self) -> u8 {
        (self.packed_distance & 0b11) as u8
    }

    /// Distancia acumulada con signo.
    #[inline(always)]
    #[must_use]
    pub fn signed_distance(&self) -> i128 {
        unpack_signed_distance(self.packed_distance)
    }

    /// Byte de shard del archivo particionado (byte alto de x).
    #[inline(always)]
    #[must_use]
    pub fn shard_byte(&self) -> u8 {
        (self.x_fingerprint >> 120) as u8
    }
}

/// Veredicto de una inserción en el almacén de trampas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Huella inédita registrada.
    Fresh,
    /// Entrada idéntica ya presente (descartada).
    Duplicate,
    /// Fusión de trayectorias dentro de la misma manada (descartada, stall).
    SameHerdFusion,
    /// ¡Colisión cruzada Tame/Wild! El resolutor recibe ambas distancias.
    Collision {
        /// Distancia acumulada de la trayectoria Tame.
        tame_distance: i128,
        /// Distancia acumulada de la trayectoria Wild (offset plegado).
        wild_distance: i128,
    },
}

/// Tabla de huellas particionada y concurrente del enjambre.
pub struct TrapTable {
    bucket_bits: u32,
    bucket_mask: u64,
    buckets: Vec<SpinMutex<Vec<TrapEntry>>>,
    entry_count: AtomicU64,
    fusion_count: AtomicU64,
    overflow_count: AtomicU64,
}

impl TrapTable {
    /// Construye la tabla con el particionamiento por defecto (2^18).
    #[must_use]
    pub fn new() -> Self {
        Self::with_bucket_bits(DEFAULT_BUCKET_BITS)
    }

    /// Construye la tabla con 2^bucket_bits cubetas.
    #[must_use]
    pub fn with_bucket_bits(bucket_bits: u32) -> Self {
        let bucket_count = 1usize << bucket_bits;
        let mut buckets = Vec::with_capacity(bucket_count);
        for _ in 0..bucket_count {
            buckets.push(SpinMutex::new(Vec::new()));
        }

        Self {
            bucket_bits,
            bucket_mask: (bucket_count as u64) - 1,
            buckets,
            entry_count: AtomicU64::new(0),
            fusion_count: AtomicU64::new(0),
            overflow_count: AtomicU64::new(0),
        }
    }

    /// Bits de particionamiento configurados.
    #[must_use]
    pub fn bucket_bits(&self) -> u32 {
        self.bucket_bits
    }

    /// Cantidad total de cubetas (2^h).
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Índice de cubeta de una coordenada X: x mod 2^h.
    #[inline(always)]
    #[must_use]
    pub fn bucket_index_of(&self, x_limbs: &U256Limbs) -> usize {
        (x_limbs[0] & self.bucket_mask) as usize
    }

    /**
     * Inserta un Punto Distinguido y dictamina el veredicto.
     *
     * # Logic (por cubeta, bajo cerrojo de giro):
     * 1. Búsqueda binaria de la huella.
     * 2. Etiqueta opuesta  -> Collision (el cerrojo se libera al retornar).
     * 3. Misma etiqueta + misma distancia -> Duplicate (descarte).
     * 4. Misma etiqueta + distinta distancia -> SameHerdFusion (stall).
     * 5. Huella inédita -> inserción ordenada con duplicación de capacidad.
     */
    pub fn insert(&self, point: &DistinguishedPoint) -> InsertOutcome {
        let x_limbs = limbs_from_be_bytes(&point.x);
        let bucket_index = self.bucket_index_of(&x_limbs);
        let candidate_entry = TrapEntry {
            x_fingerprint: TrapEntry::fingerprint_of(&x_limbs),
            packed_distance: pack_distance_tag(point.distance, point.kind),
        };

        let mut bucket_guard = self.buckets[bucket_index].lock();

        match bucket_guard
            .binary_search_by(|probe| probe.x_fingerprint.cmp(&candidate_entry.x_fingerprint))
        {
            Ok(existing_position) => {
                let existing_entry = bucket_guard[existing_position];

                if existing_entry.tag_bits() != candidate_entry.tag_bits() {
                    let (tame_distance, wild_distance) =
                        if existing_entry.tag_bits() == HerdKind::Tame.to_tag_bits() {
                            (existing_entry.signed_distance(), candidate_entry.signed_distance())
                        } else {
                            (candidate_entry.signed_distance(), existing_entry.signed_distance())
                        };
                    return InsertOutcome::Collision { tame_distance, wild_distance };
                }

                if existing_entry.packed_distance == candidate_entry.packed_distance {
                    return InsertOutcome::Duplicate;
                }

                self.fusion_count.fetch_add(1, Ordering::Relaxed);
                InsertOutcome::SameHerdFusion
            }
            Err(insertion_position) => {
                bucket_guard.insert(insertion_position, candidate_entry);
                let occupancy = bucket_guard.len();
                drop(bucket_guard);

                self.entry_count.fetch_add(1, Ordering::Relaxed);
                if occupancy == BUCKET_SOFT_CAPACITY + 1 {
                    self.overflow_count.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "⚠️ [BUCKET_PRESSURE]: Bucket {} exceeded soft capacity ({}); spill deferred to next partitioned save.",
                        bucket_index, BUCKET_SOFT_CAPACITY
                    );
                }
                InsertOutcome::Fresh
            }
        }
    }

    /// Copia consistente de una cubeta (bajo su cerrojo).
    #[must_use]
    pub fn snapshot_bucket(&self, bucket_index: usize) -> Vec<TrapEntry> {
        self.buckets[bucket_index].lock().clone()
    }

    /**
     * Reemplaza el contenido de una cubeta (trayectoria de carga).
     * Las entradas deben llegar ordenadas por huella; el contador global
     * se ajusta por la diferencia de ocupación.
     */
    pub fn replace_bucket(&self, bucket_index: usize, sorted_entries: Vec<TrapEntry>) {
        debug_assert!(sorted_entries.windows(2).all(|pair| pair[0].x_fingerprint < pair[1].x_fingerprint));

        let mut bucket_guard = self.buckets[bucket_index].lock();
        let previous_occupancy = bucket_guard.len() as u64;
        let incoming_occupancy = sorted_entries.len() as u64;
        *bucket_guard = sorted_entries;
        drop(bucket_guard);

        self.entry_count.fetch_add(incoming_occupancy, Ordering::Relaxed);
        self.entry_count.fetch_sub(previous_occupancy, Ordering::Relaxed);
    }

    /**
     * Vacía la tabla completa preservando el particionamiento.
     * Utilizado por el protocolo de división del servidor (-wsplit).
     */
    pub fn reset(&self) {
        for bucket in &self.buckets {
            bucket.lock().clear();
        }
        self.entry_count.store(0, Ordering::Relaxed);
        self.fusion_count.store(0, Ordering::Relaxed);
        self.overflow_count.store(0, Ordering::Relaxed);
    }

    /// Volumen total de huellas registradas.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.entry_count.load(Ordering::Relaxed)
    }

    /// Fusiones de trayectoria intra-manada observadas (stalls).
    #[must_use]
    pub fn fusion_count(&self) -> u64 {
        self.fusion_count.load(Ordering::Relaxed)
    }

    /// Cubetas que superaron la capacidad blanda.
    #[must_use]
    pub fn overflow_count(&self) -> u64 {
        self.overflow_count.load(Ordering::Relaxed)
    }
}

impl Default for TrapTable {
    fn default() -> Self {
        Self::new()
    }
}
