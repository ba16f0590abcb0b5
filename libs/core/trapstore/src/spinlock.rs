// [libs/core/trapstore/src/spinlock.rs]
/*!
 * =================================================================
 * APARATO: BUCKET SPIN LOCK (V4.0 - BACKOFF GOLD)
 * CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
 * RESPONSABILIDAD: SERIALIZACIÓN LIGERA POR CUBETA
 *
 * # Mathematical Proof (Contention Profile):
 * Las secciones críticas de cubeta duran microsegundos (búsqueda binaria
 * + inserción). Un cerrojo test-and-set con retroceso exponencial evita
 * el coste de un futex del sistema operativo en el camino sin contención.
 * =================================================================
 */

use std::cell::UnsafeCell;
use std::hint::spin_loop;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

/// Iteraciones de giro antes de ceder el quantum al planificador.
const SPIN_YIELD_THRESHOLD: u32 = 64;

/// Cerrojo de giro mínimo que protege el contenido de una cubeta.
pub struct SpinMutex<ProtectedValue> {
    occupancy_flag: AtomicBool,
    protected_value: UnsafeCell<ProtectedValue>,
}

// La exclusión mutua del flag de ocupación garantiza acceso único.
unsafe impl<ProtectedValue: Send> Sync for SpinMutex<ProtectedValue> {}
unsafe impl<ProtectedValue: Send> Send for SpinMutex<ProtectedValue> {}

impl<ProtectedValue> SpinMutex<ProtectedValue> {
    /// Construye el cerrojo liberado alrededor del valor inicial.
    pub const fn new(initial_value: ProtectedValue) -> Self {
        Self {
            occupancy_flag: AtomicBool::new(false),
            protected_value: UnsafeCell::new(initial_value),
        }
    }

    /**
     * Adquiere el cerrojo mediante test-and-set con retroceso exponencial.
     */
    #[inline(always)]
    pub fn lock(&self) -> SpinMutexGuard<'_, ProtectedValue> {
        let mut backoff_rounds: u32 = 1;
        loop {
            // Fast-path: lectura relajada antes del intento atómico
            if !self.occupancy_flag.load(Ordering::Relaxed)
                && self
                    .occupancy_flag
                    .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
            {
                return SpinMutexGuard { parent_lock: self };
            }

            for _ in 0..backoff_rounds {
                spin_loop();
            }
            if backoff_rounds < SPIN_YIELD_THRESHOLD {
                backoff_rounds <<= 1;
            } else {
                std::thread::yield_now();
            }
        }
    }

    /// Acceso exclusivo sin contención (requiere &mut, sin coste atómico).
    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut ProtectedValue {
        self.protected_value.get_mut()
    }
}

/// Guardia RAII del cerrojo de giro.
pub struct SpinMutexGuard<'a, ProtectedValue> {
    parent_lock: &'a SpinMutex<ProtectedValue>,
}

impl<ProtectedValue> Deref for SpinMutexGuard<'_, ProtectedValue> {
    type Target = ProtectedValue;

    #[inline(always)]
    fn deref(&self) -> &ProtectedValue {
        unsafe { &*self.parent_lock.protected_value.get() }
    }
}

impl<ProtectedValue> DerefMut for SpinMutexGuard<'_, ProtectedValue> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut ProtectedValue {
        unsafe { &mut *self.parent_lock.protected_value.get() }
    }
}

impl<ProtectedValue> Drop for SpinMutexGuard<'_, ProtectedValue> {
    #[inline(always)]
    fn drop(&mut self) {
        self.parent_lock.occupancy_flag.store(false, Ordering::Release);
    }
}
