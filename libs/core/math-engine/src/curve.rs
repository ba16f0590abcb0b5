// [libs/core/math-engine/src/curve.rs]
/*!
 * =================================================================
 * APARATO: AFFINE CURVE ENGINE (V131.0 - BATCH SOVEREIGN)
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: LEY DE GRUPO AFÍN Y ADICIÓN POR LOTE PARA LA MANADA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. MONTGOMERY SYNERGY: La adición por lote acumula los denominadores
 *    (x2 - x1) del salto de toda la manada y los invierte con un único
 *    ciclo Fermat vía 'batch_invert_into'.
 * 2. SINGULARITY SHIELD: Los pares degenerados (x iguales, identidades)
 *    se excluyen del lote y se resuelven por la trayectoria escalar.
 * 3. NOMINAL PURITY: Nomenclatura descriptiva absoluta (H -> horizontal_distance).
 *
 * # Mathematical Proof (Chord-Tangent Law):
 * Para P != ±Q: λ = (y2-y1)/(x2-x1), x3 = λ^2 - x1 - x2,
 * y3 = λ(x1-x3) - y1. Para P == Q: λ = 3x^2 / 2y.
 * =================================================================
 */

use crate::errors::MathError;
use crate::field::FieldElement;
use crate::point::AffinePoint;

/// Motor unificado para la ejecución de la ley de grupo en el plano afín.
pub struct AffineCurveEngine;

/**
 * Memoria de trabajo pre-alocada para la adición por lote.
 * Evita la presión de alocación dentro del Hot-Loop de la manada.
 */
#[derive(Default)]
pub struct BatchAdditionWorkspace {
    denominators: Vec<FieldElement>,
    inverses: Vec<FieldElement>,
    scratch: Vec<FieldElement>,
    batch_positions: Vec<usize>,
}

impl BatchAdditionWorkspace {
    /// Pre-aloca la memoria de trabajo para lotes de la capacidad indicada.
    #[must_use]
    pub fn with_capacity(batch_capacity: usize) -> Self {
        Self {
            denominators: Vec::with_capacity(batch_capacity),
            inverses: vec![FieldElement::ZERO; batch_capacity],
            scratch: vec![FieldElement::ZERO; batch_capacity],
            batch_positions: Vec::with_capacity(batch_capacity),
        }
    }
}

impl AffineCurveEngine {
    /**
     * Adición afín completa P + Q con gestión de singularidades.
     *
     * # Errors:
     * Propaga el fallo de inversión, imposible para denominadores
     * no nulos ya filtrados por las ramas de singularidad.
     */
    pub fn add_affine(
        point_alpha: &AffinePoint,
        point_beta: &AffinePoint,
    ) -> Result<AffinePoint, MathError> {
        if point_alpha.is_infinity {
            return Ok(*point_beta);
        }
        if point_beta.is_infinity {
            return Ok(*point_alpha);
        }

        let horizontal_distance = point_beta.x.subtract_modular(&point_alpha.x);

        if horizontal_distance.is_zero() {
            let vertical_distance = point_beta.y.subtract_modular(&point_alpha.y);
            if vertical_distance.is_zero() {
                // Puntos coincidentes: duplicación técnica
                return Self::double_affine(point_alpha);
            }
            // Puntos inversos: el resultado es la identidad
            return Ok(AffinePoint::infinity());
        }

        let chord_slope = point_beta
            .y
            .subtract_modular(&point_alpha.y)
            .multiply_modular(&horizontal_distance.invert()?);

        Ok(Self::apply_chord_formula(point_alpha, point_beta, &chord_slope))
    }

    /**
     * Duplicación afín 2P mediante la tangente λ = 3x^2 / 2y.
     *
     * # Errors:
     * Retorna `PointAtInfinity` para ordenada nula (punto de 2-torsión,
     * inexistente en secp256k1 pero gestionado por robustez).
     */
    pub fn double_affine(point: &AffinePoint) -> Result<AffinePoint, MathError> {
        if point.is_infinity {
            return Ok(*point);
        }
        if point.y.is_zero() {
            return Err(MathError::PointAtInfinity);
        }

        let x_coordinate_squared = point.x.square_modular();
        let tangent_numerator = x_coordinate_squared.multiply_by_u64(3);
        let tangent_denominator = point.y.add_modular(&point.y);
        let tangent_slope = tangent_numerator.multiply_modular(&tangent_denominator.invert()?);

        Ok(Self::apply_chord_formula(point, point, &tangent_slope))
    }

    /**
     * ADICIÓN POR LOTE: targets[i] <- targets[i] + addends[i].
     *
     * # Mathematical Proof (Montgomery Amortization):
     * Los k denominadores no degenerados se invierten con 3(k-1)
     * multiplicaciones y una sola exponenciación Fermat, reduciendo el
     * coste por salto de la manada a ~7 multiplicaciones de campo.
     *
     * # Logic:
     * - Identidades y pares con x iguales caen a la trayectoria escalar.
     * - Un resultado identidad (puntos inversos) queda marcado en el
     *   target; el llamador decide el reemplazo del canguro.
     *
     * # Errors:
     * Propaga fallos de inversión del lote (imposibles tras el filtrado
     * de denominadores nulos).
     */
    pub fn batch_add_assign(
        targets: &mut [AffinePoint],
        addends: &[AffinePoint],
        workspace: &mut BatchAdditionWorkspace,
    ) -> Result<(), MathError> {
        debug_assert_eq!(targets.len(), addends.len());

        workspace.denominators.clear();
        workspace.batch_positions.clear();

        // 1. CLASIFICACIÓN: lote regular vs trayectoria escalar
        for (index, (target, addend)) in targets.iter_mut().zip(addends.iter()).enumerate() {
            if target.is_infinity {
                *target = *addend;
                continue;
            }
            if addend.is_infinity {
                continue;
            }

            let horizontal_distance = addend.x.subtract_modular(&target.x);
            if horizontal_distance.is_zero() {
                let vertical_distance = addend.y.subtract_modular(&target.y);
                if vertical_distance.is_zero() {
                    *target = Self::double_affine(target)?;
                } else {
                    *target = AffinePoint::infinity();
                }
                continue;
            }

            workspace.denominators.push(horizontal_distance);
            workspace.batch_positions.push(index);
        }

        let batch_size = workspace.denominators.len();
        if batch_size == 0 {
            return Ok(());
        }

        if workspace.inverses.len() < batch_size {
            workspace.inverses.resize(batch_size, FieldElement::ZERO);
            workspace.scratch.resize(batch_size, FieldElement::ZERO);
        }

        // 2. INVERSIÓN AMORTIZADA (Montgomery Trick)
        FieldElement::batch_invert_into(
            &workspace.denominators,
            &mut workspace.inverses[..batch_size],
            &mut workspace.scratch[..batch_size],
        )?;

        // 3. APLICACIÓN DE LA FÓRMULA DE CUERDA
        for (batch_index, &target_index) in workspace.batch_positions.iter().enumerate() {
            let target = targets[target_index];
            let addend = addends[target_index];

            let chord_slope = addend
                .y
                .subtract_modular(&target.y)
                .multiply_modular(&workspace.inverses[batch_index]);

            targets[target_index] = Self::apply_chord_formula(&target, &addend, &chord_slope);
        }

        Ok(())
    }

    /// Fórmula de cuerda compartida: x3 = λ^2 - x1 - x2, y3 = λ(x1 - x3) - y1.
    #[inline(always)]
    fn apply_chord_formula(
        point_alpha: &AffinePoint,
        point_beta: &AffinePoint,
        slope: &FieldElement,
    ) -> AffinePoint {
        let output_x = slope
            .square_modular()
            .subtract_modular(&point_alpha.x)
            .subtract_modular(&point_beta.x);

        let output_y = point_alpha
            .x
            .subtract_modular(&output_x)
            .multiply_modular(slope)
            .subtract_modular(&point_alpha.y);

        AffinePoint::from_coordinates(output_x, output_y)
    }
}
