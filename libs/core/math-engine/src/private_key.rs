// [libs/core/math-engine/src/private_key.rs]
// =================================================================
// APARATO: PRIVATE KEY MANAGER (V21.0 - SCALAR BRIDGE)
// RESPONSABILIDAD: GESTIÓN SEGURA DE ESCALARES SECRETOS
// =================================================================

use crate::context::global_context;
use crate::errors::MathError;
use crate::scalar::Scalar;
use secp256k1::rand::rngs::OsRng;
use secp256k1::SecretKey;

/// Wrapper seguro para una clave privada de curva elíptica secp256k1.
/// Garantiza: 0 < k < n
#[derive(Debug, Clone)]
pub struct SafePrivateKey {
    inner: SecretKey,
}

impl SafePrivateKey {
    /// Genera una nueva clave privada utilizando el CSPRNG del sistema.
    pub fn new_random() -> Self {
        let secp = global_context();
        let (secret_key, _) = secp.generate_keypair(&mut OsRng);
        Self { inner: secret_key }
    }

    /// Intenta construir una clave privada a partir de bytes crudos.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MathError> {
        if bytes.len() != 32 {
            return Err(MathError::InvalidLength {
                expected: 32,
                got: bytes.len(),
            });
        }

        let sk = SecretKey::from_slice(bytes).map_err(MathError::EllipticCurveError)?;

        Ok(Self { inner: sk })
    }

    /// Puente desde el anillo modular del dominio lambda.
    pub fn from_scalar(scalar_value: &Scalar) -> Result<Self, MathError> {
        Self::from_bytes(&scalar_value.to_u256_be())
    }

    /// Serializa la clave a 32 bytes.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.secret_bytes()
    }

    /// Referencia al objeto interno (Zero-Copy).
    #[inline(always)]
    pub fn as_inner(&self) -> &SecretKey {
        &self.inner
    }
}
