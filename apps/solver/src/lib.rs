// [apps/solver/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SOLVER APPLICATION HUB (V15.0 - LAMBDA SHELL)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: CABLEADO DE MODOS DE EJECUCIÓN Y UTILIDADES
 * =================================================================
 */

/// Cliente de enjambre con anillo resiliente.
pub mod client;
/// Superficie de comando (clap derive).
pub mod cli;
/// Decodificación del archivo de objetivo.
pub mod config;
/// Inventario de dispositivos y paridad de kernels.
pub mod diagnostics;
/// Servidor de coordinación del enjambre.
pub mod server;
/// Campañas locales y persistencia.
pub mod solo;
/// Utilidades de work file (-wm, -wmdir, -winfo, -wcheck, -wpartcreate).
pub mod utilities;
