//! Router construction errors.

use daedalus_core::ContractError;
use daedalus_router::RouteError;
use thiserror::Error;

/// Why [`build_router`](crate::build_router) failed.
///
/// Operations without a handler are not an error; they are logged and
/// left unrouted.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The operation source could not produce its operations view.
    #[error("contract analysis failed: {0}")]
    Contract(#[from] ContractError),

    /// The routing engine rejected a contract path.
    #[error("route registration failed: {0}")]
    Route(#[from] RouteError),
}
