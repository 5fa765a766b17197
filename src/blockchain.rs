// Thin re-export module: block structure, chain management and chain
// validation live in separate submodules under `blockchain/`.

pub mod block;
pub mod chain;
pub mod validation;

pub use block::*;
pub use chain::*;
pub use validation::*;
