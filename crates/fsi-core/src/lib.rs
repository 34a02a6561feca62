//! Shared building blocks of the coupling workspace: scalar and vector
//! types, interface field arithmetic, zone and patch ids, uom units, the
//! cross-process reduction facade and stage timing.

pub mod comm;
pub mod error;
pub mod field;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;

pub use comm::{Communicator, SerialComm};
pub use error::{FsiError, FsiResult};
pub use field::*;
pub use ids::*;
pub use numeric::*;
pub use units::*;
