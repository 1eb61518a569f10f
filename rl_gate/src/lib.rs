pub mod error;
pub mod gate;
mod time;

pub use error::GateError;
pub use error::Result;
pub use gate::RateGate;
pub use gate::WINDOW;
