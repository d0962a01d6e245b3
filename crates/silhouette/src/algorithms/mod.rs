pub mod postprocessing;
pub mod preprocessing;
pub mod trace;

pub use postprocessing::*;
pub use preprocessing::*;
pub use trace::*;
