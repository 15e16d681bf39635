pub mod preprocessing;
pub mod extraction;
pub mod approximation;
pub mod classification;
pub mod symmetry;
pub mod morphology;

pub use preprocessing::*;
pub use extraction::*;
pub use approximation::*;
pub use classification::*;
pub use symmetry::*;
pub use morphology::*;
