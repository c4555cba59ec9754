pub mod transition;

pub use transition::{AlertPolicy, ProbeContext};
