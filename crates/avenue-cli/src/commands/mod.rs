pub mod reduce;
pub mod synth;
pub mod util;
