// Purpose: reverb cores built on the allpass primitives in `dsp`
// Both take stereo input and share one parameter set across channels

pub mod lattice;
pub mod nested;
pub mod params;

pub use lattice::LatticeReverbCore;
pub use nested::NestedAllpassCore;
pub use params::EffectScales;
