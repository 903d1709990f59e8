pub mod astro;
pub mod attitudes;
pub mod consts;
pub mod error;
pub mod math;
pub mod propagation;
