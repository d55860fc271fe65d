pub mod complex;
pub mod fft;

pub use complex::Complex;
pub use fft::CooleyTukeyEngine;
