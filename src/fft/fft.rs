use crate::fft::complex::Complex;

/// A recursive radix-2 Cooley-Tukey FFT over a fixed, power-of-two transform size.
///
/// Only the transform itself lives here; framing, windowing and magnitude/dB conversion are
/// the spectrogram's job (`crate::spectrogram`), and peak-picking is the extractor's
/// (`crate::peaks`).
pub struct CooleyTukeyEngine {
    size: usize,
}

impl CooleyTukeyEngine {
    pub fn new(size: usize) -> Self {
        if !size.is_power_of_two() {
            panic!("transform size must be a power of two for this implementation to work");
        }
        Self { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward FFT of a real-valued, already-windowed frame of exactly `size` samples.
    pub fn transform(&self, frame: &[f32]) -> Vec<Complex> {
        assert_eq!(frame.len(), self.size, "frame must match the engine's transform size");
        let mut buf: Vec<Complex> = frame.iter().map(|&s| Complex::new(s, 0.0)).collect();
        Self::cooley_tukey_fft(&mut buf);
        buf
    }

    fn cooley_tukey_fft(buf: &mut [Complex]) {
        let n = buf.len();

        if n <= 1 {
            return;
        }

        let mut even: Vec<Complex> = Vec::with_capacity(n / 2);
        let mut odd: Vec<Complex> = Vec::with_capacity(n / 2);

        for (i, &sample) in buf.iter().enumerate() {
            if i % 2 == 0 {
                even.push(sample);
            } else {
                odd.push(sample);
            }
        }

        Self::cooley_tukey_fft(&mut even);
        Self::cooley_tukey_fft(&mut odd);

        // P(omega)  = Pe(omega^2) + omega * Po(omega^2)
        // P(-omega) = Pe(omega^2) - omega * Po(omega^2)
        // where omega = e^(-i*2*pi*k/n), and -omega^j = omega^(j + n/2).
        for j in 0..n / 2 {
            let theta = (2.0 * std::f32::consts::PI * (j as f32)) / (n as f32);
            let twiddle = Complex::from_polar(1.0, -theta);

            let t = twiddle * odd[j];
            buf[j] = even[j] + t;
            buf[j + n / 2] = even[j] - t;
        }
    }
}
