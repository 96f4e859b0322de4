use num_complex::Complex64;
use std::ops::{Add, Mul, Sub};

/// Complex value used by the transform's working buffer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComplexSample {
    pub re: f64,
    pub im: f64,
}

impl ComplexSample {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Real-valued sample (imaginary part zero)
    pub fn from_real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        (self.re * self.re + self.im * self.im).sqrt()
    }

    /// Phase angle in degrees, in (-180, 180]
    pub fn phase_degrees(&self) -> f64 {
        self.im.atan2(self.re).to_degrees()
    }

    /// Multiply both parts by a real scalar
    pub fn scale(self, factor: f64) -> Self {
        Self {
            re: self.re * factor,
            im: self.im * factor,
        }
    }
}

impl Add for ComplexSample {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl Sub for ComplexSample {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl Mul for ComplexSample {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl From<Complex64> for ComplexSample {
    fn from(c: Complex64) -> Self {
        Self { re: c.re, im: c.im }
    }
}

impl From<ComplexSample> for Complex64 {
    fn from(c: ComplexSample) -> Self {
        Complex64::new(c.re, c.im)
    }
}
