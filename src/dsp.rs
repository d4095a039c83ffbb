//! IIR filter design and zero-phase application
//!
//! Small digital-signal-processing primitives used by the motion pipeline:
//! Butterworth high-pass design via the bilinear transform, and zero-phase
//! forward-backward filtering with odd-extension edge padding and
//! steady-state initial conditions. Transfer functions use the usual
//! `(b, a)` coefficient convention with `a[0] == 1`.

use log::debug;
use nalgebra::{Complex, DMatrix, DVector};

use crate::error::Error;

/// Design a Butterworth high-pass filter.
///
/// Returns the numerator and denominator coefficients `(b, a)` of the
/// digital transfer function for the given order and corner frequency,
/// designed by pre-warping the analog Butterworth prototype and applying
/// the bilinear transform.
///
/// # Errors
/// Rejects a non-positive or non-finite sample rate, an order below 1, and
/// a cutoff outside `(0, sample_rate / 2)`.
///
/// # Example
/// ```
/// use imu_motion::dsp::butter_highpass;
///
/// let (b, a) = butter_highpass(1, 0.1, 256.0).unwrap();
/// assert_eq!(b.len(), 2);
/// assert_eq!(a.len(), 2);
/// ```
pub fn butter_highpass(
    order: usize,
    cutoff_hz: f64,
    sample_rate_hz: f64,
) -> Result<(Vec<f64>, Vec<f64>), Error> {
    if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
        return Err(Error::InvalidSampleRate(sample_rate_hz));
    }
    let nyquist = sample_rate_hz / 2.0;
    if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 || cutoff_hz >= nyquist {
        return Err(Error::InvalidCutoff {
            cutoff: cutoff_hz,
            nyquist,
        });
    }
    if order < 1 {
        return Err(Error::InvalidFilterOrder(order));
    }

    // Pre-warp the corner frequency for the bilinear transform, with the
    // sampling frequency normalized to 2 so that frequencies are expressed
    // as a fraction of Nyquist.
    let normalized = cutoff_hz / nyquist;
    let warped = 4.0 * (core::f64::consts::PI * normalized / 2.0).tan();

    // Analog Butterworth prototype: poles evenly spaced on the left half of
    // the unit circle, no finite zeros, unit gain.
    let mut prototype_poles = Vec::with_capacity(order);
    let mut m = 1 - order as i64;
    while m < order as i64 {
        let theta = core::f64::consts::PI * m as f64 / (2.0 * order as f64);
        prototype_poles.push(-Complex::new(0.0, theta).exp());
        m += 2;
    }

    // Low-pass prototype to high-pass: poles move to warped/p, one zero at
    // the origin per pole, gain scaled by the product of the negated poles.
    let gain: f64 = prototype_poles
        .iter()
        .fold(Complex::new(1.0, 0.0), |acc, p| acc * -p)
        .re;
    let analog_poles: Vec<Complex<f64>> = prototype_poles
        .iter()
        .map(|p| Complex::new(warped, 0.0) / p)
        .collect();

    // Bilinear transform (fs = 2): s -> 4 (z - 1) / (z + 1). The zeros at
    // the analog origin land on z = 1, which pins the digital response to
    // zero at DC.
    const FS2: f64 = 4.0;
    let digital_poles: Vec<Complex<f64>> = analog_poles
        .iter()
        .map(|p| (Complex::new(FS2, 0.0) + p) / (Complex::new(FS2, 0.0) - p))
        .collect();
    let digital_zeros = vec![Complex::new(1.0, 0.0); order];

    let denominator = analog_poles
        .iter()
        .fold(Complex::new(1.0, 0.0), |acc, p| {
            acc * (Complex::new(FS2, 0.0) - p)
        });
    let digital_gain = gain * (Complex::new(FS2.powi(order as i32), 0.0) / denominator).re;

    let b: Vec<f64> = polynomial(&digital_zeros)
        .iter()
        .map(|c| c.re * digital_gain)
        .collect();
    let a: Vec<f64> = polynomial(&digital_poles).iter().map(|c| c.re).collect();

    debug!(
        "designed order-{order} Butterworth high-pass, cutoff {cutoff_hz} Hz at {sample_rate_hz} Hz"
    );

    Ok((b, a))
}

/// Apply a filter forward and backward over a series (zero phase).
///
/// Equivalent to running the filter twice, once in each direction: the
/// phase distortion of the two passes cancels and the magnitude response is
/// squared. Edges are handled by odd-extension padding of
/// `3 * max(len(a), len(b))` samples per side with steady-state initial
/// conditions scaled to the first padded sample, so a constant input comes
/// out as the filter's DC response without an edge transient.
///
/// # Errors
/// [`Error::SeriesTooShort`] when the input has fewer samples than the edge
/// padding requires.
pub fn filtfilt(b: &[f64], a: &[f64], x: &[f64]) -> Result<Vec<f64>, Error> {
    let ntaps = b.len().max(a.len());
    let padlen = 3 * ntaps;
    if x.len() <= padlen {
        return Err(Error::SeriesTooShort {
            len: x.len(),
            padlen,
        });
    }

    // Equalize lengths and normalize so a[0] == 1.
    let mut b = b.to_vec();
    let mut a = a.to_vec();
    b.resize(ntaps, 0.0);
    a.resize(ntaps, 0.0);
    let a0 = a[0];
    for coefficient in b.iter_mut().chain(a.iter_mut()) {
        *coefficient /= a0;
    }

    let zi = steady_state_conditions(&b, &a);

    // Odd extension mirrors the signal about its endpoints, which keeps the
    // first derivative continuous across the pad boundary.
    let n = x.len();
    let mut extended = Vec::with_capacity(n + 2 * padlen);
    for i in (1..=padlen).rev() {
        extended.push(2.0 * x[0] - x[i]);
    }
    extended.extend_from_slice(x);
    for i in 0..padlen {
        extended.push(2.0 * x[n - 1] - x[n - 2 - i]);
    }

    // Forward pass.
    let scaled: Vec<f64> = zi.iter().map(|z| z * extended[0]).collect();
    let mut forward = lfilter(&b, &a, &extended, &scaled);

    // Backward pass over the reversed forward output.
    forward.reverse();
    let scaled: Vec<f64> = zi.iter().map(|z| z * forward[0]).collect();
    let mut backward = lfilter(&b, &a, &forward, &scaled);
    backward.reverse();

    Ok(backward[padlen..padlen + n].to_vec())
}

/// Expand a set of roots into monic polynomial coefficients.
fn polynomial(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut coefficients = vec![Complex::new(1.0, 0.0)];
    for root in roots {
        coefficients.push(Complex::new(0.0, 0.0));
        for i in (1..coefficients.len()).rev() {
            let carry = coefficients[i - 1] * root;
            coefficients[i] -= carry;
        }
    }
    coefficients
}

/// Initial filter state that makes the step response start at steady state.
///
/// Solves `(I - Aᵀ) zi = B` for the transposed-direct-form-II state, where
/// `A` is the companion matrix of `a`. Scaling `zi` by the first input
/// sample then eliminates the start-up transient for signals with a DC
/// component.
fn steady_state_conditions(b: &[f64], a: &[f64]) -> Vec<f64> {
    let n = a.len() - 1;
    if n == 0 {
        return Vec::new();
    }

    let mut system = DMatrix::<f64>::identity(n, n);
    for i in 0..n {
        system[(i, 0)] += a[i + 1];
    }
    for i in 0..n.saturating_sub(1) {
        system[(i, i + 1)] -= 1.0;
    }
    let rhs = DVector::from_fn(n, |i, _| b[i + 1] - a[i + 1] * b[0]);

    match system.lu().solve(&rhs) {
        Some(solution) => solution.iter().copied().collect(),
        None => {
            // Unreachable for a stable design; fall back to a cold start and
            // let the edge padding absorb the transient.
            debug!("steady-state initial conditions singular, using zero state");
            vec![0.0; n]
        }
    }
}

/// Direct-form-II-transposed linear filter with explicit initial state.
fn lfilter(b: &[f64], a: &[f64], x: &[f64], zi: &[f64]) -> Vec<f64> {
    let n = b.len() - 1;
    let mut state = zi.to_vec();
    let mut y = Vec::with_capacity(x.len());

    for &sample in x {
        let output = b[0] * sample + state.first().copied().unwrap_or(0.0);
        for j in 0..n {
            let next = if j + 1 < n { state[j + 1] } else { 0.0 };
            state[j] = b[j + 1] * sample + next - a[j + 1] * output;
        }
        y.push(output);
    }

    y
}
