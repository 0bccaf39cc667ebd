//! Lag polynomial helpers for AR(I)MA processes

/// Whether the AR process `x_t = sum(phi_j * x_{t-j}) + e_t` is stationary.
///
/// Runs the Levinson recursion backwards: the process is stationary exactly
/// when every reflection coefficient has magnitude below one.
pub fn is_stationary(phi: &[f64]) -> bool {
    if phi.iter().any(|c| !c.is_finite()) {
        return false;
    }

    let mut current = phi.to_vec();
    while let Some(&kappa) = current.last() {
        if kappa.abs() >= 1.0 {
            return false;
        }
        let k = current.len();
        let denom = 1.0 - kappa * kappa;
        let reduced: Vec<f64> = (1..k)
            .map(|j| (current[j - 1] + kappa * current[k - j - 1]) / denom)
            .collect();
        current = reduced;
    }
    true
}

/// First `count` psi weights of an ARIMA process.
///
/// `ar` and `ma` follow the sign convention
/// `w_t = sum(ar_i * w_{t-i}) + e_t + sum(ma_j * e_{t-j})` and `d` is the
/// differencing order folded into the AR side.
pub fn psi_weights(ar: &[f64], ma: &[f64], d: usize, count: usize) -> Vec<f64> {
    // 1 - sum(ar_i B^i), then multiplied by (1 - B) d times
    let mut poly = Vec::with_capacity(ar.len() + 1);
    poly.push(1.0);
    poly.extend(ar.iter().map(|c| -c));
    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }
    let full_ar: Vec<f64> = poly.iter().skip(1).map(|c| -c).collect();

    let mut psi = Vec::with_capacity(count);
    for j in 0..count {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let mut value = ma.get(j - 1).copied().unwrap_or(0.0);
        for (i, phi) in full_ar.iter().enumerate().take(j) {
            value += phi * psi[j - i - 1];
        }
        psi.push(value);
    }
    psi
}
