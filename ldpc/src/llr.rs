use crate::LdpcError;

/// Convert per-symbol likelihoods into per-bit LLRs.
///
/// `pyx[k][i]` is `p(y_i | x = k)` for constellation index `k` of an
/// `E`-ary alphabet. Bit `b` of symbol `i` lands at `i * log2(E) + b` with
///
/// ```text
/// LLR = ln( Σ_{k : bit b of k = 1} pyx[k][i] / Σ_{k : bit b of k = 0} pyx[k][i] )
/// ```
pub fn symbol_likelihoods_to_bit_llr<R: AsRef<[f64]>>(pyx: &[R]) -> Result<Vec<f64>, LdpcError> {
    let order = pyx.len();
    if order < 2 || !order.is_power_of_two() {
        return Err(LdpcError::InvalidParameter(format!(
            "Modulation order {order} is not a power of two >= 2"
        )));
    }
    let n_symbols = pyx[0].as_ref().len();
    if let Some(k) = pyx.iter().position(|row| row.as_ref().len() != n_symbols) {
        return Err(LdpcError::InvalidParameter(format!(
            "Likelihood row {k} has {} symbols, expected {n_symbols}",
            pyx[k].as_ref().len()
        )));
    }

    let bits_per_symbol = order.trailing_zeros() as usize;
    let mut llr = Vec::with_capacity(n_symbols * bits_per_symbol);
    for symbol in 0..n_symbols {
        for bit in 0..bits_per_symbol {
            let (mut p1, mut p0) = (0.0, 0.0);
            for (k, row) in pyx.iter().enumerate() {
                if (k >> bit) & 1 == 1 {
                    p1 += row.as_ref()[symbol];
                } else {
                    p0 += row.as_ref()[symbol];
                }
            }
            llr.push((p1 / p0).ln());
        }
    }
    Ok(llr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_alphabet() {
        let pyx = [vec![0.2, 0.5], vec![0.8, 0.5]];
        let llr = symbol_likelihoods_to_bit_llr(&pyx).unwrap();
        assert_eq!(llr.len(), 2);
        assert!((llr[0] - 4.0f64.ln()).abs() < 1e-12);
        assert_eq!(llr[1], 0.0);
    }

    #[test]
    fn test_quaternary_bit_order() {
        // Symbol 2 (bits b0 = 0, b1 = 1) is far more likely.
        let pyx = [vec![0.1], vec![0.1], vec![0.7], vec![0.1]];
        let llr = symbol_likelihoods_to_bit_llr(&pyx).unwrap();
        assert_eq!(llr.len(), 2);
        // b0: {1, 3} over {0, 2}
        assert!((llr[0] - (0.2f64 / 0.8).ln()).abs() < 1e-12);
        // b1: {2, 3} over {0, 1}
        assert!((llr[1] - (0.8f64 / 0.2).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let three = [vec![0.1], vec![0.2], vec![0.7]];
        assert!(symbol_likelihoods_to_bit_llr(&three).is_err());

        let ragged = [vec![0.1, 0.2], vec![0.9]];
        assert!(symbol_likelihoods_to_bit_llr(&ragged).is_err());
    }
}
