use crate::{CodeParams, LdpcError, Mod2Dense};

/// Count the 4-cycles of the Tanner graph of `h`.
///
/// Every pair of variable nodes sharing `c >= 2` checks contributes
/// `c * (c - 1) / 2`. Each variable contributes at most its first `wc`
/// checks, as in a regular code of column weight `wc`. `h` is not modified.
pub fn count_4cycles(h: &Mod2Dense, params: &CodeParams) -> Result<u64, LdpcError> {
    params.validate()?;
    if h.rows() != params.m() || h.cols() != params.n {
        return Err(LdpcError::DimensionMismatch);
    }

    let adjacency: Vec<Vec<usize>> = (0..params.n)
        .map(|bit| h.ones_in_col(bit).take(params.wc).collect())
        .collect();

    let mut cycles = 0u64;
    for (i, first) in adjacency.iter().enumerate() {
        for second in &adjacency[i + 1..] {
            let shared = shared_checks(first, second);
            if shared >= 2 {
                cycles += shared * (shared - 1) / 2;
            }
        }
    }
    Ok(cycles)
}

/// Size of the intersection of two ascending index lists.
fn shared_checks(a: &[usize], b: &[usize]) -> u64 {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_check_has_no_cycles() {
        let params = CodeParams::new(4, 1, 4).unwrap();
        let h = Mod2Dense::from_rows(&[[1u8, 1, 1, 1]]).unwrap();
        assert_eq!(count_4cycles(&h, &params).unwrap(), 0);
    }

    #[test]
    fn test_counts_shared_pairs() {
        let params = CodeParams::new(4, 2, 4).unwrap();
        let h = Mod2Dense::from_rows(&[[1u8, 1, 1, 1], [1, 1, 1, 1]]).unwrap();
        // All six pairs share both checks.
        assert_eq!(count_4cycles(&h, &params).unwrap(), 6);

        let params = CodeParams::new(6, 2, 3).unwrap();
        let h = Mod2Dense::from_rows(&[
            [1u8, 1, 1, 0, 0, 0],
            [0, 0, 0, 1, 1, 1],
            [1, 1, 0, 1, 0, 0],
            [0, 0, 1, 0, 1, 1],
        ])
        .unwrap();
        // Pairs (0,1) and (4,5) each share two checks.
        assert_eq!(count_4cycles(&h, &params).unwrap(), 2);
    }

    #[test]
    fn test_shared_checks() {
        assert_eq!(shared_checks(&[0, 2, 5], &[1, 2, 5, 7]), 2);
        assert_eq!(shared_checks(&[], &[1]), 0);
    }

    #[test]
    fn test_shape_mismatch() {
        let params = CodeParams::new(8, 1, 4).unwrap();
        let h = Mod2Dense::from_rows(&[[1u8, 1, 1, 1]]).unwrap();
        assert!(count_4cycles(&h, &params).is_err());
    }
}
