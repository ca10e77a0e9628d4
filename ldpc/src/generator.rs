use crate::{CodeParams, LdpcError, Mod2Dense};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("No pivot row or column available for codeword position {column}")]
    NoPivot { column: usize },
    #[error("Generator row {row} does not satisfy the parity-check equations")]
    Inconsistent { row: usize },
    #[error("Parity-check matrix is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },
}

/// Systematic generator matrix G (K x N).
///
/// Codewords are laid out as `[parity (M) | information (K)]`: the last K
/// columns of G form the identity, so `encode(u)[M..] == u`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorMatrix {
    matrix: Mod2Dense,
    n_bits: usize,
    n_checks: usize,
}

impl GeneratorMatrix {
    /// Derive G from H by Gaussian elimination of `[Hᵀ | I_N]`.
    ///
    /// Column swaps needed to reach the systematic form are applied to `h`
    /// as well, so that `h` and the returned G describe the same code. `h` is
    /// only modified when construction succeeds.
    pub fn from_parity_check(h: &mut Mod2Dense, params: &CodeParams) -> Result<Self, LdpcError> {
        params.validate()?;
        let (m, n) = (params.m(), params.n);
        if h.rows() != m || h.cols() != n {
            return Err(GeneratorError::ShapeMismatch {
                rows: h.rows(),
                cols: h.cols(),
                expected_rows: m,
                expected_cols: n,
            }
            .into());
        }

        let mut elim = Elimination::new(h)?;
        let rank = elim.reduce_checks();
        if rank < m {
            debug!(rank, m, "parity-check matrix is rank deficient");
        }
        elim.reduce_information()?;

        let generator = Self {
            matrix: elim.extract_generator()?,
            n_bits: n,
            n_checks: m,
        };
        let permuted = elim.permute_parity_check(h)?;
        generator.check_against(&permuted)?;

        debug!(
            n,
            m,
            rank,
            column_swaps = elim.column_swaps,
            "generator matrix constructed"
        );
        *h = permuted;
        Ok(generator)
    }

    /// Wrap an existing G, checking its shape, systematic form and
    /// consistency with `h`.
    pub fn from_matrix(matrix: Mod2Dense, h: &Mod2Dense) -> Result<Self, LdpcError> {
        let (n, m) = (h.cols(), h.rows());
        if matrix.cols() != n || m >= n || matrix.rows() != n - m {
            return Err(GeneratorError::ShapeMismatch {
                rows: matrix.rows(),
                cols: matrix.cols(),
                expected_rows: n.saturating_sub(m),
                expected_cols: n,
            }
            .into());
        }
        let generator = Self {
            matrix,
            n_bits: n,
            n_checks: m,
        };
        for row in 0..generator.k_message_bits() {
            let systematic = (0..generator.k_message_bits())
                .all(|col| generator.matrix.get(row, m + col) == (row == col));
            if !systematic {
                return Err(GeneratorError::Inconsistent { row }.into());
            }
        }
        generator.check_against(h)?;
        Ok(generator)
    }

    /// Verify `h · Gᵀ = 0`.
    pub fn check_against(&self, h: &Mod2Dense) -> Result<(), LdpcError> {
        for row in 0..self.matrix.rows() {
            for check in 0..h.rows() {
                if h.row_dot(check, &self.matrix, row)? {
                    warn!(row, check, "generator row violates parity check");
                    return Err(GeneratorError::Inconsistent { row }.into());
                }
            }
        }
        Ok(())
    }

    pub fn matrix(&self) -> &Mod2Dense {
        &self.matrix
    }
    pub fn n_bits(&self) -> usize {
        self.n_bits
    }
    pub fn k_message_bits(&self) -> usize {
        self.n_bits - self.n_checks
    }

    /// Encode `info` (K bits) into a codeword: `c[i] = XOR_j info[j] & G[j][i]`.
    pub fn encode(&self, info: &[u8]) -> Result<Vec<u8>, LdpcError> {
        let k = self.k_message_bits();
        if info.len() != k {
            return Err(LdpcError::Encoding(format!(
                "Information length {} doesn't match message length {}",
                info.len(),
                k
            )));
        }

        let mut codeword = vec![0u8; self.n_bits];
        for (row, &bit) in info.iter().enumerate() {
            if bit != 0 {
                for col in self.matrix.ones_in_row(row) {
                    codeword[col] ^= 1;
                }
            }
        }
        Ok(codeword)
    }
}

/// Working state for the elimination of `X = [Hᵀ | I_N]`.
///
/// X has N rows and M + N columns. The transform block (columns M..M+N) is
/// addressed through `order`, which maps a codeword position to its
/// physical column. The same map later permutes the columns of H, so a
/// single swap keeps both in step.
struct Elimination {
    x: Mod2Dense,
    m: usize,
    n: usize,
    order: Vec<usize>,
    column_swaps: usize,
}

impl Elimination {
    fn new(h: &Mod2Dense) -> Result<Self, LdpcError> {
        let (m, n) = (h.rows(), h.cols());
        let ht = h.transpose();
        let mut x = Mod2Dense::allocate(n, m + n)?;
        for bit in 0..n {
            for check in ht.ones_in_row(bit) {
                x.set(bit, check, true)?;
            }
            x.set(bit, m + bit, true)?;
        }
        Ok(Self {
            x,
            m,
            n,
            order: (0..n).collect(),
            column_swaps: 0,
        })
    }

    #[inline]
    fn transform_bit(&self, row: usize, position: usize) -> bool {
        self.x.get(row, self.m + self.order[position])
    }

    /// Reduce the Hᵀ block (columns 0..M) and return the rank of H.
    ///
    /// Column swaps stay inside the Hᵀ block; they reorder check equations
    /// and never touch H. Once the remaining sub-block is all zero every
    /// row from the rank down has a zero Hᵀ part, i.e. its transform part
    /// is a codeword.
    fn reduce_checks(&mut self) -> usize {
        for j in 0..self.m {
            if !self.x.get(j, j) {
                if let Some(row) = (j + 1..self.n).find(|&row| self.x.get(row, j)) {
                    self.x.swap_rows(row, j);
                } else if let Some((row, col)) = self.find_check_pivot(j) {
                    self.x.swap_cols(j, col);
                    self.x.swap_rows(row, j);
                } else {
                    return j;
                }
            }
            for row in 0..self.n {
                if row != j && self.x.get(row, j) {
                    self.x.add_row(row, j);
                }
            }
        }
        self.m
    }

    fn find_check_pivot(&self, j: usize) -> Option<(usize, usize)> {
        (j..self.n).find_map(|row| {
            (j + 1..self.m)
                .find(|&col| self.x.get(row, col))
                .map(|col| (row, col))
        })
    }

    /// Bring the transform part of rows M..N to the identity on codeword
    /// positions M..N. Column swaps here go through `order` and therefore
    /// also apply to H.
    ///
    /// `NoPivot` is not expected in practice: rows M..N stay independent, so
    /// the pivot row always has a one outside the positions already fixed.
    /// The `H · Gᵀ = 0` self-check is what catches a degenerate result.
    fn reduce_information(&mut self) -> Result<(), GeneratorError> {
        let (m, n) = (self.m, self.n);
        debug_assert!((m..n).all(|row| (0..m).all(|col| !self.x.get(row, col))));

        for position in m..n {
            let pivot = position;
            if !self.transform_bit(pivot, position) {
                if let Some(row) = (pivot + 1..n).find(|&row| self.transform_bit(row, position)) {
                    self.x.swap_rows(row, pivot);
                } else {
                    let other = (0..n)
                        .rev()
                        .filter(|&q| q != position && !(m..position).contains(&q))
                        .find(|&q| self.transform_bit(pivot, q))
                        .ok_or(GeneratorError::NoPivot { column: position })?;
                    self.order.swap(position, other);
                    self.column_swaps += 1;
                }
            }
            // Rows above M are not part of G and are left as they are.
            for row in m..n {
                if row != pivot && self.transform_bit(row, position) {
                    self.x.add_row(row, pivot);
                }
            }
        }
        Ok(())
    }

    fn extract_generator(&self) -> Result<Mod2Dense, LdpcError> {
        let (m, n) = (self.m, self.n);
        let mut g = Mod2Dense::allocate(n - m, n)?;
        for row in 0..n - m {
            for position in 0..n {
                if self.transform_bit(m + row, position) {
                    g.set(row, position, true)?;
                }
            }
        }
        Ok(g)
    }

    fn permute_parity_check(&self, h: &Mod2Dense) -> Result<Mod2Dense, LdpcError> {
        if self.column_swaps == 0 {
            return Ok(h.clone());
        }
        let mut permuted = Mod2Dense::allocate(h.rows(), h.cols())?;
        for check in 0..h.rows() {
            for (position, &col) in self.order.iter().enumerate() {
                if h.get(check, col) {
                    permuted.set(check, position, true)?;
                }
            }
        }
        Ok(permuted)
    }
}
