use thiserror::Error;

const WORD_BITS: usize = 64;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DenseError {
    #[error("Invalid matrix dimensions")]
    InvalidDimensions,
    #[error("Index out of bounds")]
    IndexOutOfBounds,
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Dense matrix over GF(2).
///
/// Rows are packed into `u64` words, so row addition and row swaps touch
/// `cols / 64` words instead of `cols` entries. Padding bits past the last
/// column are always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mod2Dense {
    n_rows: usize,
    n_cols: usize,
    data: Vec<u64>,
    words_per_row: usize,
}

impl Mod2Dense {
    /// Allocate an all-zero matrix.
    pub fn allocate(n_rows: usize, n_cols: usize) -> Result<Self, DenseError> {
        if n_rows == 0 || n_cols == 0 {
            return Err(DenseError::InvalidDimensions);
        }

        let words_per_row = n_cols.div_ceil(WORD_BITS);
        Ok(Self {
            n_rows,
            n_cols,
            data: vec![0u64; n_rows * words_per_row],
            words_per_row,
        })
    }

    /// Build a matrix from rows of 0/1 values. Any non-zero value is a 1.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, DenseError> {
        let n_cols = rows.first().map_or(0, |row| row.as_ref().len());
        let mut matrix = Self::allocate(rows.len(), n_cols)?;
        for (i, row) in rows.iter().enumerate() {
            matrix.set_row(i, row.as_ref())?;
        }
        Ok(matrix)
    }

    pub fn rows(&self) -> usize {
        self.n_rows
    }
    pub fn cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    fn locate(&self, row: usize, col: usize) -> (usize, u64) {
        (
            row * self.words_per_row + col / WORD_BITS,
            1u64 << (col % WORD_BITS),
        )
    }

    #[inline]
    fn row_words(&self, row: usize) -> &[u64] {
        let start = row * self.words_per_row;
        &self.data[start..start + self.words_per_row]
    }

    /// Read an entry. Out-of-range positions read as zero.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        if row >= self.n_rows || col >= self.n_cols {
            return false;
        }
        let (word, mask) = self.locate(row, col);
        self.data[word] & mask != 0
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) -> Result<(), DenseError> {
        if row >= self.n_rows || col >= self.n_cols {
            return Err(DenseError::IndexOutOfBounds);
        }
        let (word, mask) = self.locate(row, col);
        if value {
            self.data[word] |= mask;
        } else {
            self.data[word] &= !mask;
        }
        Ok(())
    }

    pub fn swap_rows(&mut self, row1: usize, row2: usize) {
        if row1 == row2 {
            return;
        }
        for offset in 0..self.words_per_row {
            self.data.swap(
                row1 * self.words_per_row + offset,
                row2 * self.words_per_row + offset,
            );
        }
    }

    /// `dest += src` over GF(2).
    pub fn add_row(&mut self, dest: usize, src: usize) {
        if dest == src {
            // x + x = 0
            let start = dest * self.words_per_row;
            self.data[start..start + self.words_per_row].fill(0);
            return;
        }
        for offset in 0..self.words_per_row {
            let word = self.data[src * self.words_per_row + offset];
            self.data[dest * self.words_per_row + offset] ^= word;
        }
    }

    pub fn swap_cols(&mut self, col1: usize, col2: usize) {
        if col1 == col2 || col1 >= self.n_cols || col2 >= self.n_cols {
            return;
        }
        for row in 0..self.n_rows {
            let (w1, m1) = self.locate(row, col1);
            let (w2, m2) = self.locate(row, col2);
            let b1 = self.data[w1] & m1 != 0;
            let b2 = self.data[w2] & m2 != 0;
            if b1 != b2 {
                self.data[w1] ^= m1;
                self.data[w2] ^= m2;
            }
        }
    }

    /// Transposed copy, built row by row from the set bits.
    pub fn transpose(&self) -> Mod2Dense {
        let mut result = Mod2Dense {
            n_rows: self.n_cols,
            n_cols: self.n_rows,
            words_per_row: self.n_rows.div_ceil(WORD_BITS),
            data: Vec::new(),
        };
        result.data = vec![0u64; result.n_rows * result.words_per_row];
        for row in 0..self.n_rows {
            for col in self.ones_in_row(row) {
                let (word, mask) = result.locate(col, row);
                result.data[word] |= mask;
            }
        }
        result
    }

    /// Column indices of the ones in `row`, ascending.
    pub fn ones_in_row(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.row_words(row)
            .iter()
            .enumerate()
            .flat_map(|(w, &word)| SetBits(word).map(move |bit| w * WORD_BITS + bit))
    }

    /// Row indices of the ones in `col`, ascending.
    pub fn ones_in_col(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_rows).filter(move |&row| self.get(row, col))
    }

    pub fn row_weight(&self, row: usize) -> usize {
        self.row_words(row)
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }

    pub fn col_weight(&self, col: usize) -> usize {
        self.ones_in_col(col).count()
    }

    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn get_row(&self, row: usize) -> Vec<u8> {
        (0..self.n_cols).map(|col| self.get(row, col) as u8).collect()
    }

    pub fn set_row(&mut self, row: usize, bits: &[u8]) -> Result<(), DenseError> {
        if row >= self.n_rows {
            return Err(DenseError::IndexOutOfBounds);
        }
        if bits.len() != self.n_cols {
            return Err(DenseError::DimensionMismatch {
                expected: self.n_cols,
                found: bits.len(),
            });
        }
        for (col, &bit) in bits.iter().enumerate() {
            self.set(row, col, bit != 0)?;
        }
        Ok(())
    }

    /// Inner product over GF(2) of `self[row]` and `other[other_row]`.
    pub fn row_dot(
        &self,
        row: usize,
        other: &Mod2Dense,
        other_row: usize,
    ) -> Result<bool, DenseError> {
        if self.n_cols != other.n_cols {
            return Err(DenseError::DimensionMismatch {
                expected: self.n_cols,
                found: other.n_cols,
            });
        }
        if row >= self.n_rows || other_row >= other.n_rows {
            return Err(DenseError::IndexOutOfBounds);
        }
        let ones: u32 = self
            .row_words(row)
            .iter()
            .zip(other.row_words(other_row))
            .map(|(a, b)| (a & b).count_ones())
            .sum();
        Ok(ones % 2 == 1)
    }

    /// `self · wordᵀ` over GF(2), one entry per row.
    pub fn syndrome(&self, word: &[u8]) -> Result<Vec<u8>, DenseError> {
        if word.len() != self.n_cols {
            return Err(DenseError::DimensionMismatch {
                expected: self.n_cols,
                found: word.len(),
            });
        }
        Ok((0..self.n_rows)
            .map(|row| {
                self.ones_in_row(row)
                    .fold(0u8, |acc, col| acc ^ (word[col] & 1))
            })
            .collect())
    }

}

struct SetBits(u64);

impl Iterator for SetBits {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(bit)
    }
}
