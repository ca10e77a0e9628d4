use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParamsError {
    #[error("n, wc and wr must all be greater than zero")]
    ZeroParameter,
    #[error("n = {n}, wc = {wc}: n * wc is not divisible by wr = {wr}")]
    NonIntegralChecks { n: usize, wc: usize, wr: usize },
    #[error("n = {n} is not a multiple of wr = {wr}, the first block cannot cover every column")]
    UnevenBlocks { n: usize, wr: usize },
    #[error("m = {m} parity checks leave no information bits for n = {n}")]
    NoInformationBits { n: usize, m: usize },
    #[error("n = {n}, wc = {wc}: n * wc does not fit in usize")]
    TooLarge { n: usize, wc: usize },
}

/// Parameters of a regular (wc, wr) Gallager code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeParams {
    /// Codeword length.
    pub n: usize,
    /// Column weight (checks per bit).
    pub wc: usize,
    /// Row weight (bits per check).
    pub wr: usize,
}

impl CodeParams {
    /// Build and validate a parameter set.
    pub fn new(n: usize, wc: usize, wr: usize) -> Result<Self, ParamsError> {
        let params = Self { n, wc, wr };
        params.validate()?;
        Ok(params)
    }

    /// Check the regularity condition `m * wr == n * wc`.
    ///
    /// A non-integral `m` is rejected rather than truncated. `n` must also
    /// be a multiple of `wr` so that every block of H has `n / wr` full rows.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let Self { n, wc, wr } = *self;
        if n == 0 || wc == 0 || wr == 0 {
            return Err(ParamsError::ZeroParameter);
        }
        let edges = n
            .checked_mul(wc)
            .ok_or(ParamsError::TooLarge { n, wc })?;
        if edges % wr != 0 {
            return Err(ParamsError::NonIntegralChecks { n, wc, wr });
        }
        if n % wr != 0 {
            return Err(ParamsError::UnevenBlocks { n, wr });
        }
        let m = edges / wr;
        if m >= n {
            return Err(ParamsError::NoInformationBits { n, m });
        }
        Ok(())
    }

    /// Number of parity checks.
    pub fn m(&self) -> usize {
        self.n / self.wr * self.wc
    }

    /// Number of information bits.
    pub fn k(&self) -> usize {
        self.n - self.m()
    }

    /// Rows per Gallager block.
    pub fn block_rows(&self) -> usize {
        self.m() / self.wc
    }

    pub fn rate(&self) -> f64 {
        self.k() as f64 / self.n as f64
    }

    /// Folder name used when persisting a code, e.g. `N96_wc3_wr6`.
    pub fn dir_name(&self) -> String {
        format!("N{}_wc{}_wr{}", self.n, self.wc, self.wr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_sizes() {
        let params = CodeParams::new(96, 3, 6).unwrap();
        assert_eq!(params.m(), 48);
        assert_eq!(params.k(), 48);
        assert_eq!(params.block_rows(), 16);
        assert_eq!(params.rate(), 0.5);
        assert_eq!(params.dir_name(), "N96_wc3_wr6");

        let single = CodeParams::new(4, 1, 4).unwrap();
        assert_eq!((single.m(), single.k()), (1, 3));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert_eq!(CodeParams::new(0, 3, 6), Err(ParamsError::ZeroParameter));
        assert_eq!(
            CodeParams::new(10, 3, 4),
            Err(ParamsError::NonIntegralChecks { n: 10, wc: 3, wr: 4 })
        );
        assert_eq!(
            CodeParams::new(6, 2, 4),
            Err(ParamsError::UnevenBlocks { n: 6, wr: 4 })
        );
        assert_eq!(
            CodeParams::new(12, 4, 4),
            Err(ParamsError::NoInformationBits { n: 12, m: 12 })
        );
        assert_eq!(
            CodeParams::new(usize::MAX, 2, 1),
            Err(ParamsError::TooLarge { n: usize::MAX, wc: 2 })
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let params = CodeParams::new(20, 3, 5).unwrap();
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"n":20,"wc":3,"wr":5}"#);
        let back: CodeParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
