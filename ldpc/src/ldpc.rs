use crate::{
    cycles, matrix_io, CodeParams, DecodeOutcome, DecoderConfig, GeneratorMatrix, LdpcError,
    Mod2Dense, SpaDecoder,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::{fs, path::Path};
use tracing::debug;

pub const PARITY_CHECK_FILE: &str = "H.csv";
pub const GENERATOR_FILE: &str = "G.csv";

/// 4-cycle statistics of an [`LdpcCode::search`] run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSummary {
    pub candidates: usize,
    /// 4-cycles in the returned code.
    pub best_cycles: u64,
    /// Average over all candidates, including the returned one.
    pub mean_cycles: f64,
}

/// Build a regular parity-check matrix with Gallager's construction.
///
/// The first `n / wr` rows cover the columns in contiguous runs of `wr`.
/// Each of the remaining `wc - 1` blocks repeats that pattern under an
/// independent uniformly random column permutation. Rows therefore always
/// have weight `wr`; column weights are `wc` on average but permutations
/// can collide.
pub fn make_gallager<R: Rng + ?Sized>(
    params: &CodeParams,
    rng: &mut R,
) -> Result<Mod2Dense, LdpcError> {
    params.validate()?;
    let (n, wr) = (params.n, params.wr);
    let block_rows = params.block_rows();
    let mut h = Mod2Dense::allocate(params.m(), n)?;

    for row in 0..block_rows {
        for col in row * wr..(row + 1) * wr {
            h.set(row, col, true)?;
        }
    }

    let mut perm: Vec<usize> = (0..n).collect();
    for block in 1..params.wc {
        perm.shuffle(rng);
        for row in 0..block_rows {
            for (col, &source) in perm.iter().enumerate() {
                if h.get(row, source) {
                    h.set(block * block_rows + row, col, true)?;
                }
            }
        }
    }

    if tracing::enabled!(tracing::Level::DEBUG) {
        let weights: Vec<usize> = (0..n).map(|col| h.col_weight(col)).collect();
        debug!(
            n,
            m = params.m(),
            wc = params.wc,
            wr,
            min_col_weight = weights.iter().min().copied().unwrap_or(0),
            max_col_weight = weights.iter().max().copied().unwrap_or(0),
            "generated Gallager parity-check matrix"
        );
    }
    Ok(h)
}

/// A parity-check / generator pair describing one code.
///
/// `parity_check` already carries any column swaps made while deriving the
/// generator, so `encode` and `decode` agree on bit positions.
#[derive(Debug, Clone)]
pub struct LdpcCode {
    params: CodeParams,
    parity_check: Mod2Dense,
    generator: GeneratorMatrix,
}

impl LdpcCode {
    /// Generate a code from a seed. The same seed always yields the same code.
    pub fn new(params: CodeParams, seed: u64) -> Result<Self, LdpcError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::generate(params, &mut rng)
    }

    pub fn generate<R: Rng + ?Sized>(params: CodeParams, rng: &mut R) -> Result<Self, LdpcError> {
        let h = make_gallager(&params, rng)?;
        Self::from_parity_check(params, h)
    }

    /// Derive the generator for an existing H. H may come back with its
    /// columns permuted.
    pub fn from_parity_check(params: CodeParams, mut h: Mod2Dense) -> Result<Self, LdpcError> {
        let generator = GeneratorMatrix::from_parity_check(&mut h, &params)?;
        Ok(Self {
            params,
            parity_check: h,
            generator,
        })
    }

    /// Pair an existing H and G after checking shapes and `H · Gᵀ = 0`.
    pub fn from_matrices(
        params: CodeParams,
        h: Mod2Dense,
        g: Mod2Dense,
    ) -> Result<Self, LdpcError> {
        params.validate()?;
        if h.rows() != params.m() || h.cols() != params.n {
            return Err(LdpcError::DimensionMismatch);
        }
        let generator = GeneratorMatrix::from_matrix(g, &h)?;
        Ok(Self {
            params,
            parity_check: h,
            generator,
        })
    }

    /// Generate `candidates` codes and keep the one with the fewest 4-cycles.
    /// Earlier candidates win ties.
    pub fn search<R: Rng + ?Sized>(
        params: CodeParams,
        candidates: usize,
        rng: &mut R,
    ) -> Result<(Self, SearchSummary), LdpcError> {
        if candidates == 0 {
            return Err(LdpcError::InvalidParameter(
                "at least one candidate is required".to_string(),
            ));
        }
        let mut best: Option<(Self, u64)> = None;
        let mut total_cycles = 0u64;
        for candidate in 0..candidates {
            let code = Self::generate(params, rng)?;
            let cycles = code.count_4cycles()?;
            total_cycles = total_cycles.saturating_add(cycles);
            if best.as_ref().map_or(true, |(_, fewest)| cycles < *fewest) {
                debug!(candidate, cycles, "new best parity-check matrix");
                best = Some((code, cycles));
            }
        }
        let (code, best_cycles) = best
            .ok_or_else(|| LdpcError::InvalidParameter("no candidate generated".to_string()))?;
        let summary = SearchSummary {
            candidates,
            best_cycles,
            mean_cycles: total_cycles as f64 / candidates as f64,
        };
        debug!(
            candidates,
            best_cycles,
            mean_cycles = summary.mean_cycles,
            "parity-check search finished"
        );
        Ok((code, summary))
    }

    pub fn params(&self) -> &CodeParams {
        &self.params
    }
    pub fn n_bits(&self) -> usize {
        self.params.n
    }
    pub fn m_checks(&self) -> usize {
        self.params.m()
    }
    pub fn k_message_bits(&self) -> usize {
        self.params.k()
    }
    pub fn rate(&self) -> f64 {
        self.params.rate()
    }

    pub fn parity_check_matrix(&self) -> &Mod2Dense {
        &self.parity_check
    }
    pub fn generator_matrix(&self) -> &GeneratorMatrix {
        &self.generator
    }

    pub fn count_4cycles(&self) -> Result<u64, LdpcError> {
        cycles::count_4cycles(&self.parity_check, &self.params)
    }

    /// Encode K information bits; they reappear verbatim in the last K
    /// positions of the codeword.
    pub fn encode(&self, message: &[u8]) -> Result<Vec<u8>, LdpcError> {
        self.generator.encode(message)
    }

    pub fn decode(&self, llr: &[f64], config: DecoderConfig) -> Result<DecodeOutcome, LdpcError> {
        SpaDecoder::new(config).decode(&self.parity_check, llr)
    }

    /// Number of parity checks violated by `codeword`.
    pub fn verify_codeword(&self, codeword: &[u8]) -> Result<usize, LdpcError> {
        if codeword.len() != self.params.n {
            return Err(LdpcError::InvalidParameter(format!(
                "Codeword length {} doesn't match code length {}",
                codeword.len(),
                self.params.n
            )));
        }
        let syndrome = self.parity_check.syndrome(codeword)?;
        Ok(syndrome.iter().filter(|&&s| s != 0).count())
    }

    /// Write `H.csv` and `G.csv` under `root/N{n}_wc{wc}_wr{wr}/` and
    /// return that directory.
    pub fn save<P: AsRef<Path>>(&self, root: P) -> Result<std::path::PathBuf, LdpcError> {
        let dir = root.as_ref().join(self.params.dir_name());
        fs::create_dir_all(&dir)?;
        matrix_io::save_matrix(dir.join(PARITY_CHECK_FILE), &self.parity_check)?;
        matrix_io::save_matrix(dir.join(GENERATOR_FILE), self.generator.matrix())?;
        debug!(dir = %dir.display(), "saved code");
        Ok(dir)
    }

    /// Load a code written by [`LdpcCode::save`].
    pub fn load<P: AsRef<Path>>(root: P, params: CodeParams) -> Result<Self, LdpcError> {
        params.validate()?;
        let dir = root.as_ref().join(params.dir_name());
        let h = matrix_io::load_matrix(dir.join(PARITY_CHECK_FILE), Some((params.m(), params.n)))?;
        let g = matrix_io::load_matrix(dir.join(GENERATOR_FILE), Some((params.k(), params.n)))?;
        Self::from_matrices(params, h, g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_block_is_deterministic() {
        let params = CodeParams::new(24, 3, 6).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let h = make_gallager(&params, &mut rng).unwrap();

        assert_eq!(h.rows(), 12);
        for row in 0..params.block_rows() {
            let ones: Vec<usize> = h.ones_in_row(row).collect();
            assert_eq!(ones, (row * 6..(row + 1) * 6).collect::<Vec<_>>());
        }
        for row in 0..h.rows() {
            assert_eq!(h.row_weight(row), 6);
        }
        // Each block on its own covers every column exactly once.
        for block in 0..3 {
            for col in 0..24 {
                let hits = (block * 4..(block + 1) * 4)
                    .filter(|&row| h.get(row, col))
                    .count();
                assert_eq!(hits, 1);
            }
        }
    }

    #[test]
    fn test_single_block_code() {
        let params = CodeParams::new(4, 1, 4).unwrap();
        let code = LdpcCode::new(params, 0).unwrap();
        assert_eq!(code.parity_check_matrix().get_row(0), vec![1, 1, 1, 1]);
        assert_eq!(code.m_checks(), 1);
        assert_eq!(code.k_message_bits(), 3);
        assert_eq!(code.count_4cycles().unwrap(), 0);
    }

    #[test]
    fn test_rejects_non_integral_checks() {
        let params = CodeParams { n: 10, wc: 3, wr: 4 };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            make_gallager(&params, &mut rng),
            Err(LdpcError::Params(_))
        ));
    }

    #[test]
    fn test_reproducibility() {
        let params = CodeParams::new(48, 3, 6).unwrap();
        let code1 = LdpcCode::new(params, 7777).unwrap();
        let code2 = LdpcCode::new(params, 7777).unwrap();
        assert_eq!(code1.parity_check_matrix(), code2.parity_check_matrix());
        assert_eq!(code1.generator_matrix(), code2.generator_matrix());
    }

    #[test]
    fn test_verify_codeword() {
        let code = LdpcCode::new(CodeParams::new(20, 2, 4).unwrap(), 1111).unwrap();

        assert_eq!(code.verify_codeword(&[0u8; 20]).unwrap(), 0);
        assert!(code.verify_codeword(&[0u8; 15]).is_err());

        let mut codeword = code.encode(&vec![1u8; code.k_message_bits()]).unwrap();
        assert_eq!(code.verify_codeword(&codeword).unwrap(), 0);
        codeword[0] ^= 1;
        assert!(code.verify_codeword(&codeword).unwrap() > 0);
    }

    #[test]
    fn test_encoding_linearity() {
        let code = LdpcCode::new(CodeParams::new(20, 3, 5).unwrap(), 1234).unwrap();
        let k = code.k_message_bits();

        let message1: Vec<u8> = (0..k).map(|i| (i % 3 == 0) as u8).collect();
        let message2: Vec<u8> = (0..k).map(|i| (i % 2 == 1) as u8).collect();
        let combined: Vec<u8> = message1.iter().zip(&message2).map(|(a, b)| a ^ b).collect();

        let codeword1 = code.encode(&message1).unwrap();
        let codeword2 = code.encode(&message2).unwrap();
        let xor: Vec<u8> = codeword1.iter().zip(&codeword2).map(|(a, b)| a ^ b).collect();

        assert_eq!(code.encode(&combined).unwrap(), xor);
        assert_eq!(&codeword1[code.m_checks()..], &message1[..]);
    }

    #[test]
    fn test_search_keeps_fewest_cycles() {
        let params = CodeParams::new(36, 3, 6).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let (best, summary) = LdpcCode::search(params, 5, &mut rng).unwrap();
        assert_eq!(summary.candidates, 5);
        assert_eq!(best.count_4cycles().unwrap(), summary.best_cycles);

        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut counts = Vec::new();
        for _ in 0..5 {
            let candidate = LdpcCode::generate(params, &mut rng).unwrap();
            counts.push(candidate.count_4cycles().unwrap());
        }
        assert_eq!(counts.iter().min().copied(), Some(summary.best_cycles));
        let mean = counts.iter().sum::<u64>() as f64 / 5.0;
        assert!((summary.mean_cycles - mean).abs() < 1e-12);
        assert!(summary.mean_cycles >= summary.best_cycles as f64);
        assert!(LdpcCode::search(params, 0, &mut rng).is_err());
    }
}
