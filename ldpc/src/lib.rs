//! Regular LDPC codes over GF(2).
//!
//! Parity-check matrices are built with Gallager's construction, turned into
//! systematic generator matrices by Gaussian elimination, and decoded with
//! the sum-product algorithm on the Tanner graph. Codewords are laid out as
//! `[parity (M) | information (K)]`.

pub mod cycles;
pub mod decoder;
pub mod dense_matrix;
pub mod generator;
pub mod ldpc;
pub mod llr;
pub mod matrix_io;
pub mod params;
pub mod tanner;

// Re-export main types
pub use cycles::count_4cycles;
pub use decoder::{DecodeOutcome, DecoderConfig, SpaDecoder, SpaState};
pub use dense_matrix::{DenseError, Mod2Dense};
pub use generator::{GeneratorError, GeneratorMatrix};
pub use ldpc::{make_gallager, LdpcCode, SearchSummary};
pub use llr::symbol_likelihoods_to_bit_llr;
pub use matrix_io::FormatError;
pub use params::{CodeParams, ParamsError};
pub use tanner::TannerGraph;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LdpcError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Matrix dimensions mismatch")]
    DimensionMismatch,
    #[error("Code parameters: {0}")]
    Params(#[from] params::ParamsError),
    #[error("Dense matrix error: {0}")]
    DenseMatrix(#[from] dense_matrix::DenseError),
    #[error("Generator construction failed: {0}")]
    Generator(#[from] generator::GeneratorError),
    #[error("Matrix format error: {0}")]
    Format(#[from] matrix_io::FormatError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Decoding error: {0}")]
    Decoding(String),
}
