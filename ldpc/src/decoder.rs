//! Sum-product (belief propagation) decoding on the Tanner graph of H.
//!
//! LLRs follow the `log(P(bit = 1) / P(bit = 0))` convention: a positive
//! value favours a one, and the hard decision is `1` when the a-posteriori
//! sum is `>= 0`.

use crate::{tanner::TannerGraph, LdpcError, Mod2Dense};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub const DEFAULT_MAX_ITER: usize = 40;

const PHI_MIN: f64 = 1e-7;
const PHI_MAX: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Upper bound on message-passing iterations.
    pub max_iter: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

/// Result of one decode call.
///
/// A decode that runs out of iterations still returns its last hard
/// decision; `converged` tells the two cases apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOutcome {
    pub codeword: Vec<u8>,
    /// Last K bits of `codeword`.
    pub info: Vec<u8>,
    pub iterations: usize,
    pub converged: bool,
}

/// `φ(x) = ln((eˣ + 1) / (eˣ − 1))` with `x` clamped to `[1e-7, 30]`.
///
/// φ is its own inverse; the clamp keeps `φ(0)` finite and `φ(∞)` non-zero.
pub fn phi(x: f64) -> f64 {
    let e = x.clamp(PHI_MIN, PHI_MAX).exp();
    ((e + 1.0) / (e - 1.0)).ln()
}

fn check_llr_length(llr: &[f64], n: usize) -> Result<(), LdpcError> {
    if llr.len() != n {
        return Err(LdpcError::Decoding(format!(
            "LLR length {} doesn't match code length {}",
            llr.len(),
            n
        )));
    }
    Ok(())
}

#[inline]
fn sign(x: f64) -> f64 {
    if x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Message state of one decode call, indexed by edge.
#[derive(Debug, Clone)]
pub struct SpaState {
    /// Variable-to-check messages (u).
    to_check: Vec<f64>,
    /// Check-to-variable messages (v).
    to_variable: Vec<f64>,
    decision: Vec<u8>,
}

impl SpaState {
    pub fn new(graph: &TannerGraph) -> Self {
        Self {
            to_check: vec![0.0; graph.n_edges()],
            to_variable: vec![0.0; graph.n_edges()],
            decision: vec![0; graph.n_variables()],
        }
    }

    pub fn decision(&self) -> &[u8] {
        &self.decision
    }

    /// Run one iteration and report whether the new hard decision satisfies
    /// every check.
    ///
    /// The check phase reads only u and writes only v, the variable phase the
    /// reverse, so each phase sees the complete output of the previous one.
    pub fn step(&mut self, graph: &TannerGraph, llr: &[f64]) -> Result<bool, LdpcError> {
        check_llr_length(llr, graph.n_variables())?;
        self.update_checks(graph, llr);
        self.update_variables(graph);
        self.decide(graph, llr);
        Ok(graph.parity_satisfied(&self.decision))
    }

    fn update_checks(&mut self, graph: &TannerGraph, llr: &[f64]) {
        for check in 0..graph.n_checks() {
            let links = graph.check_links(check);
            // With LLR = log(P1/P0) the sign product over an even number of
            // other bits has the opposite parity from the one we vote for.
            let orientation = if links.len() % 2 == 1 { -1.0 } else { 1.0 };

            for (k, out) in links.iter().enumerate() {
                let mut prod_sign = orientation;
                let mut sum_phi = 0.0;
                for (idx, link) in links.iter().enumerate() {
                    if idx == k {
                        continue;
                    }
                    let x = llr[link.node] + self.to_check[link.edge];
                    prod_sign *= sign(x);
                    sum_phi += phi(x.abs());
                }
                self.to_variable[out.edge] = prod_sign * phi(sum_phi);
            }
        }
    }

    fn update_variables(&mut self, graph: &TannerGraph) {
        for variable in 0..graph.n_variables() {
            let links = graph.variable_links(variable);
            for (k, out) in links.iter().enumerate() {
                self.to_check[out.edge] = links
                    .iter()
                    .enumerate()
                    .filter(|&(idx, _)| idx != k)
                    .map(|(_, link)| self.to_variable[link.edge])
                    .sum();
            }
        }
    }

    fn decide(&mut self, graph: &TannerGraph, llr: &[f64]) {
        for (variable, bit) in self.decision.iter_mut().enumerate() {
            let total: f64 = llr[variable]
                + graph
                    .variable_links(variable)
                    .iter()
                    .map(|link| self.to_variable[link.edge])
                    .sum::<f64>();
            *bit = (total >= 0.0) as u8;
        }
    }
}

/// Sum-product decoder.
///
/// The Tanner graph and message arrays are built per call, so one decoder
/// can serve many threads against the same H.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaDecoder {
    config: DecoderConfig,
}

impl SpaDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode channel LLRs against the M x N parity-check matrix `h`.
    ///
    /// Stops as soon as the hard decision satisfies every check, or after
    /// `max_iter` iterations. With `max_iter == 0` the hard decision of the
    /// channel LLRs is returned.
    pub fn decode(&self, h: &Mod2Dense, llr: &[f64]) -> Result<DecodeOutcome, LdpcError> {
        let (m, n) = (h.rows(), h.cols());
        check_llr_length(llr, n)?;
        if m >= n {
            return Err(LdpcError::Decoding(format!(
                "{m} checks leave no information bits in a length-{n} code"
            )));
        }

        let graph = TannerGraph::from_parity_check(h);
        let mut state = SpaState::new(&graph);

        let mut iterations = 0;
        let mut converged = false;
        if self.config.max_iter == 0 {
            state.decide(&graph, llr);
            converged = graph.parity_satisfied(state.decision());
        }
        while iterations < self.config.max_iter {
            iterations += 1;
            if state.step(&graph, llr)? {
                converged = true;
                break;
            }
            trace!(
                iteration = iterations,
                unsatisfied = graph.unsatisfied_checks(state.decision()),
                "spa iteration"
            );
        }

        if converged {
            debug!(iterations, "spa decoder converged");
        } else {
            debug!(
                iterations,
                unsatisfied = graph.unsatisfied_checks(state.decision()),
                "spa decoder stopped without satisfying all checks"
            );
        }

        let codeword = state.decision;
        let info = codeword[m..].to_vec();
        Ok(DecodeOutcome {
            codeword,
            info,
            iterations,
            converged,
        })
    }
}
