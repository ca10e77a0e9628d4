use crate::Mod2Dense;

/// One side of an edge as seen from a node: the node at the other end and
/// the index of the edge in the message arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub node: usize,
    pub edge: usize,
}

/// Bipartite graph of a parity-check matrix.
///
/// Edges are numbered in row-major order of H, so messages for edge `e`
/// live at index `e` of a flat `Vec<f64>` instead of an M x N array.
#[derive(Debug, Clone)]
pub struct TannerGraph {
    check_links: Vec<Vec<Link>>,
    variable_links: Vec<Vec<Link>>,
    n_edges: usize,
}

impl TannerGraph {
    pub fn from_parity_check(h: &Mod2Dense) -> Self {
        let mut check_links = vec![Vec::new(); h.rows()];
        let mut variable_links = vec![Vec::new(); h.cols()];
        let mut edge = 0;

        for (check, links) in check_links.iter_mut().enumerate() {
            for variable in h.ones_in_row(check) {
                links.push(Link {
                    node: variable,
                    edge,
                });
                variable_links[variable].push(Link { node: check, edge });
                edge += 1;
            }
        }

        Self {
            check_links,
            variable_links,
            n_edges: edge,
        }
    }

    pub fn n_checks(&self) -> usize {
        self.check_links.len()
    }
    pub fn n_variables(&self) -> usize {
        self.variable_links.len()
    }
    pub fn n_edges(&self) -> usize {
        self.n_edges
    }

    /// Variables taking part in `check`, ascending.
    pub fn check_links(&self, check: usize) -> &[Link] {
        &self.check_links[check]
    }

    /// Checks that `variable` takes part in, ascending.
    pub fn variable_links(&self, variable: usize) -> &[Link] {
        &self.variable_links[variable]
    }

    /// Number of checks not satisfied by the hard decision `bits`.
    pub fn unsatisfied_checks(&self, bits: &[u8]) -> usize {
        self.check_links
            .iter()
            .filter(|links| links.iter().fold(0u8, |acc, l| acc ^ bits[l.node]) != 0)
            .count()
    }

    /// Whether every check is satisfied, stopping at the first failure.
    pub fn parity_satisfied(&self, bits: &[u8]) -> bool {
        self.check_links
            .iter()
            .all(|links| links.iter().fold(0u8, |acc, l| acc ^ bits[l.node]) == 0)
    }
}
