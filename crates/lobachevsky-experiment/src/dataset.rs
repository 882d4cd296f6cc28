//! Graph and label loading plus the caller-side collaborators the learners
//! expect: an all-pairs hop-count matrix and a stand-in point initializer.

use std::collections::VecDeque;
use std::io::{Error, ErrorKind};
use std::path::Path;

use rand::Rng;

/// Hop count recorded for unreachable node pairs.
pub const UNREACHABLE_HOPS: f64 = 50.0;

/// Load a whitespace-separated edge list of 1-indexed node id pairs.
pub fn load_edge_list(path: &Path) -> std::io::Result<Vec<(usize, usize)>> {
    let text = std::fs::read_to_string(path)?;
    let mut tokens = text.split_whitespace();
    let mut edges = Vec::new();
    while let Some(a) = tokens.next() {
        let b = tokens
            .next()
            .ok_or_else(|| Error::new(ErrorKind::InvalidData, "odd token count in edge list"))?;
        let parse = |t: &str| {
            t.parse::<usize>()
                .map_err(|_| Error::new(ErrorKind::InvalidData, format!("bad node id '{t}'")))
        };
        let (u, v) = (parse(a)?, parse(b)?);
        if u == 0 || v == 0 {
            return Err(Error::new(ErrorKind::InvalidData, "node ids are 1-indexed"));
        }
        edges.push((u, v));
    }
    Ok(edges)
}

/// Load a whitespace-separated vector of small integer class labels.
pub fn load_labels(path: &Path) -> std::io::Result<Vec<usize>> {
    std::fs::read_to_string(path)?
        .split_whitespace()
        .map(|t| {
            t.parse::<usize>()
                .map_err(|_| Error::new(ErrorKind::InvalidData, format!("bad label '{t}'")))
        })
        .collect()
}

/// Number of nodes implied by a 1-indexed edge list.
pub fn node_count(edges: &[(usize, usize)]) -> usize {
    edges.iter().map(|&(u, v)| u.max(v)).max().unwrap_or(0)
}

/// All-pairs hop counts by BFS from every node, undirected.
///
/// Unreachable pairs get [`UNREACHABLE_HOPS`]; the diagonal is zero.
pub fn hop_matrix(edges: &[(usize, usize)], n: usize) -> Vec<Vec<f64>> {
    let mut adjacency = vec![Vec::new(); n];
    for &(u, v) in edges {
        adjacency[u - 1].push(v - 1);
        adjacency[v - 1].push(u - 1);
    }

    let mut matrix = vec![vec![UNREACHABLE_HOPS; n]; n];
    for start in 0..n {
        matrix[start][start] = 0.0;
        let mut hops = vec![usize::MAX; n];
        hops[start] = 0;
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for &next in &adjacency[node] {
                if hops[next] == usize::MAX {
                    hops[next] = hops[node] + 1;
                    matrix[start][next] = hops[next] as f64;
                    queue.push_back(next);
                }
            }
        }
    }
    matrix
}

/// Random base points inside the ball of radius `max_norm`, standing in for
/// the external Poincaré embedding provider.
pub fn random_ball_points<R: Rng>(
    n: usize,
    dim: usize,
    max_norm: f64,
    rng: &mut R,
) -> Vec<Vec<f64>> {
    (0..n)
        .map(|_| loop {
            let p: Vec<f64> = (0..dim).map(|_| rng.gen_range(-max_norm..max_norm)).collect();
            if p.iter().map(|x| x * x).sum::<f64>() < max_norm * max_norm {
                break p;
            }
        })
        .collect()
}
