//! Complete-linkage similarity clustering over perceptual fingerprints.

use crate::fingerprint::hamming_hex;
use crate::types::ImageRecord;

pub const DEFAULT_DHASH_THRESHOLD: u32 = 1;
pub const DEFAULT_PHASH_THRESHOLD: u32 = 8;

/// Symmetric matrix of pairwise Hamming distances with a zero diagonal.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    cells: Vec<u32>,
}

impl DistanceMatrix {
    pub fn from_hashes<F>(records: &[ImageRecord], hash: F) -> Self
    where
        F: Fn(&ImageRecord) -> &str,
    {
        let n = records.len();
        let mut cells = vec![0u32; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = hamming_hex(hash(&records[i]), hash(&records[j]));
                cells[i * n + j] = d;
                cells[j * n + i] = d;
            }
        }
        Self { n, cells }
    }

    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.n + j]
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Largest off-diagonal distance, or `None` for fewer than two entries.
    pub fn max_off_diagonal(&self) -> Option<u32> {
        let mut max = None;
        for i in 0..self.n {
            for j in 0..self.n {
                if i != j {
                    let d = self.get(i, j);
                    max = Some(max.map_or(d, |m: u32| m.max(d)));
                }
            }
        }
        max
    }
}

/// Result of one clustering pass: a partition of all record indices plus the
/// dHash threshold that was actually applied.
#[derive(Debug, Clone)]
pub struct Clustering {
    pub clusters: Vec<Vec<usize>>,
    pub effective_dhash_threshold: u32,
}

/// Greedy first-fit complete-linkage clustering, as a single left-to-right
/// pass over the records in input order.
///
/// Each record joins the first cluster (in creation order) where it is within
/// threshold of every current member on both hash types, otherwise it starts
/// a new singleton. Re-ordering the input can change the partition; that is
/// an accepted property, and identical input order must reproduce the same
/// partition.
///
/// When every off-diagonal dHash distance across the batch is at most 1 the
/// dHash is treated as colliding across diverse images, and its effective
/// threshold tightens to 0 (exact match only). The pHash threshold is fixed.
pub fn cluster_records(
    records: &[ImageRecord],
    dhash_threshold: u32,
    phash_threshold: u32,
) -> Clustering {
    let dist_d = DistanceMatrix::from_hashes(records, |r| &r.dhash);
    let dist_p = DistanceMatrix::from_hashes(records, |r| &r.phash);

    let dhash_suspicious = dist_d.max_off_diagonal().is_some_and(|max| max <= 1);
    let effective_dhash_threshold = if dhash_suspicious { 0 } else { dhash_threshold };

    let mut clusters: Vec<Vec<usize>> = Vec::new();
    for i in 0..records.len() {
        let fits = |cluster: &[usize]| {
            cluster.iter().all(|&j| {
                dist_d.get(i, j) <= effective_dhash_threshold
                    && dist_p.get(i, j) <= phash_threshold
            })
        };
        match clusters.iter_mut().find(|cluster| fits(cluster)) {
            Some(cluster) => cluster.push(i),
            None => clusters.push(vec![i]),
        }
    }

    Clustering {
        clusters,
        effective_dhash_threshold,
    }
}
