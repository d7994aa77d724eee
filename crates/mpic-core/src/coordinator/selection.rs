//! Deterministic, diversity-aware selection of perspective cohorts.
//!
//! Perspectives are ranked per target by `SHA-256(hash_secret || target || code)`, so one
//! target always sees the same ranking while different targets spread load across the pool.
//! The ranking is then cut greedily into disjoint cohorts. Attempt `n` uses cohort `n`.

use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::perspective::Perspective;

pub type Cohort = Vec<Arc<Perspective>>;

/// Builds cohorts for a target from the resolved target perspectives.
#[derive(Debug, Clone)]
pub struct CohortSelector {
    hash_secret: String,
}

impl CohortSelector {
    #[must_use]
    pub fn new(hash_secret: impl Into<String>) -> Self {
        Self { hash_secret: hash_secret.into() }
    }

    fn rank_key(&self, target: &str, code: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.hash_secret.as_bytes());
        hasher.update(target.as_bytes());
        hasher.update(code.as_bytes());
        hasher.finalize().into()
    }

    /// Orders `perspectives` for `target`.
    #[must_use]
    pub fn rank(&self, target: &str, perspectives: &[Arc<Perspective>]) -> Cohort {
        let mut keyed: Vec<_> = perspectives
            .iter()
            .map(|p| (self.rank_key(target, &p.code), Arc::clone(p)))
            .collect();
        keyed.sort_by(|(a, pa), (b, pb)| a.cmp(b).then_with(|| pa.code.cmp(&pb.code)));
        keyed.into_iter().map(|(_, p)| p).collect()
    }

    /// Splits the ranking for `target` into disjoint cohorts of exactly `cohort_size`.
    ///
    /// Leftover perspectives that cannot fill a whole cohort are not used.
    #[must_use]
    pub fn cohorts(
        &self,
        target: &str,
        perspectives: &[Arc<Perspective>],
        cohort_size: usize,
    ) -> Vec<Cohort> {
        if cohort_size == 0 {
            return Vec::new();
        }

        let mut pool = self.rank(target, perspectives);
        let mut cohorts = Vec::with_capacity(pool.len() / cohort_size);

        while pool.len() >= cohort_size {
            let picked = pick_cohort(&pool, cohort_size);
            let cohort = picked.iter().map(|&i| Arc::clone(&pool[i])).collect();
            let mut index = 0;
            pool.retain(|_| {
                let keep = !picked.contains(&index);
                index += 1;
                keep
            });
            cohorts.push(cohort);
        }

        cohorts
    }
}

/// Picks `size` indices from `pool`, walking it in rank order.
///
/// A candidate too close to an already picked perspective is skipped. When the cohort is one
/// short and every pick so far shares an RIR, a same-RIR candidate is skipped if a usable
/// candidate from another RIR is still ahead. If the rules leave the cohort short, the
/// remaining slots are filled in rank order regardless.
fn pick_cohort(pool: &[Arc<Perspective>], size: usize) -> Vec<usize> {
    fn usable(pool: &[Arc<Perspective>], picked: &[usize], candidate: &Perspective) -> bool {
        picked.iter().all(|&i| !pool[i].is_too_close_to(candidate))
    }

    let mut picked: Vec<usize> = Vec::with_capacity(size);

    for (i, candidate) in pool.iter().enumerate() {
        if picked.len() == size {
            break;
        }
        if !usable(pool, &picked, candidate) {
            continue;
        }

        if size > 1 && picked.len() == size - 1 {
            let only_rir = pool[picked[0]].rir.as_str();
            let single_rir = picked.iter().all(|&j| pool[j].rir == only_rir);
            if single_rir && candidate.rir == only_rir {
                let other_rir_ahead = pool[i + 1..]
                    .iter()
                    .any(|p| p.rir != only_rir && usable(pool, &picked, p));
                if other_rir_ahead {
                    continue;
                }
            }
        }

        picked.push(i);
    }

    for i in 0..pool.len() {
        if picked.len() == size {
            break;
        }
        if !picked.contains(&i) {
            picked.push(i);
        }
    }

    picked
}
