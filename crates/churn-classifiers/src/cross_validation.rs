use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::CrossValidationConfig;
use crate::error::{ChurnError, Result};

/// Row positions of one train/held-out split.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified k-fold split over binary labels.
///
/// Churned rows are dealt round-robin over the folds, then retained rows
/// continue from where the churned ones stopped, so fold sizes differ by at
/// most one and both classes are spread evenly. With `shuffle` each class is
/// permuted first using a `StdRng` seeded from the config. Index lists inside
/// a fold are ascending.
pub fn stratified_folds(labels: &[u8], config: &CrossValidationConfig) -> Result<Vec<Fold>> {
    let n_folds = config.n_folds;
    if n_folds < 2 {
        return Err(ChurnError::InvalidConfig(format!(
            "cross-validation needs at least 2 folds, got {}",
            n_folds
        )));
    }
    if labels.len() < n_folds {
        return Err(ChurnError::InvalidConfig(format!(
            "cannot split {} rows into {} folds",
            labels.len(),
            n_folds
        )));
    }

    let mut churned: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == 1).collect();
    let mut retained: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] != 1).collect();
    if config.shuffle {
        let mut rng = StdRng::seed_from_u64(config.seed);
        churned.shuffle(&mut rng);
        retained.shuffle(&mut rng);
    }

    let mut held_out: Vec<Vec<usize>> = vec![Vec::new(); n_folds];
    for (i, &row) in churned.iter().chain(retained.iter()).enumerate() {
        held_out[i % n_folds].push(row);
    }

    let folds: Vec<Fold> = (0..n_folds)
        .map(|k| {
            let mut test = held_out[k].clone();
            test.sort_unstable();
            let mut train: Vec<usize> = held_out
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != k)
                .flat_map(|(_, rows)| rows.iter().copied())
                .collect();
            train.sort_unstable();
            Fold { train, test }
        })
        .collect();

    for (k, fold) in folds.iter().enumerate() {
        let positives = fold.test.iter().filter(|&&i| labels[i] == 1).count();
        log::trace!(
            "Fold {}: {} train rows, {} held-out rows ({} churned)",
            k,
            fold.train.len(),
            fold.test.len(),
            positives
        );
        if positives == 0 {
            log::warn!("Fold {} holds out no churned rows", k);
        }
    }
    Ok(folds)
}
