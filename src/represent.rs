//! Column Representer: raw values → `ColumnSummary`.
//!
//! ```text
//! values ──sample(max_items)──► one-hot(max_length) ──encoder──► latents
//!        ──per-dim mean / unbiased variance──► floor(1e-4) ──► ColumnSummary
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{RepresentConfig, Sampling};
use crate::encoder::{encode_batch, ValueEncoder};
use crate::model::{Column, ColumnSample, ColumnSummary};
use crate::{Error, Result};

/// Summarise one column's values. `Ok(None)` when there is nothing to encode.
pub fn represent_column<E, S>(encoder: &E, values: &[S], config: &RepresentConfig) -> Result<Option<ColumnSummary>>
where
    E: ValueEncoder + ?Sized,
    S: AsRef<str>,
{
    if values.is_empty() {
        return Ok(None);
    }

    let picked = sample_values(values, config.max_items, config.sampling);
    let batch = encode_batch(&picked, config.max_length);
    let latents = encoder.encode(&batch)?;

    if latents.len() != batch.len() {
        return Err(Error::Encoder(format!(
            "encoder returned {} vectors for a batch of {}",
            latents.len(),
            batch.len()
        )));
    }

    let (mean, variance) = moments(&latents, encoder.latent_dim())?;
    ColumnSummary::new(mean, variance).map(Some)
}

/// Summarise every column in parallel, keeping source order and dropping
/// columns without a summary.
pub fn represent_columns<E>(
    encoder: &E,
    samples: &[ColumnSample],
    config: &RepresentConfig,
) -> Result<Vec<(ColumnSummary, Column)>>
where
    E: ValueEncoder + ?Sized,
{
    let summaries: Vec<Option<ColumnSummary>> = samples
        .par_iter()
        .map(|s| represent_column(encoder, &s.values, config))
        .collect::<Result<_>>()?;

    let represented: Vec<(ColumnSummary, Column)> = summaries
        .into_iter()
        .zip(samples)
        .filter_map(|(summary, sample)| summary.map(|g| (g, sample.column.clone())))
        .collect();

    info!(
        represented = represented.len(),
        skipped = samples.len() - represented.len(),
        "columns represented"
    );
    Ok(represented)
}

/// Pick at most `max_items` values. Random sampling keeps source order.
fn sample_values<S: AsRef<str>>(values: &[S], max_items: usize, sampling: Sampling) -> Vec<&str> {
    if values.len() <= max_items {
        return values.iter().map(AsRef::as_ref).collect();
    }
    match sampling {
        Sampling::Head => values[..max_items].iter().map(AsRef::as_ref).collect(),
        Sampling::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut idx = rand::seq::index::sample(&mut rng, values.len(), max_items).into_vec();
            idx.sort_unstable();
            debug!(from = values.len(), kept = max_items, "random value sample");
            idx.into_iter().map(|i| values[i].as_ref()).collect()
        }
    }
}

/// Per-dimension sample mean and unbiased variance. A single latent yields
/// NaN variances, which `ColumnSummary::new` floors.
fn moments(latents: &[Vec<f64>], dim: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let n = latents.len();
    let mut mean = vec![0.0; dim];
    for v in latents {
        if v.len() != dim {
            return Err(Error::DimensionMismatch { expected: dim, got: v.len() });
        }
        for (m, x) in mean.iter_mut().zip(v) {
            *m += x;
        }
    }
    for m in &mut mean {
        *m /= n as f64;
    }

    let variance = if n < 2 {
        vec![f64::NAN; dim]
    } else {
        let mut ss = vec![0.0; dim];
        for v in latents {
            for ((s, x), m) in ss.iter_mut().zip(v).zip(&mean) {
                *s += (x - m) * (x - m);
            }
        }
        ss.into_iter().map(|s| s / (n - 1) as f64).collect()
    };

    Ok((mean, variance))
}
