#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use tracksieve::{
    constants::ObjectNumber, observations::Observation, time::NightEpoch, ObservationTable,
};

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shape of a synthetic survey.
#[derive(Debug, Clone, Copy)]
pub struct SurveyShape {
    pub n_objects: u32,
    pub n_nights: i64,
    /// Probability that an object is visited on a given night
    pub visit_probability: f64,
    /// Max detections per visit
    pub max_detections: usize,
}

impl Default for SurveyShape {
    fn default() -> Self {
        SurveyShape {
            n_objects: 200,
            n_nights: 30,
            visit_probability: 0.35,
            max_detections: 4,
        }
    }
}

/// Random but reproducible survey: linear motion on the sky, a few detections per visit with
/// gaps between ~7 minutes and ~3 hours. Half the objects use integer ids, half designations.
/// The batch is shuffled so callers exercise canonicalization.
pub fn synthetic_survey(seed: u64, shape: SurveyShape, epoch: &NightEpoch) -> Vec<Observation> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::new();

    for id in 0..shape.n_objects {
        let object: ObjectNumber = if id % 2 == 0 {
            ObjectNumber::Int(id)
        } else {
            ObjectNumber::String(format!("S{id:07}"))
        };
        let ra0 = rng.random_range(0.0..360.0);
        let dec0 = rng.random_range(-60.0..60.0);
        let ra_rate = rng.random_range(-0.5..0.5);
        let dec_rate = rng.random_range(-0.2..0.2);

        for night in 0..shape.n_nights {
            if !rng.random_bool(shape.visit_probability) {
                continue;
            }
            let n_det = rng.random_range(1..=shape.max_detections);
            let mut t = (epoch.zero + night) as f64 + 0.55 + rng.random_range(0.0..0.2);
            for _ in 0..n_det {
                let dt = t - epoch.zero as f64;
                rows.push(Observation::new(
                    object.clone(),
                    (ra0 + ra_rate * dt).rem_euclid(360.0),
                    (dec0 + dec_rate * dt).clamp(-89.0, 89.0),
                    t,
                    epoch,
                ));
                t += rng.random_range(0.005..0.12);
            }
        }
    }

    // Fisher-Yates
    for i in (1..rows.len()).rev() {
        let j = rng.random_range(0..=i);
        rows.swap(i, j);
    }
    rows
}

/// Canonical table of [`synthetic_survey`].
pub fn synthetic_table(seed: u64, shape: SurveyShape) -> ObservationTable {
    let epoch = NightEpoch::default();
    ObservationTable::canonicalize(synthetic_survey(seed, shape, &epoch)).0
}

/// Two detections of `object` on `night`, ~36" and ~14 minutes apart (always valid with the
/// default thresholds).
pub fn good_tracklet(object: &str, night: i64, epoch: &NightEpoch) -> [Observation; 2] {
    let t = (epoch.zero + night) as f64 + 0.6;
    [
        Observation::new(object, 10.0, 0.0, t, epoch),
        Observation::new(object, 10.01, 0.0, t + 0.01, epoch),
    ]
}
