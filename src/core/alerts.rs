//! Planning of injected alert patterns.

use crate::config::toml_config::AlertConfig;
use crate::domain::model::{AccountId, AlertKind, AlertPattern, ScheduledTransfer};
use crate::utils::error::{Result, SimError};
use rand::seq::index;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Each hop of a cycle keeps this fraction range of the previous amount.
const CYCLE_RETENTION: (f64, f64) = (0.90, 0.99);

/// Lays out every configured alert over `accounts` accounts and `steps` steps.
/// Alert ids are assigned in configuration order starting at zero.
pub fn plan_alerts<R: Rng + ?Sized>(
    configs: &[AlertConfig],
    accounts: usize,
    steps: u64,
    rng: &mut R,
) -> Result<Vec<AlertPattern>> {
    let mut patterns = Vec::new();
    let mut next_id = 0i64;

    for config in configs {
        if config.accounts > accounts || config.accounts < 2 {
            return Err(SimError::SimulationError {
                message: format!(
                    "{} alert needs {} accounts but {} exist",
                    config.pattern, config.accounts, accounts
                ),
            });
        }
        if config.period == 0 || config.period > steps {
            return Err(SimError::SimulationError {
                message: format!(
                    "{} alert period {} does not fit in {} steps",
                    config.pattern, config.period, steps
                ),
            });
        }

        for _ in 0..config.count {
            let pattern = plan_one(next_id, config, accounts, steps, rng);
            tracing::debug!(
                "🚨 alert {} ({}) over steps {}..={} with {} accounts",
                pattern.id,
                pattern.kind,
                pattern.start_step,
                pattern.end_step,
                pattern.accounts.len()
            );
            patterns.push(pattern);
            next_id += 1;
        }
    }

    Ok(patterns)
}

fn plan_one<R: Rng + ?Sized>(
    id: i64,
    config: &AlertConfig,
    accounts: usize,
    steps: u64,
    rng: &mut R,
) -> AlertPattern {
    let members: Vec<AccountId> = index::sample(rng, accounts, config.accounts).into_vec();
    let start_step = rng.gen_range(0..=steps - config.period);
    let end_step = start_step + config.period - 1;
    let amounts = Uniform::new_inclusive(config.min_amount, config.max_amount);

    let hub = members[0];
    let transfers = match config.pattern {
        AlertKind::FanOut => spread(&members[1..], start_step, config.period)
            .map(|(step, member)| ScheduledTransfer {
                step,
                orig: hub,
                dest: member,
                amount: round_cents(amounts.sample(rng)),
            })
            .collect(),
        AlertKind::FanIn => spread(&members[1..], start_step, config.period)
            .map(|(step, member)| ScheduledTransfer {
                step,
                orig: member,
                dest: hub,
                amount: round_cents(amounts.sample(rng)),
            })
            .collect(),
        AlertKind::Cycle => {
            let retention = Uniform::new_inclusive(CYCLE_RETENTION.0, CYCLE_RETENTION.1);
            let mut amount = amounts.sample(rng);
            let mut hops = Vec::with_capacity(members.len());
            for (step, (k, &orig)) in spread(&members, start_step, config.period)
                .map(|(step, _)| step)
                .zip(members.iter().enumerate())
            {
                let dest = members[(k + 1) % members.len()];
                hops.push(ScheduledTransfer {
                    step,
                    orig,
                    dest,
                    amount: round_cents(amount),
                });
                amount *= retention.sample(rng);
            }
            hops
        }
    };

    AlertPattern {
        id,
        kind: config.pattern,
        accounts: members,
        start_step,
        end_step,
        transfers,
    }
}

/// Spreads `items` evenly over `[start, start + period)`, in order.
fn spread<T: Copy>(items: &[T], start: u64, period: u64) -> impl Iterator<Item = (u64, T)> + '_ {
    let n = items.len() as u64;
    items
        .iter()
        .enumerate()
        .map(move |(i, &item)| (start + (i as u64 * period) / n, item))
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
