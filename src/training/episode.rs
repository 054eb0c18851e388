use rand::rngs::StdRng;
use rand::Rng;

use crate::ai::{Agent, HeuristicAgent, QTable, QTableBuilder, RandomAgent, TableAgent};
use crate::error::StepError;
use crate::game::{GameOutcome, Player, StoneGameEnv, NUM_ACTIONS};
use crate::training::metrics::{EpisodeEnd, EpisodeResult};

/// Step size and discount for the Q-learning update.
#[derive(Debug, Clone, Copy)]
pub struct LearningParams {
    pub learning_rate: f64,
    pub gamma: f64,
}

/// Explore uniformly over all actions with probability `epsilon`, otherwise
/// take the first greedy action. Illegal actions are not masked here.
pub fn epsilon_greedy(table: &QTableBuilder, stones: u32, epsilon: f64, rng: &mut StdRng) -> usize {
    if rng.random::<f64>() < epsilon {
        rng.random_range(0..NUM_ACTIONS)
    } else {
        table.best_action(stones)
    }
}

/// Play one episode against the environment, updating `table` after every step.
pub fn run_q_learning_episode(
    env: &mut StoneGameEnv,
    table: &mut QTableBuilder,
    params: LearningParams,
    epsilon: f64,
    rng: &mut StdRng,
) -> Result<EpisodeResult, StepError> {
    let mut observation = env.reset();
    let mut total_reward = 0.0;
    let mut length = 0;

    loop {
        let action = epsilon_greedy(table, observation, epsilon, rng);
        let t = env.step(action)?;

        // Row 0 is all zeros, so terminal transitions bootstrap from nothing.
        let target = t.reward + params.gamma * table.max_value(t.observation);
        table.update(observation, action, target, params.learning_rate);

        observation = t.observation;
        total_reward += t.reward;
        length += 1;
        if t.terminated {
            break;
        }
    }

    Ok(EpisodeResult {
        end: episode_end(env),
        total_reward,
        length,
    })
}

/// Play one episode with `agent` choosing every move, without learning.
pub fn play_episode(env: &mut StoneGameEnv, agent: &mut dyn Agent) -> Result<EpisodeResult, StepError> {
    env.reset();
    let mut total_reward = 0.0;
    let mut length = 0;

    while !env.state().is_terminal() {
        let Some(action) = agent.select_action(env.state()) else {
            break;
        };
        let t = env.step(action)?;
        total_reward += t.reward;
        length += 1;
    }

    Ok(EpisodeResult {
        end: episode_end(env),
        total_reward,
        length,
    })
}

/// Greedy win rate of `table` against the scripted opponent over `games` episodes.
pub fn evaluate(table: &QTable, initial_stones: u32, games: usize, seed: u64) -> Result<f32, StepError> {
    let mut agent = TableAgent::seeded(Some(table.clone()), derive_seed(seed, 1));
    evaluate_agent(&mut agent, initial_stones, games, seed)
}

/// Win rate of any `agent` in the first seat against the scripted opponent.
pub fn evaluate_agent(
    agent: &mut dyn Agent,
    initial_stones: u32,
    games: usize,
    seed: u64,
) -> Result<f32, StepError> {
    if games == 0 {
        return Ok(0.0);
    }
    let mut env = StoneGameEnv::new(initial_stones, derive_seed(seed, 0));
    let mut wins = 0;

    for _ in 0..games {
        if play_episode(&mut env, agent)?.end == EpisodeEnd::Won {
            wins += 1;
        }
    }
    Ok(wins as f32 / games as f32)
}

/// Win rates of the random and scripted baselines under the same evaluation.
pub fn baseline_win_rates(
    initial_stones: u32,
    games: usize,
    seed: u64,
) -> Result<Vec<(String, f32)>, StepError> {
    let mut baselines: Vec<Box<dyn Agent>> = vec![
        Box::new(RandomAgent::seeded(derive_seed(seed, 1))),
        Box::new(HeuristicAgent::seeded(derive_seed(seed, 1))),
    ];
    baselines
        .iter_mut()
        .map(|agent| {
            let wr = evaluate_agent(agent.as_mut(), initial_stones, games, seed)?;
            Ok((agent.name().to_string(), wr))
        })
        .collect()
}

fn episode_end(env: &StoneGameEnv) -> EpisodeEnd {
    match env.state().outcome() {
        Some(GameOutcome::Winner(Player::Agent)) => EpisodeEnd::Won,
        Some(GameOutcome::Forfeit(Player::Agent)) => EpisodeEnd::Illegal,
        _ => EpisodeEnd::Lost,
    }
}

/// Derive an independent seed for `stream` from a run's base seed.
pub fn derive_seed(base_seed: u64, stream: u64) -> u64 {
    // FNV-1a-inspired mixing for deterministic, well-distributed seeds
    let mut hash = base_seed ^ 0x517cc1b727220a95;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= stream;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= stream >> 32;
    hash
}
