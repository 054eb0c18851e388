use std::collections::VecDeque;

/// How an episode ended for the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeEnd {
    Won,
    Lost,
    /// The agent tried to take more stones than remained.
    Illegal,
}

/// Result of a single episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    pub end: EpisodeEnd,
    pub total_reward: f64,
    /// Number of agent steps taken.
    pub length: usize,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    fn rate(&self, last_n: usize, end: EpisodeEnd) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| r.end == end)
            .count();
        hits as f32 / n as f32
    }

    /// Agent win rate in the last N episodes.
    pub fn win_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, EpisodeEnd::Won)
    }

    /// Rate of games lost to the opponent in the last N episodes.
    pub fn loss_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, EpisodeEnd::Lost)
    }

    /// Rate of episodes ended by an illegal move in the last N episodes.
    pub fn illegal_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, EpisodeEnd::Illegal)
    }

    /// Average undiscounted return over the last N episodes.
    pub fn average_return(&self, last_n: usize) -> f64 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.total_reward)
            .sum();
        sum / n as f64
    }

    /// Average episode length over the last N episodes.
    pub fn average_length(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.length)
            .sum();
        total as f32 / n as f32
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(end: EpisodeEnd, total_reward: f64, length: usize) -> EpisodeResult {
        EpisodeResult {
            end,
            total_reward,
            length,
        }
    }

    #[test]
    fn test_win_rate() {
        let mut m = TrainingMetrics::new();
        for _ in 0..7 {
            m.record_episode(result(EpisodeEnd::Won, 1.0, 5));
        }
        for _ in 0..3 {
            m.record_episode(result(EpisodeEnd::Lost, -1.0, 5));
        }
        assert!((m.win_rate(10) - 0.7).abs() < 1e-6);
        assert!((m.loss_rate(10) - 0.3).abs() < 1e-6);
        assert_eq!(m.illegal_rate(10), 0.0);
    }

    #[test]
    fn test_window_only_counts_recent() {
        let mut m = TrainingMetrics::new();
        m.record_episode(result(EpisodeEnd::Illegal, -10.0, 1));
        m.record_episode(result(EpisodeEnd::Won, 1.0, 4));
        assert_eq!(m.win_rate(1), 1.0);
        assert!((m.illegal_rate(2) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_average_return_and_length() {
        let mut m = TrainingMetrics::new();
        m.record_episode(result(EpisodeEnd::Won, 1.0, 4));
        m.record_episode(result(EpisodeEnd::Illegal, -10.0, 6));
        assert!((m.average_return(10) + 4.5).abs() < 1e-9);
        assert!((m.average_length(10) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_capacity_caps_window_not_total() {
        let mut m = TrainingMetrics::with_capacity(3);
        for _ in 0..10 {
            m.record_episode(result(EpisodeEnd::Lost, -1.0, 2));
        }
        assert_eq!(m.total_episodes(), 10);
        assert_eq!(m.loss_rate(100), 1.0);
    }

    #[test]
    fn test_empty_metrics() {
        let m = TrainingMetrics::new();
        assert_eq!(m.win_rate(10), 0.0);
        assert_eq!(m.average_return(10), 0.0);
        assert_eq!(m.total_episodes(), 0);
    }
}
