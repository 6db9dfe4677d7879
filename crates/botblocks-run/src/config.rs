//! Runner configuration.

use std::time::Duration;

use botblocks_storage::GameSpeed;

use crate::interpreter::InterpreterConfig;

/// Pacing and limits for the async runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Base pause after each block that hands control to another block.
    pub step_delay: Duration,
    /// Divides the pause while fast-forward is on.
    pub fast_forward_divisor: u32,
    /// Abort after this many blocks. `None` runs until completion.
    pub max_steps: Option<u64>,
    /// Record a trace and return it with the completion event.
    pub trace_enabled: bool,
    pub speed: GameSpeed,
    /// Seed for `Speak` message selection. `None` draws from entropy.
    pub speech_seed: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            step_delay: Duration::from_secs(1),
            fast_forward_divisor: 4,
            max_steps: None,
            trace_enabled: false,
            speed: GameSpeed::Normal,
            speech_seed: None,
        }
    }
}

impl RunnerConfig {
    /// The pause between two ticks.
    pub fn tick_delay(&self, fast_forward: bool) -> Duration {
        let delay = self.step_delay.mul_f32(self.speed.delay_factor());
        if fast_forward {
            delay / self.fast_forward_divisor.max(1)
        } else {
            delay
        }
    }

    pub fn interpreter(&self) -> InterpreterConfig {
        InterpreterConfig {
            trace_enabled: self.trace_enabled,
            max_steps: self.max_steps,
        }
    }
}
