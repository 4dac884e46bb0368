//! Real-time integration loop.
//!
//! Input tasks push [`Input`]s into a bounded channel. The loop waits at most
//! one period for the first input, services everything already queued, then
//! integrates exactly once and emits exactly once. A period with no input is
//! an ordinary wake; the state still advances by the elapsed time.
//!
//! There is no shutdown path. The loop runs until the process is killed,
//! or until the output stream can no longer be written.

use crate::emitter::Emitter;
use crate::error::SimError;
use crate::simulator::{Input, Simulator};
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

pub const DEFAULT_PERIOD: Duration = Duration::from_millis(100);
pub const INPUT_QUEUE_DEPTH: usize = 64;
const STATS_LOG_INTERVAL_STEPS: u64 = 100;

/// What woke the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Timeout,
    Input { serviced: usize },
}

#[derive(Debug)]
pub struct Scheduler<W: Write> {
    simulator: Simulator,
    inputs: mpsc::Receiver<Input>,
    emitter: Emitter<W>,
    period: Duration,
    inputs_closed: bool,
}

pub fn input_channel() -> (mpsc::Sender<Input>, mpsc::Receiver<Input>) {
    mpsc::channel(INPUT_QUEUE_DEPTH)
}

impl<W: Write> Scheduler<W> {
    pub fn new(simulator: Simulator, inputs: mpsc::Receiver<Input>, emitter: Emitter<W>) -> Self {
        Self {
            simulator,
            inputs,
            emitter,
            period: DEFAULT_PERIOD,
            inputs_closed: false,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub async fn run(&mut self) -> Result<(), SimError> {
        info!("integrating every {} ms", self.period.as_millis());
        loop {
            self.tick().await?;
        }
    }

    /// One wake: wait, service input, integrate, emit.
    pub async fn tick(&mut self) -> Result<Wake, SimError> {
        let wake = self.wait_and_service().await;

        let yaw_rate = self.simulator.step(Instant::now());
        self.emitter.emit(yaw_rate)?;

        let stats = self.simulator.stats();
        if stats.steps % STATS_LOG_INTERVAL_STEPS == 0 {
            match serde_json::to_string(stats) {
                Ok(json) => debug!(
                    "yaw rate {:.6} rad/s, rudder {:.4} rad, stats {}",
                    yaw_rate,
                    self.simulator.command().commanded_angle(),
                    json
                ),
                Err(e) => warn!("failed to serialize stats: {}", e),
            }
        }
        Ok(wake)
    }

    async fn wait_and_service(&mut self) -> Wake {
        let first = match self.wait_for_input().await {
            Some(input) => input,
            None => return Wake::Timeout,
        };
        self.simulator.apply(first);

        let mut serviced = 1;
        while let Ok(input) = self.inputs.try_recv() {
            self.simulator.apply(input);
            serviced += 1;
        }
        Wake::Input { serviced }
    }

    async fn wait_for_input(&mut self) -> Option<Input> {
        if self.inputs_closed {
            time::sleep(self.period).await;
            return None;
        }
        match time::timeout(self.period, self.inputs.recv()).await {
            Ok(Some(input)) => Some(input),
            Ok(None) => {
                // Every input task is gone; keep the cadence on the timer alone.
                info!("all input sources closed");
                self.inputs_closed = true;
                time::sleep(self.period).await;
                None
            }
            Err(_elapsed) => None,
        }
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn emitter(&self) -> &Emitter<W> {
        &self.emitter
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
