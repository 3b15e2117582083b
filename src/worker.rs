//! Background simulation worker.
//!
//! Hosts submit [`WorkerMessage`]s and read [`WorkerResponse`]s; all
//! computation happens on one dedicated thread (Monte Carlo iterations fan
//! out further on the rayon pool). Both enums serialize to the tagged JSON
//! shape used by web hosts, e.g. `{"type":"START_SIMULATION","payload":{...}}`.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::config::{LeagueBands, PartialSimulationConfig};
use crate::error::{Result, SimError};
use crate::monte_carlo::{run_monte_carlo, CancellationToken, MonteCarloOptions, MonteCarloResult};
use crate::season::{run_simulation, SimulationInput, SimulationResult};

/// Host -> worker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    StartSimulation(SimulationInput),

    /// Dials applied beneath whatever the next inputs specify themselves
    UpdateConfig(PartialSimulationConfig),

    #[serde(rename_all = "camelCase")]
    RunMonteCarlo {
        input: SimulationInput,
        iterations: usize,
        #[serde(default)]
        bands: LeagueBands,
    },

    CancelSimulation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// Percent complete (0-100)
    pub progress: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_match: Option<String>,
}

/// Worker -> host
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerResponse {
    Ready,
    SimulationComplete { payload: SimulationResult },
    SimulationProgress { payload: ProgressUpdate },
    MonteCarloComplete { payload: MonteCarloResult },
    Error { error: String },
}

/// Handle to a running simulation worker thread.
///
/// Dropping the handle closes the request channel and joins the thread.
pub struct SimulationWorker {
    requests: Option<Sender<WorkerMessage>>,
    responses: Receiver<WorkerResponse>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SimulationWorker {
    /// Spawn the worker thread. The first response is always `Ready`.
    pub fn spawn() -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<WorkerMessage>();
        let (response_tx, response_rx) = mpsc::channel::<WorkerResponse>();
        let cancel = CancellationToken::new();

        let worker_cancel = cancel.clone();
        let handle = thread::Builder::new()
            .name("season-sim-worker".to_string())
            .spawn(move || Self::serve(request_rx, response_tx, worker_cancel))
            .map_err(SimError::WorkerSpawn)?;

        Ok(SimulationWorker {
            requests: Some(request_tx),
            responses: response_rx,
            cancel,
            handle: Some(handle),
        })
    }

    /// Queue a request. `CancelSimulation` also trips the running job at once,
    /// and every Monte Carlo job queued ahead of it stops before its first
    /// iteration. Jobs queued after it run normally.
    pub fn send(&self, message: WorkerMessage) -> Result<()> {
        if matches!(message, WorkerMessage::CancelSimulation) {
            self.cancel.cancel();
        }
        self.requests
            .as_ref()
            .ok_or(SimError::WorkerDisconnected)?
            .send(message)
            .map_err(|_| SimError::WorkerDisconnected)
    }

    pub fn start_simulation(&self, input: SimulationInput) -> Result<()> {
        self.send(WorkerMessage::StartSimulation(input))
    }

    pub fn run_monte_carlo(&self, input: SimulationInput, iterations: usize, bands: LeagueBands) -> Result<()> {
        self.send(WorkerMessage::RunMonteCarlo {
            input,
            iterations,
            bands,
        })
    }

    pub fn update_config(&self, config: PartialSimulationConfig) -> Result<()> {
        self.send(WorkerMessage::UpdateConfig(config))
    }

    /// Ask the running Monte Carlo job, and any queued behind it, to stop
    /// before their next iteration.
    pub fn cancel(&self) -> Result<()> {
        self.send(WorkerMessage::CancelSimulation)
    }

    /// Block until the next response.
    pub fn recv(&self) -> Result<WorkerResponse> {
        self.responses.recv().map_err(|_| SimError::WorkerDisconnected)
    }

    pub fn try_recv(&self) -> Result<Option<WorkerResponse>> {
        match self.responses.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SimError::WorkerDisconnected),
        }
    }

    /// Close the request channel and wait for queued work to drain.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        drop(self.requests.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("simulation worker thread panicked");
            }
        }
    }

    fn serve(requests: Receiver<WorkerMessage>, responses: Sender<WorkerResponse>, cancel: CancellationToken) {
        let mut overlay = PartialSimulationConfig::default();

        info!("simulation worker ready");
        if responses.send(WorkerResponse::Ready).is_err() {
            return;
        }

        for message in requests {
            let reply = match message {
                WorkerMessage::StartSimulation(input) => {
                    let input = apply_overlay(input, &overlay);
                    guarded(|| WorkerResponse::SimulationComplete {
                        payload: run_simulation(&input),
                    })
                }
                WorkerMessage::RunMonteCarlo {
                    input,
                    iterations,
                    bands,
                } => {
                    let input = apply_overlay(input, &overlay);
                    let options = MonteCarloOptions::new(bands)
                        .with_cancel(cancel.clone())
                        .with_progress(progress_reporter(responses.clone(), iterations));
                    guarded(|| match run_monte_carlo(&input, iterations, &options) {
                        Ok(result) => WorkerResponse::MonteCarloComplete { payload: result },
                        Err(e) => WorkerResponse::Error { error: e.to_string() },
                    })
                }
                WorkerMessage::UpdateConfig(config) => {
                    overlay = config.or(&overlay);
                    debug!(?overlay, "worker config updated");
                    continue;
                }
                WorkerMessage::CancelSimulation => {
                    // Everything queued before this message has seen the flag
                    cancel.reset();
                    debug!("cancel consumed");
                    continue;
                }
            };

            if responses.send(reply).is_err() {
                break;
            }
        }

        info!("simulation worker stopped");
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        self.close();
    }
}

fn apply_overlay(mut input: SimulationInput, overlay: &PartialSimulationConfig) -> SimulationInput {
    input.config = Some(input.config.unwrap_or_default().or(overlay));
    input
}

/// Emits roughly one progress message per percent.
fn progress_reporter(responses: Sender<WorkerResponse>, iterations: usize) -> impl Fn(usize, usize) + Send + Sync {
    let responses = Mutex::new(responses);
    let step = (iterations / 100).max(1);
    move |done, total| {
        if done % step != 0 && done != total {
            return;
        }
        if let Ok(tx) = responses.lock() {
            let _ = tx.send(WorkerResponse::SimulationProgress {
                payload: ProgressUpdate {
                    progress: done as f64 / total as f64 * 100.0,
                    current_match: None,
                },
            });
        }
    }
}

fn guarded(job: impl FnOnce() -> WorkerResponse) -> WorkerResponse {
    panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|panic| {
        let error = panic_message(panic.as_ref());
        warn!(%error, "simulation job panicked");
        WorkerResponse::Error { error }
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Simulation failed".to_string()
    }
}
