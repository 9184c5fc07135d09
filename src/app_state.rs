use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::update::UpdateOutcome;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Progress {
    Indeterminate,
    Determinate(f32),
}

pub struct AppState {
    progress: Option<Progress>,
    downloaded: u64,
    error: Option<String>,
    outcome: Option<UpdateOutcome>,
}

/// Status of the current run, shared between the update flow and whatever displays it.
pub struct AppStateManager {
    state: Arc<Mutex<AppState>>,
    echo: bool,
}

impl AppStateManager {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState {
                progress: None,
                downloaded: 0,
                error: None,
                outcome: None,
            })),
            echo: false,
        }
    }

    /// Like `new`, but download progress is also drawn on stdout.
    pub fn with_console() -> Self {
        Self {
            echo: true,
            ..Self::new()
        }
    }

    // Getter methods
    pub fn progress(&self) -> Option<Progress> {
        self.state.lock().progress
    }

    pub fn downloaded(&self) -> u64 {
        self.state.lock().downloaded
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn outcome(&self) -> Option<UpdateOutcome> {
        self.state.lock().outcome
    }

    // Combined operations
    pub fn start_operation(&self, operation: &str) {
        tracing::info!("{operation}");
        let mut state = self.state.lock();
        state.progress = Some(Progress::Indeterminate);
    }

    pub fn start_download(&self, operation: &str, total: Option<u64>) {
        tracing::info!("{operation}");
        let mut state = self.state.lock();
        state.downloaded = 0;
        state.progress = Some(match total {
            Some(_) => Progress::Determinate(0.0),
            None => Progress::Indeterminate,
        });
    }

    pub fn update_download(&self, downloaded: u64, progress: Progress) {
        {
            let mut state = self.state.lock();
            state.downloaded = downloaded;
            state.progress = Some(progress);
        }

        if self.echo {
            let mut stdout = std::io::stdout().lock();
            let _ = match progress {
                Progress::Determinate(fraction) => {
                    write!(stdout, "\rDownload progress: {:.2}%", fraction * 100.0)
                }
                Progress::Indeterminate => write!(stdout, "\rDownloaded {downloaded} bytes"),
            };
            let _ = stdout.flush();
        }
    }

    pub fn finish_download(&self) {
        if self.echo {
            println!();
        }
    }

    pub fn finish_operation(&self, outcome: UpdateOutcome) {
        let mut state = self.state.lock();
        state.progress = None;
        state.outcome = Some(outcome);
    }

    pub fn set_operation_failed(&self, error_msg: &str) {
        let mut state = self.state.lock();
        state.error = Some(error_msg.to_string());
        state.progress = None;
    }
}

impl Default for AppStateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for AppStateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            echo: self.echo,
        }
    }
}
