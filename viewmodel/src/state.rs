use ideas::{AnalysisState, IdeaBatch, Language};
use tracing::debug;

/// Where the user is in the capture-to-results flow.
#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    Idle,
    Capturing,
    Uploading,
    Analyzing { partial: IdeaBatch },
    Results { ideas: IdeaBatch, error: Option<String> },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Capturing => "capturing",
            Phase::Uploading => "uploading",
            Phase::Analyzing { .. } => "analyzing",
            Phase::Results { .. } => "results",
        }
    }
}

/// Everything that can advance the flow.
#[derive(Clone, Debug)]
pub enum Input {
    StartCapture,
    CaptureFailed(String),
    ImageAcquired,
    Uploaded(String),
    UploadFailed(String),
    Analysis(AnalysisState),
    Retry,
    Retake,
    Back,
}

#[derive(Clone, Debug)]
pub struct ViewModel {
    phase: Phase,
    image_url: Option<String>,
    language: Language,
}

impl ViewModel {
    pub fn new(language: Language) -> Self {
        Self {
            phase: Phase::Idle,
            image_url: None,
            language,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// URL of the last uploaded image, kept so retry can skip re-upload.
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Advance the flow. Inputs that make no sense in the current phase
    /// are ignored rather than corrupting state.
    pub fn apply(&mut self, input: Input) {
        match input {
            Input::StartCapture => {
                self.phase = Phase::Capturing;
            }
            Input::CaptureFailed(message) => {
                self.phase = Phase::Results {
                    ideas: IdeaBatch::new(),
                    error: Some(message),
                };
            }
            Input::ImageAcquired => {
                self.phase = Phase::Uploading;
            }
            Input::Uploaded(url) => {
                self.image_url = Some(url);
                self.phase = Phase::Analyzing {
                    partial: IdeaBatch::new(),
                };
            }
            Input::UploadFailed(message) => {
                self.phase = Phase::Results {
                    ideas: IdeaBatch::new(),
                    error: Some(message),
                };
            }
            Input::Analysis(state) => self.apply_analysis(state),
            Input::Retry => {
                if self.image_url.is_some() {
                    self.phase = Phase::Analyzing {
                        partial: IdeaBatch::new(),
                    };
                } else {
                    debug!("retry ignored: no cached image url");
                }
            }
            Input::Retake => {
                self.image_url = None;
                self.phase = Phase::Capturing;
            }
            Input::Back => {
                self.image_url = None;
                self.phase = Phase::Idle;
            }
        }
    }

    fn apply_analysis(&mut self, state: AnalysisState) {
        match state {
            AnalysisState::Idle => {}
            AnalysisState::InProgress(batch) => {
                self.phase = Phase::Analyzing { partial: batch };
            }
            AnalysisState::Completed(batch) => {
                self.phase = Phase::Results {
                    ideas: batch,
                    error: None,
                };
            }
            AnalysisState::Failed { error, batch } => {
                self.phase = Phase::Results {
                    ideas: batch,
                    error: Some(error.to_string()),
                };
            }
        }
    }
}
