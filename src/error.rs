use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("conversion backend failed: {0}")]
    Backend(String),
    #[error("conversion job interrupted before completion")]
    Interrupted,
}

impl JobError {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Backend(_) => "backend",
            Self::Interrupted => "interrupted",
        }
    }
}
