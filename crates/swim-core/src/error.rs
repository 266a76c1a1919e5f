use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwimError {
    #[error("Degenerate curve: {0}")]
    DegenerateCurve(String),

    #[error("Cannot encode an empty sample set")]
    EmptySampleSet,

    #[error("Degenerate mesh: {0}")]
    DegenerateMesh(String),

    #[error("Asset load error: {0}")]
    AssetLoad(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SwimError {
    pub fn degenerate_curve(msg: impl Into<String>) -> Self {
        Self::DegenerateCurve(msg.into())
    }

    pub fn degenerate_mesh(msg: impl Into<String>) -> Self {
        Self::DegenerateMesh(msg.into())
    }

    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SwimError>;
