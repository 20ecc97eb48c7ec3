//! Error types for GoldenEyes

use thiserror::Error;

/// Main error type for GoldenEyes
#[derive(Error, Debug)]
pub enum GoldenEyesError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Face tracking errors (VMC + MediaPipe)
#[derive(Error, Debug)]
pub enum TrackingError {
    /// Tracking input could not be started. Fatal for the screen.
    #[error("Face tracking unavailable: {0}")]
    Unavailable(String),

    #[error("Tracking receiver error: {0}")]
    Receiver(String),

    #[error("VMC parse error: {0}")]
    VmcParse(String),

    #[error("MediaPipe parse error: {0}")]
    MpParse(String),
}

/// Audio cue errors. None of these are fatal.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Sound file '{0}' not found")]
    ResourceNotFound(String),

    #[error("Failed to decode sound: {0}")]
    Decode(String),

    #[error("No audio output device: {0}")]
    OutputDevice(String),

    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Console command errors
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument for '{0}'")]
    MissingArgument(&'static str),

    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument { command: &'static str, value: String },
}

/// Result type alias for GoldenEyes operations
pub type Result<T> = std::result::Result<T, GoldenEyesError>;
