use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures acquiring or reading the CAN bus socket.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("CAN socket: {0}")]
    Socket(#[source] io::Error),
    #[error("invalid interface name {0:?}")]
    InterfaceName(String),
    #[error("no such interface {interface}: {source}")]
    UnknownInterface {
        interface: String,
        #[source]
        source: io::Error,
    },
    #[error("bind to {interface}: {source}")]
    Bind {
        interface: String,
        #[source]
        source: io::Error,
    },
    #[error("setsockopt(CAN_RAW_FILTER): {0}")]
    Filter(#[source] io::Error),
    #[error("register socket with the reactor: {0}")]
    Register(#[source] io::Error),
    #[error("read from socket: {0}")]
    Read(#[source] io::Error),
}

/// Rejections of an inbound frame. Never fatal to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("short frame {length}, need {expected} bytes")]
    ShortFrame { length: usize, expected: usize },
    #[error("unexpected PGN {0}")]
    WrongPgn(u32),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid speed factor {0:?}")]
    InvalidSpeed(String),
    #[error("invalid loop period {0:?}")]
    InvalidPeriod(String),
    #[error("read vessel file {path}: {source}")]
    VesselFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse vessel constants: {0}")]
    VesselJson(#[from] serde_json::Error),
    #[error("vessel constant {name} must be positive and finite, got {value}")]
    InvalidConstant { name: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("write yaw rate: {0}")]
    Output(#[from] io::Error),
}
