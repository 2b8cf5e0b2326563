use crate::drivers::send_flags::Flags;
use crate::error::{DynError, DynResult};
use crate::utils::dyn_future::DynFuture;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

/// Frames sent on a DALI bus.
#[derive(Debug, Clone)]
pub enum DaliFrame {
    /// Backward frame
    Frame8(u8),
    /// Forward frame for control gear
    Frame16([u8; 2]),
    /// Forward frame for control devices
    Frame24([u8; 3]),
}

/// Result of a send transaction.
#[derive(Debug)]
pub enum DaliSendResult {
    /// The frame was sent, no answer was requested
    Ok,
    /// An answer was received
    Answer(u8),
    /// No answer was received within the backward frame interval
    Timeout,
    /// The answer was corrupt, usually because multiple devices
    /// answered at once
    Framing,
    DriverError(DynError),
}

impl DaliSendResult {
    /// Fail unless the frame was sent without requesting an answer.
    pub fn check_send(self) -> Result<(), DaliSendResult> {
        match self {
            DaliSendResult::Ok => Ok(()),
            e => Err(e),
        }
    }

    /// Fail unless an answer was received.
    pub fn check_answer(self) -> Result<u8, DaliSendResult> {
        match self {
            DaliSendResult::Answer(r) => Ok(r),
            e => Err(e),
        }
    }

    /// Treat any answer as yes and a missing answer as no.
    pub fn check_yes_no(self) -> Result<bool, DaliSendResult> {
        match self {
            DaliSendResult::Answer(_) => Ok(true),
            DaliSendResult::Timeout => Ok(false),
            e => Err(e),
        }
    }
}

impl std::fmt::Display for DaliSendResult {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DaliSendResult::Ok => write!(f, "Send OK"),
            DaliSendResult::Answer(a) => write!(f, "Answer: 0x{:02x}", a),
            DaliSendResult::Timeout => write!(f, "Timeout"),
            DaliSendResult::Framing => write!(f, "Invalid framing"),
            DaliSendResult::DriverError(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for DaliSendResult {}

/// Activity observed on the bus.
#[derive(Debug, Clone)]
pub enum DaliBusEventType {
    Frame8(u8),
    Frame16([u8; 2]),
    Frame24([u8; 3]),
    FramingError,
    BusPowerOff,
    BusPowerOn,
    /// Events were lost because they were not read fast enough
    Overrun,
}

#[derive(Debug, Clone)]
pub struct DaliBusEvent {
    pub timestamp: Instant,
    pub event_type: DaliBusEventType,
}

pub type DaliBusEventResult = DynResult<DaliBusEvent>;

/// Low level interface to a DALI bus.
pub trait DaliDriver: Send {
    /// Send a frame and wait for the transaction to finish, including
    /// any answer requested through `flags`.
    fn send_frame(&mut self, cmd: DaliFrame, flags: Flags) -> DynFuture<'_, DaliSendResult>;

    /// Next frame or bus state change seen on the bus. Frames sent by
    /// this driver are not reported.
    fn next_bus_event(&mut self) -> DynFuture<'_, DaliBusEventResult>;

    /// Current time using the same clock as bus event timestamps.
    fn current_timestamp(&self) -> Instant;

    /// Wait until `end`, as measured by the driver's clock.
    fn wait_until(&self, end: Instant) -> DynFuture<'_, ()>;
}

#[derive(Debug)]
pub enum OpenError {
    /// No driver matches the requested name
    NotFound,
    /// A driver parameter is missing or malformed
    ParameterError(String),
    DriverError(DynError),
}

impl std::fmt::Display for OpenError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OpenError::NotFound => write!(f, "Driver not found"),
            OpenError::ParameterError(p) => write!(f, "Invalid driver parameter: {}", p),
            OpenError::DriverError(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for OpenError {}

pub struct DriverInfo {
    pub name: String,
    pub description: String,
    pub open: fn(params: HashMap<String, String>) -> Result<Box<dyn DaliDriver>, OpenError>,
}

lazy_static! {
    static ref DALI_DRIVERS: Mutex<Vec<DriverInfo>> = Mutex::new(Vec::new());
}

pub fn add_driver(info: DriverInfo) {
    let mut drivers = DALI_DRIVERS.lock().unwrap();
    drivers.push(info);
}

/// Open a driver given a name of the form
/// `driver<:param=value<,param=value>...>`.
/// The name `default` selects the first registered driver.
pub fn open(name: &str) -> Result<Box<dyn DaliDriver>, OpenError> {
    let (name, param_str) = match name.split_once(':') {
        Some((name, params)) => (name, params),
        None => (name, ""),
    };
    let mut params = HashMap::new();
    for param in param_str.split(',').filter(|p| !p.is_empty()) {
        match param.split_once('=') {
            Some((key, value)) => {
                params.insert(key.to_string(), value.to_string());
            }
            None => return Err(OpenError::ParameterError(param.to_string())),
        }
    }
    let drivers = DALI_DRIVERS.lock().unwrap();
    if name.eq_ignore_ascii_case("default") {
        return match drivers.first() {
            Some(info) => (info.open)(params),
            None => Err(OpenError::NotFound),
        };
    }
    for info in drivers.iter() {
        if info.name.eq_ignore_ascii_case(name) {
            return (info.open)(params);
        }
    }
    Err(OpenError::NotFound)
}

pub fn driver_names() -> Vec<String> {
    let drivers = DALI_DRIVERS.lock().unwrap();
    drivers.iter().map(|info| info.name.clone()).collect()
}
