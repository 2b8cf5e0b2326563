use super::gear::SimGear;
use super::input::SimInput;
use crate::common::address::Short;
use crate::drivers::driver::{
    DaliBusEvent, DaliBusEventResult, DaliBusEventType, DaliDriver, DaliFrame, DaliSendResult,
    DriverInfo, OpenError,
};
use crate::drivers::send_flags::Flags;
use crate::utils::dyn_future::DynFuture;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::mpsc;

struct Listener {
    driver_id: u32,
    events: mpsc::UnboundedSender<DaliBusEvent>,
}

struct BusState {
    gears: Vec<SimGear>,
    inputs: Vec<SimInput>,
    listeners: Vec<Listener>,
    next_driver_id: u32,
}

impl BusState {
    /// Report bus activity to all listeners except `skip`. Listeners
    /// whose driver is gone are dropped.
    fn broadcast(&mut self, event_type: DaliBusEventType, skip: Option<u32>) {
        let timestamp = Instant::now();
        self.listeners.retain(|listener| {
            if Some(listener.driver_id) == skip {
                return true;
            }
            listener
                .events
                .send(DaliBusEvent {
                    timestamp,
                    event_type: event_type.clone(),
                })
                .is_ok()
        });
    }

    fn dispatch(&mut self, frame: &DaliFrame, flags: &Flags, from: u32) -> DaliSendResult {
        let twice = flags.send_twice();
        let mut answers = Vec::new();
        match frame {
            DaliFrame::Frame16(bytes) => {
                self.broadcast(DaliBusEventType::Frame16(*bytes), Some(from));
                for gear in self.gears.iter_mut() {
                    if let Some(answer) = gear.frame16(*bytes, twice) {
                        answers.push(answer);
                    }
                }
            }
            DaliFrame::Frame24(bytes) => {
                self.broadcast(DaliBusEventType::Frame24(*bytes), Some(from));
                for input in self.inputs.iter_mut() {
                    if let Some(answer) = input.frame24(*bytes, twice) {
                        answers.push(answer);
                    }
                }
            }
            DaliFrame::Frame8(byte) => {
                self.broadcast(DaliBusEventType::Frame8(*byte), Some(from));
            }
        }
        match answers[..] {
            [] => {
                if flags.expect_answer() {
                    DaliSendResult::Timeout
                } else {
                    DaliSendResult::Ok
                }
            }
            [answer] => {
                self.broadcast(DaliBusEventType::Frame8(answer), None);
                if flags.expect_answer() {
                    DaliSendResult::Answer(answer)
                } else {
                    DaliSendResult::Ok
                }
            }
            // Several devices answering at once corrupt the backward
            // frame
            _ => {
                self.broadcast(DaliBusEventType::FramingError, None);
                if flags.expect_answer() {
                    DaliSendResult::Framing
                } else {
                    DaliSendResult::Ok
                }
            }
        }
    }
}

/// A simulated DALI bus. Cloning gives another handle to the same
/// bus, any number of drivers can be connected.
#[derive(Clone)]
pub struct SimBus {
    state: Arc<Mutex<BusState>>,
}

impl SimBus {
    /// Bus with factory fresh devices, none of them addressed.
    pub fn new(gears: usize, inputs: usize) -> SimBus {
        SimBus::with_devices(
            (0..gears).map(|_| SimGear::new()).collect(),
            (0..inputs).map(|_| SimInput::new()).collect(),
        )
    }

    pub fn with_devices(gears: Vec<SimGear>, inputs: Vec<SimInput>) -> SimBus {
        SimBus {
            state: Arc::new(Mutex::new(BusState {
                gears,
                inputs,
                listeners: Vec::new(),
                next_driver_id: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap()
    }

    /// Connect a new driver to this bus.
    pub fn driver(&self) -> Box<dyn DaliDriver> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let driver_id = state.next_driver_id;
        state.next_driver_id += 1;
        state.listeners.push(Listener {
            driver_id,
            events: tx,
        });
        Box::new(SimDriver {
            bus: self.clone(),
            driver_id,
            events: rx,
        })
    }

    /// Inspect a control gear. The index is the position on the bus,
    /// not an address.
    pub fn gear<R>(&self, index: usize, f: impl FnOnce(&SimGear) -> R) -> R {
        f(&self.lock().gears[index])
    }

    pub fn gear_mut<R>(&self, index: usize, f: impl FnOnce(&mut SimGear) -> R) -> R {
        f(&mut self.lock().gears[index])
    }

    pub fn input<R>(&self, index: usize, f: impl FnOnce(&SimInput) -> R) -> R {
        f(&self.lock().inputs[index])
    }

    pub fn input_mut<R>(&self, index: usize, f: impl FnOnce(&mut SimInput) -> R) -> R {
        f(&mut self.lock().inputs[index])
    }

    /// Short addresses of all control gears, in bus order.
    pub fn gear_addresses(&self) -> Vec<Option<Short>> {
        self.lock().gears.iter().map(|g| g.short_address).collect()
    }

    /// Short addresses of all input devices, in bus order.
    pub fn input_addresses(&self) -> Vec<Option<Short>> {
        self.lock().inputs.iter().map(|d| d.short_address).collect()
    }

    /// Make an input device send an event frame. Returns false if the
    /// device does not send events in its current state.
    pub fn emit_event(&self, input: usize, instance: usize, info: u16) -> bool {
        let mut state = self.lock();
        match state.inputs[input].event(instance, info) {
            Some(frame) => {
                state.broadcast(DaliBusEventType::Frame24(frame), None);
                true
            }
            None => false,
        }
    }
}

struct SimDriver {
    bus: SimBus,
    driver_id: u32,
    events: mpsc::UnboundedReceiver<DaliBusEvent>,
}

impl DaliDriver for SimDriver {
    fn send_frame(&mut self, cmd: DaliFrame, flags: Flags) -> DynFuture<'_, DaliSendResult> {
        let result = self.bus.lock().dispatch(&cmd, &flags, self.driver_id);
        Box::pin(async move { result })
    }

    fn next_bus_event(&mut self) -> DynFuture<'_, DaliBusEventResult> {
        Box::pin(async move {
            match self.events.recv().await {
                Some(event) => Ok(event),
                None => Err("Simulated bus is gone".into()),
            }
        })
    }

    fn current_timestamp(&self) -> Instant {
        Instant::now()
    }

    fn wait_until(&self, end: Instant) -> DynFuture<'_, ()> {
        Box::pin(tokio::time::sleep_until(end.into()))
    }
}

fn count_param(params: &HashMap<String, String>, key: &str) -> Result<usize, OpenError> {
    match params.get(key) {
        None => Ok(0),
        Some(value) => value
            .parse()
            .map_err(|_| OpenError::ParameterError(key.to_string())),
    }
}

fn driver_open(params: HashMap<String, String>) -> Result<Box<dyn DaliDriver>, OpenError> {
    let gears = count_param(&params, "gears")?;
    let inputs = count_param(&params, "inputs")?;
    Ok(SimBus::new(gears, inputs).driver())
}

pub fn driver_info() -> DriverInfo {
    DriverInfo {
        name: "sim".to_string(),
        description: "Simulated bus. Parameters: gears=<count>, inputs=<count>".to_string(),
        open: driver_open,
    }
}
