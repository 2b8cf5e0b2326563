use crate::drivers::driver::{
    DaliBusEventResult, DaliDriver, DaliFrame, DaliSendResult, DriverInfo, OpenError,
};
use crate::drivers::send_flags::Flags;
use crate::utils::dyn_future::DynFuture;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Driver for a bus with nothing connected. Frames are accepted and
/// take roughly as long as on a real bus, queries time out.
pub struct DummyDriver;

impl DaliDriver for DummyDriver {
    fn send_frame(&mut self, _cmd: DaliFrame, flags: Flags) -> DynFuture<'_, DaliSendResult> {
        Box::pin(async move {
            if flags.send_twice() {
                tokio::time::sleep(Duration::from_millis(32)).await;
                DaliSendResult::Ok
            } else if flags.expect_answer() {
                tokio::time::sleep(Duration::from_millis(22)).await;
                DaliSendResult::Timeout
            } else {
                tokio::time::sleep(Duration::from_millis(14)).await;
                DaliSendResult::Ok
            }
        })
    }

    fn next_bus_event(&mut self) -> DynFuture<'_, DaliBusEventResult> {
        Box::pin(std::future::pending())
    }

    fn current_timestamp(&self) -> Instant {
        Instant::now()
    }

    fn wait_until(&self, end: Instant) -> DynFuture<'_, ()> {
        Box::pin(tokio::time::sleep_until(end.into()))
    }
}

fn driver_open(_params: HashMap<String, String>) -> Result<Box<dyn DaliDriver>, OpenError> {
    Ok(Box::new(DummyDriver))
}

pub fn driver_info() -> DriverInfo {
    DriverInfo {
        name: "dummy".to_string(),
        description: "Dummy driver, emulates an empty bus".to_string(),
        open: driver_open,
    }
}
