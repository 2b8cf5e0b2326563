use crate::common::address::Short;
use crate::drivers::driver::{DaliBusEventType, DaliDriver};
use log::warn;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;

/// Event message sent by an input device, using short address and
/// instance type addressing. Bit 0 of the first byte is zero, which
/// is what separates events from commands on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub device: Short,
    pub instance_type: u8,
    /// Type-specific event data, at most 11 bits.
    pub info: u16,
}

impl InputEvent {
    /// Wire layout of the event.
    pub fn frame(&self) -> [u8; 3] {
        [
            self.device.value() << 1,
            (self.instance_type << 3) | ((self.info >> 8) as u8 & 0x07),
            (self.info & 0xff) as u8,
        ]
    }

    /// Decode a 24 bit frame. Returns `None` for frames that are not
    /// short address events, such as commands or instance group
    /// events.
    pub fn parse(frame: &[u8; 3]) -> Option<InputEvent> {
        if frame[0] & 0x81 != 0 {
            return None;
        }
        Some(InputEvent {
            device: Short::new(frame[0] >> 1),
            instance_type: frame[1] >> 3,
            info: ((frame[1] as u16 & 0x07) << 8) | frame[2] as u16,
        })
    }
}

/// Forwards input device events from the bus to a stream.
///
/// The driver stays locked while the monitor runs, so no commands can
/// be interleaved with event reception. Detach or drop the monitor to
/// release the driver.
pub struct EventMonitor {
    handle: JoinHandle<()>,
}

impl EventMonitor {
    /// Start monitoring. Events arrive on the returned stream until
    /// the monitor is detached.
    pub fn attach(
        driver: Arc<Mutex<Box<dyn DaliDriver>>>,
    ) -> (EventMonitor, Pin<Box<dyn Stream<Item = InputEvent> + Send>>) {
        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let handle = tokio::spawn(monitor_events(driver, tx));
        (EventMonitor { handle }, Box::pin(ReceiverStream::new(rx)))
    }

    /// Stop monitoring and release the driver.
    pub fn detach(self) {
        self.handle.abort();
    }
}

impl Drop for EventMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn monitor_events(driver: Arc<Mutex<Box<dyn DaliDriver>>>, tx: Sender<InputEvent>) {
    let mut driver = driver.lock().await;
    loop {
        match driver.next_bus_event().await {
            Ok(event) => {
                if let DaliBusEventType::Frame24(frame) = event.event_type {
                    if let Some(input) = InputEvent::parse(&frame) {
                        if tx.send(input).await.is_err() {
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Event monitor stopped: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::InputEvent;
    use crate::common::address::Short;

    #[test]
    fn event_frames() {
        let event = InputEvent {
            device: Short::new(5),
            instance_type: 1,
            info: 0x102,
        };
        assert_eq!(event.frame(), [0x0a, 0x09, 0x02]);
        assert_eq!(InputEvent::parse(&[0x0a, 0x09, 0x02]), Some(event));
    }

    #[test]
    fn commands_are_not_events() {
        // Bit 0 set marks a command frame
        assert_eq!(InputEvent::parse(&[0x0b, 0x09, 0x02]), None);
        // Special commands start with 0xc1
        assert_eq!(InputEvent::parse(&[0xc1, 0x01, 0xff]), None);
    }
}
