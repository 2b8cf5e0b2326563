use crate::common::address::Short;
use crate::common::commands::{Commands, ErrorInfo, YesNo};
use crate::common::defs::MASK;
use crate::common::driver_commands::DriverCommands;
use crate::control::cmd_defs::*;
use crate::drivers::driver::{DaliDriver, DaliFrame, DaliSendResult};
use crate::drivers::send_flags::{Flags, PRIORITY_DEFAULT};
use log::debug;
use std::time::Duration;

/// Addressing commands encoded as 24 bit control device frames.
pub struct Device103<'a> {
    driver: &'a mut dyn DaliDriver,
    flags: Flags,
}

impl<'a> Device103<'a> {
    pub fn new(driver: &'a mut dyn DaliDriver) -> Self {
        Self::with_flags(driver, PRIORITY_DEFAULT)
    }

    pub fn with_flags(driver: &'a mut dyn DaliDriver, flags: Flags) -> Self {
        Device103 { driver, flags }
    }

    async fn send_frame<const TWICE: bool>(
        &mut self,
        cmd: &Command<false, TWICE>,
    ) -> Result<(), DaliSendResult> {
        self.driver
            .send_frame(
                DaliFrame::Frame24(cmd.0),
                self.flags.clone() | Flags::SendTwice(TWICE),
            )
            .await
            .check_send()
    }

    async fn request_answer<const TWICE: bool>(
        &mut self,
        cmd: &Command<true, TWICE>,
    ) -> Result<u8, DaliSendResult> {
        self.driver
            .send_frame(
                DaliFrame::Frame24(cmd.0),
                self.flags.clone() | Flags::SendTwice(TWICE) | Flags::ExpectAnswer(true),
            )
            .await
            .check_answer()
    }
}

impl Commands for Device103<'_> {
    type Error = DaliSendResult;

    async fn initialise_all(&mut self) -> Result<(), Self::Error> {
        self.send_frame(&INITIALISE_ALL()).await
    }

    async fn initialise_unaddressed(&mut self) -> Result<(), Self::Error> {
        self.send_frame(&INITIALISE_UNADDRESSED()).await
    }

    async fn terminate(&mut self) -> Result<(), Self::Error> {
        self.send_frame(&TERMINATE()).await
    }

    async fn randomise(&mut self) -> Result<(), Self::Error> {
        self.send_frame(&RANDOMISE()).await
    }

    async fn compare(&mut self) -> Result<YesNo, Self::Error> {
        // A garbled answer means more than one device replied, which
        // still counts as a match during the search.
        match self
            .driver
            .send_frame(
                DaliFrame::Frame24(COMPARE().0),
                self.flags.clone() | Flags::ExpectAnswer(true),
            )
            .await
        {
            DaliSendResult::Answer(_) => Ok(YesNo::Yes),
            DaliSendResult::Timeout => Ok(YesNo::No),
            DaliSendResult::Framing => Ok(YesNo::Multiple),
            e => Err(e),
        }
    }

    async fn withdraw(&mut self) -> Result<(), Self::Error> {
        self.send_frame(&WITHDRAW()).await
    }

    async fn searchaddr_h(&mut self, h: u8) -> Result<(), Self::Error> {
        self.send_frame(&SEARCHADDRH(h)).await
    }

    async fn searchaddr_m(&mut self, m: u8) -> Result<(), Self::Error> {
        self.send_frame(&SEARCHADDRM(m)).await
    }

    async fn searchaddr_l(&mut self, l: u8) -> Result<(), Self::Error> {
        self.send_frame(&SEARCHADDRL(l)).await
    }

    async fn program_short_address(&mut self, addr: Short) -> Result<(), Self::Error> {
        self.send_frame(&PROGRAM_SHORT_ADDRESS(addr)).await
    }

    async fn query_short_address(&mut self) -> Result<Option<Short>, Self::Error> {
        match self.request_answer(&QUERY_SHORT_ADDRESS()).await {
            Ok(MASK) => Ok(None),
            Ok(a) if a & 0x81 == 0x01 => Ok(Some(Short::new(a >> 1))),
            Ok(a) => {
                debug!("malformed short address answer 0x{:02x}", a);
                Ok(None)
            }
            Err(e) if e.is_timeout() || e.is_framing_error() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn settle(&mut self, duration: Duration) {
        let end = self.driver.current_timestamp() + duration;
        self.driver.wait_until(end).await;
    }
}

impl DriverCommands for Device103<'_> {
    type Output<'a> = Device103<'a>;
    fn from_driver<'a>(driver: &'a mut dyn DaliDriver, flags: Flags) -> Device103<'a> {
        Device103::with_flags(driver, flags)
    }
}
