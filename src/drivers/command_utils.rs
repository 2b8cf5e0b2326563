use super::driver::{DaliDriver, DaliSendResult};
use super::driver_utils::DaliDriverExt;
use super::send_flags::Flags;
use crate::drivers::send_flags::{EXPECT_ANSWER, NO_FLAG, SEND_TWICE};
use crate::utils::dyn_future::DynFuture;

/// Typed send helpers for control gear frames.
pub mod send16 {
    use super::*;
    use crate::common::cmd_defs::AddressByte;
    use crate::gear::cmd_defs as cmd;
    use crate::gear::cmd_defs::Command;

    /// Send a command. Commands marked as such in the command tables
    /// are automatically sent twice.
    pub fn cmd<const T: bool>(
        driver: &mut dyn DaliDriver,
        cmd: Command<false, T>,
        flags: Flags,
    ) -> DynFuture<'_, DaliSendResult> {
        driver.send_frame16(cmd.0, flags | if T { SEND_TWICE } else { NO_FLAG })
    }

    /// Send a query and wait for the answer.
    pub fn query(
        driver: &mut dyn DaliDriver,
        cmd: Command<true, false>,
        flags: Flags,
    ) -> DynFuture<'_, DaliSendResult> {
        driver.send_frame16(cmd.0, flags | EXPECT_ANSWER)
    }

    /// Send a direct arc power command.
    pub fn device_level<A>(
        driver: &mut dyn DaliDriver,
        addr: A,
        level: u8,
        flags: Flags,
    ) -> DynFuture<'_, DaliSendResult>
    where
        A: Into<AddressByte>,
    {
        driver.send_frame16(cmd::DAPC(addr, level).0, flags)
    }

    pub fn set_dtr0(
        driver: &mut dyn DaliDriver,
        dtr: u8,
        flags: Flags,
    ) -> DynFuture<'_, DaliSendResult> {
        driver.send_frame16(cmd::DTR0(dtr).0, flags)
    }

    pub fn set_dtr1(
        driver: &mut dyn DaliDriver,
        dtr: u8,
        flags: Flags,
    ) -> DynFuture<'_, DaliSendResult> {
        driver.send_frame16(cmd::DTR1(dtr).0, flags)
    }

    pub fn set_dtr2(
        driver: &mut dyn DaliDriver,
        dtr: u8,
        flags: Flags,
    ) -> DynFuture<'_, DaliSendResult> {
        driver.send_frame16(cmd::DTR2(dtr).0, flags)
    }
}

/// Typed send helpers for control device frames.
pub mod send24 {
    use super::*;
    use crate::control::cmd_defs as cmd;
    use crate::control::cmd_defs::Command;

    /// Send a command. Commands marked as such in the command tables
    /// are automatically sent twice.
    pub fn cmd<const T: bool>(
        driver: &mut dyn DaliDriver,
        cmd: Command<false, T>,
        flags: Flags,
    ) -> DynFuture<'_, DaliSendResult> {
        driver.send_frame24(cmd.0, flags | if T { SEND_TWICE } else { NO_FLAG })
    }

    /// Send a query and wait for the answer.
    pub fn query(
        driver: &mut dyn DaliDriver,
        cmd: Command<true, false>,
        flags: Flags,
    ) -> DynFuture<'_, DaliSendResult> {
        driver.send_frame24(cmd.0, flags | EXPECT_ANSWER)
    }

    pub fn set_dtr0(
        driver: &mut dyn DaliDriver,
        dtr: u8,
        flags: Flags,
    ) -> DynFuture<'_, DaliSendResult> {
        driver.send_frame24(cmd::DTR0(dtr).0, flags)
    }

    pub fn set_dtr1(
        driver: &mut dyn DaliDriver,
        dtr: u8,
        flags: Flags,
    ) -> DynFuture<'_, DaliSendResult> {
        driver.send_frame24(cmd::DTR1(dtr).0, flags)
    }

    pub fn set_dtr2(
        driver: &mut dyn DaliDriver,
        dtr: u8,
        flags: Flags,
    ) -> DynFuture<'_, DaliSendResult> {
        driver.send_frame24(cmd::DTR2(dtr).0, flags)
    }
}
