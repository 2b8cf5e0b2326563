use crate::common::address::Short;
use crate::common::defs::MASK;
use crate::control::cmd_defs as cmd;
use crate::drivers::command_utils::send24;
use crate::drivers::driver::{DaliDriver, DaliSendResult};
use crate::drivers::send_flags::NO_FLAG;

/// Instance types from part 103 and the input device parts.
pub const INSTANCE_GENERIC: u8 = 0;
pub const INSTANCE_BUTTON: u8 = 1;
pub const INSTANCE_OCCUPANCY: u8 = 3;
pub const INSTANCE_LIGHT: u8 = 4;

/// Instance addressing, using instance type and number.
pub const EVENT_SCHEME_INSTANCE: u8 = 0;
/// Device addressing, using short address and instance type.
pub const EVENT_SCHEME_DEVICE: u8 = 1;
/// Device and instance addressing, using short address and instance
/// number.
pub const EVENT_SCHEME_DEVICE_INSTANCE: u8 = 2;
/// Device group addressing, using device group and instance type.
pub const EVENT_SCHEME_DEVICE_GROUP: u8 = 3;
/// Instance group addressing, using instance group and type.
pub const EVENT_SCHEME_INSTANCE_GROUP: u8 = 4;

/// Number of instances on an input device.
pub async fn device_instances(d: &mut dyn DaliDriver, addr: Short) -> Result<u8, DaliSendResult> {
    send24::query(d, cmd::QUERY_NUMBER_OF_INSTANCES(addr), NO_FLAG)
        .await
        .check_answer()
}

/// Instance type, see the `INSTANCE_` constants for known values.
pub async fn instance_type(
    d: &mut dyn DaliDriver,
    addr: Short,
    instance: u8,
) -> Result<u8, DaliSendResult> {
    send24::query(d, cmd::QUERY_INSTANCE_TYPE(addr, instance), NO_FLAG)
        .await
        .check_answer()
}

pub async fn instance_enabled(
    d: &mut dyn DaliDriver,
    addr: Short,
    instance: u8,
) -> Result<bool, DaliSendResult> {
    let status = send24::query(d, cmd::QUERY_INSTANCE_ENABLED(addr, instance), NO_FLAG)
        .await
        .check_answer()?;
    Ok(status == MASK)
}

pub async fn enable_instance(
    d: &mut dyn DaliDriver,
    addr: Short,
    instance: u8,
) -> Result<(), DaliSendResult> {
    send24::cmd(d, cmd::ENABLE_INSTANCE(addr, instance), NO_FLAG)
        .await
        .check_send()
}

pub async fn disable_instance(
    d: &mut dyn DaliDriver,
    addr: Short,
    instance: u8,
) -> Result<(), DaliSendResult> {
    send24::cmd(d, cmd::DISABLE_INSTANCE(addr, instance), NO_FLAG)
        .await
        .check_send()
}

/// Select how the instance addresses its event messages, see the
/// `EVENT_SCHEME_` constants.
pub async fn set_event_scheme(
    d: &mut dyn DaliDriver,
    addr: Short,
    instance: u8,
    scheme: u8,
) -> Result<(), DaliSendResult> {
    send24::set_dtr0(d, scheme, NO_FLAG).await.check_send()?;
    send24::cmd(d, cmd::SET_EVENT_SCHEME(addr, instance), NO_FLAG)
        .await
        .check_send()
}

pub async fn query_event_scheme(
    d: &mut dyn DaliDriver,
    addr: Short,
    instance: u8,
) -> Result<u8, DaliSendResult> {
    send24::query(d, cmd::QUERY_EVENT_SCHEME(addr, instance), NO_FLAG)
        .await
        .check_answer()
}

/// Select which events the instance sends.
pub async fn set_event_filter(
    d: &mut dyn DaliDriver,
    addr: Short,
    instance: u8,
    filter: u8,
) -> Result<(), DaliSendResult> {
    send24::set_dtr0(d, filter, NO_FLAG).await.check_send()?;
    send24::cmd(d, cmd::SET_EVENT_FILTER(addr, instance), NO_FLAG)
        .await
        .check_send()
}

/// Current input value of the instance, most significant byte first.
pub async fn read_input_value(
    d: &mut dyn DaliDriver,
    addr: Short,
    instance: u8,
) -> Result<u16, DaliSendResult> {
    let high = send24::query(d, cmd::QUERY_INPUT_VALUE(addr, instance), NO_FLAG)
        .await
        .check_answer()?;
    let low = send24::query(d, cmd::QUERY_INPUT_VALUE_LATCH(addr, instance), NO_FLAG)
        .await
        .check_answer()?;
    Ok((high as u16) << 8 | low as u16)
}

/// Temperature in degrees celsius. Sensors report the input value in
/// centidegrees offset by 40 degrees.
pub async fn read_temperature(
    d: &mut dyn DaliDriver,
    addr: Short,
    instance: u8,
) -> Result<f32, DaliSendResult> {
    let raw = read_input_value(d, addr, instance).await?;
    Ok(raw as f32 / 100.0 - 40.0)
}

/// Relative humidity in percent. Sensors report the input value in
/// centipercent.
pub async fn read_humidity(
    d: &mut dyn DaliDriver,
    addr: Short,
    instance: u8,
) -> Result<f32, DaliSendResult> {
    let raw = read_input_value(d, addr, instance).await?;
    Ok(raw as f32 / 100.0)
}
