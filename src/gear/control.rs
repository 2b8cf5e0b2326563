use crate::common::address::{Long, Short};
use crate::common::cmd_defs::AddressByte;
use crate::common::defs::MASK;
use crate::drivers::command_utils::send16;
use crate::drivers::driver::{DaliDriver, DaliSendResult};
use crate::drivers::send_flags::NO_FLAG;
use crate::error::DynResult;
use crate::gear::address::Group;
use crate::gear::cmd_defs as cmd;
use crate::gear::status::GearStatus;
use std::fmt;

pub enum MemoryError {
    LengthMismatch,
    InvalidMemoryArea,
}

impl std::error::Error for MemoryError {}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::LengthMismatch => write!(f, "DTR0 doesn't match read length"),
            MemoryError::InvalidMemoryArea => {
                write!(f, "Trying to read an unimplemented memory area")
            }
        }
    }
}

impl fmt::Debug for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Set the light level directly, using the current fade time.
pub async fn set_level<A>(d: &mut dyn DaliDriver, addr: A, level: u8) -> Result<(), DaliSendResult>
where
    A: Into<AddressByte>,
{
    send16::device_level(d, addr, level, NO_FLAG)
        .await
        .check_send()
}

pub async fn turn_on<A>(d: &mut dyn DaliDriver, addr: A) -> Result<(), DaliSendResult>
where
    A: Into<AddressByte>,
{
    send16::cmd(d, cmd::ON_AND_STEP_UP(addr), NO_FLAG)
        .await
        .check_send()
}

pub async fn turn_off<A>(d: &mut dyn DaliDriver, addr: A) -> Result<(), DaliSendResult>
where
    A: Into<AddressByte>,
{
    send16::cmd(d, cmd::OFF(addr), NO_FLAG).await.check_send()
}

/// Add a device to a group and confirm the change by reading the
/// membership mask back.
pub async fn add_to_group(
    d: &mut dyn DaliDriver,
    addr: Short,
    group: Group,
) -> Result<bool, DaliSendResult> {
    send16::cmd(d, cmd::ADD_TO_GROUP(addr, group.value()), NO_FLAG)
        .await
        .check_send()?;
    query_group_membership(d, addr, group).await
}

/// Remove a device from a group. Returns true when the membership
/// mask no longer has the group bit set.
pub async fn remove_from_group(
    d: &mut dyn DaliDriver,
    addr: Short,
    group: Group,
) -> Result<bool, DaliSendResult> {
    send16::cmd(d, cmd::REMOVE_FROM_GROUP(addr, group.value()), NO_FLAG)
        .await
        .check_send()?;
    Ok(!query_group_membership(d, addr, group).await?)
}

/// Check one group bit, reading only the half of the mask that holds
/// it.
pub async fn query_group_membership(
    d: &mut dyn DaliDriver,
    addr: Short,
    group: Group,
) -> Result<bool, DaliSendResult> {
    let g = group.value();
    let query = if g < 8 {
        cmd::QUERY_GROUPS_0_7(addr)
    } else {
        cmd::QUERY_GROUPS_8_15(addr)
    };
    let mask = send16::query(d, query, NO_FLAG).await.check_answer()?;
    Ok(mask & (1 << (g & 7)) != 0)
}

/// Group membership as a 16 bit mask, one bit per group.
pub async fn query_groups(d: &mut dyn DaliDriver, addr: Short) -> Result<u16, DaliSendResult> {
    let low = send16::query(d, cmd::QUERY_GROUPS_0_7(addr), NO_FLAG)
        .await
        .check_answer()?;
    let high = send16::query(d, cmd::QUERY_GROUPS_8_15(addr), NO_FLAG)
        .await
        .check_answer()?;
    Ok((high as u16) << 8 | low as u16)
}

/// Store the level for one of the 16 scenes.
pub async fn set_scene<A>(
    d: &mut dyn DaliDriver,
    addr: A,
    scene: u8,
    level: u8,
) -> Result<(), DaliSendResult>
where
    A: Into<AddressByte>,
{
    assert!(scene < 16);
    send16::set_dtr0(d, level, NO_FLAG).await.check_send()?;
    send16::cmd(d, cmd::SET_SCENE(addr, scene), NO_FLAG)
        .await
        .check_send()
}

pub async fn remove_from_scene<A>(
    d: &mut dyn DaliDriver,
    addr: A,
    scene: u8,
) -> Result<(), DaliSendResult>
where
    A: Into<AddressByte>,
{
    assert!(scene < 16);
    send16::cmd(d, cmd::REMOVE_FROM_SCENE(addr, scene), NO_FLAG)
        .await
        .check_send()
}

pub async fn go_to_scene<A>(d: &mut dyn DaliDriver, addr: A, scene: u8) -> Result<(), DaliSendResult>
where
    A: Into<AddressByte>,
{
    assert!(scene < 16);
    send16::cmd(d, cmd::GOTO_SCENE(addr, scene), NO_FLAG)
        .await
        .check_send()
}

/// Level the device goes to for a scene. `None` if the device is not
/// part of the scene.
pub async fn query_scene_level(
    d: &mut dyn DaliDriver,
    addr: Short,
    scene: u8,
) -> Result<Option<u8>, DaliSendResult> {
    assert!(scene < 16);
    let level = send16::query(d, cmd::QUERY_SCENE_LEVEL(addr, scene), NO_FLAG)
        .await
        .check_answer()?;
    Ok(match level {
        MASK => None,
        level => Some(level),
    })
}

pub async fn set_fade_time<A>(d: &mut dyn DaliDriver, addr: A, time: u8) -> Result<(), DaliSendResult>
where
    A: Into<AddressByte>,
{
    send16::set_dtr0(d, time, NO_FLAG).await.check_send()?;
    send16::cmd(d, cmd::SET_FADE_TIME(addr), NO_FLAG)
        .await
        .check_send()
}

pub async fn set_fade_rate<A>(d: &mut dyn DaliDriver, addr: A, rate: u8) -> Result<(), DaliSendResult>
where
    A: Into<AddressByte>,
{
    send16::set_dtr0(d, rate, NO_FLAG).await.check_send()?;
    send16::cmd(d, cmd::SET_FADE_RATE(addr), NO_FLAG)
        .await
        .check_send()
}

/// Fade time and fade rate, packed as two nibbles in the answer.
pub async fn query_fade(d: &mut dyn DaliDriver, addr: Short) -> Result<(u8, u8), DaliSendResult> {
    let fade = send16::query(d, cmd::QUERY_FADE(addr), NO_FLAG)
        .await
        .check_answer()?;
    Ok((fade >> 4, fade & 0x0f))
}

pub async fn set_max_level<A>(
    d: &mut dyn DaliDriver,
    addr: A,
    level: u8,
) -> Result<(), DaliSendResult>
where
    A: Into<AddressByte>,
{
    send16::set_dtr0(d, level, NO_FLAG).await.check_send()?;
    send16::cmd(d, cmd::SET_MAX_LEVEL(addr), NO_FLAG)
        .await
        .check_send()
}

pub async fn set_min_level<A>(
    d: &mut dyn DaliDriver,
    addr: A,
    level: u8,
) -> Result<(), DaliSendResult>
where
    A: Into<AddressByte>,
{
    send16::set_dtr0(d, level, NO_FLAG).await.check_send()?;
    send16::cmd(d, cmd::SET_MIN_LEVEL(addr), NO_FLAG)
        .await
        .check_send()
}

pub async fn query_actual_level(d: &mut dyn DaliDriver, addr: Short) -> Result<u8, DaliSendResult> {
    send16::query(d, cmd::QUERY_ACTUAL_LEVEL(addr), NO_FLAG)
        .await
        .check_answer()
}

pub async fn query_max_level(d: &mut dyn DaliDriver, addr: Short) -> Result<u8, DaliSendResult> {
    send16::query(d, cmd::QUERY_MAX_LEVEL(addr), NO_FLAG)
        .await
        .check_answer()
}

pub async fn query_min_level(d: &mut dyn DaliDriver, addr: Short) -> Result<u8, DaliSendResult> {
    send16::query(d, cmd::QUERY_MIN_LEVEL(addr), NO_FLAG)
        .await
        .check_answer()
}

/// Lowest light output the lamp can produce.
pub async fn query_physical_minimum(
    d: &mut dyn DaliDriver,
    addr: Short,
) -> Result<u8, DaliSendResult> {
    send16::query(d, cmd::QUERY_PHYSICAL_MINIMUM(addr), NO_FLAG)
        .await
        .check_answer()
}

pub async fn query_status(d: &mut dyn DaliDriver, addr: Short) -> Result<GearStatus, DaliSendResult> {
    let status = send16::query(d, cmd::QUERY_STATUS(addr), NO_FLAG)
        .await
        .check_answer()?;
    Ok(GearStatus::new(status))
}

/// True if any control gear answers at this address.
pub async fn query_gear_present(d: &mut dyn DaliDriver, addr: Short) -> Result<bool, DaliSendResult> {
    send16::query(d, cmd::QUERY_CONTROL_GEAR_PRESENT(addr), NO_FLAG)
        .await
        .check_yes_no()
}

pub async fn query_lamp_failure(d: &mut dyn DaliDriver, addr: Short) -> Result<bool, DaliSendResult> {
    send16::query(d, cmd::QUERY_LAMP_FAILURE(addr), NO_FLAG)
        .await
        .check_yes_no()
}

pub async fn query_device_type(d: &mut dyn DaliDriver, addr: Short) -> Result<u8, DaliSendResult> {
    send16::query(d, cmd::QUERY_DEVICE_TYPE(addr), NO_FLAG)
        .await
        .check_answer()
}

/// Random search address currently stored in the device.
pub async fn query_random_address(
    d: &mut dyn DaliDriver,
    addr: Short,
) -> Result<Long, DaliSendResult> {
    let h = send16::query(d, cmd::QUERY_RANDOM_ADDRESS_H(addr), NO_FLAG)
        .await
        .check_answer()?;
    let m = send16::query(d, cmd::QUERY_RANDOM_ADDRESS_M(addr), NO_FLAG)
        .await
        .check_answer()?;
    let l = send16::query(d, cmd::QUERY_RANDOM_ADDRESS_L(addr), NO_FLAG)
        .await
        .check_answer()?;
    Ok((h as Long) << 16 | (m as Long) << 8 | l as Long)
}

/// Store a new short address in an addressed device, or clear it with
/// `None`.
pub async fn set_short_address(
    d: &mut dyn DaliDriver,
    addr: Short,
    new: Option<Short>,
) -> Result<(), DaliSendResult> {
    send16::set_dtr0(d, AddressByte::from(new).0, NO_FLAG)
        .await
        .check_send()?;
    send16::cmd(d, cmd::SET_SHORT_ADDRESS(addr), NO_FLAG)
        .await
        .check_send()
}

/// Read `length` bytes from a device memory bank, starting at
/// `location`. The read stops early at the end of the implemented
/// area. The DTR0 position is checked afterwards to catch lost
/// answers.
pub async fn read_memory(
    d: &mut dyn DaliDriver,
    addr: Short,
    bank: u8,
    location: u8,
    length: u8,
) -> DynResult<Vec<u8>> {
    send16::set_dtr1(d, bank, NO_FLAG).await.check_send()?;
    send16::set_dtr0(d, location, NO_FLAG).await.check_send()?;
    let mut data = Vec::new();
    for _ in 0..length {
        match send16::query(d, cmd::READ_MEMORY_LOCATION(addr), NO_FLAG).await {
            DaliSendResult::Answer(byte) => data.push(byte),
            DaliSendResult::Timeout => break,
            e => return Err(Box::new(e)),
        }
    }

    let dtr0 = send16::query(d, cmd::QUERY_CONTENT_DTR0(addr), NO_FLAG)
        .await
        .check_answer()?;
    if data.len() == length as usize {
        if dtr0 != location.wrapping_add(length) {
            return Err(Box::new(MemoryError::LengthMismatch));
        }
    } else if dtr0 != location.wrapping_add(data.len() as u8).wrapping_add(1) {
        return Err(Box::new(MemoryError::LengthMismatch));
    }
    Ok(data)
}

/// Index of this unit within a multi-unit device, from memory bank 0.
pub async fn logical_unit_index(d: &mut dyn DaliDriver, addr: Short) -> DynResult<u8> {
    let data = read_memory(d, addr, 0, 0x1a, 1).await?;
    match data.into_iter().next() {
        Some(index) => Ok(index),
        None => Err(Box::new(MemoryError::InvalidMemoryArea)),
    }
}

/// Colour control capability of a device type 8 ballast.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColourType {
    ColourTemperature,
    Rgb,
    Unsupported,
}

fn colour_type_from_features(features: u8) -> ColourType {
    if features & 0x02 != 0 {
        ColourType::ColourTemperature
    } else if features >> 5 >= 3 {
        ColourType::Rgb
    } else {
        ColourType::Unsupported
    }
}

/// Colour features byte of a device type 8 ballast.
pub async fn query_colour_features(
    d: &mut dyn DaliDriver,
    addr: Short,
) -> Result<u8, DaliSendResult> {
    send16::cmd(d, cmd::ENABLE_DEVICE_TYPE(8), NO_FLAG)
        .await
        .check_send()?;
    send16::query(d, cmd::QUERY_COLOUR_TYPE_FEATURES(addr), NO_FLAG)
        .await
        .check_answer()
}

/// Colour control supported by the device. Devices that do not
/// implement device type 8 ignore the query, which maps to
/// `Unsupported`.
pub async fn colour_type(d: &mut dyn DaliDriver, addr: Short) -> Result<ColourType, DaliSendResult> {
    match query_colour_features(d, addr).await {
        Ok(features) => Ok(colour_type_from_features(features)),
        Err(DaliSendResult::Timeout) => Ok(ColourType::Unsupported),
        Err(e) => Err(e),
    }
}

async fn activate_colour(d: &mut dyn DaliDriver, addr: Short) -> Result<(), DaliSendResult> {
    send16::cmd(d, cmd::ENABLE_DEVICE_TYPE(8), NO_FLAG)
        .await
        .check_send()?;
    send16::cmd(d, cmd::ACTIVATE(addr), NO_FLAG).await.check_send()
}

/// Set the colour temperature of a device type 8 ballast. `kelvin` is
/// clamped to the 2500 to 7042 range the mirek encoding covers.
pub async fn set_colour_temperature(
    d: &mut dyn DaliDriver,
    addr: Short,
    kelvin: u32,
) -> Result<(), DaliSendResult> {
    let mirek = (1_000_000 / kelvin.clamp(2500, 7042)) as u16;
    send16::set_dtr0(d, (mirek & 0xff) as u8, NO_FLAG)
        .await
        .check_send()?;
    send16::set_dtr1(d, (mirek >> 8) as u8, NO_FLAG)
        .await
        .check_send()?;
    send16::cmd(d, cmd::ENABLE_DEVICE_TYPE(8), NO_FLAG)
        .await
        .check_send()?;
    send16::cmd(d, cmd::SET_TEMP_COLOUR_TEMPERATURE(addr), NO_FLAG)
        .await
        .check_send()?;
    activate_colour(d, addr).await
}

/// Set red, green and blue levels of a device type 8 ballast.
pub async fn set_colour_rgb(
    d: &mut dyn DaliDriver,
    addr: Short,
    red: u8,
    green: u8,
    blue: u8,
) -> Result<(), DaliSendResult> {
    send16::set_dtr0(d, red, NO_FLAG).await.check_send()?;
    send16::set_dtr1(d, green, NO_FLAG).await.check_send()?;
    send16::set_dtr2(d, blue, NO_FLAG).await.check_send()?;
    send16::cmd(d, cmd::ENABLE_DEVICE_TYPE(8), NO_FLAG)
        .await
        .check_send()?;
    send16::cmd(d, cmd::SET_TEMP_RGB_DIM_LEVEL(addr), NO_FLAG)
        .await
        .check_send()?;
    activate_colour(d, addr).await
}

#[cfg(test)]
mod test {
    use super::{colour_type_from_features, ColourType};

    #[test]
    fn colour_types() {
        assert_eq!(
            colour_type_from_features(0x02),
            ColourType::ColourTemperature
        );
        assert_eq!(colour_type_from_features(0x60), ColourType::Rgb);
        assert_eq!(colour_type_from_features(0x00), ColourType::Unsupported);
        assert_eq!(colour_type_from_features(0x20), ColourType::Unsupported);
    }
}
