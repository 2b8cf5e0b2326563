use crate::control::events::InputEvent;

fn gear_address(byte: u8) -> String {
    match byte & 0xfe {
        0xfe => "Broadcast".to_string(),
        0xfc => "Broadcast unaddressed".to_string(),
        b if b & 0x80 == 0 => format!("Short {}", b >> 1),
        b if b & 0xe0 == 0x80 => format!("Group {}", (b >> 1) & 0x0f),
        _ => format!("Reserved address 0x{:02x}", byte),
    }
}

fn gear_command(opcode: u8) -> String {
    match opcode {
        0x00 => "Off".to_string(),
        0x01 => "Up".to_string(),
        0x02 => "Down".to_string(),
        0x03 => "Step up".to_string(),
        0x04 => "Step down".to_string(),
        0x05 => "Recall max level".to_string(),
        0x06 => "Recall min level".to_string(),
        0x07 => "Step down and off".to_string(),
        0x08 => "On and step up".to_string(),
        0x0a => "Go to last active level".to_string(),
        0x10..=0x1f => format!("Go to scene {}", opcode & 0x0f),
        0x20 => "Reset".to_string(),
        0x21 => "Store actual level in DTR0".to_string(),
        0x2a => "Set max level".to_string(),
        0x2b => "Set min level".to_string(),
        0x2c => "Set system failure level".to_string(),
        0x2d => "Set power on level".to_string(),
        0x2e => "Set fade time".to_string(),
        0x2f => "Set fade rate".to_string(),
        0x40..=0x4f => format!("Set scene {}", opcode & 0x0f),
        0x50..=0x5f => format!("Remove from scene {}", opcode & 0x0f),
        0x60..=0x6f => format!("Add to group {}", opcode & 0x0f),
        0x70..=0x7f => format!("Remove from group {}", opcode & 0x0f),
        0x80 => "Set short address".to_string(),
        0x81 => "Enable write memory".to_string(),
        0x90 => "Query status".to_string(),
        0x91 => "Query control gear present".to_string(),
        0x92 => "Query lamp failure".to_string(),
        0x93 => "Query lamp power on".to_string(),
        0x94 => "Query limit error".to_string(),
        0x95 => "Query reset state".to_string(),
        0x96 => "Query missing short address".to_string(),
        0x97 => "Query version number".to_string(),
        0x98 => "Query content DTR0".to_string(),
        0x99 => "Query device type".to_string(),
        0x9a => "Query physical minimum".to_string(),
        0x9b => "Query power failure".to_string(),
        0x9c => "Query content DTR1".to_string(),
        0x9d => "Query content DTR2".to_string(),
        0xa0 => "Query actual level".to_string(),
        0xa1 => "Query max level".to_string(),
        0xa2 => "Query min level".to_string(),
        0xa3 => "Query power on level".to_string(),
        0xa4 => "Query system failure level".to_string(),
        0xa5 => "Query fade time/fade rate".to_string(),
        0xb0..=0xbf => format!("Query scene {} level", opcode & 0x0f),
        0xc0 => "Query groups 0-7".to_string(),
        0xc1 => "Query groups 8-15".to_string(),
        0xc2 => "Query random address (H)".to_string(),
        0xc3 => "Query random address (M)".to_string(),
        0xc4 => "Query random address (L)".to_string(),
        0xc5 => "Read memory location".to_string(),
        0xe2 => "Activate".to_string(),
        0xe7 => "Set temporary colour temperature".to_string(),
        0xeb => "Set temporary RGB dim level".to_string(),
        0xf9 => "Query colour features".to_string(),
        0xe0..=0xfe => format!("Extended command 0x{:02x}", opcode),
        0xff => "Query extended version number".to_string(),
        _ => format!("Unknown command 0x{:02x}", opcode),
    }
}

fn initialise_selector_16(data: u8) -> String {
    match data {
        0x00 => "all".to_string(),
        0xff => "unaddressed".to_string(),
        d if d & 0x81 == 0x01 => format!("short {}", d >> 1),
        _ => "none".to_string(),
    }
}

fn gear_special(frame: &[u8; 2]) -> String {
    let data = frame[1];
    match frame[0] {
        0xa1 => "Terminate".to_string(),
        0xa3 => format!("Set DTR0 = 0x{:02x}", data),
        0xa5 => format!("Initialise ({})", initialise_selector_16(data)),
        0xa7 => "Randomise".to_string(),
        0xa9 => "Compare".to_string(),
        0xab => "Withdraw".to_string(),
        0xb1 => format!("Search address high 0x{:02x}", data),
        0xb3 => format!("Search address middle 0x{:02x}", data),
        0xb5 => format!("Search address low 0x{:02x}", data),
        0xb7 => format!("Program short address {}", data >> 1),
        0xb9 => format!("Verify short address {}", data >> 1),
        0xbb => "Query short address".to_string(),
        0xc1 => format!("Enable device type {}", data),
        0xc3 => format!("Set DTR1 = 0x{:02x}", data),
        0xc5 => format!("Set DTR2 = 0x{:02x}", data),
        op => format!("Special command 0x{:02x} 0x{:02x}", op, data),
    }
}

/// Describe a 16 bit control gear frame.
pub fn decode_frame16(frame: &[u8; 2]) -> String {
    if frame[0] & 0x01 == 0 {
        return format!("{}: Direct level {}", gear_address(frame[0]), frame[1]);
    }
    match frame[0] & 0xe0 {
        0xa0 | 0xc0 => gear_special(frame),
        _ => format!("{}: {}", gear_address(frame[0]), gear_command(frame[1])),
    }
}

fn device_address(byte: u8) -> Option<String> {
    match byte & 0xfe {
        0xfe => Some("Broadcast".to_string()),
        0xfc => Some("Broadcast unaddressed".to_string()),
        b if b & 0x80 == 0 => Some(format!("Device {}", b >> 1)),
        b if b & 0xc0 == 0x80 => Some(format!("Device group {}", (b >> 1) & 0x1f)),
        _ => None,
    }
}

fn device_command(opcode: u8) -> String {
    match opcode {
        0x00 => "Identify device".to_string(),
        0x10 => "Reset".to_string(),
        0x14 => "Set short address".to_string(),
        0x30 => "Query device status".to_string(),
        0x33 => "Query missing short address".to_string(),
        0x34 => "Query version number".to_string(),
        0x35 => "Query number of instances".to_string(),
        0x36 => "Query content DTR0".to_string(),
        0x39 => "Query random address (H)".to_string(),
        0x3a => "Query random address (M)".to_string(),
        0x3b => "Query random address (L)".to_string(),
        0x3c => "Read memory location".to_string(),
        op => format!("Device command 0x{:02x}", op),
    }
}

fn instance_command(instance: u8, opcode: u8) -> String {
    let name = match opcode {
        0x62 => "Enable instance",
        0x63 => "Disable instance",
        0x67 => "Set event scheme",
        0x68 => "Set event filter",
        0x80 => "Query instance type",
        0x81 => "Query resolution",
        0x86 => "Query instance enabled",
        0x8b => "Query event scheme",
        0x8c => "Query input value",
        0x8d => "Query input value latch",
        _ => return format!("Instance {}: command 0x{:02x}", instance, opcode),
    };
    format!("Instance {}: {}", instance, name)
}

fn initialise_selector_24(data: u8) -> String {
    match data {
        0xff => "all".to_string(),
        0x7f => "unaddressed".to_string(),
        d if d & 0x81 == 0x01 => format!("device {}", d >> 1),
        _ => "none".to_string(),
    }
}

fn device_special(frame: &[u8; 3]) -> String {
    let data = frame[2];
    match frame[1] {
        0x00 => "Terminate".to_string(),
        0x01 => format!("Initialise ({})", initialise_selector_24(data)),
        0x02 => "Randomise".to_string(),
        0x03 => "Compare".to_string(),
        0x04 => "Withdraw".to_string(),
        0x05 => format!("Search address high 0x{:02x}", data),
        0x06 => format!("Search address middle 0x{:02x}", data),
        0x07 => format!("Search address low 0x{:02x}", data),
        0x08 => format!("Program short address {}", data >> 1),
        0x09 => format!("Verify short address {}", data >> 1),
        0x0a => "Query short address".to_string(),
        0x30 => format!("Set DTR0 = 0x{:02x}", data),
        0x31 => format!("Set DTR1 = 0x{:02x}", data),
        0x32 => format!("Set DTR2 = 0x{:02x}", data),
        sel => format!("Special command 0x{:02x} 0x{:02x}", sel, data),
    }
}

fn instance_type_name(instance_type: u8) -> &'static str {
    match instance_type {
        0 => "generic",
        1 => "push button",
        3 => "occupancy sensor",
        4 => "light sensor",
        _ => "unknown",
    }
}

fn event_frame(frame: &[u8; 3]) -> String {
    match InputEvent::parse(frame) {
        Some(event) => format!(
            "Event from device {} ({}): 0x{:03x}",
            event.device.value(),
            instance_type_name(event.instance_type),
            event.info
        ),
        None => format!(
            "Event 0x{:02x} 0x{:02x} 0x{:02x}",
            frame[0], frame[1], frame[2]
        ),
    }
}

/// Describe a 24 bit control device frame.
pub fn decode_frame24(frame: &[u8; 3]) -> String {
    if frame[0] & 0x01 == 0 {
        return event_frame(frame);
    }
    if frame[0] == 0xc1 {
        return device_special(frame);
    }
    match device_address(frame[0]) {
        Some(addr) => {
            let op = if frame[1] == 0xfe {
                device_command(frame[2])
            } else if frame[1] & 0x80 == 0 {
                instance_command(frame[1], frame[2])
            } else {
                format!("command 0x{:02x} 0x{:02x}", frame[1], frame[2])
            };
            format!("{}: {}", addr, op)
        }
        None => format!(
            "Unknown frame 0x{:02x} 0x{:02x} 0x{:02x}",
            frame[0], frame[1], frame[2]
        ),
    }
}

#[cfg(test)]
mod test {
    use super::{decode_frame16, decode_frame24};

    #[test]
    fn gear_frames() {
        assert_eq!(decode_frame16(&[0x0a, 128]), "Short 5: Direct level 128");
        assert_eq!(decode_frame16(&[0xff, 0x90]), "Broadcast: Query status");
        assert_eq!(decode_frame16(&[0x0b, 0x11]), "Short 5: Go to scene 1");
        assert_eq!(decode_frame16(&[0x87, 0x63]), "Group 3: Add to group 3");
        assert_eq!(decode_frame16(&[0xa5, 0x00]), "Initialise (all)");
        assert_eq!(decode_frame16(&[0xa5, 0xff]), "Initialise (unaddressed)");
        assert_eq!(decode_frame16(&[0xb7, 0x0b]), "Program short address 5");
    }

    #[test]
    fn device_frames() {
        assert_eq!(
            decode_frame24(&[0xc1, 0x01, 0x7f]),
            "Initialise (unaddressed)"
        );
        assert_eq!(
            decode_frame24(&[0x0b, 0xfe, 0x35]),
            "Device 5: Query number of instances"
        );
        assert_eq!(
            decode_frame24(&[0xff, 0x00, 0x8c]),
            "Broadcast: Instance 0: Query input value"
        );
    }

    #[test]
    fn event_frames() {
        assert_eq!(
            decode_frame24(&[0x0a, 0x09, 0x02]),
            "Event from device 5 (push button): 0x102"
        );
    }
}
