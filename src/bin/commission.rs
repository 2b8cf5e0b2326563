use dali::common::address::Short;
use dali::control::commands_103::Device103;
use dali::drivers::driver::OpenError;
use dali::gear::commands_102::Gear102;
use dali::utils::commission::{self, CommissionReport, CommissionedDevice, Config};
use dali_master as dali;

extern crate clap;
use clap::{value_parser, Arg, Command};

fn print_summary(family: &str, report: &CommissionReport) {
    println!(
        "{}: {} new, {} kept, {} left unaddressed, {} addresses in use",
        family, report.assigned, report.existing, report.overflow, report.in_use
    );
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    if let Err(e) = dali::drivers::init() {
        eprintln!("Failed to initialize DALI drivers: {}", e);
    }
    let matches = Command::new("commission")
        .about("Give every device on a DALI bus a short address.")
        .arg(
            Arg::new("DEVICE")
                .short('d')
                .long("device")
                .default_value("default")
                .help("Select DALI-device"),
        )
        .arg(
            Arg::new("family")
                .short('f')
                .long("family")
                .value_parser(["gear", "input", "both"])
                .default_value("both")
                .help("Device family to commission"),
        )
        .arg(
            Arg::new("reset")
                .long("reset")
                .action(clap::ArgAction::SetTrue)
                .help("Search all devices, not only unaddressed ones"),
        )
        .arg(
            Arg::new("first")
                .long("first-address")
                .value_parser(value_parser!(u8).range(0..64))
                .default_value("0")
                .help("Lowest short address to hand out"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(clap::ArgAction::SetTrue)
                .help("Print the report as JSON"),
        )
        .get_matches();

    let device_name = matches.get_one::<String>("DEVICE").unwrap();
    let family = matches.get_one::<String>("family").unwrap();
    let json = *matches.get_one::<bool>("json").unwrap();
    let config = Config {
        reset_addresses: *matches.get_one::<bool>("reset").unwrap(),
        first_address: *matches.get_one::<u8>("first").unwrap(),
    };

    let mut driver = match dali::drivers::open(device_name) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to open DALI device: {}", e);
            if let OpenError::NotFound = e {
                eprintln!("Available drivers:");
                for name in dali::drivers::driver_names() {
                    eprintln!("  {}", name);
                }
            }
            return;
        }
    };

    let mut found = |device: &CommissionedDevice| {
        if json {
            return;
        }
        match device.short {
            Some(short) => println!(
                "Device 0x{:06x}: short address {}{}{}",
                device.long,
                Short::new(short),
                if device.existing { " (kept)" } else { "" },
                if device.verified { "" } else { " (not verified)" },
            ),
            None => println!("Device 0x{:06x}: left unaddressed", device.long),
        }
    };

    match family.as_str() {
        "both" => match commission::commission_bus(driver.as_mut(), &config, &mut found).await {
            Ok(report) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&report).unwrap());
                } else {
                    print_summary("Control gear", &report.gear);
                    print_summary("Input devices", &report.input);
                }
            }
            Err(e) => eprintln!("Commissioning failed: {}", e),
        },
        family => {
            let report = if family == "gear" {
                commission::commission_family::<Gear102>(driver.as_mut(), &config, &mut found).await
            } else {
                commission::commission_family::<Device103>(driver.as_mut(), &config, &mut found)
                    .await
            };
            match report {
                Ok(report) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&report).unwrap());
                    } else {
                        let name = if family == "gear" {
                            "Control gear"
                        } else {
                            "Input devices"
                        };
                        print_summary(name, &report);
                    }
                }
                Err(e) => eprintln!("Commissioning failed: {}", e),
            }
        }
    }
}
