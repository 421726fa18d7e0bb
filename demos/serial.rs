use std::env;

use inquire::Select;
use serialport::SerialPort;

use dps_psu::psu::DpsPsu;
use dps_psu::register::ParamName;
use dps_psu::transport::RtuTransport;

// Configuration constants - adjust these for your setup
const BAUD_RATE: u32 = 9600;
// The PSU can take a while to respond, a reasonably large time out is required.
const SERIAL_TIMEOUT_MS: u64 = 500;
const MODBUS_UNIT_ID: u8 = 0x01;
const OUTPUT_VOLTAGE: f64 = 5.0; // 5V
const CURRENT_LIMIT: f64 = 0.1; // 0.1A
const STABILIZATION_DELAY_MS: u64 = 1000;

pub struct PortWrapper(Box<dyn SerialPort>);

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            std::io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            std::io::ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for PortWrapper {
    type Error = IoError;
}

impl embedded_io::Read for PortWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for PortWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

fn main() {
    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    let port = serialport::new(&port_name, BAUD_RATE)
        .timeout(std::time::Duration::from_millis(SERIAL_TIMEOUT_MS))
        .open()
        .expect("Failed to open serial port");

    let transport: RtuTransport<PortWrapper, 128> =
        RtuTransport::new(PortWrapper(port), MODBUS_UNIT_ID);

    // Connecting runs discovery: the model and input voltage are read and the
    // writable ranges derived from them.
    let mut psu = DpsPsu::new(transport).expect("Failed to connect to the PSU");

    let ratings = psu.ratings();
    println!(
        "Connected to a DPS{:02}{:02} ({} V / {} A class) on a {} V input",
        ratings.voltage_rating,
        ratings.current_rating,
        ratings.voltage_rating,
        ratings.current_rating,
        ratings.input_voltage
    );
    println!("Firmware version: {}", psu.get_firmware_version().unwrap());

    let v_set_info = psu.parameter_info(ParamName::VSet).unwrap();
    println!(
        "Settable voltage range: {:?} {}",
        v_set_info.range.unwrap(),
        v_set_info.unit
    );

    // Program a test point and enable the output
    psu.set_voltage(OUTPUT_VOLTAGE).unwrap();
    println!("Set output voltage to {}V", OUTPUT_VOLTAGE);

    psu.set_current(CURRENT_LIMIT).unwrap();
    println!("Set current limit to {}A", CURRENT_LIMIT);

    psu.set_output(true).unwrap();
    println!("Output enabled");

    // Wait for output to stabilize
    std::thread::sleep(std::time::Duration::from_millis(STABILIZATION_DELAY_MS));

    let measurements = psu.get_all_measurements().unwrap();
    println!(
        "Measured: {:.2} V, {:.2} A, {:.2} W (input {:.2} V)",
        measurements[&ParamName::VOut],
        measurements[&ParamName::IOut],
        measurements[&ParamName::Power],
        measurements[&ParamName::VIn]
    );

    println!("Regulation mode: {:?}", psu.get_regulation_mode().unwrap());
    println!(
        "Protection status: {:?}",
        psu.get_protection_status().unwrap()
    );

    psu.set_output(false).unwrap();
    println!("Output disabled");
}
