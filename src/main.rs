//! Dock Station Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioAdapter        LogEventSink    TcpCommandLink per channel │
//! │  (DigitalIo+Clock)  (EventSink)     (machine · human)          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             StationService (pure logic)                │    │
//! │  │  Router · Motors · Sensors · Relay · Sequences         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver};
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use dockstation::adapters::hardware::{GpioAdapter, StationPins};
use dockstation::adapters::log_sink::LogEventSink;
use dockstation::adapters::tcp_link;
use dockstation::app::commands::ChannelId;
use dockstation::app::ports::CommandLink;
use dockstation::app::service::StationService;
use dockstation::config::StationConfig;
use dockstation::pins;

const WIFI_SSID: &str = match option_env!("STATION_WIFI_SSID") {
    Some(s) => s,
    None => "dockstation",
};
const WIFI_PASSWORD: &str = match option_env!("STATION_WIFI_PASSWORD") {
    Some(s) => s,
    None => "",
};

type OutPin = PinDriver<'static, AnyOutputPin, Output>;
type InPin = PinDriver<'static, AnyInputPin, Input>;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Dock Station v{}                   ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config();
    info!(
        "Config: {:?}, {:?} sequences, ports {}/{}",
        config.variant, config.sequence_mode, config.machine_port, config.human_port
    );

    // ── 3. Pins (safe levels are driven by StationService::start) ──
    let peripherals = Peripherals::take()?;
    let mut hw = GpioAdapter::new(station_pins()?, FreeRtos);

    // ── 4. Network ────────────────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let _wifi = connect_wifi(peripherals.modem, sysloop, nvs)?;

    let mut links = tcp_link::bind_served(&config)?;

    // ── 5. Station service ────────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut app = StationService::new(config.clone());
    app.start(&mut hw, &mut sink);

    info!("Station ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        {
            let mut polled: heapless::Vec<(ChannelId, &mut dyn CommandLink), 2> = links
                .iter_mut()
                .map(|(channel, link)| (*channel, link as &mut dyn CommandLink))
                .collect();
            app.tick(&mut hw, &mut polled, &mut sink);
        }
        for (_, link) in &mut links {
            link.flush();
        }

        std::thread::sleep(std::time::Duration::from_millis(u64::from(
            config.loop_interval_ms,
        )));
    }
}

/// Build-time JSON override, falling back to defaults.
fn load_config() -> StationConfig {
    let Some(json) = option_env!("STATION_CONFIG_JSON") else {
        return StationConfig::default();
    };
    match StationConfig::from_json(json) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("STATION_CONFIG_JSON rejected ({}), using defaults", e);
            StationConfig::default()
        }
    }
}

fn station_pins() -> Result<StationPins<OutPin, InPin>> {
    // SAFETY: each GPIO number in `pins` is claimed exactly once, here,
    // and nothing else in the firmware constructs pins from raw numbers.
    let out = |gpio: i32| PinDriver::output(unsafe { AnyOutputPin::new(gpio) });
    let inp = |gpio: i32| PinDriver::input(unsafe { AnyInputPin::new(gpio) });

    Ok(StationPins {
        door_direction: out(pins::DOOR_DIRECTION_GPIO)?,
        door_enable: out(pins::DOOR_ENABLE_GPIO)?,
        plate_direction: out(pins::PLATE_DIRECTION_GPIO)?,
        plate_enable: out(pins::PLATE_ENABLE_GPIO)?,
        power_relay: out(pins::POWER_RELAY_GPIO)?,
        door_sensor: inp(pins::DOOR_SENSOR_GPIO)?,
        plate_sensor: inp(pins::PLATE_SENSOR_GPIO)?,
    })
}

fn connect_wifi(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
) -> Result<BlockingWifi<EspWifi<'static>>> {
    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

    let auth_method = if WIFI_PASSWORD.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: WIFI_SSID
            .try_into()
            .map_err(|_| anyhow!("SSID longer than 32 bytes"))?,
        password: WIFI_PASSWORD
            .try_into()
            .map_err(|_| anyhow!("password longer than 64 bytes"))?,
        auth_method,
        ..Default::default()
    }))?;

    wifi.start()?;
    info!("WiFi started, connecting to '{}'", WIFI_SSID);
    wifi.connect()?;
    wifi.wait_netif_up()?;

    let ip = wifi.wifi().sta_netif().get_ip_info()?;
    info!("WiFi connected, IP {}", ip.ip);
    Ok(wifi)
}
