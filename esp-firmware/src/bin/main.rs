// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

use core::fmt::Write;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Ipv4Cidr, Stack, StackResources, StaticConfigV4};
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::efuse::Efuse;
use esp_hal::gpio::{Input, InputConfig, Pull};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;

use defmt::{Debug2Format, info, warn};

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use esp_core::{ConfigStore, RunMode, StatusMessage, select_mode};
use esp_rufbox::config::{
    EXTRA_HEAP_SIZE, HTTP_TASK_POOL, PORTAL_ADDR, PORTAL_PREFIX_LEN, STATUS_DISPLAY_MS,
    WIFI_HEAP_SIZE,
};
use esp_rufbox::hal::FlashConfigStore;
use esp_rufbox::tasks::{
    call_button_task, captive_dns_task, click_worker_task, connection_task, dhcp_server_task,
    display_task, factory_reset_task, http_server_task, mdns_responder_task, mqtt_task, net_task,
    restart_task, softap_task, wait_for_ipv4,
};
use esp_rufbox::{
    ClickChannel, DisplayChannel, PublishChannel, RestartSignal, SharedConfigStore,
    hostname_from_mac,
};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
esp_bootloader_esp_idf::esp_app_desc!();

// Channels und Neustart-Signal (const-Konstruktoren, daher plain statics)
static DISPLAY: DisplayChannel = Channel::new();
static CLICKS: ClickChannel = Channel::new();
static PUBLISH: PublishChannel = Channel::new();
static RESTART: RestartSignal = Signal::new();

/// Main Entry Point
///
/// Initialisiert Hardware und Config Store, entscheidet den Betriebsmodus
/// und spawnt die Tasks des jeweiligen Modus. Danach schläft main() -
/// alle Arbeit läuft in Tasks; der einzige Teardown-Pfad ist der Neustart.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    // Restart-Plumbing und Factory-Reset ZUERST: beides muss schon beim
    // allerersten Boot eines unkonfigurierten Geräts funktionieren
    static STORE: static_cell::StaticCell<SharedConfigStore> = static_cell::StaticCell::new();
    let store: &'static SharedConfigStore = &*STORE.init(Mutex::new(
        FlashConfigStore::new().expect("Failed to open config store"),
    ));

    let reset_button = Input::new(peripherals.GPIO9, InputConfig::default().with_pull(Pull::Up));
    spawner.spawn(restart_task(&RESTART)).unwrap();
    spawner
        .spawn(factory_reset_task(reset_button, store, &RESTART))
        .unwrap();

    // Display-Senke
    spawner.spawn(display_task(DISPLAY.receiver())).unwrap();

    // Konfiguration lesen; ein beschädigter Store gilt als leer (fail open):
    // lieber ein erreichbares Portal als ein totes Gerät
    let current = match store.lock().await.load() {
        Ok(current) => current,
        Err(e) => {
            warn!("APP: config store unreadable ({}), starting provisioning", e);
            None
        }
    };

    // Geräte-Identität aus dem MAC-Suffix
    let hostname = hostname_from_mac(Efuse::mac_address());
    info!("APP: device identity '{}'", hostname.as_str());

    // WiFi Hardware initialisieren
    static RADIO_INIT: static_cell::StaticCell<esp_radio::Controller> =
        static_cell::StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi controller"));

    let (wifi_controller, wifi_interfaces) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Static resources für embassy-net
    // 12 Sockets: HTTP-Listener + DNS/DHCP/mDNS + MQTT + Reserve
    static RESOURCES: static_cell::StaticCell<StackResources<12>> = static_cell::StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    static STACK: static_cell::StaticCell<Stack<'static>> = static_cell::StaticCell::new();

    match select_mode(current.as_ref()) {
        RunMode::Provisioning => {
            info!("APP: no valid configuration, starting provisioning portal");

            // AP-Interface mit fester Portal-Adresse 192.168.4.1/24
            let net_config = NetConfig::ipv4_static(StaticConfigV4 {
                address: Ipv4Cidr::new(PORTAL_ADDR, PORTAL_PREFIX_LEN),
                gateway: Some(PORTAL_ADDR),
                dns_servers: Default::default(),
            });
            let (stack, runner) =
                embassy_net::new(wifi_interfaces.ap, net_config, resources, seed);
            let stack = &*STACK.init(stack);

            spawner
                .spawn(softap_task(wifi_controller, hostname.clone()))
                .unwrap();
            spawner.spawn(net_task(runner)).unwrap();
            spawner.spawn(dhcp_server_task(stack)).unwrap();
            spawner.spawn(captive_dns_task(stack)).unwrap();

            for task_id in 0..HTTP_TASK_POOL {
                spawner
                    .spawn(http_server_task(
                        task_id,
                        stack,
                        true,
                        hostname.clone(),
                        current.clone(),
                        store,
                        &RESTART,
                    ))
                    .unwrap();
            }

            // Portal-Hinweis aufs Display (bleibt bis zum Neustart stehen)
            let mut text = heapless::String::<{ esp_core::types::STATUS_TEXT_MAX }>::new();
            let _ = write!(text, "Wi-Fi SSID\n{hostname}");
            DISPLAY.sender().send(StatusMessage::new(&text, None)).await;
        }
        RunMode::Operational => {
            let cfg = current.expect("operational mode requires a configuration");
            info!("APP: configuration found, joining '{}'", cfg.wifi_ssid.as_str());

            // STA-Interface mit DHCP
            let net_config = NetConfig::dhcpv4(Default::default());
            let (stack, runner) =
                embassy_net::new(wifi_interfaces.sta, net_config, resources, seed);
            let stack = &*STACK.init(stack);

            spawner
                .spawn(connection_task(wifi_controller, cfg.clone()))
                .unwrap();
            spawner.spawn(net_task(runner)).unwrap();

            // Blockiert bis eine Adresse da ist (bewusst ohne Timeout)
            let ip_config = wait_for_ipv4(stack).await;
            let ip = ip_config.address.address();
            info!("APP: STA IP {}", Debug2Format(&ip));

            // Status-Text für Boot-Anzeige und Einzelklick
            let mut status = heapless::String::<{ esp_core::types::STATUS_TEXT_MAX }>::new();
            let _ = write!(
                status,
                "Wi-Fi: {}\nSERVER: {}\nIP: {}\n{}",
                cfg.wifi_ssid, cfg.server_addr, ip, cfg.device_name
            );
            DISPLAY
                .sender()
                .send(StatusMessage::new(&status, Some(STATUS_DISPLAY_MS)))
                .await;

            // Konfigurations-Service bleibt auch im Betrieb erreichbar
            for task_id in 0..HTTP_TASK_POOL {
                spawner
                    .spawn(http_server_task(
                        task_id,
                        stack,
                        false,
                        hostname.clone(),
                        Some(cfg.clone()),
                        store,
                        &RESTART,
                    ))
                    .unwrap();
            }

            spawner.spawn(mdns_responder_task(stack)).unwrap();
            spawner
                .spawn(mqtt_task(
                    stack,
                    cfg.clone(),
                    hostname.clone(),
                    PUBLISH.receiver(),
                    DISPLAY.sender(),
                ))
                .unwrap();

            // Ruftaste aktivieren
            let call_button =
                Input::new(peripherals.GPIO4, InputConfig::default().with_pull(Pull::Up));
            spawner
                .spawn(call_button_task(call_button, CLICKS.sender()))
                .unwrap();
            spawner
                .spawn(click_worker_task(
                    CLICKS.receiver(),
                    DISPLAY.sender(),
                    PUBLISH.sender(),
                    status,
                ))
                .unwrap();
        }
    }

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
