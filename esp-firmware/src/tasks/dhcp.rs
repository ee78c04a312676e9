// DHCP Server Task - vergibt Adressen an Portal-Clients im AP-Modus
//
// Ohne DHCP bekommt ein Telefon im Provisioning-AP keine Adresse und
// das Captive Portal bleibt unerreichbar. Der Server kommt komplett
// aus edge-dhcp; hier passiert nur Socket-Setup und Fehler-Retry.

use core::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use defmt::{Debug2Format, info, warn};
use embassy_net::Stack;
use embassy_time::{Duration, Timer};

use edge_dhcp::io::{self, DEFAULT_SERVER_PORT};
use edge_dhcp::server::{Server, ServerOptions};
use edge_nal::UdpBind;
use edge_nal_embassy::{Udp, UdpBuffers};

use crate::config::PORTAL_ADDR;

/// Maximale Anzahl gleichzeitiger DHCP-Leases
const DHCP_MAX_LEASES: usize = 8;

/// UDP Buffer-Größen für DHCP (Bytes)
const DHCP_UDP_BUFFER_SIZE: usize = 1024;

/// DHCP Server Task
///
/// # Parameter
/// - `stack`: embassy-net Stack des AP-Interfaces
#[embassy_executor::task]
pub async fn dhcp_server_task(stack: &'static Stack<'static>) {
    let mut packet_buf = [0u8; 1500];
    let mut gw_buf = [Ipv4Addr::UNSPECIFIED];

    // StaticCell: nur einmal initialisieren, auch wenn der Loop neu bindet
    static UDP_BUFFERS: static_cell::StaticCell<
        UdpBuffers<1, DHCP_UDP_BUFFER_SIZE, DHCP_UDP_BUFFER_SIZE>,
    > = static_cell::StaticCell::new();
    let udp_buffers = UDP_BUFFERS.init_with(UdpBuffers::new);
    let udp_stack = Udp::new(*stack, udp_buffers);

    loop {
        info!("DHCP: Server starting on port {}", DEFAULT_SERVER_PORT);

        let mut socket = match udp_stack
            .bind(SocketAddr::V4(SocketAddrV4::new(
                Ipv4Addr::UNSPECIFIED,
                DEFAULT_SERVER_PORT,
            )))
            .await
        {
            Ok(socket) => socket,
            Err(e) => {
                warn!("DHCP: bind failed: {}", Debug2Format(&e));
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
        };

        let result = io::server::run(
            &mut Server::<_, DHCP_MAX_LEASES>::new_with_et(PORTAL_ADDR),
            &ServerOptions::new(PORTAL_ADDR, Some(&mut gw_buf)),
            &mut socket,
            &mut packet_buf,
        )
        .await;

        if let Err(e) = result {
            warn!("DHCP: server error: {}", Debug2Format(&e));
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}
