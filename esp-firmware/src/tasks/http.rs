// HTTP Config Service - Formular-Seite, Speichern, Reset, Captive-Probes
use defmt::{info, warn};
use embassy_net::Stack;
use embassy_time::Duration;
use picoserve::io::embedded_io_async;
use picoserve::response::{IntoResponse, Redirect, Response, StatusCode};
use picoserve::routing::{get, post};

use esp_core::{ConfigStore, DeviceConfig, SaveOutcome, apply_save};

use crate::config::{
    HTTP_BUFFER_SIZE, HTTP_PORT, SAVE_BODY_MAX, TCP_RX_BUFFER_SIZE, TCP_TX_BUFFER_SIZE,
};
use crate::web;
use crate::{Hostname, RestartReason, RestartSignal, SharedConfigStore};

/// Antwort-Varianten des Portals
///
/// Eigene IntoResponse-Implementierung statt Tuple-Responses, damit
/// Status-Code, Header und Body pro Variante beieinander stehen.
enum PortalResponse {
    /// 200 mit dynamisch gerenderter Formular-Seite
    Form(alloc::string::String),
    /// 200 Erfolgs-Seite (Neustart folgt)
    Success,
    /// 400 mit generischer Fehler-Seite; Konfiguration unangetastet
    Invalid,
    /// Body passt nicht in den Puffer - minimale Plain-Text-Antwort
    OutOfMemory,
    /// Persistenz fehlgeschlagen - minimale Plain-Text-Antwort
    StoreError,
    /// Captive-Probe im AP-Modus: Umleitung aufs Portal
    RedirectToPortal,
    /// Captive-Probe im Client-Modus: Pfad existiert dort nicht
    NotFound,
}

impl IntoResponse for PortalResponse {
    async fn write_to<
        R: embedded_io_async::Read,
        W: picoserve::response::ResponseWriter<Error = R::Error>,
    >(
        self,
        connection: picoserve::response::Connection<'_, R>,
        response_writer: W,
    ) -> Result<picoserve::ResponseSent, W::Error> {
        match self {
            PortalResponse::Form(html) => html_response(StatusCode::OK, html.as_str())
                .write_to(connection, response_writer)
                .await,
            PortalResponse::Success => html_response(StatusCode::OK, web::HTML_OK)
                .write_to(connection, response_writer)
                .await,
            PortalResponse::Invalid => html_response(StatusCode::new(400), web::HTML_FAIL)
                .write_to(connection, response_writer)
                .await,
            PortalResponse::OutOfMemory => Response::new(StatusCode::new(500), "OOM")
                .write_to(connection, response_writer)
                .await,
            PortalResponse::StoreError => {
                Response::new(StatusCode::new(500), "configuration store failure")
                    .write_to(connection, response_writer)
                    .await
            }
            PortalResponse::RedirectToPortal => Redirect::to(web::PORTAL_URL)
                .write_to(connection, response_writer)
                .await,
            PortalResponse::NotFound => Response::new(StatusCode::new(404), "Not Found")
                .write_to(connection, response_writer)
                .await,
        }
    }
}

fn html_response(status: StatusCode, body: &str) -> impl IntoResponse {
    Response::new(status, body)
        .with_header("Content-Type", "text/html; charset=utf-8")
        .with_header("Cache-Control", "no-store")
}

/// Roh-Body des Speichern-Formulars, Länge begrenzt
///
/// Eigener Extractor statt picoserve::extract::Form: das URL-Decoding
/// (inklusive seiner Eigenheiten) gehört zur Kern-Logik in esp-core und
/// soll nicht doppelt existieren.
struct SaveBody(heapless::Vec<u8, SAVE_BODY_MAX>);

impl<'r, State> picoserve::extract::FromRequest<'r, State> for SaveBody {
    type Rejection = PortalResponse;

    async fn from_request<R: embedded_io_async::Read>(
        _state: &'r State,
        _request_parts: picoserve::request::RequestParts<'r>,
        request_body: picoserve::request::RequestBody<'r, R>,
    ) -> Result<Self, Self::Rejection> {
        // Abgebrochene Übertragung → 400, der Service läuft weiter
        let data = request_body
            .read_all()
            .await
            .map_err(|_| PortalResponse::Invalid)?;

        // Übergroße Bodies sind ein DoS-Vektor, kein Anwendungsfall
        heapless::Vec::from_slice(data)
            .map(SaveBody)
            .map_err(|_| PortalResponse::OutOfMemory)
    }
}

/// HTTP Server Task
///
/// Bedient in beiden Modi `/` (Formular), `/save` und `/reset`. Die
/// Captive-Probe-Pfade der gängigen Betriebssysteme leiten nur im
/// AP-Modus aufs Portal um; im Client-Modus existieren sie nicht (404).
///
/// **Task Pool:** mehrfach gespawnt für parallele Connections; jede
/// Instanz akzeptiert eine Verbindung zur Zeit.
///
/// # Parameter
/// - `task_id`: Eindeutige ID dieser Server-Instanz
/// - `stack`: embassy-net Stack (AP- oder STA-Interface)
/// - `ap_mode`: Captive-Probe-Pfade registrieren?
/// - `hostname`: Geräte-Identität für die Formular-Überschrift
/// - `current`: aktuelle Konfiguration zum Vorbefüllen des Formulars
/// - `store`: geteilter Config Store für save/reset
/// - `restart`: Signal an den Restart-Task
#[embassy_executor::task(pool_size = 2)]
pub async fn http_server_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    ap_mode: bool,
    hostname: Hostname,
    current: Option<DeviceConfig>,
    store: &'static SharedConfigStore,
    restart: &'static RestartSignal,
) {
    info!("HTTP: Server task {} starting on port {}...", task_id, HTTP_PORT);

    let form_handler = move || {
        let hostname = hostname.clone();
        let current = current.clone();
        async move { PortalResponse::Form(web::config_page(&hostname, current.as_ref())) }
    };

    let save_handler = move |SaveBody(body): SaveBody| async move {
        let outcome = {
            let mut store = store.lock().await;
            apply_save(&mut *store, &body)
        };

        match outcome {
            SaveOutcome::Saved(cfg) => {
                info!(
                    "HTTP: configuration saved (ssid '{}'), restarting",
                    cfg.wifi_ssid.as_str()
                );
                restart.signal(RestartReason::ConfigSaved);
                PortalResponse::Success
            }
            SaveOutcome::Invalid => {
                warn!("HTTP: invalid configuration submitted");
                PortalResponse::Invalid
            }
            SaveOutcome::StoreFailed => {
                // Store-Zustand unbekannt: fatal für diesen Boot
                warn!("HTTP: persisting configuration failed");
                restart.signal(RestartReason::StoreFailure);
                PortalResponse::StoreError
            }
        }
    };

    let reset_handler = move || async move {
        warn!("HTTP: erasing configuration");
        let result = {
            let mut store = store.lock().await;
            store.erase()
        };

        match result {
            Ok(()) => {
                restart.signal(RestartReason::ConfigReset);
                PortalResponse::Success
            }
            Err(_) => {
                restart.signal(RestartReason::StoreFailure);
                PortalResponse::StoreError
            }
        }
    };

    // Copy-Closure, damit derselbe Handler an allen Probe-Routen hängt
    let probe_handler = move || async move {
        if ap_mode {
            PortalResponse::RedirectToPortal
        } else {
            PortalResponse::NotFound
        }
    };

    // Router-Konfiguration
    // Probe-Pfade: Android, Windows, Apple + Diverses
    let app = picoserve::Router::new()
        .route("/", get(form_handler))
        .route("/save", post(save_handler))
        .route("/reset", post(reset_handler))
        .route("/generate_204", get(probe_handler))
        .route("/gen_204", get(probe_handler))
        .route("/ncsi.txt", get(probe_handler))
        .route("/connecttest.txt", get(probe_handler))
        .route("/hotspot-detect.html", get(probe_handler))
        .route("/library/test/success.html", get(probe_handler))
        .route("/success.txt", get(probe_handler))
        .route("/favicon.ico", get(probe_handler))
        .route("/redirect", get(probe_handler));

    // Server-Konfiguration
    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(2)),
        write: Some(Duration::from_secs(2)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    // HTTP-Buffer für Requests/Responses
    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];

    // TCP-Buffers für Socket
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    // Server erstellen und auf Port 80 lauschen
    let server = picoserve::Server::new(&app, &config, &mut http_buffer);
    let _ = server
        .listen_and_serve(task_id, *stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}
