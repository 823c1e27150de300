// Kalender-Abruf - HTTPS GET und Streaming in die Ingestion-Pipeline
//
// Der Response-Body wird chunk-weise gelesen und direkt in die
// CalendarIngest-Pipeline gefüttert; der komplette Kalender steht nie am
// Stück im Speicher.

use defmt::{info, warn};
use embassy_net::Stack;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_time::{Duration, with_timeout};
use embedded_io_async::Read;
use reqwless::client::{HttpClient, TlsConfig, TlsVerify};
use reqwless::request::{Method, RequestBuilder};
use tonnenlicht_core::{CalendarIngest, EventList, IngestFlow};

use crate::config::{
    CALENDAR_URL, FETCH_TIMEOUT_SECS, HTTP_CHUNK_SIZE, HTTP_HEADER_BUFFER_SIZE, TCP_BUFFER_SIZE,
    TLS_READ_BUFFER_SIZE, TLS_WRITE_BUFFER_SIZE,
};

/// Fehler-Typ für den Kalender-Abruf
///
/// Alle Varianten sind lokal behebbar; die Retry-Schleife im Kalender-Task
/// entscheidet über Wartezeit und Fehleranzeige.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum FetchError {
    /// Verbindungsaufbau oder TLS-Handshake fehlgeschlagen
    Connect,
    /// Request konnte nicht gesendet werden
    Request,
    /// Server antwortete mit einem Fehler-Status
    Status(u16),
    /// Lesefehler mitten im Response-Body
    Read,
    /// Gesamter Abruf hat das Zeitlimit überschritten
    Timeout,
    /// Transport erfolgreich, aber kein einziges Event geparst:
    /// nicht von einem Totalausfall unterscheidbar, gleicher Retry-Pfad
    NoEvents,
}

/// Ruft den Kalender ab, begrenzt auf [`FETCH_TIMEOUT_SECS`]
///
/// Ein Abruf endet immer: Erfolg, Fehler oder Timeout. Abbrechen mitten
/// im Abruf gibt es nicht, der Aufrufer entscheidet nur über den Retry.
pub async fn fetch_calendar(
    stack: &'static Stack<'static>,
    tls_seed: u64,
) -> Result<EventList, FetchError> {
    with_timeout(
        Duration::from_secs(FETCH_TIMEOUT_SECS),
        fetch_calendar_inner(stack, tls_seed),
    )
    .await
    .unwrap_or(Err(FetchError::Timeout))
}

/// Der eigentliche Abruf: Verbindung, Request, Body-Streaming
///
/// Die alte Liste bleibt beim Aufrufer, bis dieser Abruf erfolgreich war;
/// erst dann wird getauscht.
async fn fetch_calendar_inner(
    stack: &'static Stack<'static>,
    tls_seed: u64,
) -> Result<EventList, FetchError> {
    let mut tls_rx = [0u8; TLS_READ_BUFFER_SIZE];
    let mut tls_tx = [0u8; TLS_WRITE_BUFFER_SIZE];
    let tcp_state = TcpClientState::<1, TCP_BUFFER_SIZE, TCP_BUFFER_SIZE>::new();
    let tcp_client = TcpClient::new(*stack, &tcp_state);
    let dns_socket = DnsSocket::new(*stack);

    // Zertifikatsprüfung ist Sache der Transport-Policy, hier deaktiviert:
    // der Kalender ist ein öffentliches Dokument
    let tls = TlsConfig::new(tls_seed, &mut tls_rx, &mut tls_tx, TlsVerify::None);
    let mut client = HttpClient::new_with_tls(&tcp_client, &dns_socket, tls);

    info!("Abruf: GET {}", CALENDAR_URL);
    let mut header_buf = [0u8; HTTP_HEADER_BUFFER_SIZE];
    let headers = [("User-Agent", "tonnenlicht"), ("Connection", "close")];
    let request = client
        .request(Method::GET, CALENDAR_URL)
        .await
        .map_err(|_| FetchError::Connect)?;
    let mut request = request.headers(&headers);
    let response = request
        .send(&mut header_buf)
        .await
        .map_err(|_| FetchError::Request)?;

    let status = response.status.0;
    if !(200..300).contains(&status) {
        return Err(FetchError::Status(status));
    }

    // Body streamen bis der Inhalt zu Ende ist oder der Server schließt
    let mut ingest = CalendarIngest::new();
    let mut body = response.body().reader();
    let mut chunk = [0u8; HTTP_CHUNK_SIZE];
    loop {
        match body.read(&mut chunk).await {
            Ok(0) => break,
            Ok(len) => {
                if ingest.feed(&chunk[..len]) == IngestFlow::Done {
                    break;
                }
            }
            Err(_) => return Err(FetchError::Read),
        }
    }

    let result = ingest.finish();
    if result.dropped_unmatched > 0 {
        warn!(
            "Abruf: {} Kategoriezeilen ohne bekanntes Label verworfen",
            result.dropped_unmatched
        );
    }
    if result.ignored_after_full > 0 {
        warn!(
            "Abruf: Event-Liste voll, {} Zeilen ignoriert",
            result.ignored_after_full
        );
    }
    if result.bad_lines > 0 {
        warn!("Abruf: {} unlesbare Zeilen übersprungen", result.bad_lines);
    }
    if !result.success() {
        return Err(FetchError::NoEvents);
    }
    info!("Abruf: {} Events geladen", result.event_count());
    Ok(result.events)
}
