// Zeitsynchronisation - SNTP über UDP und lokale Uhr
//
// Ein einziger 48-Byte Mode-3 Austausch laut RFC 5905 reicht für
// Tagesgenauigkeit. Zwischen den Synchronisationen zählt die Uhr mit dem
// monotonen Embassy-Timer weiter; nachsynchronisiert wird bei jedem
// Kalender-Abruf.

use chrono::{Datelike, Timelike};
use defmt::{Debug2Format, info, warn};
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpAddress, Stack};
use embassy_time::{Duration, Instant, with_timeout};
use tonnenlicht_core::{Clock, LocalDateTime, SimpleDate};

use crate::config::{DNS_TIMEOUT_SECS, NTP_PORT, NTP_SERVER, NTP_TIMEOUT_SECS, UTC_OFFSET_SECS};

/// Sekunden zwischen NTP-Epoche (1900) und Unix-Epoche (1970)
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// Lokaler UDP-Port für die NTP-Anfrage
const NTP_LOCAL_PORT: u16 = 50123;

/// Fehler-Typ für die Zeitsynchronisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ClockError {
    Dns,
    Socket,
    Timeout,
    BadReply,
}

/// Lokale Uhr, verankert an der letzten SNTP-Synchronisation
///
/// Vor der ersten Synchronisation liefert now() None; der Kalender-Task
/// lässt solche Ticks aus.
pub struct WallClock {
    sync: Option<SyncPoint>,
}

#[derive(Clone, Copy)]
struct SyncPoint {
    unix_secs: u64,
    at: Instant,
}

impl WallClock {
    pub const fn new() -> Self {
        Self { sync: None }
    }

    /// Verankert die Uhr an einer frisch empfangenen Unix-Zeit
    pub fn set(&mut self, unix_secs: u64) {
        self.sync = Some(SyncPoint {
            unix_secs,
            at: Instant::now(),
        });
    }

    /// Unix-Zeit in Sekunden, None vor der ersten Synchronisation
    pub fn unix_now(&self) -> Option<u64> {
        self.sync
            .map(|sync| sync.unix_secs + sync.at.elapsed().as_secs())
    }
}

impl Clock for WallClock {
    fn now(&self) -> Option<LocalDateTime> {
        let unix = self.unix_now()?;
        // Lokalzeit = Unix-Zeit plus fester Offset, keine Zeitzonen-Datenbank
        let local = chrono::DateTime::from_timestamp(unix as i64 + UTC_OFFSET_SECS, 0)?;
        Some(LocalDateTime {
            date: SimpleDate::from(local.date_naive()),
            hour: local.hour() as u8,
            minute: local.minute() as u8,
            second: local.second() as u8,
        })
    }
}

/// Führt eine SNTP-Synchronisation durch und verankert die Uhr
///
/// Ablauf: NTP-Server per DNS auflösen, Mode-3 Paket senden, auf die
/// Antwort warten (mit Timeout), Transmit-Timestamp übernehmen.
pub async fn sync_clock(
    stack: &'static Stack<'static>,
    clock: &mut WallClock,
) -> Result<(), ClockError> {
    let server_ip = resolve_hostname(stack, NTP_SERVER).await?;
    info!("Uhr: '{}' aufgelöst zu {}", NTP_SERVER, Debug2Format(&server_ip));

    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_buffer = [0u8; 128];
    let mut socket = UdpSocket::new(
        *stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(NTP_LOCAL_PORT).map_err(|_| ClockError::Socket)?;

    // Mode-3 Anfrage: LI=0, Version=3, Mode=Client, Rest Null
    let mut request = [0u8; 48];
    request[0] = 0x1B;
    socket
        .send_to(&request, (server_ip, NTP_PORT))
        .await
        .map_err(|_| ClockError::Socket)?;

    let mut reply = [0u8; 48];
    let (len, _) = with_timeout(
        Duration::from_secs(NTP_TIMEOUT_SECS),
        socket.recv_from(&mut reply),
    )
    .await
    .map_err(|_| ClockError::Timeout)?
    .map_err(|_| ClockError::Socket)?;

    let unix_secs = parse_ntp_reply(&reply[..len])?;
    clock.set(unix_secs);
    match clock.now() {
        Some(now) => info!(
            "Uhr: synchronisiert auf {} {=u8:02}:{=u8:02}:{=u8:02}",
            now.date, now.hour, now.minute, now.second
        ),
        None => warn!("Uhr: Zeitstempel außerhalb des darstellbaren Bereichs"),
    }
    Ok(())
}

/// Prüft die NTP-Antwort und extrahiert die Unix-Zeit
fn parse_ntp_reply(reply: &[u8]) -> Result<u64, ClockError> {
    if reply.len() < 48 {
        return Err(ClockError::BadReply);
    }
    // Mode muss Server (4) sein, Stratum 0 ist ein Kiss-of-Death-Paket
    let mode = reply[0] & 0x07;
    let stratum = reply[1];
    if mode != 4 || stratum == 0 || stratum > 15 {
        return Err(ClockError::BadReply);
    }
    // Transmit-Timestamp: Sekunden seit 1900, Big-Endian bei Byte 40
    let ntp_secs = u64::from(u32::from_be_bytes([reply[40], reply[41], reply[42], reply[43]]));
    if ntp_secs <= NTP_UNIX_OFFSET {
        return Err(ClockError::BadReply);
    }
    Ok(ntp_secs - NTP_UNIX_OFFSET)
}

/// Löst einen Hostnamen zur IPv4-Adresse auf
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<IpAddress, ClockError> {
    let addresses = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await
    .map_err(|_| ClockError::Timeout)?
    .map_err(|_| ClockError::Dns)?;

    addresses.first().copied().ok_or(ClockError::Dns)
}
