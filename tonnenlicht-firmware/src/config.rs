// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
#![allow(dead_code)]

// ============================================================================
// LED Konfiguration
// ============================================================================

/// GPIO-Pin für den LED-Streifen (WS2812/Neopixel)
pub const LED_GPIO_PIN: u8 = 8;

/// Anzahl der LEDs im Streifen
///
/// Die Anzeige-Logik funktioniert mit jeder Anzahl; die Referenz-Hardware
/// hat drei Pixel (Ring-Optik: außen, Mitte, außen).
pub const LED_COUNT: usize = 3;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

// ============================================================================
// Scheduling
// ============================================================================

/// Abstand zwischen zwei Scheduling-Ticks in Sekunden
///
/// Einmal pro Minute reicht: die Tageswechsel-Erkennung macht aus allen
/// Ticks desselben Kalendertags ein No-Op.
pub const TICK_INTERVAL_SECS: u64 = 60;

/// Wartezeit zwischen zwei Abruf-Versuchen in Sekunden
pub const FETCH_RETRY_DELAY_SECS: u64 = 30;

/// Abruf-Versuche beim monatlichen Neuabruf
///
/// Schlagen alle fehl, bleibt die alte Event-Liste stehen und Slot 0
/// zeigt Rot bis zum nächsten erfolgreichen Abruf.
pub const FETCH_RETRY_ATTEMPTS: u32 = 3;

/// Blink-Halbperiode des Fehlerindikators in Millisekunden
pub const FAILURE_BLINK_MS: u64 = 500;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// Gesamt-Heap: ~100 KB für WiFi-Stack und TLS-Handshake

// ============================================================================
// Kalender-Abruf
// ============================================================================

/// URL des Abfallkalenders (iCalendar-Export des Entsorgers)
/// Wird zur Build-Zeit aus der Environment Variable CALENDAR_URL geladen
/// Setze diese in .env file (siehe .env.example)
pub const CALENDAR_URL: &str = env!(
    "CALENDAR_URL",
    "Kalender-URL nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Zeitlimit für einen kompletten Abruf in Sekunden
/// (DNS + TLS-Handshake + Request + Body-Streaming)
pub const FETCH_TIMEOUT_SECS: u64 = 60;

/// TLS Record-Buffer Leserichtung in Bytes
/// 16 KB deckt die maximale TLS-Record-Größe ab
pub const TLS_READ_BUFFER_SIZE: usize = 16384;

/// TLS Record-Buffer Schreibrichtung in Bytes
/// Der GET-Request ist klein, 4 KB reichen
pub const TLS_WRITE_BUFFER_SIZE: usize = 4096;

/// TCP Buffer-Größen für die HTTPS-Verbindung in Bytes
pub const TCP_BUFFER_SIZE: usize = 4096;

/// Buffer für HTTP Response-Header in Bytes
pub const HTTP_HEADER_BUFFER_SIZE: usize = 2048;

/// Lese-Chunk für den Response-Body in Bytes
pub const HTTP_CHUNK_SIZE: usize = 512;

// ============================================================================
// Zeitsynchronisation (SNTP)
// ============================================================================

/// NTP-Server Hostname
/// Kann über die Environment Variable NTP_SERVER überschrieben werden
pub const NTP_SERVER: &str = match option_env!("NTP_SERVER") {
    Some(server) => server,
    None => "pool.ntp.org",
};

/// NTP Port (Standard: 123 laut RFC 5905)
pub const NTP_PORT: u16 = 123;

/// Wartezeit auf die NTP-Antwort in Sekunden
pub const NTP_TIMEOUT_SECS: u64 = 5;

/// Wartezeit nach fehlgeschlagener Zeitsynchronisation in Sekunden
pub const NTP_RETRY_DELAY_SECS: u64 = 10;

/// Offset der lokalen Zeit zu UTC in Sekunden
///
/// Fest konfiguriert (MEZ = +3600). Die Sommerzeit verschiebt nur den
/// Zeitpunkt des Tageswechsels um eine Stunde, was bei minütlichen Ticks
/// keinen sichtbaren Unterschied macht.
pub const UTC_OFFSET_SECS: i64 = 3600;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;
