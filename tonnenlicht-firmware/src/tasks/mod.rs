// Task-Modul: Enthält alle Embassy Tasks und die Netzwerk-Helfer
//
// Der Kalender-Task ist der einzige Konsument von Netz und LEDs, die
// WiFi-Tasks halten nur die Verbindung am Leben. Es gibt keine
// Kommunikation zwischen Tasks.

pub mod calendar;
pub mod clock;
pub mod fetch;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use calendar::calendar_task;
pub use wifi::{connection_task, dhcp_task, net_task};
