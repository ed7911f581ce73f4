// Adapters layer: concrete implementations for the external collaborators (REST API, QR payloads, reports).

pub mod http;
pub mod qr;
pub mod report;
