//! UI layer for desktop GUI: app shell, drop zone, file list, tool tiles and toast.

pub mod app;

pub use app::PdfMasterApp;
