//! roadtrace-export: Pure format serializers (sans-IO)
//!
//! Converts extracted roads and sampled waypoints into output formats.
//! Currently supports CSV and plot-series JSON.

pub mod csv;
pub mod plot;

pub use csv::{roads_csv, to_csv, waypoints_csv};
pub use plot::{Panel, PlotData, Series, SeriesStyle, plot_data};

/// Errors that can occur while serializing exports.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A plotted coordinate is `NaN` or infinite.
    #[error("panel {panel:?} contains a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Title of the offending panel.
        panel: String,
    },

    /// JSON serialization failed.
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}
