/// Number of samples kept per plotted vitals channel.
pub const HISTORY_CAPACITY: usize = 500;
/// Neutral value the history buffers are pre-filled with.
pub const HISTORY_FILL_VALUE: f64 = 0.0;
/// Chart fallback when a reading lacks the plotted field.
///
/// Indistinguishable from a true zero reading on the chart; text fields use
/// [`DISPLAY_PLACEHOLDER`] instead.
pub const MISSING_SAMPLE_FALLBACK: f64 = 0.0;
/// Rendered in place of a vitals field that is absent from the latest reading.
pub const DISPLAY_PLACEHOLDER: &str = "--";
/// State-machine message for a connection attempt that never came up.
pub const CONNECT_FAILED_MSG: &str = "Connection failed";
/// State-machine message for a connection that closed after being established.
pub const DISCONNECTED_MSG: &str = "Disconnected from server";
/// Default telemetry endpoint when none is given on the command line.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:5000";
/// Capacity of the application event bus.
pub const EVENT_BUS_CAPACITY: usize = 128;
