/// Marker grammar semantics - defines only the line protocol, not parsing logic
/// Shared by the driver templates (which print these lines) and the
/// comparator (which reads them back), so the two sides never drift.
///
/// Per test case, in order, one marker per line:
///   TC_START:<index>
///   OUTPUT:<serialized-result>
///   TIME:<integer-milliseconds>
///   TC_END:<index>

pub const TC_START: &str = "TC_START:";
pub const OUTPUT: &str = "OUTPUT:";
pub const TIME: &str = "TIME:";
pub const TC_END: &str = "TC_END:";

/// Observed output reported for a test case with no committed record
pub const NO_OUTPUT: &str = "No output";

/// Build the start marker line for a test case
pub fn start_line(index: usize) -> String {
    format!("{}{}", TC_START, index)
}

/// Build the end marker line for a test case
pub fn end_line(index: usize) -> String {
    format!("{}{}", TC_END, index)
}

/// Render the full marker block a well-behaved driver prints for one test case
pub fn render_block(index: usize, output: &str, time_ms: u64) -> String {
    format!(
        "{}\n{}{}\n{}{}\n{}\n",
        start_line(index),
        OUTPUT,
        output,
        TIME,
        time_ms,
        end_line(index)
    )
}
