use std::collections::BTreeMap;

/// Render a summary as the on-disk markdown document.
///
/// Layout: title header with the video ID, the summary body, one bullet
/// per metadata entry, and a trailing generation timestamp line.
pub fn render_summary_document(
    video_id: &str,
    summary: &str,
    metadata: &BTreeMap<String, String>,
    timestamp: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Summary for Video {video_id}\n\n"));

    output.push_str("## Summary\n");
    output.push_str(summary);
    output.push_str("\n\n");

    output.push_str("## Metadata\n");
    for (key, value) in metadata {
        output.push_str(&format!("- **{key}**: {value}\n"));
    }

    output.push_str(&format!("\nGenerated on: {timestamp}"));

    output
}
