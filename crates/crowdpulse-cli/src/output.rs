use std::sync::Arc;

use crowdpulse_community::{PostTable, ResultSet};
use crowdpulse_core::SourceType;

use crate::OutputFormat;

/// Titles longer than this are cut in the human-readable table.
const TITLE_DISPLAY_CHARS: usize = 40;

pub(crate) fn print_results(
    results: &[(SourceType, Arc<ResultSet>)],
    trigger_time: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&to_json(results, trigger_time))?);
        }
        OutputFormat::Table => {
            for (source, result) in results {
                print_table(*source, &PostTable::from(result.as_ref()));
            }
        }
    }
    Ok(())
}

fn to_json(results: &[(SourceType, Arc<ResultSet>)], trigger_time: &str) -> serde_json::Value {
    let sources: Vec<serde_json::Value> = results
        .iter()
        .map(|(source, result)| {
            let table = PostTable::from(result.as_ref());
            serde_json::json!({
                "source": source,
                "columns": table.columns(),
                "rows": table.rows(),
            })
        })
        .collect();
    serde_json::json!({
        "trigger_time": trigger_time,
        "sources": sources,
    })
}

fn print_table(source: SourceType, table: &PostTable) {
    println!("== {source} ({} posts)", table.len());
    if table.is_empty() {
        println!("no posts passed the quality gate; try again later");
        return;
    }
    println!(
        "{:<10}{:<9}{:<8}{:<21}TITLE",
        "SENTIMENT", "QUALITY", "TARGET", "PUBLISHED"
    );
    for row in table.rows() {
        println!(
            "{:<10}{:<9.2}{:<8}{:<21}{}",
            row.sentiment.as_str(),
            row.quality_score,
            row.source_target,
            row.publish_time,
            shorten(&row.title)
        );
    }
}

fn shorten(title: &str) -> String {
    if title.chars().count() <= TITLE_DISPLAY_CHARS {
        title.to_string()
    } else {
        let head: String = title.chars().take(TITLE_DISPLAY_CHARS).collect();
        format!("{head}…")
    }
}
