//! Watch command implementation

use crate::cli::WatchArgs;
use crate::output::Output;
use anyhow::Result;
use geoexplorer_core::config::LayeredConfig;
use geoexplorer_core::events::{StreamEvent, STREAM_ERROR_EVENT};
use geoexplorer_gateway::EventStream;
use std::collections::HashSet;

/// Event types printed when no --type is given
const DEFAULT_KINDS: [&str; 3] = ["job_status", "job_created", "progress"];

pub async fn execute(args: WatchArgs, config: &LayeredConfig, output: &Output) -> Result<()> {
    let gateway = super::connect(config)?;
    let stream = EventStream::from_config(config);

    let kinds = subscribed_kinds(args.kinds);
    for kind in &kinds {
        let output = *output;
        stream.on(kind, move |event| print_event(output, event));
    }

    let closer = stream.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            closer.close();
        }
    });

    if !output.is_json() {
        output.note(format!("Watching {} for {}", gateway.base_url(), kinds.join(", ")))?;
    }
    stream.run(&gateway).await?;
    Ok(())
}

/// Requested kinds (or the defaults) plus stream errors, each once, in order
fn subscribed_kinds(requested: Vec<String>) -> Vec<String> {
    let mut kinds = if requested.is_empty() {
        DEFAULT_KINDS.iter().map(|kind| kind.to_string()).collect()
    } else {
        requested
    };
    kinds.push(STREAM_ERROR_EVENT.to_string());

    let mut seen = HashSet::new();
    kinds.retain(|kind| seen.insert(kind.clone()));
    kinds
}

fn print_event(output: Output, event: &StreamEvent) {
    let printed = if output.is_json() {
        output.json_line(event)
    } else if event.kind == STREAM_ERROR_EVENT {
        output.warn(format!("Undecodable event: {}", serde_json::Value::Object(event.payload.clone())));
        Ok(())
    } else {
        output.note(format!("{} {}", event.kind, serde_json::Value::Object(event.payload.clone())))
    };

    if let Err(e) = printed {
        tracing::warn!(kind = %event.kind, error = %e, "Failed to print event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_include_stream_errors() {
        let kinds = subscribed_kinds(Vec::new());
        assert_eq!(kinds, vec!["job_status", "job_created", "progress", STREAM_ERROR_EVENT]);
    }

    #[test]
    fn test_requested_kinds_are_deduplicated() {
        let requested = vec![
            STREAM_ERROR_EVENT.to_string(),
            "progress".to_string(),
            "progress".to_string(),
        ];
        assert_eq!(subscribed_kinds(requested), vec![STREAM_ERROR_EVENT, "progress"]);
    }
}
