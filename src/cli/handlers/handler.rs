//! Handler registry inspection: list, describe.

use anyhow::Result;

use crate::cli::output::{
    output_json, output_json_list, print_header, print_kv, print_section, print_table, OutputMode,
};
use crate::init::AppContext;
use crate::StoryError;

pub fn handle_list(ctx: &AppContext, mode: OutputMode) -> Result<()> {
    let names = ctx.registry.list();

    if mode == OutputMode::Json {
        output_json_list(&names);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = names
        .iter()
        .map(|name| {
            let description = ctx
                .registry
                .describe(name)
                .map(|m| m.description)
                .unwrap_or_default();
            let default = if *name == ctx.config.default_handler {
                "yes".to_string()
            } else {
                String::new()
            };
            vec![name.clone(), description, default]
        })
        .collect();

    print_table(&["Name", "Description", "Default"], rows);
    Ok(())
}

pub fn handle_describe(ctx: &AppContext, name: &str, mode: OutputMode) -> Result<()> {
    let metadata = ctx
        .registry
        .describe(name)
        .ok_or_else(|| StoryError::HandlerNotFound(name.to_string()))?;

    if mode == OutputMode::Json {
        output_json(&metadata);
        return Ok(());
    }

    print_header(&metadata.name);
    print_kv("Description", &metadata.description);
    print_kv(
        "Live events",
        if metadata.accepts_events { "yes" } else { "no" },
    );
    if let Some(schema) = &metadata.config_schema {
        print_section(
            "Config schema",
            &serde_json::to_string_pretty(schema).unwrap_or_default(),
        );
    }
    Ok(())
}
