use std::path::Path;

use packgen_interchange::DescriptionAnalysis;
use packgen_match::find_matches;

use crate::{Context, OutputFormat};

pub(crate) fn cmd_match(analysis_path: &Path, apply: bool, ctx: &Context) {
    let text = match std::fs::read_to_string(analysis_path) {
        Ok(s) => s,
        Err(e) => ctx.fail(&format!(
            "error reading file '{}': {}",
            analysis_path.display(),
            e
        )),
    };
    let analysis: DescriptionAnalysis = match serde_json::from_str(&text) {
        Ok(a) => a,
        Err(e) => ctx.fail(&format!(
            "error parsing analysis in '{}': {}",
            analysis_path.display(),
            e
        )),
    };

    let registry = ctx.registry();
    let result = find_matches(&analysis, &registry.catalog());

    if apply {
        let Some(best) = &result.best_match else {
            ctx.fail("error: no matching scenario to apply");
        };
        let mut store = ctx.store(&registry);
        if let Err(e) = store.set_scenario(best.selection()) {
            ctx.fail(&format!("error: {}", e));
        }
        tracing::info!(scenario = %best.info.qualified_id, "applied best match");
    }

    match ctx.output {
        OutputFormat::Json => ctx.print_json(&result),
        OutputFormat::Text => {
            if result.matches.is_empty() {
                println!("no matching scenarios");
            }
            for m in &result.matches {
                println!("{:.2}  {}  {}", m.confidence(), m.info.qualified_id, m.info.name);
            }
            if ctx.quiet {
                return;
            }
            println!(
                "recommend new scenario: {}",
                if result.recommend_new_scenario { "yes" } else { "no" }
            );
            for line in &result.reasoning {
                println!("  - {}", line);
            }
            if let (true, Some(best)) = (apply, &result.best_match) {
                println!("applied {}", best.info.qualified_id);
            }
        }
    }
}
