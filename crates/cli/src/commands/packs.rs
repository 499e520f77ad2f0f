use packgen_interchange::qualified_name;
use serde::Serialize;

use crate::{Context, OutputFormat};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PackSummary<'a> {
    id: &'a str,
    name: &'a str,
    version: &'a str,
    business_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    schemas: Vec<&'a str>,
    scenarios: Vec<String>,
    personas: Vec<String>,
    routes: Vec<&'a str>,
}

pub(crate) fn cmd_packs(ctx: &Context) {
    let registry = ctx.registry();

    let summaries: Vec<PackSummary> = registry
        .packs()
        .map(|pack| PackSummary {
            id: &pack.id,
            name: &pack.name,
            version: &pack.version,
            business_type: pack.business_type(),
            description: pack.description.as_deref(),
            schemas: pack.schemas.keys().map(String::as_str).collect(),
            scenarios: pack
                .scenarios
                .keys()
                .map(|k| qualified_name(&pack.id, k))
                .collect(),
            personas: pack
                .personas
                .keys()
                .map(|k| qualified_name(&pack.id, k))
                .collect(),
            routes: pack.routes.keys().map(String::as_str).collect(),
        })
        .collect();

    match ctx.output {
        OutputFormat::Json => ctx.print_json(&summaries),
        OutputFormat::Text => {
            if summaries.is_empty() {
                if !ctx.quiet {
                    println!("no packs found");
                }
                return;
            }
            for s in &summaries {
                println!("{} {} ({}) [{}]", s.id, s.version, s.name, s.business_type);
                if ctx.quiet {
                    continue;
                }
                println!("  schemas:   {}", s.schemas.join(", "));
                println!("  scenarios: {}", s.scenarios.join(", "));
                if !s.personas.is_empty() {
                    println!("  personas:  {}", s.personas.join(", "));
                }
                if !s.routes.is_empty() {
                    println!("  routes:    {}", s.routes.join(", "));
                }
            }
        }
    }
}
