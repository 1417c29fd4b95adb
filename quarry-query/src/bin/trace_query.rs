/// Query Tracer - Shows the flow through Schema → Tokens → Result → Suggestions
///
/// Usage: cargo run --bin trace_query <schema-file> <query> [caret]
///
/// Set RUST_LOG=quarry_query=trace to see scanner and resolver logs.

use quarry_query::config::load_schema;
use quarry_query::{parse, pretty_print, suggest_at, Selection};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: cargo run --bin trace_query <schema-file> <query> [caret]");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --bin trace_query schema.yaml 'rust tag:async sort:n'");
        std::process::exit(1);
    }

    let schema_path = &args[1];
    let query = &args[2];
    let caret = match args.get(3).map(|raw| raw.parse::<usize>()) {
        None => query.len(),
        Some(Ok(caret)) if caret <= query.len() => caret,
        Some(_) => {
            eprintln!("❌ Caret must be a byte offset between 0 and {}", query.len());
            std::process::exit(1);
        }
    };

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ QUARRY QUERY TRACER");
    println!("╚═══════════════════════════════════════════════════════════════\n");

    let schema = match load_schema(schema_path) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("❌ Failed to load {}: {}", schema_path, e);
            std::process::exit(1);
        }
    };

    println!("📋 SCHEMA ({} options):", schema.len());
    for spec in &schema {
        let multiple = if spec.multiple { " (multiple)" } else { "" };
        println!("  {}: {}{}", spec.name, spec.kind.as_str(), multiple);
    }
    println!();

    let output = parse(query, &schema);

    println!("🔍 TOKENS:");
    println!("─────────────────────────────────────────────────────────────");
    for token in &output.tokens {
        println!(
            "  {:>3}..{:<3} {:<24} {:?}",
            token.span.start,
            token.span.end,
            token.kind.as_str(),
            token.raw
        );
    }
    println!();

    match &output.error {
        None => println!("✅ Parse succeeded!"),
        Some(err) => {
            println!("❌ {}", err);
            println!("   {}", query);
            println!("   {}^", " ".repeat(query[..err.position].chars().count()));
        }
    }
    println!();

    println!("🌳 RESULT:");
    println!("─────────────────────────────────────────────────────────────");
    match serde_json::to_string_pretty(&output.result) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("(failed to serialize result: {})", e),
    }
    println!();

    println!("🔄 CANONICAL QUERY:");
    println!("─────────────────────────────────────────────────────────────");
    println!("{}", pretty_print(&output.result));
    println!();

    println!("💡 SUGGESTIONS AT {}:", caret);
    println!("─────────────────────────────────────────────────────────────");
    let candidates = suggest_at(&output.tokens, Selection::caret(caret), &schema).await;
    if candidates.is_empty() {
        println!("  (none)");
    }
    for candidate in candidates {
        println!("  {}", candidate);
    }
}
